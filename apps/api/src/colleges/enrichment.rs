use serde::Serialize;

pub const UNRANKED: &str = "Not ranked in NIRF";
pub const NO_PREREQUISITES: &str = "No data available";

/// Locally curated facts about an institution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enrichment {
    pub ranking: String,
    /// Average and highest package, in lakh per annum.
    pub placement: [f64; 2],
    pub prerequisites: Vec<String>,
}

impl Enrichment {
    fn placeholder() -> Self {
        Self {
            ranking: UNRANKED.to_string(),
            placement: [0.0, 0.0],
            prerequisites: vec![NO_PREREQUISITES.to_string()],
        }
    }
}

struct Entry {
    name: &'static str,
    ranking: &'static str,
    placement: [f64; 2],
    prerequisites: &'static [&'static str],
}

const TABLE: &[Entry] = &[
    Entry {
        name: "Nirma University",
        ranking: "NIRF Engineering Rank 81",
        placement: [8.5, 45.0],
        prerequisites: &[
            "JEE Main / GUJCET score",
            "10+2 with Physics, Chemistry, Mathematics",
        ],
    },
    Entry {
        name: "Gujarat University",
        ranking: "NIRF University Rank 62",
        placement: [4.5, 12.0],
        prerequisites: &["10+2 from a recognised board", "GCAS merit admission"],
    },
    Entry {
        name: "Indian Institute of Management Ahmedabad",
        ranking: "NIRF Management Rank 1",
        placement: [34.5, 115.0],
        prerequisites: &["CAT score", "Bachelor's degree with at least 50% marks"],
    },
];

/// Exact, case-sensitive name match; unknown names get placeholder values.
pub fn enrich(name: &str) -> Enrichment {
    TABLE
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| Enrichment {
            ranking: entry.ranking.to_string(),
            placement: entry.placement,
            prerequisites: entry.prerequisites.iter().map(|p| p.to_string()).collect(),
        })
        .unwrap_or_else(Enrichment::placeholder)
}
