//! College locator: nearby institutions from public geodata, enriched with
//! locally curated rankings and admission prerequisites.

pub mod enrichment;
pub mod handlers;
pub mod overpass;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use enrichment::{enrich, Enrichment};

pub use overpass::OverpassClient;

pub const GEODATA_BANNER: &str =
    "We couldn't load nearby colleges right now. Please try again in a moment.";

#[derive(Debug, Error)]
pub enum GeodataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geodata service returned status {0}")]
    Status(u16),

    #[error("unexpected geodata response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("lat must be between -90 and 90, got {}", self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(format!("lon must be between -180 and 180, got {}", self.lon));
        }
        Ok(())
    }
}

/// An institution as reported by the geodata source, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct CollegeSite {
    /// `<element type>/<numeric id>`, e.g. `way/123`.
    pub id: String,
    pub name: String,
    pub position: Coordinate,
    pub area: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollegeRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub area: String,
    #[serde(flatten)]
    pub enrichment: Enrichment,
}

impl From<CollegeSite> for CollegeRecord {
    fn from(site: CollegeSite) -> Self {
        let enrichment = enrich(&site.name);
        Self {
            id: site.id,
            name: site.name,
            lat: site.position.lat,
            lon: site.position.lon,
            area: site.area,
            enrichment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollegeSearch {
    pub center: Coordinate,
    pub used_default_location: bool,
    pub colleges: Vec<CollegeRecord>,
    /// User-facing message when the geodata lookup failed.
    pub banner: Option<String>,
}

#[async_trait]
pub trait CollegeSource: Send + Sync {
    async fn nearby(&self, center: Coordinate, radius_m: u32)
        -> Result<Vec<CollegeSite>, GeodataError>;
}

/// Looks up institutions around `center`, or around `fallback` when the
/// client had no location. Geodata failures degrade to an empty list with a
/// banner instead of an error.
pub async fn locate(
    source: &dyn CollegeSource,
    center: Option<Coordinate>,
    fallback: Coordinate,
    radius_m: u32,
) -> CollegeSearch {
    let used_default_location = center.is_none();
    let center = center.unwrap_or(fallback);

    match source.nearby(center, radius_m).await {
        Ok(sites) => {
            let colleges: Vec<CollegeRecord> = sites.into_iter().map(CollegeRecord::from).collect();
            info!(
                "Found {} colleges within {}m of ({}, {})",
                colleges.len(),
                radius_m,
                center.lat,
                center.lon
            );
            CollegeSearch {
                center,
                used_default_location,
                colleges,
                banner: None,
            }
        }
        Err(e) => {
            warn!("College lookup failed: {e}");
            CollegeSearch {
                center,
                used_default_location,
                colleges: Vec::new(),
                banner: Some(GEODATA_BANNER.to_string()),
            }
        }
    }
}
