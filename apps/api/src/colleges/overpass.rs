//! Overpass API client for university/college lookups.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::colleges::{CollegeSite, CollegeSource, Coordinate, GeodataError};

const AREA_TAGS: [&str; 4] = ["addr:suburb", "addr:city", "addr:district", "is_in"];
pub const UNKNOWN_AREA: &str = "Unknown area";
pub const UNNAMED: &str = "Unnamed institution";

pub fn build_query(center: Coordinate, radius_m: u32) -> String {
    let around = format!("(around:{radius_m},{},{})", center.lat, center.lon);
    format!(
        "[out:json][timeout:25];(\
         node[\"amenity\"~\"university|college\"]{around};\
         way[\"amenity\"~\"university|college\"]{around};\
         relation[\"amenity\"~\"university|college\"]{around};\
         );out center;"
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    /// Ways and relations carry their centroid here with `out center`.
    center: Option<LatLon>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl Element {
    fn position(&self) -> Option<Coordinate> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Some(Coordinate { lat, lon }),
            (_, _, Some(c)) => Some(Coordinate { lat: c.lat, lon: c.lon }),
            _ => None,
        }
    }

    fn into_site(self) -> Option<CollegeSite> {
        let position = self.position()?;
        // Kept verbatim: enrichment matches the exact tag value.
        let name = self
            .tags
            .get("name")
            .filter(|n| !n.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| UNNAMED.to_string());
        let area = AREA_TAGS
            .iter()
            .find_map(|tag| self.tags.get(*tag).filter(|v| !v.trim().is_empty()))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_AREA.to_string());

        Some(CollegeSite {
            id: format!("{}/{}", self.kind, self.id),
            name,
            position,
            area,
        })
    }
}

/// Elements without resolvable coordinates are dropped; duplicates are kept.
pub fn parse_elements(body: &str) -> Result<Vec<CollegeSite>, GeodataError> {
    let parsed: OverpassResponse =
        serde_json::from_str(body).map_err(|e| GeodataError::Malformed(e.to_string()))?;
    Ok(parsed
        .elements
        .into_iter()
        .filter_map(Element::into_site)
        .collect())
}

#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    url: String,
}

impl OverpassClient {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl CollegeSource for OverpassClient {
    async fn nearby(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<CollegeSite>, GeodataError> {
        let query = build_query(center, radius_m);
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeodataError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let sites = parse_elements(&body)?;
        debug!("Geodata returned {} institutions", sites.len());
        Ok(sites)
    }
}
