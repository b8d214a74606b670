use anyhow::{Context, Result};

use crate::colleges::Coordinate;

const DEFAULT_GEODATA_URL: &str = "https://overpass-api.de/api/interpreter";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    /// Base URL of the hosted auth/database backend (e.g. `https://xyz.example.co`).
    pub auth_url: String,
    pub auth_anon_key: String,
    pub anthropic_api_key: String,
    /// Career classification endpoint, receives the personality feature vector.
    pub classifier_url: String,
    pub geodata_url: String,
    pub college_search_radius_m: u32,
    /// Map center used when the client cannot supply a location.
    pub default_location: Coordinate,
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            auth_url: require_env("AUTH_URL")?,
            auth_anon_key: require_env("AUTH_ANON_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            classifier_url: require_env("CLASSIFIER_URL")?,
            geodata_url: std::env::var("GEODATA_URL")
                .unwrap_or_else(|_| DEFAULT_GEODATA_URL.to_string()),
            college_search_radius_m: parse_env("COLLEGE_SEARCH_RADIUS_M", 10_000)?,
            default_location: Coordinate {
                lat: parse_env("DEFAULT_LAT", 23.0225)?,
                lon: parse_env("DEFAULT_LON", 72.5714)?,
            },
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 86_400)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
