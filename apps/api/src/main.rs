mod assessment;
mod auth;
mod colleges;
mod config;
mod continuation;
mod db;
mod errors;
mod forms;
mod llm_client;
mod models;
mod profile;
mod recommendation;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::classifier::HttpCareerClassifier;
use crate::auth::{AuthEvent, AuthGateway, HostedAuthClient};
use crate::colleges::OverpassClient;
use crate::config::Config;
use crate::continuation::RedisContinuationStore;
use crate::db::{connect_redis, create_pool};
use crate::llm_client::LlmClient;
use crate::profile::PgProfileStore;
use crate::routes::build_router;
use crate::state::AppState;

const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Compass API v{}", env!("CARGO_PKG_VERSION"));

    // Profiles live in the hosted backend's Postgres
    let db = create_pool(&config.database_url).await?;

    // In-flight assessments
    let redis = connect_redis(&config.redis_url).await?;

    // One HTTP client shared by every outbound integration
    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

    let auth = Arc::new(HostedAuthClient::new(
        http.clone(),
        &config.auth_url,
        config.auth_anon_key.clone(),
    ));
    spawn_auth_event_logger(auth.as_ref());

    let llm = LlmClient::new(http.clone(), config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        config: config.clone(),
        auth,
        profiles: Arc::new(PgProfileStore::new(db)),
        sessions: Arc::new(RedisContinuationStore::new(redis, config.session_ttl_secs)),
        llm: Arc::new(llm),
        classifier: Arc::new(HttpCareerClassifier::new(
            http.clone(),
            config.classifier_url.clone(),
        )),
        colleges: Arc::new(OverpassClient::new(http, config.geodata_url.clone())),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Follows session changes for the lifetime of the process.
fn spawn_auth_event_logger(auth: &dyn AuthGateway) {
    let mut events = auth.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedUp(id)) => info!("Auth: account created for {id}"),
                Ok(AuthEvent::SignedIn(id)) => info!("Auth: {id} signed in"),
                Ok(AuthEvent::TokenRefreshed(id)) => info!("Auth: session refreshed for {id}"),
                Ok(AuthEvent::SignedOut) => info!("Auth: a session was signed out"),
                Err(RecvError::Lagged(missed)) => warn!("Auth event logger skipped {missed} events"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
