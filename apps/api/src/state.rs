use std::sync::Arc;

use crate::assessment::classifier::CareerClassifier;
use crate::auth::AuthGateway;
use crate::colleges::CollegeSource;
use crate::config::Config;
use crate::continuation::ContinuationStore;
use crate::llm_client::TextGenerator;
use crate::profile::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every external service sits behind a trait so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: Arc<dyn AuthGateway>,
    pub profiles: Arc<dyn ProfileStore>,
    /// In-flight assessment sessions, keyed by session id.
    pub sessions: Arc<dyn ContinuationStore>,
    pub llm: Arc<dyn TextGenerator>,
    pub classifier: Arc<dyn CareerClassifier>,
    pub colleges: Arc<dyn CollegeSource>,
}
