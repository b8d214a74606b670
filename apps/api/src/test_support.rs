//! In-memory fakes for every external service, shared by unit and router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::assessment::classifier::{CareerClassifier, ClassifierError};
use crate::assessment::features::FeatureVector;
use crate::auth::{
    AuthError, AuthEvent, AuthGateway, AuthSession, AuthUser, SignUpMetadata, SignUpOutcome,
};
use crate::colleges::{CollegeSite, CollegeSource, Coordinate, GeodataError};
use crate::config::Config;
use crate::continuation::MemoryContinuationStore;
use crate::errors::AppError;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::profile::ProfileRow;
use crate::profile::{mobile_taken, CompletionFlag, NewProfile, ProfileStore};
use crate::state::AppState;

pub struct FixedClassifier {
    label: String,
    received: Mutex<Vec<FeatureVector>>,
}

impl FixedClassifier {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<FeatureVector> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl CareerClassifier for FixedClassifier {
    async fn classify(&self, features: &FeatureVector) -> Result<String, ClassifierError> {
        self.received.lock().unwrap().push(*features);
        Ok(self.label.clone())
    }
}

pub struct FailingClassifier;

#[async_trait]
impl CareerClassifier for FailingClassifier {
    async fn classify(&self, _features: &FeatureVector) -> Result<String, ClassifierError> {
        Err(ClassifierError::Status(503))
    }
}

/// Answers every prompt with the same text and records what it was asked.
pub struct ScriptedGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 529,
            message: "overloaded".to_string(),
        })
    }
}

pub struct FixedCollegeSource {
    sites: Vec<CollegeSite>,
    requests: Mutex<Vec<(Coordinate, u32)>>,
}

impl FixedCollegeSource {
    pub fn new(sites: Vec<CollegeSite>) -> Self {
        Self {
            sites,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Coordinate, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CollegeSource for FixedCollegeSource {
    async fn nearby(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<CollegeSite>, GeodataError> {
        self.requests.lock().unwrap().push((center, radius_m));
        Ok(self.sites.clone())
    }
}

pub struct FailingCollegeSource;

#[async_trait]
impl CollegeSource for FailingCollegeSource {
    async fn nearby(
        &self,
        _center: Coordinate,
        _radius_m: u32,
    ) -> Result<Vec<CollegeSite>, GeodataError> {
        Err(GeodataError::Status(504))
    }
}

struct Account {
    password: String,
    user: AuthUser,
}

/// Accounts keyed by email; every sign-in issues a fresh access token.
pub struct MemoryAuthGateway {
    accounts: Mutex<HashMap<String, Account>>,
    tokens: Mutex<HashMap<String, AuthUser>>,
    events: broadcast::Sender<AuthEvent>,
}

impl MemoryAuthGateway {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            events,
        }
    }

    fn issue(&self, user: AuthUser) -> AuthSession {
        let access_token = format!("access-{}", Uuid::new_v4());
        self.tokens
            .lock()
            .unwrap()
            .insert(access_token.clone(), user.clone());
        AuthSession {
            access_token,
            refresh_token: format!("refresh-{}", user.id),
            expires_in: 3600,
            user,
        }
    }

    fn invalid() -> AuthError {
        AuthError::InvalidCredentials("Invalid login credentials".to_string())
    }
}

#[async_trait]
impl AuthGateway for MemoryAuthGateway {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _metadata: &SignUpMetadata,
    ) -> Result<SignUpOutcome, AuthError> {
        let user = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(AuthError::AccountExists("User already registered".to_string()));
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: Some(email.to_string()),
                phone: None,
            };
            accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    user: user.clone(),
                },
            );
            user
        };
        let _ = self.events.send(AuthEvent::SignedUp(user.id));
        Ok(SignUpOutcome {
            user: user.clone(),
            session: Some(self.issue(user)),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let user = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(Self::invalid()),
            }
        };
        let _ = self.events.send(AuthEvent::SignedIn(user.id));
        Ok(self.issue(user))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let user = {
            let accounts = self.accounts.lock().unwrap();
            accounts
                .values()
                .find(|a| format!("refresh-{}", a.user.id) == refresh_token)
                .map(|a| a.user.clone())
                .ok_or_else(Self::invalid)?
        };
        Ok(self.issue(user))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.tokens.lock().unwrap().remove(access_token);
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        self.tokens
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(Self::invalid)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

/// Mirrors the `profiles` table, including the unique mobile constraint.
#[derive(Default)]
pub struct MemoryProfileStore {
    rows: Mutex<HashMap<Uuid, ProfileRow>>,
    mobile_lookups: Mutex<Vec<String>>,
    reject_next_create: Mutex<bool>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mobile_lookups(&self) -> Vec<String> {
        self.mobile_lookups.lock().unwrap().clone()
    }

    /// The next `create` fails as if a concurrent sign-up had taken the mobile.
    pub fn reject_next_create(&self) {
        *self.reject_next_create.lock().unwrap() = true;
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<ProfileRow>, AppError> {
        self.mobile_lookups.lock().unwrap().push(mobile.to_string());
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|p| p.mobile == mobile)
            .cloned())
    }

    async fn create(&self, profile: NewProfile) -> Result<ProfileRow, AppError> {
        if std::mem::take(&mut *self.reject_next_create.lock().unwrap()) {
            return Err(mobile_taken());
        }
        let row = profile.into_row();
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|p| p.mobile == row.mobile) {
            return Err(mobile_taken());
        }
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save(&self, profile: &ProfileRow) -> Result<ProfileRow, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&profile.id) {
            return Err(AppError::NotFound(format!("Profile {} not found", profile.id)));
        }
        rows.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn mark_completed(&self, id: Uuid, flag: CompletionFlag) -> Result<(), AppError> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
            match flag {
                CompletionFlag::Personality => row.personality_completed = true,
                CompletionFlag::Appearance => row.appearance_completed = true,
            }
        }
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/compass_test".to_string(),
        redis_url: "redis://localhost".to_string(),
        auth_url: "http://auth.test".to_string(),
        auth_anon_key: "anon".to_string(),
        anthropic_api_key: "test-key".to_string(),
        classifier_url: "http://classifier.test/predict".to_string(),
        geodata_url: "http://geodata.test/api/interpreter".to_string(),
        college_search_radius_m: 10_000,
        default_location: Coordinate {
            lat: 23.0225,
            lon: 72.5714,
        },
        session_ttl_secs: 3600,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// Fakes wired into an `AppState`, with handles kept for assertions.
pub struct TestHarness {
    pub state: AppState,
    pub profiles: Arc<MemoryProfileStore>,
    pub classifier: Arc<FixedClassifier>,
    pub llm: Arc<ScriptedGenerator>,
    pub colleges: Arc<FixedCollegeSource>,
}

impl TestHarness {
    pub fn new(llm_reply: &str, sites: Vec<CollegeSite>) -> Self {
        let profiles = Arc::new(MemoryProfileStore::new());
        let classifier = Arc::new(FixedClassifier::new("Engineering"));
        let llm = Arc::new(ScriptedGenerator::new(llm_reply));
        let colleges = Arc::new(FixedCollegeSource::new(sites));
        let state = AppState {
            config: test_config(),
            auth: Arc::new(MemoryAuthGateway::new()),
            profiles: profiles.clone(),
            sessions: Arc::new(MemoryContinuationStore::new()),
            llm: llm.clone(),
            classifier: classifier.clone(),
            colleges: colleges.clone(),
        };
        Self {
            state,
            profiles,
            classifier,
            llm,
            colleges,
        }
    }
}
