//! REST client for the hosted auth backend (`/auth/v1/*`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::auth::{
    AuthError, AuthEvent, AuthGateway, AuthSession, AuthUser, SignUpMetadata, SignUpOutcome,
};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
struct RawUser {
    id: uuid::Uuid,
    email: Option<String>,
    phone: Option<String>,
}

impl From<RawUser> for AuthUser {
    fn from(raw: RawUser) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        AuthUser {
            id: raw.id,
            email: non_empty(raw.email),
            phone: non_empty(raw.phone),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSession {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    user: RawUser,
}

impl From<RawSession> for AuthSession {
    fn from(raw: RawSession) -> Self {
        AuthSession {
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
            expires_in: raw.expires_in,
            user: raw.user.into(),
        }
    }
}

#[derive(Clone)]
pub struct HostedAuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
    events: broadcast::Sender<AuthEvent>,
}

impl HostedAuthClient {
    pub fn new(client: Client, base_url: &str, anon_key: String) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            events,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// Adds the project key and, when given, the user's bearer token.
    fn authorize(&self, request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }

    fn publish(&self, event: AuthEvent) {
        debug!("Auth event: {event:?}");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn session_from(&self, response: Response) -> Result<AuthSession, AuthError> {
        let body = read_success(response).await?;
        serde_json::from_value::<RawSession>(body)
            .map(AuthSession::from)
            .map_err(|e| AuthError::Malformed(e.to_string()))
    }
}

/// Returns the JSON body of a 2xx response, or the classified error.
async fn read_success(response: Response) -> Result<Value, AuthError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(classify_error(status.as_u16(), &text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| AuthError::Malformed(e.to_string()))
}

/// Maps a non-2xx auth response onto `AuthError`. The backend has used both
/// `{ error_code, msg }` and `{ error, error_description }` bodies.
fn classify_error(status: u16, body: &str) -> AuthError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let field = |key: &str| parsed.get(key).and_then(Value::as_str).map(str::to_string);

    let message = field("msg")
        .or_else(|| field("error_description"))
        .or_else(|| field("message"))
        .unwrap_or_else(|| body.trim().to_string());
    let code = field("error_code").or_else(|| field("error")).unwrap_or_default();

    let already_exists = matches!(code.as_str(), "user_already_exists" | "email_exists")
        || message.to_lowercase().contains("already registered");
    let bad_credentials = matches!(
        code.as_str(),
        "invalid_credentials" | "invalid_grant" | "bad_jwt" | "session_not_found"
    ) || status == 401
        || status == 403;

    if already_exists {
        AuthError::AccountExists(message)
    } else if bad_credentials {
        AuthError::InvalidCredentials(message)
    } else if status >= 500 {
        AuthError::Upstream { status, message }
    } else {
        AuthError::Rejected { status, message }
    }
}

/// Sign-up returns a full session when the account is usable immediately,
/// otherwise just the user pending email confirmation.
fn parse_sign_up(body: Value) -> Result<SignUpOutcome, AuthError> {
    if body.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value::<RawSession>(body)
            .map_err(|e| AuthError::Malformed(e.to_string()))?
            .into();
        return Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        });
    }
    let user = body.get("user").cloned().unwrap_or(body);
    let user: AuthUser = serde_json::from_value::<RawUser>(user)
        .map_err(|e| AuthError::Malformed(e.to_string()))?
        .into();
    Ok(SignUpOutcome {
        user,
        session: None,
    })
}

#[async_trait]
impl AuthGateway for HostedAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpOutcome, AuthError> {
        let request = self.client.post(self.url("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": metadata,
        }));
        let response = self.authorize(request, None).send().await?;
        let outcome = parse_sign_up(read_success(response).await?)?;

        info!("Signed up user {}", outcome.user.id);
        self.publish(AuthEvent::SignedUp(outcome.user.id));
        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let request = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = self.authorize(request, None).send().await?;
        let session = self.session_from(response).await?;

        info!("User {} signed in", session.user.id);
        self.publish(AuthEvent::SignedIn(session.user.id));
        Ok(session)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let request = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));
        let response = self.authorize(request, None).send().await?;
        let session = self.session_from(response).await?;

        self.publish(AuthEvent::TokenRefreshed(session.user.id));
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let request = self.client.post(self.url("logout"));
        let response = self.authorize(request, Some(access_token)).send().await?;
        read_success(response).await?;

        self.publish(AuthEvent::SignedOut);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let request = self.client.get(self.url("user"));
        let response = self.authorize(request, Some(access_token)).send().await?;
        let body = read_success(response).await?;
        serde_json::from_value::<RawUser>(body)
            .map(AuthUser::from)
            .map_err(|e| AuthError::Malformed(e.to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
