//! Auth gateway wrapping the hosted backend's sign-up, sign-in and session calls.
//!
//! The rest of the service only sees `AuthGateway`; `HostedAuthClient` is the
//! production implementation. Session changes are published on a broadcast
//! channel so interested parties can follow sign-ins and sign-outs.

pub mod client;
pub mod extractor;
pub mod handlers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

pub use client::HostedAuthClient;
pub use extractor::CurrentUser;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Wrong email/password, or an expired/invalid access token.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    AccountExists(String),

    /// Any other 4xx the backend explains itself (weak password, rate limit, ...).
    #[error("auth backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("auth backend failed ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("unexpected auth backend response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until `access_token` expires.
    pub expires_in: u64,
    pub user: AuthUser,
}

/// Extra fields stored with the account at sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub mobile: String,
}

/// Sign-up may or may not return a session, depending on whether the backend
/// requires email confirmation first.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedUp(Uuid),
    SignedIn(Uuid),
    TokenRefreshed(Uuid),
    SignedOut,
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Resolves an access token to its user; `InvalidCredentials` if the token
    /// is expired or unknown.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
