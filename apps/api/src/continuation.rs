//! Continuation store: carries an `AssessmentSession` between requests.
//!
//! Sessions are stored as JSON under `assessment:<id>` and expire after the
//! configured TTL. Staleness is not checked beyond that.

#[cfg(test)]
use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use thiserror::Error;
#[cfg(test)]
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::assessment::session::AssessmentSession;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt session payload: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait ContinuationStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<AssessmentSession>, StoreError>;
    async fn save(&self, session: &AssessmentSession) -> Result<(), StoreError>;
    /// Returns whether a session was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

fn session_key(id: Uuid) -> String {
    format!("assessment:{id}")
}

#[derive(Clone)]
pub struct RedisContinuationStore {
    /// Reconnects on its own after the server drops the connection.
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl RedisContinuationStore {
    pub fn new(conn: ConnectionManager, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }
}

#[async_trait]
impl ContinuationStore for RedisContinuationStore {
    async fn load(&self, id: Uuid) -> Result<Option<AssessmentSession>, StoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = redis::cmd("GET")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await?;
        payload
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save(&self, session: &AssessmentSession) -> Result<(), StoreError> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(session_key(session.id))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!("Saved assessment session {} ({:?})", session.id, session.state);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }
}

/// Process-local store. Keeps the JSON encoding so tests exercise the same
/// serialization path as Redis.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryContinuationStore {
    sessions: RwLock<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryContinuationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl ContinuationStore for MemoryContinuationStore {
    async fn load(&self, id: Uuid) -> Result<Option<AssessmentSession>, StoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_key(id))
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save(&self, session: &AssessmentSession) -> Result<(), StoreError> {
        let payload = serde_json::to_string(session)?;
        self.sessions
            .write()
            .await
            .insert(session_key(session.id), payload);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(&session_key(id)).is_some())
    }
}
