use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    /// Same id as the auth backend's user.
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    /// Free-form key/value academic details (board, stream, grades, ...).
    pub academic_info: Value,
    pub profile_completed: bool,
    pub personality_completed: bool,
    pub appearance_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
