//! One profile record per user, keyed by the auth user id.

pub mod handlers;
pub mod store;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::errors::AppError;
use crate::forms::validators::{validate_name, validate_phone};
use crate::forms::FieldErrors;
use crate::models::profile::ProfileRow;

pub use store::PgProfileStore;

/// A mobile number belongs to at most one profile.
pub fn mobile_taken() -> AppError {
    AppError::Auth(AuthError::AccountExists(
        "Mobile number is already registered".to_string(),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionFlag {
    Personality,
    Appearance,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
}

impl NewProfile {
    pub fn into_row(self) -> ProfileRow {
        let now = Utc::now();
        ProfileRow {
            id: self.id,
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            mobile: self.mobile,
            academic_info: Value::Object(Map::new()),
            profile_completed: false,
            personality_completed: false,
            appearance_completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update from the client. Absent fields are left untouched;
/// `academic_info` replaces the stored blob wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub academic_info: Option<Map<String, Value>>,
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.full_name {
            errors.check("full_name", validate_name(name));
        }
        if let Some(mobile) = &self.mobile {
            errors.check("mobile", validate_phone(mobile));
        }
        errors.into_result()
    }
}

/// A profile is complete once it has a name, a valid mobile number and at
/// least one academic detail.
pub fn is_profile_complete(profile: &ProfileRow) -> bool {
    let has_academics = profile
        .academic_info
        .as_object()
        .map(|m| !m.is_empty())
        .unwrap_or(false);
    validate_name(&profile.full_name).is_ok()
        && validate_phone(&profile.mobile).is_ok()
        && has_academics
}

pub fn apply_patch(mut profile: ProfileRow, patch: ProfilePatch) -> ProfileRow {
    if let Some(name) = patch.full_name {
        profile.full_name = name.trim().to_string();
    }
    if let Some(mobile) = patch.mobile {
        profile.mobile = mobile;
    }
    if let Some(info) = patch.academic_info {
        profile.academic_info = Value::Object(info);
    }
    profile.profile_completed = is_profile_complete(&profile);
    profile.updated_at = Utc::now();
    profile
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ProfileRow>, AppError>;
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<ProfileRow>, AppError>;
    async fn create(&self, profile: NewProfile) -> Result<ProfileRow, AppError>;
    /// Writes every mutable column of `profile`.
    async fn save(&self, profile: &ProfileRow) -> Result<ProfileRow, AppError>;
    async fn mark_completed(&self, id: Uuid, flag: CompletionFlag) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> ProfileRow {
        NewProfile {
            id: Uuid::new_v4(),
            full_name: " Asha Patel ".to_string(),
            email: "Asha@Example.com".to_string(),
            mobile: "9876543210".to_string(),
        }
        .into_row()
    }

    #[test]
    fn test_new_profile_normalises_fields() {
        let profile = row();
        assert_eq!(profile.full_name, "Asha Patel");
        assert_eq!(profile.email, "asha@example.com");
        assert_eq!(profile.academic_info, json!({}));
        assert!(!profile.profile_completed);
    }

    #[test]
    fn test_patch_with_academics_completes_profile() {
        let info = json!({ "board": "GSEB", "stream": "Science", "percentage": 88 });
        let patch = ProfilePatch {
            academic_info: info.as_object().cloned(),
            ..ProfilePatch::default()
        };
        let updated = apply_patch(row(), patch);
        assert!(updated.profile_completed);
        assert_eq!(updated.academic_info["stream"], "Science");
    }

    #[test]
    fn test_patch_leaves_absent_fields_untouched() {
        let original = row();
        let updated = apply_patch(
            original.clone(),
            ProfilePatch {
                full_name: Some("Asha P.".to_string()),
                ..ProfilePatch::default()
            },
        );
        assert_eq!(updated.full_name, "Asha P.");
        assert_eq!(updated.mobile, original.mobile);
        assert_eq!(updated.email, original.email);
    }

    #[test]
    fn test_patch_validation_rejects_bad_mobile() {
        let patch = ProfilePatch {
            mobile: Some("12345".to_string()),
            ..ProfilePatch::default()
        };
        assert!(patch.validate().unwrap_err().get("mobile").is_some());
    }

    #[test]
    fn test_empty_academics_keep_profile_incomplete() {
        let patch = ProfilePatch {
            academic_info: Some(Map::new()),
            ..ProfilePatch::default()
        };
        assert!(!apply_patch(row(), patch).profile_completed);
    }
}
