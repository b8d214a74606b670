use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::profile::{mobile_taken, CompletionFlag, NewProfile, ProfileStore};

/// Profiles table in the hosted backend's Postgres database.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations come from a concurrent insert that slipped past the
/// handler's lookup; they are conflicts, not server errors.
fn insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some(constraint) if constraint.contains("mobile") => mobile_taken(),
                _ => AppError::Conflict("Profile already exists".to_string()),
            };
        }
    }
    AppError::Database(e)
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        Ok(
            sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<ProfileRow>, AppError> {
        Ok(
            sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE mobile = $1 LIMIT 1")
                .bind(mobile)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create(&self, profile: NewProfile) -> Result<ProfileRow, AppError> {
        let row = profile.into_row();
        let created = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles
                (id, full_name, email, mobile, academic_info,
                 profile_completed, personality_completed, appearance_completed,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(&row.full_name)
        .bind(&row.email)
        .bind(&row.mobile)
        .bind(&row.academic_info)
        .bind(row.profile_completed)
        .bind(row.personality_completed)
        .bind(row.appearance_completed)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(insert_error)?;

        info!("Created profile for user {}", created.id);
        Ok(created)
    }

    async fn save(&self, profile: &ProfileRow) -> Result<ProfileRow, AppError> {
        sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET full_name = $2, mobile = $3, academic_info = $4,
                profile_completed = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.full_name)
        .bind(&profile.mobile)
        .bind(&profile.academic_info)
        .bind(profile.profile_completed)
        .bind(profile.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", profile.id)))
    }

    async fn mark_completed(&self, id: Uuid, flag: CompletionFlag) -> Result<(), AppError> {
        let sql = match flag {
            CompletionFlag::Personality => {
                "UPDATE profiles SET personality_completed = TRUE, updated_at = NOW() WHERE id = $1"
            }
            CompletionFlag::Appearance => {
                "UPDATE profiles SET appearance_completed = TRUE, updated_at = NOW() WHERE id = $1"
            }
        };
        sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}
