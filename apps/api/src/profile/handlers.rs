use axum::{extract::State, Json};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::profile::{apply_patch, mobile_taken, ProfilePatch};
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ProfileRow>, AppError> {
    let profile = state
        .profiles
        .get(current.user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", current.user.id)))?;
    Ok(Json(profile))
}

/// PATCH /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<ProfileRow>, AppError> {
    patch.validate().map_err(AppError::InvalidForm)?;

    if let Some(mobile) = &patch.mobile {
        if let Some(other) = state.profiles.find_by_mobile(mobile).await? {
            if other.id != current.user.id {
                return Err(mobile_taken());
            }
        }
    }

    let profile = state
        .profiles
        .get(current.user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", current.user.id)))?;

    let saved = state.profiles.save(&apply_patch(profile, patch)).await?;
    Ok(Json(saved))
}
