use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{
    AuthError, AuthSession, AuthUser, CurrentUser, SignUpMetadata, SignUpOutcome,
};
use crate::errors::AppError;
use crate::forms::{Credential, SignInForm, SignUpForm};
use crate::models::profile::ProfileRow;
use crate::profile::{mobile_taken, NewProfile};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SignUpResponse {
    pub user: AuthUser,
    /// Absent when the backend wants the email confirmed before the first sign-in.
    pub session: Option<AuthSession>,
    pub profile: ProfileRow,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub session: AuthSession,
    pub profile: Option<ProfileRow>,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct AuthContext {
    pub user: AuthUser,
    pub session_valid: bool,
    pub profile: Option<ProfileRow>,
}

/// POST /api/v1/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    form.validate().map_err(AppError::InvalidForm)?;

    if state.profiles.find_by_mobile(&form.mobile).await?.is_some() {
        return Err(mobile_taken());
    }

    let email = form.email.trim().to_lowercase();
    let metadata = SignUpMetadata {
        full_name: form.full_name.trim().to_string(),
        mobile: form.mobile.clone(),
    };
    let outcome = match state.auth.sign_up(&email, &form.password, &metadata).await {
        Ok(outcome) => outcome,
        Err(AuthError::AccountExists(message)) => {
            resume_orphaned_account(&state, &email, &form.password)
                .await
                .ok_or(AppError::Auth(AuthError::AccountExists(message)))?
        }
        Err(e) => return Err(e.into()),
    };

    let profile = state
        .profiles
        .create(NewProfile {
            id: outcome.user.id,
            full_name: metadata.full_name,
            email,
            mobile: metadata.mobile,
        })
        .await
        .map_err(|e| {
            warn!(
                "User {} has an auth account but no profile ({}); repeating the sign-up completes it",
                outcome.user.id, e
            );
            e
        })?;

    info!(
        "Signed up user {} (session issued: {})",
        outcome.user.id,
        outcome.session.is_some()
    );

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user: outcome.user,
            session: outcome.session,
            profile,
        }),
    ))
}

/// An earlier sign-up can leave a backend account without a profile when the
/// profile insert lost a race. The same credentials resume it.
async fn resume_orphaned_account(
    state: &AppState,
    email: &str,
    password: &str,
) -> Option<SignUpOutcome> {
    let session = state.auth.sign_in(email, password).await.ok()?;
    match state.profiles.get(session.user.id).await {
        Ok(None) => {
            info!("Resuming sign-up for user {} without a profile", session.user.id);
            Some(SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            })
        }
        _ => None,
    }
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(form): Json<SignInForm>,
) -> Result<Json<SignInResponse>, AppError> {
    let credential = form.validate().map_err(AppError::InvalidForm)?;

    // The backend signs in by email only; phone numbers are resolved through profiles.
    let email = match credential {
        Credential::Email(email) => email,
        Credential::Phone(mobile) => match state.profiles.find_by_mobile(&mobile).await? {
            Some(profile) => profile.email,
            None => {
                return Err(AppError::Auth(AuthError::InvalidCredentials(
                    "Invalid login credentials".to_string(),
                )))
            }
        },
    };

    let session = state.auth.sign_in(&email, &form.password).await?;
    let profile = state.profiles.get(session.user.id).await?;
    if profile.is_none() {
        warn!("User {} signed in without a profile record", session.user.id);
    }

    Ok(Json(SignInResponse { session, profile }))
}

/// POST /api/v1/auth/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthSession>, AppError> {
    if req.refresh_token.trim().is_empty() {
        return Err(AppError::Validation("refresh_token is required".to_string()));
    }
    let session = state.auth.refresh(req.refresh_token.trim()).await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, AppError> {
    state.auth.sign_out(&current.access_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<AuthContext>, AppError> {
    let profile = state.profiles.get(current.user.id).await?;
    Ok(Json(AuthContext {
        user: current.user,
        session_valid: true,
        profile,
    }))
}
