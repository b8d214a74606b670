use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::pipeline::{generate_recommendations, submit_appearance, submit_personality};
use crate::assessment::questions::{QuestionBank, QuizKind};
use crate::assessment::session::{AssessmentSession, SessionView};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::profile::CompletionFlag;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub option: String,
}

/// Loads a session and checks it belongs to the caller.
async fn load_owned(
    state: &AppState,
    id: Uuid,
    current: &CurrentUser,
) -> Result<AssessmentSession, AppError> {
    let session = state
        .sessions
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))?;
    if session.owner_id != current.user.id {
        return Err(AppError::Forbidden);
    }
    Ok(session)
}

async fn persist(state: &AppState, session: &AssessmentSession) -> Result<Json<SessionView>, AppError> {
    state.sessions.save(session).await?;
    Ok(Json(session.view()))
}

/// The profile flags are informational; a failed update must not undo a
/// completed quiz.
async fn mark_profile(state: &AppState, user_id: Uuid, flag: CompletionFlag) {
    if let Err(e) = state.profiles.mark_completed(user_id, flag).await {
        warn!("Failed to mark {flag:?} complete for user {user_id}: {e}");
    }
}

/// GET /api/v1/quizzes/:kind
pub async fn handle_get_quiz(Path(kind): Path<QuizKind>) -> Json<&'static QuestionBank> {
    Json(kind.bank())
}

/// POST /api/v1/assessments
pub async fn handle_create_assessment(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let session = AssessmentSession::new(current.user.id);
    state.sessions.save(&session).await?;
    info!("Created assessment {} for user {}", session.id, current.user.id);
    Ok((StatusCode::CREATED, Json(session.view())))
}

/// GET /api/v1/assessments/:id
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = load_owned(&state, id, &current).await?;
    Ok(Json(session.view()))
}

/// DELETE /api/v1/assessments/:id
pub async fn handle_abandon_assessment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    load_owned(&state, id, &current).await?;
    state.sessions.delete(id).await?;
    info!("Assessment {id} abandoned");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/assessments/:id/:kind/start
pub async fn handle_start_quiz(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, kind)): Path<(Uuid, QuizKind)>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = load_owned(&state, id, &current).await?;
    session.start(kind)?;
    persist(&state, &session).await
}

/// POST /api/v1/assessments/:id/:kind/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, kind)): Path<(Uuid, QuizKind)>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = load_owned(&state, id, &current).await?;
    session.answer(kind, &req.option)?;
    persist(&state, &session).await
}

/// POST /api/v1/assessments/:id/:kind/previous
pub async fn handle_previous(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, kind)): Path<(Uuid, QuizKind)>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = load_owned(&state, id, &current).await?;
    if session.previous(kind)? {
        persist(&state, &session).await
    } else {
        Ok(Json(session.view()))
    }
}

/// POST /api/v1/assessments/:id/:kind/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, kind)): Path<(Uuid, QuizKind)>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = load_owned(&state, id, &current).await?;
    let flag = match kind {
        QuizKind::Personality => {
            submit_personality(&mut session, state.classifier.as_ref()).await?;
            CompletionFlag::Personality
        }
        QuizKind::Appearance => {
            submit_appearance(&mut session, state.llm.as_ref()).await?;
            CompletionFlag::Appearance
        }
    };
    let view = persist(&state, &session).await?;
    mark_profile(&state, current.user.id, flag).await;
    Ok(view)
}

/// POST /api/v1/assessments/:id/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = load_owned(&state, id, &current).await?;
    generate_recommendations(&mut session, state.llm.as_ref()).await?;
    persist(&state, &session).await
}
