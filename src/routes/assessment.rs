use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::extractors::{JsonBody, LearnerId};
use crate::response::{created, ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(current))
        .route("/answer", post(answer))
        .route("/next", post(next_question))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub choice_id: String,
}

async fn current(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().assessment(learner.as_str()).await?))
}

async fn answer(
    learner: LearnerId,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.choice_id.trim().is_empty() {
        return Err(AppError::bad_request("INVALID_CHOICE", "choiceId must not be empty"));
    }
    let outcome = state
        .engine()
        .answer(learner.as_str(), &req.choice_id)
        .await?;
    Ok(created(outcome))
}

async fn next_question(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().next_question(learner.as_str()).await?))
}
