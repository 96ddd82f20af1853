use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::constants::MAX_REVIEW_QUEUE_LIMIT;
use crate::extractors::{JsonBody, LearnerId};
use crate::response::{ok, AppError};
use crate::routes::responses::LimitQuery;
use crate::state::AppState;
use crate::study::types::ReviewAction;
use crate::validation::clamp_limit;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(queue))
        .route("/next", get(next_card))
        .route("/grade", post(grade))
}

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub key: String,
    pub action: ReviewAction,
}

async fn queue(
    learner: LearnerId,
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(query.limit, MAX_REVIEW_QUEUE_LIMIT, MAX_REVIEW_QUEUE_LIMIT);
    let view = state.engine().review_queue(learner.as_str(), limit).await?;
    Ok(ok(view).into_response())
}

async fn next_card(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let next = state.engine().next_review(learner.as_str()).await?;
    Ok(ok(next).into_response())
}

async fn grade(
    learner: LearnerId,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<GradeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .engine()
        .grade(learner.as_str(), &req.key, req.action)
        .await?;
    Ok(ok(outcome))
}
