use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::constants::MAX_RESPONSES_LIMIT;
use crate::extractors::LearnerId;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::validation::clamp_limit;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(recent).delete(reset))
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

async fn recent(
    learner: LearnerId,
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(
        query.limit,
        state.config().study.recent_responses_limit,
        MAX_RESPONSES_LIMIT,
    );
    Ok(ok(state.engine().recent(learner.as_str(), limit).await?))
}

/// Irreversible: the learner's whole answer history is dropped.
async fn reset(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().reset(learner.as_str()).await?))
}
