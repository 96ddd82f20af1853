use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::extractors::LearnerId;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(report))
        .route("/topics", get(by_topic))
        .route("/difficulties", get(by_difficulty))
        .route("/objectives", get(by_objective))
}

async fn report(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().mastery(learner.as_str()).await?))
}

async fn by_topic(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.engine().snapshot(learner.as_str()).await?;
    Ok(ok(snapshot.by_topic))
}

async fn by_difficulty(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.engine().snapshot(learner.as_str()).await?;
    Ok(ok(snapshot.by_difficulty))
}

async fn by_objective(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.engine().snapshot(learner.as_str()).await?;
    Ok(ok(snapshot.by_learning_objective))
}
