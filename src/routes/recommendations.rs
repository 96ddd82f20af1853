use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::extractors::LearnerId;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(diagnostics))
}

async fn diagnostics(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.engine().diagnostics(learner.as_str()).await?;
    Ok(ok(report).into_response())
}
