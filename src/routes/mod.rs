pub mod assessment;
pub mod content;
pub mod health;
pub mod mastery;
pub mod realtime;
pub mod recommendations;
pub mod responses;
pub mod reviews;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::constants::MAX_BODY_SIZE;
use crate::middleware::request_id;
use crate::response::AppError;
use crate::state::AppState;

/// Everything scoped to one learner, mounted under `/api/learners/:learner_id`.
fn learner_router() -> Router<AppState> {
    Router::new()
        .nest("/assessment", assessment::router())
        .nest("/responses", responses::router())
        .nest("/mastery", mastery::router())
        .nest("/recommendations", recommendations::router())
        .nest("/reviews", reviews::router())
        .merge(realtime::router())
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/content", content::router())
        .nest("/learners/:learner_id", learner_router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback(fallback_404)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

async fn fallback_404() -> AppError {
    AppError::not_found("NOT_FOUND", "Not found")
}
