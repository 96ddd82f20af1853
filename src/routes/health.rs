use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/database", get(database_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let content = state.content();
    let active_learners = state.engine().active_sessions().await;
    Json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
        "content": {
            "questions": content.bank.questions.len(),
            "topics": content.topics.len(),
        },
        "activeLearners": active_learners,
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Ready once there is something to study.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.content().bank.questions.is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

pub async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let healthy = state.store().get_ledger("__health_check__").is_ok();
    let latency_us = start.elapsed().as_micros() as u64;

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "healthy": healthy,
            "latencyUs": latency_us,
            "storedLedgers": state.store().count_ledgers(),
            "sizeOnDiskBytes": state.store().size_on_disk().ok(),
        })),
    )
}
