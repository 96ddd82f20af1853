use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::study::cross_review;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions))
        .route("/questions/:question_id", get(get_question))
        .route("/topics", get(list_topics))
        .route("/topics/:topic_id", get(get_topic))
        .route("/formulas", get(formula_sheet))
        .route("/quiz", get(mixed_quiz))
        .route("/quiz/answer", post(check_quiz_answer))
}

async fn list_questions(State(state): State<AppState>) -> impl IntoResponse {
    ok(&state.content().bank).into_response()
}

async fn get_question(
    Path(question_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .content()
        .bank
        .get(&question_id)
        .ok_or_else(|| AppError::not_found("QUESTION_NOT_FOUND", "Question not found"))?;
    Ok(ok(question).into_response())
}

async fn list_topics(State(state): State<AppState>) -> impl IntoResponse {
    ok(&state.content().topics).into_response()
}

async fn get_topic(
    Path(topic_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let topic = state
        .content()
        .topics
        .iter()
        .find(|topic| topic.id == topic_id)
        .ok_or_else(|| AppError::not_found("TOPIC_NOT_FOUND", "Topic not found"))?;
    Ok(ok(topic).into_response())
}

async fn formula_sheet(State(state): State<AppState>) -> impl IntoResponse {
    ok(cross_review::formula_sheet(&state.content().topics)).into_response()
}

async fn mixed_quiz(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let quiz = cross_review::mixed_quiz(&state.content().topics, &mut rand::thread_rng())
        .ok_or_else(|| AppError::not_found("NO_FLASHCARDS", "No flashcards available"))?;
    Ok(ok(quiz))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizAnswerRequest {
    key: String,
    answer: String,
}

async fn check_quiz_answer(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<QuizAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = cross_review::check_mixed_answer(&state.content().topics, &req.key, &req.answer)
        .ok_or_else(|| AppError::not_found("CARD_NOT_FOUND", "Flashcard not found"))?;
    Ok(ok(result))
}
