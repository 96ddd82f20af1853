use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};

use cfa_study_backend::content::Content;
use cfa_study_backend::study::types::Question;

use super::http::{request, response_json};

pub fn bank() -> Vec<Question> {
    Content::embedded().expect("embedded content").bank.questions
}

pub fn question(id: &str) -> Question {
    bank()
        .into_iter()
        .find(|q| q.id == id)
        .unwrap_or_else(|| panic!("question {id} in bank"))
}

pub fn wrong_choice(question: &Question) -> String {
    question
        .choices
        .iter()
        .find(|c| c.id != question.answer_id)
        .expect("a wrong choice")
        .id
        .clone()
}

pub async fn current_question_id(app: &Router, learner: &str) -> String {
    let resp = request(
        app,
        Method::GET,
        &format!("/api/learners/{learner}/assessment"),
        None,
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["question"]["id"]
        .as_str()
        .expect("current question id")
        .to_string()
}

/// Answers whatever is on screen, correctly or not. Returns the answer payload.
pub async fn answer_current(app: &Router, learner: &str, correct: bool) -> Value {
    let question = question(&current_question_id(app, learner).await);
    let choice = if correct {
        question.answer_id.clone()
    } else {
        wrong_choice(&question)
    };

    let resp = request(
        app,
        Method::POST,
        &format!("/api/learners/{learner}/assessment/answer"),
        Some(json!({ "choiceId": choice })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::CREATED, "answer failed: {body}");
    body["data"].clone()
}

pub async fn advance(app: &Router, learner: &str) -> Value {
    let resp = request(
        app,
        Method::POST,
        &format!("/api/learners/{learner}/assessment/next"),
        None,
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    body["data"].clone()
}
