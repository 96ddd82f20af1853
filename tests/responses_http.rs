mod common;

use axum::http::{Method, StatusCode};

use common::app::{spawn_test_server, spawn_with_config};
use common::fixtures::{advance, answer_current};
use common::http::{assert_status_ok_json, get_json, request, response_json};

#[tokio::test]
async fn it_empty_ledger_has_no_recent_responses() {
    let app = spawn_test_server().await;

    let (status, body) = get_json(&app.app, "/api/learners/alice/responses?limit=5").await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn it_recent_is_newest_first_and_limited() {
    let app = spawn_test_server().await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let answer = answer_current(&app.app, "alice", true).await;
        ids.push(answer["record"]["questionId"].as_str().unwrap().to_string());
        advance(&app.app, "alice").await;
    }

    let (_, all) = get_json(&app.app, "/api/learners/alice/responses?limit=100").await;
    let all = all["data"].as_array().unwrap().clone();
    assert_eq!(all.len(), 3);
    for pair in all.windows(2) {
        assert!(pair[0]["timestamp"].as_i64() >= pair[1]["timestamp"].as_i64());
    }
    let mut returned: Vec<String> = all
        .iter()
        .map(|r| r["questionId"].as_str().unwrap().to_string())
        .collect();
    returned.sort();
    ids.sort();
    assert_eq!(returned, ids);

    let (_, body) = get_json(&app.app, "/api/learners/alice/responses?limit=2").await;
    let recent = body["data"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[..], all[..2]);
}

#[tokio::test]
async fn it_default_limit_comes_from_config() {
    let app = spawn_with_config(|cfg| cfg.study.recent_responses_limit = 1).await;

    for _ in 0..2 {
        answer_current(&app.app, "alice", false).await;
        advance(&app.app, "alice").await;
    }

    let (_, body) = get_json(&app.app, "/api/learners/alice/responses").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn it_invalid_limit_is_json_bad_request() {
    let app = spawn_test_server().await;

    let (status, body) = get_json(&app.app, "/api/learners/alice/responses?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn it_reset_clears_ledger_and_asked_set() {
    let app = spawn_test_server().await;

    answer_current(&app.app, "alice", true).await;
    advance(&app.app, "alice").await;
    answer_current(&app.app, "alice", true).await;

    let resp = request(&app.app, Method::DELETE, "/api/learners/alice/responses", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["cleared"], 2);

    let (_, recent) = get_json(&app.app, "/api/learners/alice/responses").await;
    assert_eq!(recent["data"].as_array().unwrap().len(), 0);

    let (_, view) = get_json(&app.app, "/api/learners/alice/assessment").await;
    assert_eq!(view["data"]["remainingQuestions"], 5);
    assert_eq!(view["data"]["answered"], false);
    assert_eq!(view["data"]["progress"]["answeredCount"], 0);

    let (_, mastery) = get_json(&app.app, "/api/learners/alice/mastery").await;
    assert_eq!(mastery["data"]["responseCount"], 0);
}
