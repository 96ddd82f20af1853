mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use cfa_study_backend::study::ledger::LedgerState;
use common::app::{build_app, spawn_test_server};
use common::fixtures::{advance, answer_current};
use common::http::{get_json, request, response_json};

#[tokio::test]
async fn it_ledger_and_reviews_survive_restart() {
    let app = spawn_test_server().await;

    answer_current(&app.app, "alice", true).await;
    advance(&app.app, "alice").await;
    answer_current(&app.app, "alice", false).await;

    let key = "Derivatives:Define delta.";
    let resp = request(
        &app.app,
        Method::POST,
        "/api/learners/alice/reviews/grade",
        Some(json!({ "key": key, "action": "easy" })),
        &[],
    )
    .await;
    let (status, _, _) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);

    let (_, before) = get_json(&app.app, "/api/learners/alice/responses").await;

    // Every handle on the sled db must be gone before it can be reopened.
    let config = app.config.clone();
    let _temp_dir = app.temp_dir;
    app.state.store().flush().unwrap();
    drop(app.state);
    drop(app.app);

    let (reopened, reopened_state, _) = build_app(&config);

    let (_, after) = get_json(&reopened, "/api/learners/alice/responses").await;
    assert_eq!(after["data"], before["data"]);

    let (_, mastery) = get_json(&reopened, "/api/learners/alice/mastery").await;
    assert_eq!(mastery["data"]["responseCount"], 2);

    let (_, queue) = get_json(&reopened, "/api/learners/alice/reviews/queue").await;
    assert_eq!(queue["data"]["stats"]["dueNow"], 19);
    let last = queue["data"]["entries"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["key"], key);
    assert_eq!(last["review"]["interval"], 6);
    let stored = reopened_state.store().get_review_states("alice").unwrap().unwrap();
    assert_eq!(stored[key].interval, 6);

    // The asked-set is session state and starts over.
    let (_, view) = get_json(&reopened, "/api/learners/alice/assessment").await;
    assert_eq!(view["data"]["progress"]["answeredCount"], 0);
}

#[tokio::test]
async fn it_corrupt_ledger_loads_as_empty() {
    let app = spawn_test_server().await;

    app.state
        .store()
        .responses
        .insert("alice", b"{\"responses\": [oops".as_slice())
        .unwrap();

    let (status, body) = get_json(&app.app, "/api/learners/alice/responses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    // The next write replaces the corrupt snapshot.
    answer_current(&app.app, "alice", true).await;
    let stored: LedgerState = app.state.store().get_ledger("alice").unwrap().unwrap();
    assert_eq!(stored.responses.len(), 1);
}
