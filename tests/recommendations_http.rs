mod common;

use common::app::{spawn_test_server, spawn_with_config};
use common::fixtures::{advance, answer_current};
use common::http::{assert_status_ok_json, get_json};

#[tokio::test]
async fn it_new_learner_gets_new_concept() {
    let app = spawn_test_server().await;

    let (status, body) = get_json(&app.app, "/api/learners/alice/recommendations").await;
    assert_status_ok_json(status, &body);
    let recs = body["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["question"]["id"], "q_ethics_001");
    assert_eq!(
        recs[0]["reason"],
        "Introduce a new concept to expand your coverage."
    );
    assert_eq!(body["data"]["strengths"], serde_json::json!([]));
    assert_eq!(body["data"]["objectiveSignals"], serde_json::json!([]));
}

#[tokio::test]
async fn it_missed_topic_is_recommended_first() {
    let app = spawn_test_server().await;

    // medium correct, then hard equity wrong.
    answer_current(&app.app, "alice", true).await;
    advance(&app.app, "alice").await;
    answer_current(&app.app, "alice", false).await;

    let (_, body) = get_json(&app.app, "/api/learners/alice/recommendations").await;
    let data = &body["data"];
    let recs = data["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["question"]["id"], "q_equity_005");
    assert_eq!(
        recs[0]["reason"],
        "Build proficiency in Equity Investments (current accuracy 0%)."
    );

    let areas = data["areasToImprove"].as_array().unwrap();
    assert_eq!(areas[0]["difficulty"], "hard");

    let signals = data["objectiveSignals"].as_array().unwrap();
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0]["objectiveId"], "equity_valuation");
    assert_eq!(
        signals[0]["description"],
        "Assess intrinsic value using fundamental equity valuation techniques."
    );
}

#[tokio::test]
async fn it_recommendation_cap_is_configurable() {
    let app = spawn_with_config(|cfg| cfg.study.max_recommendations = 0).await;

    answer_current(&app.app, "alice", false).await;

    let (_, body) = get_json(&app.app, "/api/learners/alice/recommendations").await;
    assert_eq!(body["data"]["recommendations"], serde_json::json!([]));
    assert_eq!(body["data"]["areasToImprove"][0]["difficulty"], "medium");
}

#[tokio::test]
async fn it_strengths_need_two_attempts() {
    let app = spawn_test_server().await;

    // Exhaust the bank answering correctly, then answer the fallback again.
    for _ in 0..5 {
        answer_current(&app.app, "alice", true).await;
        advance(&app.app, "alice").await;
    }
    answer_current(&app.app, "alice", true).await;

    let (_, body) = get_json(&app.app, "/api/learners/alice/recommendations").await;
    let strengths = body["data"]["strengths"].as_array().unwrap();
    assert_eq!(strengths.len(), 1);
    assert_eq!(strengths[0]["topic"], "Ethics");
    assert_eq!(strengths[0]["performance"]["total"], 2);
}
