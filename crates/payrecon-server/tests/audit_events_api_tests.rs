//! Reading the audit trail back over HTTP

mod common;

use axum::{
    body::Body,
    http::{Method, StatusCode},
};
use payrecon_server::audit::{AuditOutcome, AuditStore, NewAuditEvent};

use common::{body_json, peer_request, TestApp};

fn event(action: &str, trace_id: &str, user_id: &str, outcome: AuditOutcome) -> NewAuditEvent {
    NewAuditEvent {
        action: action.to_string(),
        resource_type: "BOARD_RECEIPT".to_string(),
        trace_id: trace_id.to_string(),
        user_id: user_id.to_string(),
        outcome,
        details: None,
        old_values: Some("[1]".to_string()),
        new_values: None,
        client_ip: None,
        user_agent: None,
    }
}

async fn seeded_app() -> TestApp {
    let app = TestApp::new();
    let seed = [
        event("UPDATE_BOARD_RECEIPT", "trace-1", "alice", AuditOutcome::Success),
        event("PROCESS_BOARD_RECEIPT", "trace-1", "alice", AuditOutcome::Failure),
        event("DELETE_BOARD_RECEIPT", "trace-2", "bob", AuditOutcome::Success),
    ];
    for e in seed {
        app.store.record_event(e, None).await.unwrap();
    }
    app
}

async fn get(app: &TestApp, uri: &str) -> axum::response::Response {
    app.send(peer_request(Method::GET, uri).body(Body::empty()).unwrap())
        .await
}

#[tokio::test]
async fn test_list_filters_and_orders_newest_first() {
    let app = seeded_app().await;

    let response = get(&app, "/api/v1/audit-events?user_id=alice").await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["meta"]["count"], 2);
    let data = payload["data"].as_array().unwrap();
    assert_eq!(data[0]["action"], "PROCESS_BOARD_RECEIPT");
    assert_eq!(data[1]["action"], "UPDATE_BOARD_RECEIPT");
}

#[tokio::test]
async fn test_list_by_outcome_with_limit() {
    let app = seeded_app().await;

    let payload = body_json(get(&app, "/api/v1/audit-events?outcome=SUCCESS&limit=1").await).await;
    let data = payload["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["action"], "DELETE_BOARD_RECEIPT");
    assert_eq!(data[0]["outcome"], "SUCCESS");
    assert_eq!(payload["meta"]["limit"], 1);
}

#[tokio::test]
async fn test_oversized_limit_is_clamped() {
    let app = seeded_app().await;

    let payload = body_json(get(&app, "/api/v1/audit-events?limit=999999").await).await;
    assert_eq!(payload["meta"]["limit"], 1000);
    assert_eq!(payload["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_trace_route_returns_call_order() {
    let app = seeded_app().await;

    let payload = body_json(get(&app, "/api/v1/audit-events/trace/trace-1").await).await;
    let actions: Vec<_> = payload["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(actions, vec!["UPDATE_BOARD_RECEIPT", "PROCESS_BOARD_RECEIPT"]);

    let payload = body_json(get(&app, "/api/v1/audit-events/trace/unknown").await).await;
    assert_eq!(payload["meta"]["count"], 0);
}

#[tokio::test]
async fn test_unknown_outcome_is_rejected() {
    let app = seeded_app().await;

    let response = get(&app, "/api/v1/audit-events?outcome=MAYBE").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
