//! Tests for the audited-call wrapper

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value as JsonValue;

use super::*;

const TRANSFER: AuditedOperation = AuditedOperation::new("TRANSFER", "ACCOUNT");

#[derive(Debug, PartialEq, serde::Serialize)]
struct Receipt {
    amount: u32,
    to: String,
}

async fn transfer(amount: u32, to: &str) -> Result<Receipt, String> {
    if amount == 0 {
        return Err("amount must be positive".to_string());
    }
    Ok(Receipt {
        amount,
        to: to.to_string(),
    })
}

async fn explode(_: ()) -> Result<u32, String> {
    panic!("ledger exploded")
}

fn auditor_with_memory() -> (Auditor, Arc<InMemoryAuditStore>) {
    let store = Arc::new(InMemoryAuditStore::new());
    (Auditor::new(store.clone(), true), store)
}

fn request_ctx() -> RequestContext {
    RequestContext::detached()
        .with_trace_id("req-123")
        .with_principal("alice")
        .with_client_ip("198.51.100.7")
        .with_user_agent("reconciler/1.0")
}

/// Store that rejects every write
#[derive(Default)]
struct UnavailableStore {
    attempts: AtomicUsize,
}

#[async_trait]
impl AuditStore for UnavailableStore {
    async fn record_event(
        &self,
        _event: NewAuditEvent,
        _context: Option<JsonValue>,
    ) -> Result<AuditEvent, AuditStoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditStoreError::Unavailable("connection refused".to_string()))
    }

    async fn query_events(&self, _query: &AuditQuery) -> Result<Vec<AuditEvent>, AuditStoreError> {
        Ok(Vec::new())
    }

    async fn events_for_trace(&self, _trace_id: &str) -> Result<Vec<AuditEvent>, AuditStoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_success_records_arguments_and_result() {
    let (auditor, store) = auditor_with_memory();

    let receipt = auditor
        .audited(&request_ctx(), TRANSFER, (100, "X"), |(amount, to)| transfer(amount, to))
        .await
        .unwrap();

    assert_eq!(receipt.to, "X");

    let events = store.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.action, "TRANSFER");
    assert_eq!(event.resource_type, "ACCOUNT");
    assert_eq!(event.trace_id, "req-123");
    assert_eq!(event.user_id, "alice");
    assert_eq!(event.outcome, AuditOutcome::Success);
    assert_eq!(event.old_values.as_deref(), Some(r#"[100,"X"]"#));
    assert_eq!(event.new_values.as_deref(), Some(r#"{"amount":100,"to":"X"}"#));
    assert_eq!(event.client_ip.as_deref(), Some("198.51.100.7"));
    assert_eq!(event.user_agent.as_deref(), Some("reconciler/1.0"));
}

#[tokio::test]
async fn test_error_is_returned_unchanged_and_recorded_as_failure() {
    let (auditor, store) = auditor_with_memory();

    let err = auditor
        .audited(&request_ctx(), TRANSFER, (0, "X"), |(amount, to)| transfer(amount, to))
        .await
        .unwrap_err();

    assert_eq!(err, "amount must be positive");

    let events = store.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, AuditOutcome::Failure);
    assert_eq!(events[0].old_values.as_deref(), Some(r#"[0,"X"]"#));
    assert_eq!(events[0].new_values, None);
}

#[tokio::test]
async fn test_missing_principal_and_trace_fall_back() {
    let (auditor, store) = auditor_with_memory();
    let ctx = RequestContext::detached().with_trace_id("  ");

    auditor
        .audited(&ctx, TRANSFER, (5, "Y"), |(amount, to)| transfer(amount, to))
        .await
        .unwrap();
    auditor
        .audited(&ctx, TRANSFER, (6, "Y"), |(amount, to)| transfer(amount, to))
        .await
        .unwrap();

    let events = store.events();
    assert_eq!(events[0].user_id, SYSTEM_USER);
    assert_eq!(events[0].client_ip, None);
    assert!(uuid::Uuid::parse_str(&events[0].trace_id).is_ok());
    // Each detached call gets its own generated trace id
    assert_ne!(events[0].trace_id, events[1].trace_id);
}

#[tokio::test]
async fn test_single_argument_is_recorded_as_list() {
    let (auditor, store) = auditor_with_memory();

    let count = auditor
        .audited(&request_ctx(), TRANSFER, ("batch-7",), |(batch,)| async move {
            Ok::<_, String>(batch.len())
        })
        .await
        .unwrap();

    assert_eq!(count, 7);
    let events = store.events();
    assert_eq!(events[0].old_values.as_deref(), Some(r#"["batch-7"]"#));
    assert_eq!(events[0].new_values.as_deref(), Some("7"));
}

#[tokio::test]
async fn test_unserializable_arguments_use_sentinel() {
    let (auditor, store) = auditor_with_memory();
    let mut by_pair = HashMap::new();
    by_pair.insert((1u8, 2u8), "pair");

    let size = auditor
        .audited(&request_ctx(), TRANSFER, (by_pair,), |(map,)| async move {
            Ok::<_, String>(map.len())
        })
        .await
        .unwrap();

    assert_eq!(size, 1);
    let events = store.events();
    assert_eq!(events[0].old_values.as_deref(), Some(UNSERIALIZABLE_ARGUMENTS));
    assert_eq!(events[0].new_values.as_deref(), Some("1"));
    assert_eq!(events[0].outcome, AuditOutcome::Success);
}

#[tokio::test]
async fn test_unserializable_result_uses_sentinel() {
    let (auditor, store) = auditor_with_memory();

    let map = auditor
        .audited(&request_ctx(), TRANSFER, (), |()| async {
            let mut by_pair = HashMap::new();
            by_pair.insert((1u8, 2u8), "pair");
            Ok::<_, String>(by_pair)
        })
        .await
        .unwrap();

    assert_eq!(map.len(), 1);
    let events = store.events();
    assert_eq!(events[0].old_values.as_deref(), Some("null"));
    assert_eq!(events[0].new_values.as_deref(), Some(UNSERIALIZABLE_RESULT));
}

#[tokio::test]
async fn test_panic_is_recorded_then_resumed() {
    let (auditor, store) = auditor_with_memory();
    let ctx = request_ctx();

    let result = std::panic::AssertUnwindSafe(auditor.audited(&ctx, TRANSFER, (), explode))
        .catch_unwind()
        .await;

    let payload = result.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"ledger exploded"));

    let events = store.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, AuditOutcome::Failure);
    assert_eq!(events[0].new_values, None);
}

#[tokio::test]
async fn test_panic_before_first_poll_is_recorded() {
    let (auditor, store) = auditor_with_memory();
    let ctx = request_ctx();

    let result = std::panic::AssertUnwindSafe(auditor.audited(
        &ctx,
        TRANSFER,
        (),
        |()| -> std::future::Ready<Result<u32, String>> { panic!("rejected eagerly") },
    ))
    .catch_unwind()
    .await;

    assert!(result.is_err());
    assert_eq!(store.events()[0].outcome, AuditOutcome::Failure);
}

#[tokio::test]
async fn test_store_failure_does_not_change_result() {
    let store = Arc::new(UnavailableStore::default());
    let auditor = Auditor::new(store.clone(), true);

    let receipt = auditor
        .audited(&request_ctx(), TRANSFER, (9, "Z"), |(amount, to)| transfer(amount, to))
        .await
        .unwrap();
    let err = auditor
        .audited(&request_ctx(), TRANSFER, (0, "Z"), |(amount, to)| transfer(amount, to))
        .await
        .unwrap_err();

    assert_eq!(receipt.amount, 9);
    assert_eq!(err, "amount must be positive");
    assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_disabled_auditor_records_nothing() {
    let store = Arc::new(InMemoryAuditStore::new());
    let auditor = Auditor::new(store.clone(), false);

    let receipt = auditor
        .audited(&request_ctx(), TRANSFER, (3, "W"), |(amount, to)| transfer(amount, to))
        .await
        .unwrap();

    assert!(!auditor.is_enabled());
    assert_eq!(receipt.amount, 3);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_nested_calls_share_trace_id() {
    const SETTLE: AuditedOperation = AuditedOperation::new("SETTLE", "BATCH");
    let (auditor, store) = auditor_with_memory();
    let ctx = request_ctx();

    let inner_auditor = auditor.clone();
    let inner_ctx = ctx.clone();
    auditor
        .audited(&ctx, SETTLE, ("batch-7",), move |(batch,)| async move {
            let receipt = inner_auditor
                .audited(&inner_ctx, TRANSFER, (10, "A"), |(amount, to)| transfer(amount, to))
                .await?;
            Ok::<_, String>(format!("{batch}:{}", receipt.amount))
        })
        .await
        .unwrap();

    let trace = store.events_for_trace("req-123").await.unwrap();
    let actions: Vec<_> = trace.iter().map(|e| e.action.as_str()).collect();
    // The inner call finishes, and is recorded, first
    assert_eq!(actions, vec!["TRANSFER", "SETTLE"]);
    assert_eq!(trace[1].new_values.as_deref(), Some(r#""batch-7:10""#));
}
