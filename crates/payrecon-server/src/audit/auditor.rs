//! The audited-call wrapper
//!
//! [`Auditor::audited`] runs a fallible async operation and records exactly
//! one [`AuditEvent`](super::AuditEvent) describing it: who called, from
//! where, with which arguments, and how it ended. The caller sees the
//! operation's own result unchanged. A panic inside the operation is
//! recorded as a failure and then resumed.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use super::context::RequestContextProvider;
use super::models::{AuditOutcome, AuditedOperation, NewAuditEvent, SYSTEM_USER};
use super::snapshot;
use super::store::AuditStore;

/// Records one audit event per wrapped call
#[derive(Clone)]
pub struct Auditor {
    store: Arc<dyn AuditStore>,
    enabled: bool,
}

impl Auditor {
    pub fn new(store: Arc<dyn AuditStore>, enabled: bool) -> Self {
        Self { store, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Run `call` with `args` and record the outcome under `operation`.
    ///
    /// `args` is always a tuple of the call's arguments, `(command,)` for a
    /// single one. It is snapshotted before the call and then moved into it,
    /// so `(id, command)` is stored as the JSON array `[id, command]`. The
    /// result snapshot is only taken on success.
    ///
    /// Failures to reach the audit store are logged and never change the
    /// value returned to the caller. When auditing is disabled the call runs
    /// untouched and nothing is recorded.
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use payrecon_server::audit::{Auditor, AuditedOperation, InMemoryAuditStore, RequestContext};
    /// const TRANSFER: AuditedOperation = AuditedOperation::new("TRANSFER", "ACCOUNT");
    ///
    /// # async fn transfer(amount: u32, to: &str) -> Result<String, std::io::Error> { Ok(to.into()) }
    /// # async fn run() -> Result<(), std::io::Error> {
    /// let auditor = Auditor::new(Arc::new(InMemoryAuditStore::new()), true);
    /// let ctx = RequestContext::detached().with_principal("alice");
    ///
    /// let receipt = auditor
    ///     .audited(&ctx, TRANSFER, (100, "X"), |(amount, to)| transfer(amount, to))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn audited<C, A, F, Fut, T, E>(
        &self,
        ctx: &C,
        operation: AuditedOperation,
        args: A,
        call: F,
    ) -> Result<T, E>
    where
        C: RequestContextProvider + ?Sized,
        A: Serialize,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
    {
        if !self.enabled {
            return call(args).await;
        }

        let trace_id = non_blank(ctx.current_trace_id())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let user_id = non_blank(ctx.current_principal_name())
            .unwrap_or(SYSTEM_USER)
            .to_owned();
        let old_values = snapshot::arguments(&args);

        debug!(
            action = operation.action,
            resource_type = operation.resource_type,
            %trace_id,
            %user_id,
            "Audited call started"
        );

        // `call` itself runs inside the guarded future so a panic raised
        // before its first await is caught too.
        let outcome = AssertUnwindSafe(async move { call(args).await })
            .catch_unwind()
            .await;

        let (status, new_values) = match &outcome {
            Ok(Ok(value)) => (AuditOutcome::Success, Some(snapshot::result(value))),
            Ok(Err(_)) | Err(_) => (AuditOutcome::Failure, None),
        };

        let event = NewAuditEvent {
            action: operation.action.to_string(),
            resource_type: operation.resource_type.to_string(),
            trace_id,
            user_id,
            outcome: status,
            details: None,
            old_values: Some(old_values),
            new_values,
            client_ip: ctx.current_client_ip().map(str::to_owned),
            user_agent: ctx.current_user_agent().map(str::to_owned),
        };
        self.submit(event).await;

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    async fn submit(&self, event: NewAuditEvent) {
        let action = event.action.clone();
        let trace_id = event.trace_id.clone();

        match self.store.record_event(event, None).await {
            Ok(recorded) => debug!(
                audit_id = %recorded.id,
                action = %recorded.action,
                outcome = %recorded.outcome,
                "Audit event recorded"
            ),
            Err(e) => error!(
                error = %e,
                %action,
                %trace_id,
                "Failed to record audit event"
            ),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl std::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
