//! Audit data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// ============================================================================
// Audit Constants
// ============================================================================

/// Default number of audit events returned per query
pub const DEFAULT_AUDIT_QUERY_LIMIT: i64 = 100;

/// Maximum number of audit events that can be returned in a single query
pub const MAX_AUDIT_QUERY_LIMIT: i64 = 1000;

/// Recorded as `user_id` when the call carries no authenticated principal
pub const SYSTEM_USER: &str = "system";

/// The `{action, resource_type}` label of an audited call site.
///
/// Declare one constant per call site and pass it to
/// [`Auditor::audited`](super::Auditor::audited):
///
/// ```
/// use payrecon_server::audit::AuditedOperation;
///
/// const REVERSE_PAYMENT: AuditedOperation =
///     AuditedOperation::new("REVERSE_PAYMENT", "WORKER_PAYMENT");
/// assert_eq!(REVERSE_PAYMENT.resource_type, "WORKER_PAYMENT");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuditedOperation {
    pub action: &'static str,
    pub resource_type: &'static str,
}

impl AuditedOperation {
    pub const fn new(action: &'static str, resource_type: &'static str) -> Self {
        Self {
            action,
            resource_type,
        }
    }
}

/// Whether the audited call returned normally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    Success,
    Failure,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown audit outcome '{0}'")]
pub struct UnknownOutcome(pub String);

impl std::str::FromStr for AuditOutcome {
    type Err = UnknownOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(Self::Success),
            "FAILURE" => Ok(Self::Failure),
            other => Err(UnknownOutcome(other.to_string())),
        }
    }
}

impl TryFrom<String> for AuditOutcome {
    type Error = UnknownOutcome;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An audit event as captured by the auditor, before the store assigns
/// an id and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditEvent {
    pub action: String,
    pub resource_type: String,
    /// Correlation id of the request that triggered the call
    pub trace_id: String,
    /// Principal name, or [`SYSTEM_USER`]
    pub user_id: String,
    pub outcome: AuditOutcome,
    pub details: Option<String>,
    /// JSON snapshot of the call arguments
    pub old_values: Option<String>,
    /// JSON snapshot of the return value, only set on success
    pub new_values: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl NewAuditEvent {
    /// Stamp the event with a fresh id and the current time
    pub fn into_recorded(self, metadata: Option<JsonValue>) -> AuditEvent {
        AuditEvent {
            id: Uuid::new_v4(),
            action: self.action,
            resource_type: self.resource_type,
            trace_id: self.trace_id,
            user_id: self.user_id,
            outcome: self.outcome,
            details: self.details,
            old_values: self.old_values,
            new_values: self.new_values,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            metadata,
            occurred_at: Utc::now(),
        }
    }
}

/// Audit event as persisted by an [`AuditStore`](super::AuditStore)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEvent {
    pub id: Uuid,
    pub action: String,
    pub resource_type: String,
    pub trace_id: String,
    pub user_id: String,
    #[sqlx(try_from = "String")]
    pub outcome: AuditOutcome,
    pub details: Option<String>,
    pub old_values: Option<String>,
    pub new_values: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    /// Optional context passed alongside the event by the recorder
    pub metadata: Option<JsonValue>,
    pub occurred_at: DateTime<Utc>,
}

/// Filters for reading audit events back
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub user_id: Option<String>,
    pub trace_id: Option<String>,
    pub outcome: Option<AuditOutcome>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_AUDIT_QUERY_LIMIT
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            action: None,
            resource_type: None,
            user_id: None,
            trace_id: None,
            outcome: None,
            start_time: None,
            end_time: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl AuditQuery {
    /// Limit clamped to `1..=MAX_AUDIT_QUERY_LIMIT`
    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_AUDIT_QUERY_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.max(0)
    }

    /// In-process equivalent of the SQL filter
    pub fn matches(&self, event: &AuditEvent) -> bool {
        fn eq(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().map_or(true, |f| f == value)
        }

        eq(&self.action, &event.action)
            && eq(&self.resource_type, &event.resource_type)
            && eq(&self.user_id, &event.user_id)
            && eq(&self.trace_id, &event.trace_id)
            && self.outcome.map_or(true, |o| o == event.outcome)
            && self.start_time.map_or(true, |t| event.occurred_at >= t)
            && self.end_time.map_or(true, |t| event.occurred_at <= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> AuditEvent {
        NewAuditEvent {
            action: "UPDATE_BOARD_RECEIPT".to_string(),
            resource_type: "BOARD_RECEIPT".to_string(),
            trace_id: "trace-1".to_string(),
            user_id: "checker".to_string(),
            outcome: AuditOutcome::Success,
            details: None,
            old_values: Some("[1]".to_string()),
            new_values: Some("{}".to_string()),
            client_ip: None,
            user_agent: None,
        }
        .into_recorded(None)
    }

    #[test]
    fn test_outcome_wire_format() {
        assert_eq!(serde_json::to_string(&AuditOutcome::Success).unwrap(), r#""SUCCESS""#);
        let outcome: AuditOutcome = serde_json::from_str(r#""FAILURE""#).unwrap();
        assert_eq!(outcome, AuditOutcome::Failure);
        assert_eq!(AuditOutcome::try_from("FAILURE".to_string()).unwrap(), AuditOutcome::Failure);
        assert!("failure".parse::<AuditOutcome>().is_err());
    }

    #[test]
    fn test_query_limit_is_clamped() {
        let query = AuditQuery {
            limit: 50_000,
            offset: -3,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), MAX_AUDIT_QUERY_LIMIT);
        assert_eq!(query.effective_offset(), 0);

        let query = AuditQuery {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), 1);
    }

    #[test]
    fn test_query_matches_filters() {
        let event = sample_event();

        assert!(AuditQuery::default().matches(&event));
        assert!(AuditQuery {
            user_id: Some("checker".to_string()),
            outcome: Some(AuditOutcome::Success),
            ..Default::default()
        }
        .matches(&event));
        assert!(!AuditQuery {
            outcome: Some(AuditOutcome::Failure),
            ..Default::default()
        }
        .matches(&event));
        assert!(!AuditQuery {
            start_time: Some(event.occurred_at + chrono::Duration::seconds(1)),
            ..Default::default()
        }
        .matches(&event));
    }

    #[test]
    fn test_into_recorded_assigns_identity() {
        let first = sample_event();
        let second = sample_event();
        assert_ne!(first.id, second.id);
        assert_eq!(first.action, "UPDATE_BOARD_RECEIPT");
    }
}
