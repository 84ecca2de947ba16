//! Ambient request facts the auditor reads at call time
//!
//! The auditor never touches HTTP types directly. Anything that can answer
//! "which request is this, and who sent it" implements
//! [`RequestContextProvider`]; the HTTP layer does so through
//! [`RequestContext`], which is extracted from each request.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};

use crate::middleware::request_context::{RequestId, REQUEST_ID_HEADER};

/// Header carrying the caller's principal name
pub const USER_ID_HEADER: &str = "x-user-id";

/// Source of the per-call facts recorded on an audit event.
///
/// Every method may return `None`; the auditor substitutes a generated
/// trace id or the system user as needed.
pub trait RequestContextProvider: Send + Sync {
    fn current_trace_id(&self) -> Option<&str>;

    fn current_principal_name(&self) -> Option<&str>;

    fn current_client_ip(&self) -> Option<&str>;

    fn current_user_agent(&self) -> Option<&str>;
}

/// Snapshot of the facts of one inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub trace_id: Option<String>,
    pub principal: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Context for calls made outside any request, such as startup jobs
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the context from request parts.
    ///
    /// The trace id comes from the [`RequestId`] extension set by the
    /// request context middleware, falling back to the raw `X-Request-ID`
    /// header when the middleware is not installed.
    pub fn from_parts(parts: &Parts) -> Self {
        let trace_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.as_str().to_owned())
            .or_else(|| header_value(&parts.headers, REQUEST_ID_HEADER));

        let client_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Self {
            trace_id,
            principal: header_value(&parts.headers, USER_ID_HEADER),
            client_ip,
            user_agent: header_value(&parts.headers, USER_AGENT.as_str()),
        }
    }
}

/// Non-blank header value as an owned string
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl RequestContextProvider for RequestContext {
    fn current_trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    fn current_principal_name(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    fn current_client_ip(&self) -> Option<&str> {
        self.client_ip.as_deref()
    }

    fn current_user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
