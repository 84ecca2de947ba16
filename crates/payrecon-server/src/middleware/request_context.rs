//! Request correlation middleware
//!
//! Every request gets a [`RequestId`] (taken from `X-Request-ID` or freshly
//! generated) and a [`SessionToken`] (from the `sessionToken` header, query
//! parameter or cookie, or generated). Both are stored as request
//! extensions, the request id is echoed on the response, and a generated
//! session token is returned so the client can reuse it. Handler logs are
//! emitted inside a span carrying the request id.

use axum::{
    extract::Request,
    http::{header::COOKIE, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub const SESSION_TOKEN_HEADER: &str = "sessiontoken";

/// Name of the query parameter and cookie carrying the session token
pub const SESSION_TOKEN_PARAM: &str = "sessionToken";

/// Incoming ids longer than this are replaced
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id of one request; the audit trace id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Client session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    generated: bool,
}

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// True when the client sent no token and this one was created
    pub fn was_generated(&self) -> bool {
        self.generated
    }

    fn from_request(headers: &HeaderMap, query: Option<&str>) -> Self {
        let supplied = headers
            .get(SESSION_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| query.and_then(|q| pair_value(q.split('&'), SESSION_TOKEN_PARAM)))
            .or_else(|| {
                headers
                    .get_all(COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .find_map(|cookies| pair_value(cookies.split(';'), SESSION_TOKEN_PARAM))
            })
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty());

        match supplied {
            Some(value) => Self {
                value,
                generated: false,
            },
            None => Self {
                value: Uuid::new_v4().to_string(),
                generated: true,
            },
        }
    }
}

/// Value of `key` among `key=value` pairs
fn pair_value<'a>(pairs: impl Iterator<Item = &'a str>, key: &str) -> Option<String> {
    pairs
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_owned())
}

fn incoming_request_id(headers: &HeaderMap) -> Option<RequestId> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(RequestId::new)
}

/// Attach request id and session token, and echo them on the response
pub async fn propagate_request_context(mut request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(request.headers()).unwrap_or_else(RequestId::generate);
    let session = SessionToken::from_request(request.headers(), request.uri().query());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.as_str(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    request.extensions_mut().insert(request_id.clone());
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).instrument(span).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if session.was_generated() {
        if let Ok(value) = HeaderValue::from_str(session.as_str()) {
            headers.insert(SESSION_TOKEN_HEADER, value);
        }
    }

    response
}
