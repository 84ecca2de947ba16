//! Entity tags for cacheable GET responses
//!
//! The tag is the SHA-256 of the serialized `data` payload, so two
//! responses carry the same tag exactly when their bodies match.

use axum::{
    http::{
        header::{ETAG, IF_NONE_MATCH},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::api::response::ApiResponse;

/// Quoted hex SHA-256 of `bytes`
pub fn strong_etag(bytes: &[u8]) -> String {
    format!("\"{:x}\"", Sha256::digest(bytes))
}

/// True when `If-None-Match` lists `etag` or is `*`
fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

/// Respond with the enveloped `data` and its ETag, or `304 Not Modified`
/// when the client already holds the same representation.
pub fn cached_response<T: Serialize>(
    request_headers: &HeaderMap,
    data: T,
) -> Result<Response, serde_json::Error> {
    let body = serde_json::to_vec(&data)?;
    let etag = strong_etag(&body);

    let mut response = if if_none_match(request_headers, &etag) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
    };

    if let Ok(value) = HeaderValue::from_str(&etag) {
        response.headers_mut().insert(ETAG, value);
    }
    Ok(response)
}
