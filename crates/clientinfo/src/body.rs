use axum::http::{header::CONTENT_TYPE, HeaderMap};
use serde_json::Value;

use crate::error::ClientInfoError;

/// Request body as handed over by the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Unparsed text.
    Raw(String),
    /// Already decoded upstream.
    Json(Value),
}

/// Return the request body as JSON.
///
/// Beacons sent with `text/plain` carry JSON text that the HTTP layer does
/// not decode, so that text is parsed here. Every other body is returned
/// as-is.
pub fn get_json_body(headers: &HeaderMap, body: RequestBody) -> Result<Value, ClientInfoError> {
    let is_text = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/plain"));

    match body {
        RequestBody::Raw(text) if is_text => Ok(serde_json::from_str(&text)?),
        RequestBody::Raw(text) => Ok(Value::String(text)),
        RequestBody::Json(value) => Ok(value),
    }
}
