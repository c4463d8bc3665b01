use thiserror::Error;

/// Hard failures that abort client-info resolution for a request.
///
/// Missing data is never an error: absent fields are `None`, and an area API
/// failure status is the empty string.
#[derive(Debug, Error)]
pub enum ClientInfoError {
    #[error("area lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}
