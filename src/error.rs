// ============================================================================
// File: src/error.rs
// Error taxonomy shared by the upload and chat paths
// ============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad local input; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected the request: HTTP {status}{}", fmt_detail(.detail))]
    UpstreamRejection { status: u16, detail: Option<String> },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered, but not with a body we understand.
    #[error("could not decode backend response: {0}")]
    Decode(String),
}

fn fmt_detail(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

impl ClientError {
    /// Server-provided detail for a rejection, if one was sent.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::UpstreamRejection { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
