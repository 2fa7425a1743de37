use crate::endpoints::Operation;

/// Errors raised while resolving, sending or decoding a backend request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API error: {status}{}", detail_suffix(.detail))]
    Request { status: u16, detail: Option<String> },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid response envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Operation {0} requires a node id")]
    MissingNode(Operation),

    #[error("Operation {0} cannot address node {1:?}")]
    InvalidNode(Operation, String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(" ({})", d),
        None => String::new(),
    }
}

impl ApiError {
    /// HTTP status carried by the error, if the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Failure of a view loader, tagged with the HTTP status the view should
/// render.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error {status}: {message}")]
pub struct ViewError {
    pub status: u16,
    pub message: String,
}

impl ViewError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }
}

impl From<ApiError> for ViewError {
    fn from(err: ApiError) -> Self {
        let status = err.status().unwrap_or(500);
        Self::new(status, err.to_string())
    }
}
