//! Error taxonomy for the metrics API and the message shown to the user.

use thiserror::Error;

/// Shown when neither the server nor the transport says anything useful.
pub const FALLBACK_MESSAGE: &str = "Failed to fetch metrics";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unreachable host, DNS/connection failure, timeout.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx answer.
    #[error("server returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Server { status: u16, message: Option<String> },
    /// Nothing has been collected yet.
    #[error("no data available{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    NotFound(Option<String>),
    /// Body did not match the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Server,
    NotFound,
    Malformed,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Server { .. } | ApiError::InvalidUrl(_) => ErrorKind::Server,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Malformed(_) => ErrorKind::Malformed,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Message for the error banner: the server's own words, then the transport
    /// description, then a generic fallback.
    pub fn display_message(&self) -> String {
        let msg = match self {
            ApiError::Server {
                message: Some(m), ..
            }
            | ApiError::NotFound(Some(m)) => m.clone(),
            ApiError::Server {
                status,
                message: None,
            } => format!("Request failed with status code {status}"),
            ApiError::Transport(desc) => desc.clone(),
            ApiError::Malformed(desc) => format!("Malformed response: {desc}"),
            ApiError::NotFound(None) => "No metrics available".into(),
            ApiError::InvalidUrl(e) => e.to_string(),
        };
        if msg.trim().is_empty() {
            FALLBACK_MESSAGE.into()
        } else {
            msg
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Server {
                status: status.as_u16(),
                message: None,
            }
        } else if e.is_timeout() {
            ApiError::Transport(format!("request timed out: {e}"))
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Pulls a human message out of an error body: `error`, then `message`, then `detail`.
pub fn server_message(body: &[u8]) -> Option<String> {
    let v: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// What `SyncState` keeps about the last failed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ApiError> for ErrorInfo {
    fn from(e: &ApiError) -> Self {
        Self {
            kind: e.kind(),
            message: e.display_message(),
        }
    }
}
