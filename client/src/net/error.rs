//! Error taxonomy for calls against the booking API.
//!
//! ERROR HANDLING
//! ==============
//! Three families reach callers: server-reported business errors (carrying a
//! `detail` message), auth errors (401, which also invalidate the session),
//! and transport/decode failures that fall back to a per-operation message.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

/// Failure raised by the underlying HTTP transport before any response exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    Build(String),

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),
}

/// Failure of a single API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered 401; the credential is missing or no longer valid.
    #[error("unauthorized: {}", detail.as_deref().unwrap_or("credentials rejected"))]
    Unauthorized { detail: Option<String> },

    /// The server answered with any other non-success status.
    #[error("server returned {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    /// A success response carried a body that did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),
}

impl ApiError {
    /// Build the error for a non-success `status` from the raw response body.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = parse_detail(body);
        if status == 401 {
            Self::Unauthorized { detail }
        } else {
            Self::Server { status, detail }
        }
    }

    /// HTTP status of the failure, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Server { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) | Self::Encode(_) => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Server-provided `detail`, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail } | Self::Server { detail, .. } => detail.as_deref(),
            Self::Transport(_) | Self::Decode(_) | Self::Encode(_) => None,
        }
    }

    /// The message shown to the user: the server detail verbatim, else `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().map_or_else(|| fallback.to_owned(), str::to_owned)
    }
}

/// Extract the `detail` field from an error body.
///
/// A plain string is used verbatim. A validation list (`[{ "msg": ... }]`)
/// is flattened into one `; `-separated line.
pub(crate) fn parse_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() { None } else { Some(messages.join("; ")) }
        }
        _ => None,
    }
}
