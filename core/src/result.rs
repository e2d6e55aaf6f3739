//! The discriminated outcome of a `send-request` call.

use std::borrow::Cow;

use serde_json::{json, Value};

/// Exactly one of the two shapes is produced per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestResult {
    /// A response was received, whatever its status code.
    Success {
        status: u16,
        /// Response body exactly as received.
        body: Vec<u8>,
        /// Unparsed header block of every response seen, line terminators
        /// included.
        headers: Vec<u8>,
    },
    /// The transport could not produce a response.
    Failure { error: String },
}

impl RequestResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestResult::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestResult::Success { status, .. } => Some(*status),
            RequestResult::Failure { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&[u8]> {
        match self {
            RequestResult::Success { body, .. } => Some(body),
            RequestResult::Failure { .. } => None,
        }
    }

    pub fn headers(&self) -> Option<&[u8]> {
        match self {
            RequestResult::Success { headers, .. } => Some(headers),
            RequestResult::Failure { .. } => None,
        }
    }

    /// The body as text, with invalid UTF-8 replaced by U+FFFD.
    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        self.body().map(String::from_utf8_lossy)
    }

    /// The header block as text, with invalid UTF-8 replaced by U+FFFD.
    pub fn headers_text(&self) -> Option<Cow<'_, str>> {
        self.headers().map(String::from_utf8_lossy)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestResult::Failure { error } => Some(error),
            RequestResult::Success { .. } => None,
        }
    }

    /// Flatten into the keyed mapping handed back to the host: either
    /// `{"status", "body", "headers"}` or `{"error"}`.
    ///
    /// JSON strings cannot carry arbitrary bytes, so `body` and `headers` are
    /// decoded lossily here. Callers that need the exact bytes read them from
    /// the `Success` variant instead.
    pub fn into_value(self) -> Value {
        match self {
            RequestResult::Success {
                status,
                body,
                headers,
            } => json!({
                "status": status,
                "body": String::from_utf8_lossy(&body),
                "headers": String::from_utf8_lossy(&headers),
            }),
            RequestResult::Failure { error } => json!({ "error": error }),
        }
    }
}
