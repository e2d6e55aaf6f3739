//! Error types for the request executor and the host binding.
//!
//! # Design
//! `TransportError` is the only failure a request can end in. Its variants
//! record where the transfer broke down, but callers never branch on them: the
//! executor flattens every variant into the `error` string of a
//! `RequestResult`. HTTP error statuses are not errors here.
//!
//! `HostError` belongs to the binding layer. It reports calls that do not match
//! the declared signature of a native function, which the embedding runtime
//! raises as its own argument error rather than returning a result mapping.

/// A failure to obtain a response from the transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The `method` option is not a valid HTTP token.
    #[error("invalid request method: {0:?}")]
    InvalidMethod(String),

    /// URL, DNS, connect, TLS, redirect limit, or protocol failure reported
    /// by the transport.
    #[error("{}", describe(.0))]
    Transfer(curl::Error),

    /// A response buffer could not grow to hold the next chunk.
    #[error("failed writing received data to buffer ({wanted} bytes)")]
    Write { wanted: usize },
}

impl From<curl::Error> for TransportError {
    fn from(err: curl::Error) -> Self {
        TransportError::Transfer(err)
    }
}

/// The transport's description of `err`, followed by its detail line when
/// there is one.
fn describe(err: &curl::Error) -> String {
    match err.extra_description() {
        Some(extra) if !extra.is_empty() => format!("{}: {extra}", err.description()),
        _ => err.description().to_string(),
    }
}

/// A call into a native function that does not match its declared signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("arity mismatch, expected {expected}, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("bad slot #{index}, expected {expected}, got {got}")]
    BadArgument {
        index: usize,
        expected: &'static str,
        got: &'static str,
    },

    #[error("unknown function: {0}")]
    UnknownFunction(String),
}
