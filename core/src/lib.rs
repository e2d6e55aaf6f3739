//! Blocking HTTP request executor behind the `send-request` native callable.
//!
//! # Overview
//! A host runtime calls `send-request` with a URL and an options mapping. The
//! executor turns the mapping into typed `RequestOptions`, performs one
//! blocking transfer through libcurl on the calling thread, and returns a
//! `RequestResult`: either the status, the body bytes and the raw header block,
//! or an error message.
//!
//! # Design
//! - Option extraction is a pure function; malformed options fall back to
//!   their defaults instead of failing the call.
//! - Each call owns its transport handle and its two response buffers.
//!   Nothing is shared between concurrent calls.
//! - HTTP error statuses are ordinary results; only transport failures
//!   produce the `error` shape.
//! - `host::FUNCTIONS` declares the callable's name, arity and docstring for
//!   whatever registration mechanism the embedding runtime uses.

pub mod buffer;
pub mod error;
pub mod executor;
pub mod host;
pub mod options;
pub mod result;

pub use buffer::ResponseBuffer;
pub use error::{HostError, TransportError};
pub use executor::RequestExecutor;
pub use host::{NativeFunction, FUNCTIONS};
pub use options::{ConfigMap, RequestOptions};
pub use result::RequestResult;
