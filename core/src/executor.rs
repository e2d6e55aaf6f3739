//! Blocking request execution on top of libcurl's easy interface.
//!
//! # Design
//! `RequestExecutor` carries no state between calls. Every call builds its own
//! easy handle from the extracted `RequestOptions`, performs exactly one
//! transfer on the calling thread, and accumulates the response through a
//! `Collector` that owns two call-local `ResponseBuffer`s. The handle and the
//! buffers are dropped on every return path.
//!
//! The transport hands each body chunk and each header line to the collector
//! as it arrives, so the header block is the bytes on the wire. With
//! redirects followed it holds the block of every response in order.
//!
//! Transport failures are caught here and become `RequestResult::Failure`;
//! nothing propagates to the host as a panic. A response with a 4xx or 5xx
//! status is still a `Success`.

use curl::easy::{Easy2, Handler, WriteError};
use http::Method;

use crate::buffer::ResponseBuffer;
use crate::error::TransportError;
use crate::options::{ConfigMap, RequestOptions};
use crate::result::RequestResult;

#[derive(Debug, Clone, Copy)]
pub struct RequestExecutor {
    buffer_limit: usize,
}

impl Default for RequestExecutor {
    fn default() -> Self {
        RequestExecutor {
            buffer_limit: usize::MAX,
        }
    }
}

impl RequestExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap each response buffer at `limit` bytes. A response that does not fit
    /// aborts the transfer with a write error.
    pub fn with_buffer_limit(limit: usize) -> Self {
        RequestExecutor {
            buffer_limit: limit,
        }
    }

    /// Perform one request against `url`, configured from a loosely-typed
    /// options mapping.
    pub fn execute(&self, url: &str, options: &ConfigMap) -> RequestResult {
        self.execute_with(url, &RequestOptions::from_map(options))
    }

    /// Perform one request against `url` with already-extracted options.
    pub fn execute_with(&self, url: &str, options: &RequestOptions) -> RequestResult {
        match self.perform(url, options) {
            Ok((status, collector)) => {
                log::debug!(
                    "{url} -> {status} ({} body bytes, {} header bytes)",
                    collector.body.len(),
                    collector.headers.len()
                );
                RequestResult::Success {
                    status,
                    body: collector.body.into_bytes(),
                    headers: collector.headers.into_bytes(),
                }
            }
            Err(e) => {
                let error = e.to_string();
                log::warn!("request to {url} failed: {error}");
                RequestResult::Failure { error }
            }
        }
    }

    /// Run the transfer. Returns the final status code and the filled buffers.
    fn perform(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<(u16, Collector), TransportError> {
        let method = resolve_method(options)?;

        log::debug!(
            "{url} (method={:?}, body={}, follow_redirects={}, max_redirects={}, keep_alive={})",
            options.method,
            options.body.is_some(),
            options.follow_redirects,
            options.max_redirects,
            options.keep_alive
        );

        let mut easy = Easy2::new(Collector::new(self.buffer_limit));
        easy.url(url)?;
        if let Some(method) = &method {
            easy.custom_request(method.as_str())?;
        }
        easy.follow_location(options.follow_redirects)?;
        easy.max_redirections(redirect_cap(options.max_redirects))?;
        easy.progress(false)?;
        easy.useragent(&options.user_agent)?;
        easy.tcp_keepalive(options.keep_alive)?;
        if let Some(payload) = &options.body {
            // Sets POST and the form content type unless a method overrides it.
            easy.post_fields_copy(payload.as_bytes())?;
        }

        if let Err(e) = easy.perform() {
            return Err(match easy.get_ref().refused {
                Some(wanted) if e.is_write_error() => TransportError::Write { wanted },
                _ => TransportError::Transfer(e),
            });
        }

        let status = u16::try_from(easy.response_code()?).unwrap_or(0);
        let collector = std::mem::take(easy.get_mut());
        Ok((status, collector))
    }
}

/// Receives the transport's callbacks for one transfer.
#[derive(Debug, Default)]
struct Collector {
    body: ResponseBuffer,
    headers: ResponseBuffer,
    /// Size of the chunk that a buffer refused, if any.
    refused: Option<usize>,
}

impl Collector {
    fn new(limit: usize) -> Self {
        Collector {
            body: ResponseBuffer::with_limit(limit),
            headers: ResponseBuffer::with_limit(limit),
            refused: None,
        }
    }
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        let consumed = self.body.append(data);
        if consumed != data.len() {
            self.refused = Some(data.len());
        }
        Ok(consumed)
    }

    fn header(&mut self, data: &[u8]) -> bool {
        if self.headers.append(data) != data.len() {
            self.refused = Some(data.len());
            return false;
        }
        true
    }
}

/// The `method` option when given, validated as an HTTP token. `None` leaves
/// the verb to the transport: POST when a body is set, GET otherwise.
fn resolve_method(options: &RequestOptions) -> Result<Option<Method>, TransportError> {
    match &options.method {
        Some(name) => Method::from_bytes(name.as_bytes())
            .map(Some)
            .map_err(|_| TransportError::InvalidMethod(name.clone())),
        None => Ok(None),
    }
}

/// Redirect cap for the transport. Negative means no limit.
fn redirect_cap(max_redirects: i64) -> u32 {
    u32::try_from(max_redirects).unwrap_or(u32::MAX)
}
