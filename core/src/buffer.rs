//! Append-only accumulation buffer for response bodies and header blocks.
//!
//! # Design
//! Each `send-request` call owns two `ResponseBuffer`s and drops them on every
//! exit path. `append` is the accumulation callback handed to the transport: it
//! reports how many bytes it consumed, and a short count means the buffer
//! could not grow. The transport treats a short count as a write failure and
//! aborts the transfer.

#[derive(Debug)]
pub struct ResponseBuffer {
    bytes: Vec<u8>,
    limit: usize,
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::with_limit(usize::MAX)
    }
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that refuses to grow past `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        ResponseBuffer {
            bytes: Vec::new(),
            limit,
        }
    }

    /// Append `chunk` and return the number of bytes consumed: either
    /// `chunk.len()` or 0 when the backing storage could not grow.
    pub fn append(&mut self, chunk: &[u8]) -> usize {
        let fits = self
            .bytes
            .len()
            .checked_add(chunk.len())
            .is_some_and(|total| total <= self.limit);
        if !fits || self.bytes.try_reserve(chunk.len()).is_err() {
            return 0;
        }
        self.bytes.extend_from_slice(chunk);
        chunk.len()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
