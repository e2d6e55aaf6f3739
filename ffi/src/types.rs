//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each result type mirrors a core outcome in C-compatible form. Strings the
//! caller may treat as text (`error_message`, `value_json`) are NUL-terminated
//! `CString`s. Response bodies and header blocks may contain NUL bytes, so they
//! travel as pointer + length; a trailing NUL is still appended (not counted in
//! the length) for callers that only handle text. Conversion and release
//! helpers live here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use http_client_core::{HostError, RequestResult};
use serde_json::Value;

/// Error codes shared by every result envelope.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Transport = 1,
    BadArgument = 2,
    Arity = 3,
    UnknownFunction = 4,
    NullArg = 5,
    Panic = 6,
}

impl From<&HostError> for FfiErrorCode {
    fn from(err: &HostError) -> Self {
        match err {
            HostError::Arity { .. } => FfiErrorCode::Arity,
            HostError::BadArgument { .. } => FfiErrorCode::BadArgument,
            HostError::UnknownFunction(_) => FfiErrorCode::UnknownFunction,
        }
    }
}

/// A native function as declared to the host runtime. Both strings are static
/// and must not be freed.
#[repr(C)]
pub struct FfiNativeFunction {
    pub name: *const c_char,
    pub arity: i32,
    pub doc: *const c_char,
}

impl FfiNativeFunction {
    pub(crate) fn missing() -> Self {
        FfiNativeFunction {
            name: std::ptr::null(),
            arity: -1,
            doc: std::ptr::null(),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed request result
// ---------------------------------------------------------------------------

/// Result of `http_send_request`.
///
/// With `error_code == Ok`, `status`, `body`/`body_len` and
/// `headers`/`headers_len` are set and `error_message` is null. With any other
/// code only `error_message` is set; `status` is 0 and the byte fields are null.
#[repr(C)]
pub struct FfiRequestResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub status: u16,
    pub body: *mut c_char,
    pub body_len: usize,
    pub headers: *mut c_char,
    pub headers_len: usize,
}

impl FfiRequestResult {
    pub(crate) fn from_core(result: RequestResult) -> *mut Self {
        match result {
            RequestResult::Success {
                status,
                body,
                headers,
            } => {
                let (body, body_len) = into_raw_bytes(body);
                let (headers, headers_len) = into_raw_bytes(headers);
                Box::into_raw(Box::new(FfiRequestResult {
                    error_code: FfiErrorCode::Ok,
                    error_message: std::ptr::null_mut(),
                    status,
                    body,
                    body_len,
                    headers,
                    headers_len,
                }))
            }
            RequestResult::Failure { error } => Self::error(FfiErrorCode::Transport, &error),
        }
    }

    pub(crate) fn error(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiRequestResult {
            error_code,
            error_message: CString::new(msg).unwrap_or_default().into_raw(),
            status: 0,
            body: std::ptr::null_mut(),
            body_len: 0,
            headers: std::ptr::null_mut(),
            headers_len: 0,
        }))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        log::error!("{msg}");
        Self::error(FfiErrorCode::Panic, msg)
    }
}

// ---------------------------------------------------------------------------
// Generic invocation result
// ---------------------------------------------------------------------------

/// Result of `http_invoke`.
///
/// With `error_code == Ok`, `value_json` holds the returned mapping as JSON,
/// e.g. `{"status":200,"body":"...","headers":"..."}` or `{"error":"..."}`.
/// Any other code means the call itself was rejected and only
/// `error_message` is set.
#[repr(C)]
pub struct FfiInvokeResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub value_json: *mut c_char,
}

impl FfiInvokeResult {
    pub(crate) fn ok(value: &Value) -> *mut Self {
        Box::into_raw(Box::new(FfiInvokeResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            value_json: CString::new(value.to_string()).unwrap_or_default().into_raw(),
        }))
    }

    pub(crate) fn error(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiInvokeResult {
            error_code,
            error_message: CString::new(msg).unwrap_or_default().into_raw(),
            value_json: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn from_host_error(err: &HostError) -> *mut Self {
        Self::error(err.into(), &err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        log::error!("{msg}");
        Self::error(FfiErrorCode::Panic, msg)
    }
}

// ---------------------------------------------------------------------------
// Byte buffers
// ---------------------------------------------------------------------------

/// Leak `bytes` as a NUL-terminated byte array. Returns the pointer and the
/// length without the terminator.
fn into_raw_bytes(mut bytes: Vec<u8>) -> (*mut c_char, usize) {
    let len = bytes.len();
    bytes.push(0);
    let ptr = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
    (ptr as *mut c_char, len)
}

/// Release an array produced by `into_raw_bytes`.
///
/// # Safety
/// `ptr` must be null or come from `into_raw_bytes` with the same `len`.
pub(crate) unsafe fn free_raw_bytes(ptr: *mut c_char, len: usize) {
    if !ptr.is_null() {
        let slice = std::ptr::slice_from_raw_parts_mut(ptr as *mut u8, len + 1);
        drop(unsafe { Box::from_raw(slice) });
    }
}
