//! C-ABI wrapper around `http-client-core`.
//!
//! # Overview
//! Lets a runtime that loads native code through a C ABI register and call
//! `send-request` without linking against Rust types. Two entry points cover
//! the two ways hosts tend to bind:
//! - `http_send_request` returns a typed `FfiRequestResult`;
//! - `http_invoke` dispatches by name through the core function table and
//!   returns the flattened result mapping as JSON.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Options and argument lists arrive as JSON text, the neutral encoding of
//!   host tables and arrays.
//! - The C caller owns all returned pointers and must call the matching
//!   `http_free_*` function to release them. Strings in `FfiNativeFunction`
//!   are static and are never freed.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::sync::OnceLock;

use http_client_core::host::{self, FUNCTIONS};
use http_client_core::{ConfigMap, HostError, RequestExecutor};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

struct Registration {
    name: CString,
    arity: i32,
    doc: CString,
}

/// C copies of the core function table, built once and kept for the process
/// lifetime so the returned pointers stay valid.
fn registrations() -> &'static [Registration] {
    static TABLE: OnceLock<Vec<Registration>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FUNCTIONS
            .iter()
            .map(|f| Registration {
                name: CString::new(f.name).unwrap_or_default(),
                arity: i32::try_from(f.arity).unwrap_or(i32::MAX),
                doc: CString::new(f.doc).unwrap_or_default(),
            })
            .collect()
    })
}

/// Number of native functions this library provides.
#[unsafe(no_mangle)]
pub extern "C" fn http_function_count() -> u32 {
    catch_unwind(|| registrations().len() as u32).unwrap_or(0)
}

/// Declaration of the native function at `index`.
///
/// Out-of-range indices return null `name`/`doc` and an arity of -1.
#[unsafe(no_mangle)]
pub extern "C" fn http_function_at(index: u32) -> FfiNativeFunction {
    catch_unwind(|| match registrations().get(index as usize) {
        Some(r) => FfiNativeFunction {
            name: r.name.as_ptr(),
            arity: r.arity,
            doc: r.doc.as_ptr(),
        },
        None => FfiNativeFunction::missing(),
    })
    .unwrap_or_else(|_| FfiNativeFunction::missing())
}

/// Install an `env_logger` backend filtered by `RUST_LOG`.
///
/// Returns false if a logger was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn http_init_logging() -> bool {
    catch_unwind(|| env_logger::try_init().is_ok()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Perform one blocking request.
///
/// `options_json` is a JSON object using the host option keys
/// (`follow-redirects`, `max-redirects`, `user-agent`, `keep-alive`, `body`,
/// `method`); null means no options. Transport failures come back with
/// `error_code = Transport`, never as null.
/// The caller must free the result with `http_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn http_send_request(
    url: *const c_char,
    options_json: *const c_char,
) -> *mut FfiRequestResult {
    catch_unwind(|| {
        if url.is_null() {
            return FfiRequestResult::null_arg("url");
        }
        let url = unsafe { CStr::from_ptr(url) }.to_string_lossy();
        let options = match parse_options(options_json) {
            Ok(options) => options,
            Err(msg) => return FfiRequestResult::error(FfiErrorCode::BadArgument, &msg),
        };
        FfiRequestResult::from_core(RequestExecutor::new().execute(&url, &options))
    })
    .unwrap_or_else(|_| FfiRequestResult::panic("panic in http_send_request"))
}

/// Call the native function registered as `name` with a JSON array of
/// positional arguments.
///
/// The caller must free the result with `http_free_invoke_result`.
#[unsafe(no_mangle)]
pub extern "C" fn http_invoke(name: *const c_char, args_json: *const c_char) -> *mut FfiInvokeResult {
    catch_unwind(|| {
        if name.is_null() {
            return FfiInvokeResult::null_arg("name");
        }
        if args_json.is_null() {
            return FfiInvokeResult::null_arg("args_json");
        }
        let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();
        let raw = unsafe { CStr::from_ptr(args_json) }.to_string_lossy();
        let args = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(args)) => args,
            Ok(other) => {
                let msg = format!("arguments must be an array, got {}", host::type_name(&other));
                return FfiInvokeResult::error(FfiErrorCode::BadArgument, &msg);
            }
            Err(e) => {
                let msg = format!("arguments are not valid JSON: {e}");
                return FfiInvokeResult::error(FfiErrorCode::BadArgument, &msg);
            }
        };
        match host::invoke(&name, &args) {
            Ok(value) => FfiInvokeResult::ok(&value),
            Err(e) => FfiInvokeResult::from_host_error(&e),
        }
    })
    .unwrap_or_else(|_| FfiInvokeResult::panic("panic in http_invoke"))
}

/// Decode the options table. Null means an empty table.
fn parse_options(options_json: *const c_char) -> Result<ConfigMap, String> {
    if options_json.is_null() {
        return Ok(ConfigMap::new());
    }
    let raw = unsafe { CStr::from_ptr(options_json) }.to_string_lossy();
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(HostError::BadArgument {
            index: 1,
            expected: "table",
            got: host::type_name(&other),
        }
        .to_string()),
        Err(e) => Err(format!("options are not valid JSON: {e}")),
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiRequestResult` returned by `http_send_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_free_result(result: *mut FfiRequestResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        unsafe {
            free_raw_bytes(result.body, result.body_len);
            free_raw_bytes(result.headers, result.headers_len);
        }
    });
}

/// Free an `FfiInvokeResult` returned by `http_invoke`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_free_invoke_result(result: *mut FfiInvokeResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.value_json.is_null() {
            drop(unsafe { CString::from_raw(result.value_json) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn message(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    #[test]
    fn function_table_exposes_send_request() {
        assert_eq!(http_function_count(), 1);
        let f = http_function_at(0);
        assert_eq!(message(f.name), "send-request");
        assert_eq!(f.arity, 2);
        assert!(message(f.doc).contains(":status"));
    }

    #[test]
    fn function_at_out_of_range_is_empty() {
        let f = http_function_at(7);
        assert!(f.name.is_null());
        assert!(f.doc.is_null());
        assert_eq!(f.arity, -1);
    }

    #[test]
    fn function_table_pointers_are_stable() {
        assert_eq!(http_function_at(0).name, http_function_at(0).name);
    }

    #[test]
    fn send_request_null_url_returns_null_arg() {
        let result = http_send_request(std::ptr::null(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(message(r.error_message), "null argument: url");
        assert!(r.body.is_null());
        http_free_result(result);
    }

    #[test]
    fn send_request_rejects_non_object_options() {
        let url = CString::new("http://localhost/").unwrap();
        let options = CString::new("[1, 2]").unwrap();
        let result = http_send_request(url.as_ptr(), options.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::BadArgument);
        assert_eq!(message(r.error_message), "bad slot #1, expected table, got array");
        http_free_result(result);
    }

    #[test]
    fn send_request_rejects_malformed_json() {
        let url = CString::new("http://localhost/").unwrap();
        let options = CString::new("{follow-redirects: true").unwrap();
        let result = http_send_request(url.as_ptr(), options.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::BadArgument);
        assert!(message(r.error_message).starts_with("options are not valid JSON"));
        http_free_result(result);
    }

    #[test]
    fn send_request_transport_failure() {
        let url = CString::new("not a url").unwrap();
        let result = http_send_request(url.as_ptr(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        assert!(!message(r.error_message).is_empty());
        assert_eq!(r.status, 0);
        assert!(r.body.is_null());
        assert!(r.headers.is_null());
        http_free_result(result);
    }

    #[test]
    fn invoke_null_args_return_null_arg() {
        let name = CString::new("send-request").unwrap();
        let result = http_invoke(name.as_ptr(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert!(r.value_json.is_null());
        http_free_invoke_result(result);

        let args = CString::new("[]").unwrap();
        let result = http_invoke(std::ptr::null(), args.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        http_free_invoke_result(result);
    }

    #[test]
    fn invoke_unknown_function() {
        let name = CString::new("fetch").unwrap();
        let args = CString::new("[]").unwrap();
        let result = http_invoke(name.as_ptr(), args.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::UnknownFunction);
        assert_eq!(message(r.error_message), "unknown function: fetch");
        http_free_invoke_result(result);
    }

    #[test]
    fn invoke_arity_mismatch() {
        let name = CString::new("send-request").unwrap();
        let args = CString::new(r#"["http://localhost/"]"#).unwrap();
        let result = http_invoke(name.as_ptr(), args.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Arity);
        assert_eq!(message(r.error_message), "arity mismatch, expected 2, got 1");
        http_free_invoke_result(result);
    }

    #[test]
    fn invoke_requires_array_arguments() {
        let name = CString::new("send-request").unwrap();
        let args = CString::new(r#"{"url": "http://localhost/"}"#).unwrap();
        let result = http_invoke(name.as_ptr(), args.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::BadArgument);
        assert_eq!(message(r.error_message), "arguments must be an array, got table");
        http_free_invoke_result(result);
    }

    #[test]
    fn invoke_transport_failure_is_a_value() {
        let name = CString::new("send-request").unwrap();
        let args = CString::new(r#"["not a url", {}]"#).unwrap();
        let result = http_invoke(name.as_ptr(), args.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());

        let value: Value = serde_json::from_str(&message(r.value_json)).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("error"));
        http_free_invoke_result(result);
    }

    #[test]
    fn free_result_null_is_safe() {
        http_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_invoke_result_null_is_safe() {
        http_free_invoke_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        http_free_string(std::ptr::null_mut());
    }
}
