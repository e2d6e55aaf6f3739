//! Per-call request options extracted from a loosely-typed host mapping.
//!
//! # Design
//! Every recognized key is optional and independently defaulted. A key that is
//! present but carries the wrong shape is treated exactly like an absent key:
//! extraction never fails. All type checks happen once, in
//! `RequestOptions::from_map`, so the executor only ever sees typed values.

use serde_json::{Map, Value};

/// The options mapping as handed over by the host runtime.
pub type ConfigMap = Map<String, Value>;

pub const FOLLOW_REDIRECTS_KEY: &str = "follow-redirects";
pub const MAX_REDIRECTS_KEY: &str = "max-redirects";
pub const USER_AGENT_KEY: &str = "user-agent";
pub const KEEP_ALIVE_KEY: &str = "keep-alive";
pub const BODY_KEY: &str = "body";
pub const METHOD_KEY: &str = "method";

pub const DEFAULT_FOLLOW_REDIRECTS: bool = false;
pub const DEFAULT_MAX_REDIRECTS: i64 = 50;
pub const DEFAULT_USER_AGENT: &str = "janet http client";
pub const DEFAULT_KEEP_ALIVE: bool = true;

/// Typed configuration for a single `send-request` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub follow_redirects: bool,
    /// Passed through without range checks; negative means unlimited.
    pub max_redirects: i64,
    pub user_agent: String,
    pub keep_alive: bool,
    /// Sent verbatim when present. Absent means no request body at all.
    pub body: Option<String>,
    /// Custom verb. Absent means the transport picks (GET, or POST with a body).
    pub method: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            follow_redirects: DEFAULT_FOLLOW_REDIRECTS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            body: None,
            method: None,
        }
    }
}

impl RequestOptions {
    /// Extract options from `map`, falling back to the default for every key
    /// that is missing or of the wrong shape. Unknown keys are ignored.
    pub fn from_map(map: &ConfigMap) -> Self {
        let defaults = Self::default();
        Self {
            follow_redirects: get_bool(map, FOLLOW_REDIRECTS_KEY).unwrap_or(defaults.follow_redirects),
            max_redirects: get_integer(map, MAX_REDIRECTS_KEY).unwrap_or(defaults.max_redirects),
            user_agent: get_string(map, USER_AGENT_KEY).unwrap_or(defaults.user_agent),
            keep_alive: get_bool(map, KEEP_ALIVE_KEY).unwrap_or(defaults.keep_alive),
            body: get_string(map, BODY_KEY),
            method: get_string(map, METHOD_KEY),
        }
    }
}

fn get_bool(map: &ConfigMap, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

/// Any number is accepted; fractional values truncate toward zero.
fn get_integer(map: &ConfigMap, key: &str) -> Option<i64> {
    let value = map.get(key)?;
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

fn get_string(map: &ConfigMap, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
