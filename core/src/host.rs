//! Native function table for embedding runtimes.
//!
//! A host registers each entry of `FUNCTIONS` under its `name` and calls it
//! with positional arguments. Argument values use `serde_json::Value` as the
//! neutral representation of host values: strings for host strings and
//! objects for host tables.

use serde_json::Value;

use crate::error::HostError;
use crate::executor::RequestExecutor;

pub type NativeFn = fn(&[Value]) -> Result<Value, HostError>;

/// A native callable as declared to the host: name, fixed arity, docstring.
#[derive(Debug, Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub doc: &'static str,
    pub call: NativeFn,
}

impl NativeFunction {
    pub fn invoke(&self, args: &[Value]) -> Result<Value, HostError> {
        (self.call)(args)
    }
}

pub const SEND_REQUEST: &str = "send-request";

pub const FUNCTIONS: &[NativeFunction] = &[NativeFunction {
    name: SEND_REQUEST,
    arity: 2,
    doc: "(send-request url options)\n\n\
          Sends an HTTP request. Returns a table with :status, :body and :headers, \
          or :error.",
    call: send_request,
}];

pub fn lookup(name: &str) -> Option<&'static NativeFunction> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

/// Dispatch `args` to the function registered as `name`.
pub fn invoke(name: &str, args: &[Value]) -> Result<Value, HostError> {
    lookup(name)
        .ok_or_else(|| HostError::UnknownFunction(name.to_string()))?
        .invoke(args)
}

/// `(send-request url options)`. Transport failures are part of the returned
/// mapping; only signature mismatches are errors.
pub fn send_request(args: &[Value]) -> Result<Value, HostError> {
    fix_arity(args, 2)?;
    let url = args[0].as_str().ok_or_else(|| bad_slot(args, 0, "string"))?;
    let options = args[1].as_object().ok_or_else(|| bad_slot(args, 1, "table"))?;
    Ok(RequestExecutor::new().execute(url, options).into_value())
}

fn fix_arity(args: &[Value], expected: usize) -> Result<(), HostError> {
    if args.len() != expected {
        return Err(HostError::Arity {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn bad_slot(args: &[Value], index: usize, expected: &'static str) -> HostError {
    HostError::BadArgument {
        index,
        expected,
        got: type_name(&args[index]),
    }
}

/// Host-facing name of the type `value` stands in for.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}
