//! Boundary operations for the scripting / remote-call layer
//!
//! These are the only entry points the scripting bridge, diagnostics panels
//! and transports need. Typed pops check the kind on top before removing
//! anything: on `TypeMismatch` the stack is left exactly as it was.
//!
//! # Example
//!
//! ```
//! use ivs::bridge::*;
//! use ivs::Stack;
//!
//! let mut args = Stack::new();
//! push_bool(&mut args, true);
//! push_integer(&mut args, 42);
//! push_text(&mut args, "hi");
//!
//! let wire = serialize_stack(&args);
//! let mut received = decode_stack(&wire).unwrap();
//! assert_eq!(pop_text(&mut received).unwrap(), b"hi");
//! assert_eq!(pop_integer(&mut received).unwrap(), 42);
//! assert!(pop_bool(&mut received).unwrap());
//! ```

use crate::config::DecodeLimits;
use crate::error::{DecodeError, StackError};
use crate::printer::{self, PrintConfig};
use crate::stack::Stack;
use crate::value::{Kind, Table, Value};

pub fn push_null(stack: &mut Stack) {
    stack.push(Value::Null);
}

pub fn push_bool(stack: &mut Stack, value: bool) {
    stack.push(Value::Bool(value));
}

pub fn push_integer(stack: &mut Stack, value: i64) {
    stack.push(Value::Integer(value));
}

pub fn push_float(stack: &mut Stack, value: f64) {
    stack.push(Value::Float(value));
}

/// Push a byte string; `&str` and `String` convert directly
pub fn push_text(stack: &mut Stack, value: impl Into<Vec<u8>>) {
    stack.push(Value::Text(value.into()));
}

pub fn push_array(stack: &mut Stack, items: Vec<Value>) {
    stack.push(Value::Array(items));
}

pub fn push_table(stack: &mut Stack, table: Table) {
    stack.push(Value::Table(table));
}

/// Pop the top value if it has the `expected` kind
fn pop_as<T>(
    stack: &mut Stack,
    expected: Kind,
    take: impl FnOnce(Value) -> Option<T>,
) -> Result<T, StackError> {
    let found = stack.top()?.kind();
    if found != expected {
        return Err(StackError::TypeMismatch { expected, found });
    }
    take(stack.pop()?).ok_or(StackError::TypeMismatch { expected, found })
}

pub fn pop_null(stack: &mut Stack) -> Result<(), StackError> {
    pop_as(stack, Kind::Null, |v| v.is_null().then_some(()))
}

pub fn pop_bool(stack: &mut Stack) -> Result<bool, StackError> {
    pop_as(stack, Kind::Bool, |v| v.as_bool())
}

pub fn pop_integer(stack: &mut Stack) -> Result<i64, StackError> {
    pop_as(stack, Kind::Integer, |v| v.as_integer())
}

pub fn pop_float(stack: &mut Stack) -> Result<f64, StackError> {
    pop_as(stack, Kind::Float, |v| v.as_float())
}

/// Pop a Text value as its raw bytes
pub fn pop_text(stack: &mut Stack) -> Result<Vec<u8>, StackError> {
    pop_as(stack, Kind::Text, |v| match v {
        Value::Text(s) => Some(s),
        _ => None,
    })
}

pub fn pop_array(stack: &mut Stack) -> Result<Vec<Value>, StackError> {
    pop_as(stack, Kind::Array, |v| match v {
        Value::Array(items) => Some(items),
        _ => None,
    })
}

pub fn pop_table(stack: &mut Stack) -> Result<Table, StackError> {
    pop_as(stack, Kind::Table, |v| match v {
        Value::Table(t) => Some(t),
        _ => None,
    })
}

/// Wire form of a whole stack
pub fn serialize_stack(stack: &Stack) -> Vec<u8> {
    stack.serialize()
}

/// Rebuild a stack from its wire form using default limits
pub fn decode_stack(bytes: &[u8]) -> Result<Stack, DecodeError> {
    Stack::decode(bytes)
}

/// Rebuild a stack from its wire form using caller-supplied limits
pub fn decode_stack_with(bytes: &[u8], limits: &DecodeLimits) -> Result<Stack, DecodeError> {
    Stack::decode_with_limits(bytes, limits)
}

/// Diagnostic rendering of a stack
pub fn print_stack(stack: &Stack) -> String {
    printer::stack_to_string(stack, &PrintConfig::default())
}
