//! Stack: the unit exchanged across the interface boundary
//!
//! A call's full argument or result list is one `Stack`. Slots own their
//! values; `pop` hands ownership to the caller. Containers are built as
//! ordinary `Value::Array` / `Value::Table` values and pushed like any other.
//!
//! # Wire form
//!
//! The encodings of all slots, bottom to top, back to back, with no outer
//! length prefix. Decoding walks the buffer until it is exhausted.

use crate::codec::DecodeContext;
use crate::config::DecodeLimits;
use crate::error::{DecodeError, StackError};
use crate::printer::{self, PrintConfig};
use crate::registry;
use crate::value::Value;
use std::fmt;

/// Ordered, owning sequence of values; index 0 is the bottom
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push value on top, taking ownership
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Remove the top value and hand it to the caller
    pub fn pop(&mut self) -> Result<Value, StackError> {
        self.values.pop().ok_or(StackError::Empty)
    }

    /// Read the value at `index` (0 = bottom) without removing it
    pub fn peek(&self, index: usize) -> Result<&Value, StackError> {
        self.values.get(index).ok_or(StackError::IndexOutOfRange {
            index,
            depth: self.values.len(),
        })
    }

    /// Mutable access to the value at `index` (0 = bottom)
    pub fn peek_mut(&mut self, index: usize) -> Result<&mut Value, StackError> {
        let depth = self.values.len();
        self.values
            .get_mut(index)
            .ok_or(StackError::IndexOutOfRange { index, depth })
    }

    /// Read the top value without removing it
    pub fn top(&self) -> Result<&Value, StackError> {
        self.values.last().ok_or(StackError::Empty)
    }

    /// Release every value
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of values on the stack
    pub fn depth(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate bottom to top
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Independent copy of every slot
    pub fn deep_copy(&self) -> Stack {
        self.clone()
    }

    /// Encode every slot, bottom to top
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for value in &self.values {
            registry::encode_value(value, &mut out);
        }
        tracing::debug!(depth = self.depth(), bytes = out.len(), "serialized stack");
        out
    }

    /// Decode a whole buffer with default limits
    pub fn decode(buf: &[u8]) -> Result<Stack, DecodeError> {
        Self::decode_with_limits(buf, &DecodeLimits::default())
    }

    /// Decode a whole buffer; any invalid value fails the entire decode
    ///
    /// Each value is checked before anything is built for it, so a buffer
    /// that ends mid-value is rejected without returning a partial stack.
    pub fn decode_with_limits(buf: &[u8], limits: &DecodeLimits) -> Result<Stack, DecodeError> {
        let ctx = DecodeContext::new(limits);
        let mut stack = Stack::new();
        let mut cursor = 0;
        while cursor < buf.len() {
            let expected = registry::check_value(&buf[cursor..], &ctx).map_err(|e| {
                let e = e.at_offset(cursor);
                tracing::warn!(error = %e, offset = cursor, "rejected stack buffer");
                e
            })?;
            let (value, used) = registry::create_value(&buf[cursor..]);
            debug_assert_eq!(used, expected, "check and create disagree on length");
            tracing::trace!(slot = stack.depth(), kind = %value.kind(), bytes = used, "decoded slot");
            stack.push(value);
            cursor += used;
        }
        tracing::debug!(depth = stack.depth(), bytes = buf.len(), "decoded stack");
        Ok(stack)
    }
}

impl From<Vec<Value>> for Stack {
    /// First element becomes the bottom of the stack
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<Value> for Stack {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Stack {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::stack_to_string(self, &PrintConfig::default()))
    }
}
