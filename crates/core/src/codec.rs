//! Per-kind payload codecs
//!
//! Every kind implements the same capability set through `ValueCodec`:
//! encode a payload, check a foreign payload without materializing it, and
//! create a value from a payload that already passed the check. The tag byte
//! is handled by the registry; codecs only see the bytes after it.
//!
//! # Payload layout (little-endian)
//!
//! | Kind    | Payload                                        |
//! |---------|------------------------------------------------|
//! | Null    | nothing                                        |
//! | Bool    | 1 byte, 0 = false, nonzero = true              |
//! | Integer | 8 bytes, `i64`                                 |
//! | Float   | 8 bytes, IEEE 754 binary64 bits                |
//! | Text    | `u32` byte length N, then N raw bytes          |
//! | Array   | `u32` count N, then N value encodings          |
//! | Table   | `u32` count N, then N (key, value) encodings   |
//!
//! # Check / create split
//!
//! `check_create_from_data` is the only place foreign bytes are validated.
//! It reports exactly how many bytes `create_from_data` will consume, which
//! lets the stack decoder walk a buffer of concatenated values without
//! allocating anything for values it might still reject.

use crate::config::DecodeLimits;
use crate::error::DecodeError;
use crate::registry;
use crate::value::{Kind, Table, TableKey, Value};
use std::collections::BTreeSet;

/// Size of the Text length / Array and Table count prefix
pub const LEN_PREFIX: usize = 4;

/// Size of Integer and Float payloads
pub const SCALAR_WIDTH: usize = 8;

/// Limits plus the current container depth, threaded through a check
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub limits: &'a DecodeLimits,
    pub depth: usize,
}

impl<'a> DecodeContext<'a> {
    pub fn new(limits: &'a DecodeLimits) -> Self {
        Self { limits, depth: 0 }
    }

    /// Context for the children of a container
    fn nested(&self) -> Result<DecodeContext<'a>, DecodeError> {
        let depth = self.depth + 1;
        if depth > self.limits.max_depth {
            return Err(DecodeError::DepthExceeded {
                limit: self.limits.max_depth,
            });
        }
        Ok(DecodeContext {
            limits: self.limits,
            depth,
        })
    }
}

/// Capability set shared by every kind
pub trait ValueCodec: Sync {
    /// The kind this codec handles
    fn kind(&self) -> Kind;

    /// Append the payload of `value` to `out`
    ///
    /// # Panics
    /// If `value` is not of this codec's kind, or a Text/Array/Table is too
    /// large for its 4-byte length prefix.
    fn encode(&self, value: &Value, out: &mut Vec<u8>);

    /// Check that `buf` starts with a complete, well-formed payload
    ///
    /// Returns the exact byte count `create_from_data` will consume.
    fn check_create_from_data(
        &self,
        buf: &[u8],
        ctx: &DecodeContext<'_>,
    ) -> Result<usize, DecodeError>;

    /// Build the value from a payload, returning it with the bytes consumed
    ///
    /// Precondition: `buf` passed `check_create_from_data`. Nothing is
    /// re-validated here.
    ///
    /// # Panics
    /// May panic on slice bounds if the precondition is violated.
    fn create_from_data(&self, buf: &[u8]) -> (Value, usize);
}

fn kind_mismatch(expected: Kind, value: &Value) -> ! {
    panic!("{} codec cannot encode a {} value", expected, value.kind())
}

fn require(kind: Kind, buf: &[u8], needed: usize) -> Result<(), DecodeError> {
    if buf.len() < needed {
        return Err(DecodeError::Truncated {
            kind,
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

#[inline]
fn read_u32(buf: &[u8]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}

#[inline]
fn read_word(buf: &[u8]) -> [u8; SCALAR_WIDTH] {
    let mut word = [0u8; SCALAR_WIDTH];
    word.copy_from_slice(&buf[..SCALAR_WIDTH]);
    word
}

fn write_len(kind: Kind, len: usize, out: &mut Vec<u8>) {
    let len = u32::try_from(len).unwrap_or_else(|_| {
        panic!("{} of length {} does not fit a 4-byte prefix", kind, len)
    });
    out.extend_from_slice(&len.to_le_bytes());
}

/// Read and bound a container count, rejecting counts the buffer cannot hold
///
/// `min_bytes_per_item` is the smallest possible encoding of one item, so a
/// count the remaining bytes cannot possibly satisfy is rejected up front.
fn check_count(
    kind: Kind,
    buf: &[u8],
    ctx: &DecodeContext<'_>,
    min_bytes_per_item: u64,
) -> Result<u32, DecodeError> {
    require(kind, buf, LEN_PREFIX)?;
    let count = read_u32(buf);
    if count > ctx.limits.max_elements {
        return Err(DecodeError::TooManyElements {
            kind,
            declared: count,
            limit: ctx.limits.max_elements,
        });
    }
    let minimum = LEN_PREFIX as u64 + count as u64 * min_bytes_per_item;
    if minimum > buf.len() as u64 {
        return Err(DecodeError::Truncated {
            kind,
            needed: usize::try_from(minimum).unwrap_or(usize::MAX),
            available: buf.len(),
        });
    }
    Ok(count)
}

pub struct NullCodec;

impl ValueCodec for NullCodec {
    fn kind(&self) -> Kind {
        Kind::Null
    }

    fn encode(&self, value: &Value, _out: &mut Vec<u8>) {
        if !value.is_null() {
            kind_mismatch(Kind::Null, value);
        }
    }

    fn check_create_from_data(
        &self,
        _buf: &[u8],
        _ctx: &DecodeContext<'_>,
    ) -> Result<usize, DecodeError> {
        Ok(0)
    }

    fn create_from_data(&self, _buf: &[u8]) -> (Value, usize) {
        (Value::Null, 0)
    }
}

pub struct BoolCodec;

impl ValueCodec for BoolCodec {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) {
        match value {
            Value::Bool(b) => out.push(u8::from(*b)),
            other => kind_mismatch(Kind::Bool, other),
        }
    }

    fn check_create_from_data(
        &self,
        buf: &[u8],
        _ctx: &DecodeContext<'_>,
    ) -> Result<usize, DecodeError> {
        require(Kind::Bool, buf, 1)?;
        Ok(1)
    }

    fn create_from_data(&self, buf: &[u8]) -> (Value, usize) {
        (Value::Bool(buf[0] != 0), 1)
    }
}

pub struct IntegerCodec;

impl ValueCodec for IntegerCodec {
    fn kind(&self) -> Kind {
        Kind::Integer
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) {
        match value {
            Value::Integer(n) => out.extend_from_slice(&n.to_le_bytes()),
            other => kind_mismatch(Kind::Integer, other),
        }
    }

    fn check_create_from_data(
        &self,
        buf: &[u8],
        _ctx: &DecodeContext<'_>,
    ) -> Result<usize, DecodeError> {
        require(Kind::Integer, buf, SCALAR_WIDTH)?;
        Ok(SCALAR_WIDTH)
    }

    fn create_from_data(&self, buf: &[u8]) -> (Value, usize) {
        (Value::Integer(i64::from_le_bytes(read_word(buf))), SCALAR_WIDTH)
    }
}

pub struct FloatCodec;

impl ValueCodec for FloatCodec {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) {
        match value {
            // Raw bits so NaN payloads and signed zero survive
            Value::Float(f) => out.extend_from_slice(&f.to_bits().to_le_bytes()),
            other => kind_mismatch(Kind::Float, other),
        }
    }

    fn check_create_from_data(
        &self,
        buf: &[u8],
        _ctx: &DecodeContext<'_>,
    ) -> Result<usize, DecodeError> {
        require(Kind::Float, buf, SCALAR_WIDTH)?;
        Ok(SCALAR_WIDTH)
    }

    fn create_from_data(&self, buf: &[u8]) -> (Value, usize) {
        let bits = u64::from_le_bytes(read_word(buf));
        (Value::Float(f64::from_bits(bits)), SCALAR_WIDTH)
    }
}

pub struct TextCodec;

impl ValueCodec for TextCodec {
    fn kind(&self) -> Kind {
        Kind::Text
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) {
        match value {
            Value::Text(s) => {
                write_len(Kind::Text, s.len(), out);
                out.extend_from_slice(s);
            }
            other => kind_mismatch(Kind::Text, other),
        }
    }

    fn check_create_from_data(
        &self,
        buf: &[u8],
        ctx: &DecodeContext<'_>,
    ) -> Result<usize, DecodeError> {
        require(Kind::Text, buf, LEN_PREFIX)?;
        let declared = read_u32(buf);
        if declared > ctx.limits.max_text_len {
            return Err(DecodeError::TextTooLong {
                declared,
                limit: ctx.limits.max_text_len,
            });
        }
        let end = usize::try_from(declared)
            .ok()
            .and_then(|n| n.checked_add(LEN_PREFIX))
            .ok_or(DecodeError::Truncated {
                kind: Kind::Text,
                needed: usize::MAX,
                available: buf.len(),
            })?;
        require(Kind::Text, buf, end)?;
        Ok(end)
    }

    fn create_from_data(&self, buf: &[u8]) -> (Value, usize) {
        let end = LEN_PREFIX + read_u32(buf) as usize;
        (Value::Text(buf[LEN_PREFIX..end].to_vec()), end)
    }
}

pub struct ArrayCodec;

impl ValueCodec for ArrayCodec {
    fn kind(&self) -> Kind {
        Kind::Array
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) {
        match value {
            Value::Array(items) => {
                write_len(Kind::Array, items.len(), out);
                for item in items {
                    registry::encode_value(item, out);
                }
            }
            other => kind_mismatch(Kind::Array, other),
        }
    }

    fn check_create_from_data(
        &self,
        buf: &[u8],
        ctx: &DecodeContext<'_>,
    ) -> Result<usize, DecodeError> {
        // Smallest element is a bare Null tag
        let count = check_count(Kind::Array, buf, ctx, 1)?;
        let child = ctx.nested()?;
        let mut cursor = LEN_PREFIX;
        for _ in 0..count {
            let used = registry::check_value(&buf[cursor..], &child)
                .map_err(|e| e.at_offset(cursor))?;
            cursor += used;
        }
        Ok(cursor)
    }

    fn create_from_data(&self, buf: &[u8]) -> (Value, usize) {
        let count = read_u32(buf) as usize;
        let mut items = Vec::with_capacity(count);
        let mut cursor = LEN_PREFIX;
        for _ in 0..count {
            let (item, used) = registry::create_value(&buf[cursor..]);
            items.push(item);
            cursor += used;
        }
        (Value::Array(items), cursor)
    }
}

/// Borrowed view of an encoded key, used to detect duplicates while checking
///
/// Equality matches `TableKey`: floats compare by bit pattern.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum KeyView<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    Float(u64),
    Text(&'a [u8]),
}

/// View of a key encoding that already passed `check_value`
fn key_view(encoded: &[u8]) -> Option<KeyView<'_>> {
    match Kind::from_tag(*encoded.first()?)? {
        Kind::Null => Some(KeyView::Null),
        Kind::Bool => Some(KeyView::Bool(*encoded.get(1)? != 0)),
        Kind::Integer => {
            let payload = encoded.get(1..1 + SCALAR_WIDTH)?;
            Some(KeyView::Integer(i64::from_le_bytes(read_word(payload))))
        }
        Kind::Float => {
            let payload = encoded.get(1..1 + SCALAR_WIDTH)?;
            Some(KeyView::Float(u64::from_le_bytes(read_word(payload))))
        }
        Kind::Text => encoded.get(1 + LEN_PREFIX..).map(KeyView::Text),
        Kind::Array | Kind::Table => None,
    }
}

pub struct TableCodec;

impl ValueCodec for TableCodec {
    fn kind(&self) -> Kind {
        Kind::Table
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) {
        match value {
            Value::Table(table) => {
                write_len(Kind::Table, table.len(), out);
                for (key, item) in table {
                    registry::encode_value(&key.to_value(), out);
                    registry::encode_value(item, out);
                }
            }
            other => kind_mismatch(Kind::Table, other),
        }
    }

    fn check_create_from_data(
        &self,
        buf: &[u8],
        ctx: &DecodeContext<'_>,
    ) -> Result<usize, DecodeError> {
        // Smallest entry is a Null key and a Null value
        let count = check_count(Kind::Table, buf, ctx, 2)?;
        let child = ctx.nested()?;
        let mut seen = BTreeSet::new();
        let mut cursor = LEN_PREFIX;
        for _ in 0..count {
            let key_start = cursor;
            if let Some(kind) = buf.get(cursor).copied().and_then(Kind::from_tag)
                && !kind.is_keyable()
            {
                return Err(DecodeError::InvalidTableKey { kind });
            }
            let used = registry::check_value(&buf[cursor..], &child)
                .map_err(|e| e.at_offset(cursor))?;
            cursor += used;
            if let Some(view) = key_view(&buf[key_start..cursor])
                && !seen.insert(view)
            {
                return Err(DecodeError::DuplicateTableKey);
            }
            let used = registry::check_value(&buf[cursor..], &child)
                .map_err(|e| e.at_offset(cursor))?;
            cursor += used;
        }
        Ok(cursor)
    }

    fn create_from_data(&self, buf: &[u8]) -> (Value, usize) {
        let count = read_u32(buf) as usize;
        let mut table = Table::new();
        let mut cursor = LEN_PREFIX;
        for _ in 0..count {
            let (key, used) = registry::create_value(&buf[cursor..]);
            cursor += used;
            let (item, used) = registry::create_value(&buf[cursor..]);
            cursor += used;
            match TableKey::try_from_value(key) {
                Ok(key) => {
                    table.insert(key, item);
                }
                Err(key) => panic!("unchecked table payload has a {} key", key.kind()),
            }
        }
        (Value::Table(table), cursor)
    }
}
