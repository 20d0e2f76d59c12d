//! Tag dispatch
//!
//! The registry maps a leading tag byte to the codec for that kind. It is the
//! only place that reads tags; codecs handle the payload after it. Adding a
//! kind means one new `ValueCodec` and one entry in `CODECS`.

use crate::codec::{
    ArrayCodec, BoolCodec, DecodeContext, FloatCodec, IntegerCodec, NullCodec, TableCodec,
    TextCodec, ValueCodec,
};
use crate::config::DecodeLimits;
use crate::error::DecodeError;
use crate::value::{Kind, Value};

/// Codecs indexed by tag byte
static CODECS: [&dyn ValueCodec; 7] = [
    &NullCodec,
    &BoolCodec,
    &IntegerCodec,
    &FloatCodec,
    &TextCodec,
    &ArrayCodec,
    &TableCodec,
];

/// Codec registered for a tag byte
pub fn lookup(tag: u8) -> Option<&'static dyn ValueCodec> {
    CODECS.get(tag as usize).copied()
}

/// Codec for a known kind
#[inline]
pub fn codec_for(kind: Kind) -> &'static dyn ValueCodec {
    CODECS[kind.tag() as usize]
}

/// Append the full encoding (tag + payload) of `value`
pub fn encode_value(value: &Value, out: &mut Vec<u8>) {
    let kind = value.kind();
    out.push(kind.tag());
    codec_for(kind).encode(value, out);
}

/// Full encoding of one value
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_value(value, &mut out);
    out
}

/// Validate one complete encoding at the start of `buf`
///
/// Returns the total bytes (tag included) that `create_value` will consume.
/// Unknown tags are rejected before any codec is consulted.
pub fn check_value(buf: &[u8], ctx: &DecodeContext<'_>) -> Result<usize, DecodeError> {
    let Some(&tag) = buf.first() else {
        return Err(DecodeError::UnexpectedEnd { offset: 0 });
    };
    let codec = lookup(tag).ok_or(DecodeError::UnknownTag { tag, offset: 0 })?;
    let payload = codec
        .check_create_from_data(&buf[1..], ctx)
        .map_err(|e| e.at_offset(1))?;
    Ok(1 + payload)
}

/// Build one value from an encoding that passed `check_value`
///
/// # Panics
/// If `buf` was not validated first (unknown tag or short buffer).
pub fn create_value(buf: &[u8]) -> (Value, usize) {
    let tag = buf[0];
    let Some(codec) = lookup(tag) else {
        panic!("create_value on unchecked buffer: unknown tag 0x{:02X}", tag);
    };
    let (value, used) = codec.create_from_data(&buf[1..]);
    (value, 1 + used)
}

/// Check, then create, one value at the start of `buf`
pub fn decode_value(buf: &[u8], limits: &DecodeLimits) -> Result<(Value, usize), DecodeError> {
    let expected = check_value(buf, &DecodeContext::new(limits))?;
    let (value, used) = create_value(buf);
    debug_assert_eq!(used, expected, "check and create disagree on length");
    tracing::trace!(kind = %value.kind(), bytes = used, "decoded value");
    Ok((value, used))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TableKey;

    fn decode(buf: &[u8]) -> Result<(Value, usize), DecodeError> {
        decode_value(buf, &DecodeLimits::default())
    }

    fn samples() -> Vec<Value> {
        vec![
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Integer(0),
            Value::Integer(i64::MIN),
            Value::Integer(i64::MAX),
            Value::Float(3.25),
            Value::Float(f64::NEG_INFINITY),
            Value::Float(f64::NAN),
            Value::text(""),
            Value::text("héllo wörld"),
            Value::Array(vec![]),
            Value::Array(vec![Value::Integer(1), Value::text("two"), Value::Null]),
            Value::table::<&str, _>([]),
            Value::table([
                (TableKey::Integer(-3), Value::Float(0.5)),
                (TableKey::Bool(false), Value::Array(vec![Value::Bool(true)])),
                (TableKey::from("name"), Value::text("value")),
            ]),
            Value::Array(vec![
                Value::Integer(1),
                Value::table([("k", Value::Bool(false))]),
            ]),
        ]
    }

    #[test]
    fn test_registry_is_indexed_by_tag() {
        for (index, codec) in CODECS.iter().enumerate() {
            assert_eq!(codec.kind().tag() as usize, index);
        }
        for kind in Kind::ALL {
            assert_eq!(codec_for(kind).kind(), kind);
            assert_eq!(lookup(kind.tag()).map(|c| c.kind()), Some(kind));
        }
    }

    #[test]
    fn test_roundtrip_every_kind() {
        for value in samples() {
            let bytes = encode(&value);
            let (back, used) = decode(&bytes).unwrap();
            assert_eq!(used, bytes.len(), "consumed length for {:?}", value);
            assert!(back.bitwise_eq(&value), "{:?} != {:?}", back, value);
        }
    }

    #[test]
    fn test_every_proper_prefix_is_rejected() {
        for value in samples() {
            let bytes = encode(&value);
            for k in 0..bytes.len() {
                let result = check_value(&bytes[..k], &DecodeContext::new(&DecodeLimits::default()));
                assert!(
                    result.is_err(),
                    "prefix {} of {:?} accepted as {:?}",
                    k,
                    value,
                    result
                );
            }
        }
    }

    #[test]
    fn test_trailing_bytes_are_not_consumed() {
        let mut bytes = encode(&Value::Integer(5));
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        let (value, used) = decode(&bytes).unwrap();
        assert_eq!(value, Value::Integer(5));
        assert_eq!(used, 9);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        for tag in [0x07u8, 0x10, 0x80, 0xFF] {
            assert!(lookup(tag).is_none());
            assert_eq!(
                decode(&[tag, 0, 0, 0, 0]),
                Err(DecodeError::UnknownTag { tag, offset: 0 })
            );
        }
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(decode(&[]), Err(DecodeError::UnexpectedEnd { offset: 0 }));
    }

    #[test]
    fn test_nested_error_offsets_are_absolute() {
        // Array[Null, <0x99>]
        let buf = [Kind::Array.tag(), 2, 0, 0, 0, Kind::Null.tag(), 0x99];
        assert_eq!(
            decode(&buf),
            Err(DecodeError::UnknownTag {
                tag: 0x99,
                offset: 6
            })
        );
    }

    #[test]
    fn test_nested_scenario_bytes() {
        let value = Value::Array(vec![
            Value::Integer(1),
            Value::table([("k", Value::Bool(false))]),
        ]);
        let bytes = encode(&value);
        let mut expected = vec![0x05, 2, 0, 0, 0];
        expected.extend_from_slice(&[0x02, 1, 0, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&[0x06, 1, 0, 0, 0, 0x04, 1, 0, 0, 0, b'k', 0x01, 0]);
        assert_eq!(bytes, expected);

        let (back, _) = decode(&bytes).unwrap();
        let table = back.as_array().unwrap()[1].as_table().unwrap();
        assert_eq!(table.get(&TableKey::from("k")), Some(&Value::Bool(false)));
    }

    #[test]
    #[should_panic(expected = "unknown tag 0x33")]
    fn test_create_without_check_panics_on_unknown_tag() {
        create_value(&[0x33]);
    }
}
