//! Human-readable rendering of values and stacks for diagnostics
//!
//! # Format
//!
//! ```text
//! Array[2]
//!   Integer(1)
//!   Table{1}
//!     Text("k") => Bool(false)
//! ```
//!
//! Scalars print on one line; containers print a header with their size and
//! then one member per line, indented one level deeper, in stored order.
//! The printer trusts its input: it never validates and never mutates.

use crate::stack::Stack;
use crate::value::{TableKey, Value};
use serde::Deserialize;
use std::fmt::{self, Write};

/// Configuration for printer output
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Number of spaces per nesting level
    pub indent: usize,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Write `value` with `indent` leading spaces; members of containers go one
/// level deeper on following lines
pub fn write_value<W: Write + ?Sized>(
    value: &Value,
    indent: usize,
    config: &PrintConfig,
    out: &mut W,
) -> fmt::Result {
    push_indent(out, indent)?;
    write_body(value, indent, config, out)
}

/// Render a value starting at column 0
pub fn value_to_string(value: &Value, config: &PrintConfig) -> String {
    let mut buf = String::new();
    // Writing into a String cannot fail
    let _ = write_value(value, 0, config, &mut buf);
    buf
}

/// Render every stack slot, bottom to top, as `[index] value`
pub fn stack_to_string(stack: &Stack, config: &PrintConfig) -> String {
    if stack.is_empty() {
        return "<empty stack>".to_string();
    }
    let mut buf = String::new();
    for (index, value) in stack.iter().enumerate() {
        if index > 0 {
            buf.push('\n');
        }
        let _ = write!(buf, "[{}] ", index);
        let _ = write_body(value, 0, config, &mut buf);
    }
    buf
}

/// Emit a stack rendering to the diagnostic log at debug level
pub fn log_stack(stack: &Stack, label: &str) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        let text = stack_to_string(stack, &PrintConfig::default());
        tracing::debug!(depth = stack.depth(), "{}:\n{}", label, text);
    }
}

/// Value without its leading indent
fn write_body<W: Write + ?Sized>(
    value: &Value,
    indent: usize,
    config: &PrintConfig,
    out: &mut W,
) -> fmt::Result {
    match value {
        Value::Null => out.write_str("Null"),
        Value::Bool(b) => write!(out, "Bool({})", b),
        Value::Integer(n) => write!(out, "Integer({})", n),
        // Debug keeps a decimal point on whole numbers
        Value::Float(f) => write!(out, "Float({:?})", f),
        Value::Text(s) => write_text(s, out),
        Value::Array(items) => {
            write!(out, "Array[{}]", items.len())?;
            let child = indent + config.indent;
            for item in items {
                out.write_char('\n')?;
                write_value(item, child, config, out)?;
            }
            Ok(())
        }
        Value::Table(table) => {
            write!(out, "Table{{{}}}", table.len())?;
            let child = indent + config.indent;
            for (key, item) in table {
                out.write_char('\n')?;
                push_indent(out, child)?;
                write_key(key, out)?;
                out.write_str(" => ")?;
                write_body(item, child, config, out)?;
            }
            Ok(())
        }
    }
}

fn write_key<W: Write + ?Sized>(key: &TableKey, out: &mut W) -> fmt::Result {
    match key {
        TableKey::Null => out.write_str("Null"),
        TableKey::Bool(b) => write!(out, "Bool({})", b),
        TableKey::Integer(n) => write!(out, "Integer({})", n),
        TableKey::Float(f) => write!(out, "Float({:?})", f),
        TableKey::Text(s) => write_text(s, out),
    }
}

/// UTF-8 text as a quoted string, anything else as an escaped byte literal
fn write_text<W: Write + ?Sized>(bytes: &[u8], out: &mut W) -> fmt::Result {
    match std::str::from_utf8(bytes) {
        Ok(s) => write!(out, "Text({:?})", s),
        Err(_) => write!(out, "Text(b\"{}\")", bytes.escape_ascii()),
    }
}

fn push_indent<W: Write + ?Sized>(out: &mut W, width: usize) -> fmt::Result {
    for _ in 0..width {
        out.write_char(' ')?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: &Value) -> String {
        value_to_string(value, &PrintConfig::default())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(render(&Value::Null), "Null");
        assert_eq!(render(&Value::Bool(true)), "Bool(true)");
        assert_eq!(render(&Value::Integer(-42)), "Integer(-42)");
        assert_eq!(render(&Value::Float(2.5)), "Float(2.5)");
        assert_eq!(render(&Value::Float(42.0)), "Float(42.0)");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(render(&Value::text("hi")), r#"Text("hi")"#);
        assert_eq!(
            render(&Value::text("say \"hi\"\n")),
            r#"Text("say \"hi\"\n")"#
        );
    }

    #[test]
    fn test_raw_bytes_are_escaped() {
        assert_eq!(
            render(&Value::text(vec![b'a', 0xFF, 0x00, b'"'])),
            r#"Text(b"a\xff\x00\"")"#
        );
    }

    #[test]
    fn test_scalar_keys() {
        let value = Value::table([
            (TableKey::Null, Value::Integer(0)),
            (TableKey::Float(1.5), Value::Integer(1)),
        ]);
        let expected = "Table{2}\n  Null => Integer(0)\n  Float(1.5) => Integer(1)";
        assert_eq!(render(&value), expected);
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(render(&Value::Array(vec![])), "Array[0]");
        assert_eq!(render(&Value::table::<&str, _>([])), "Table{0}");
    }

    #[test]
    fn test_nested() {
        let value = Value::Array(vec![
            Value::Integer(1),
            Value::table([("k", Value::Bool(false))]),
        ]);
        let expected = "Array[2]\n  Integer(1)\n  Table{1}\n    Text(\"k\") => Bool(false)";
        assert_eq!(render(&value), expected);
    }

    #[test]
    fn test_table_with_container_value() {
        let value = Value::table([(1i64, Value::Array(vec![Value::Null]))]);
        let expected = "Table{1}\n  Integer(1) => Array[1]\n    Null";
        assert_eq!(render(&value), expected);
    }

    #[test]
    fn test_leading_indent_and_width() {
        let config = PrintConfig { indent: 4 };
        let mut buf = String::new();
        write_value(&Value::Array(vec![Value::Bool(true)]), 2, &config, &mut buf).unwrap();
        assert_eq!(buf, "  Array[1]\n      Bool(true)");
    }

    #[test]
    fn test_stack_rendering() {
        let mut stack = Stack::new();
        assert_eq!(stack_to_string(&stack, &PrintConfig::default()), "<empty stack>");

        stack.push(Value::Bool(true));
        stack.push(Value::Array(vec![Value::Integer(7)]));
        assert_eq!(
            stack_to_string(&stack, &PrintConfig::default()),
            "[0] Bool(true)\n[1] Array[1]\n  Integer(7)"
        );
    }

    #[test]
    fn test_display_matches_printer() {
        let value = Value::table([("a", Value::Integer(1))]);
        assert_eq!(value.to_string(), render(&value));
    }
}
