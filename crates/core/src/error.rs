//! Error types for decoding and stack access
//!
//! Two families, kept apart because callers treat them differently:
//!
//! - `DecodeError`: a foreign buffer is not a well-formed encoding. Every
//!   variant is a *Malformed* classification; `Truncated` is the sub-class for
//!   buffers that end before a declared payload does.
//! - `StackError`: caller misuse of stack accessors (empty pop, bad index,
//!   wrong kind). Recoverable; the marshaling layer turns these into
//!   script-visible errors.
//!
//! Allocation failure is not represented: it aborts, as everywhere in Rust.

use crate::value::Kind;
use std::fmt;

/// A wire buffer failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Leading byte is not a registered kind tag
    UnknownTag { tag: u8, offset: usize },
    /// Buffer ends where a kind tag was expected
    UnexpectedEnd { offset: usize },
    /// Buffer ends before the payload of `kind` does
    Truncated {
        kind: Kind,
        needed: usize,
        available: usize,
    },
    /// Text length prefix exceeds the configured maximum
    TextTooLong { declared: u32, limit: u32 },
    /// Array/Table count exceeds the configured maximum
    TooManyElements { kind: Kind, declared: u32, limit: u32 },
    /// Containers nested deeper than the configured maximum
    DepthExceeded { limit: usize },
    /// Table key is a container (Array or Table)
    InvalidTableKey { kind: Kind },
    /// Table encodes the same key twice
    DuplicateTableKey,
}

impl DecodeError {
    /// True for the Truncated sub-class of Malformed
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            DecodeError::Truncated { .. } | DecodeError::UnexpectedEnd { .. }
        )
    }

    /// Shift a positional error to be relative to an enclosing buffer
    pub(crate) fn at_offset(self, base: usize) -> Self {
        match self {
            DecodeError::UnknownTag { tag, offset } => DecodeError::UnknownTag {
                tag,
                offset: offset + base,
            },
            DecodeError::UnexpectedEnd { offset } => DecodeError::UnexpectedEnd {
                offset: offset + base,
            },
            other => other,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownTag { tag, offset } => {
                write!(f, "malformed: unknown kind tag 0x{:02X} at offset {}", tag, offset)
            }
            DecodeError::UnexpectedEnd { offset } => {
                write!(f, "malformed: buffer ends at offset {} before a value", offset)
            }
            DecodeError::Truncated {
                kind,
                needed,
                available,
            } => write!(
                f,
                "malformed: truncated {} payload (needs {} bytes, {} available)",
                kind, needed, available
            ),
            DecodeError::TextTooLong { declared, limit } => write!(
                f,
                "malformed: text length {} exceeds limit {}",
                declared, limit
            ),
            DecodeError::TooManyElements {
                kind,
                declared,
                limit,
            } => write!(
                f,
                "malformed: {} count {} exceeds limit {}",
                kind, declared, limit
            ),
            DecodeError::DepthExceeded { limit } => {
                write!(f, "malformed: nesting deeper than {} levels", limit)
            }
            DecodeError::InvalidTableKey { kind } => {
                write!(f, "malformed: {} cannot be a table key", kind)
            }
            DecodeError::DuplicateTableKey => write!(f, "malformed: duplicate table key"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Misuse of stack accessors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    /// Pop on a stack with no elements
    Empty,
    /// Peek past the current depth
    IndexOutOfRange { index: usize, depth: usize },
    /// Typed pop found another kind on top (stack left unchanged)
    TypeMismatch { expected: Kind, found: Kind },
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::Empty => write!(f, "stack is empty"),
            StackError::IndexOutOfRange { index, depth } => write!(
                f,
                "index {} out of range for stack of depth {}",
                index, depth
            ),
            StackError::TypeMismatch { expected, found } => {
                write!(f, "expected {} on top of stack, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for StackError {}

/// Configuration could not be loaded
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}
