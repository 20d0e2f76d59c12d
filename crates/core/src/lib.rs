//! Interface value stack: typed values marshaled across a host/script boundary
//!
//! Key design principles:
//! - Value: a closed set of tagged kinds (Null, Bool, Integer, Float, Text, Array, Table)
//! - Codec: one `ValueCodec` per kind, with a validating check kept separate from creation
//! - Registry: the tag byte selects the codec; nothing else branches on kinds
//! - Stack: an owning sequence of values; a whole call's arguments or results
//!
//! # Modules
//!
//! - `value`: Value, Kind and TableKey
//! - `codec`: per-kind payload encode / check / create
//! - `registry`: tag dispatch and single-value encode/decode
//! - `stack`: Stack operations and whole-stack wire form
//! - `printer`: indentation-aware diagnostic rendering
//! - `bridge`: typed push/pop and wire helpers for the scripting layer
//! - `config`: decode limits and printer settings from TOML
//! - `error`: DecodeError, StackError, ConfigError
//! - `json`: JSON view of values and stacks (feature `json`)

pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
#[cfg(feature = "json")]
pub mod json;
pub mod printer;
pub mod registry;
pub mod stack;
pub mod value;

// Re-export key types and functions
pub use config::{Config, DecodeLimits};
pub use error::{ConfigError, DecodeError, StackError};
pub use printer::{PrintConfig, log_stack, stack_to_string, value_to_string};
pub use registry::{decode_value, encode};
pub use stack::Stack;
pub use value::{Kind, Table, TableKey, Value};
