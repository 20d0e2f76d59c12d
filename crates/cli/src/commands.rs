//! Command implementations, kept free of process exit and stdio so they can
//! be tested directly

use base64::prelude::*;
use clap::ValueEnum;
use ivs::json::{stack_from_json, stack_to_json};
use ivs::{Config, ConfigError, DecodeError, Stack, stack_to_string};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;

/// How a wire buffer is spelled on disk or in a pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BufferFormat {
    /// Raw bytes
    #[default]
    Raw,
    /// Hexadecimal text (whitespace ignored)
    Hex,
    /// Standard Base64 text
    Base64,
}

#[derive(Debug)]
pub enum CliError {
    Io(io::Error),
    Hex(hex::FromHexError),
    Base64(base64::DecodeError),
    Json(serde_json::Error),
    Decode(DecodeError),
    Config(ConfigError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::Hex(e) => write!(f, "invalid hex input: {}", e),
            CliError::Base64(e) => write!(f, "invalid base64 input: {}", e),
            CliError::Json(e) => write!(f, "invalid JSON input: {}", e),
            CliError::Decode(e) => write!(f, "{}", e),
            CliError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<hex::FromHexError> for CliError {
    fn from(e: hex::FromHexError) -> Self {
        CliError::Hex(e)
    }
}

impl From<base64::DecodeError> for CliError {
    fn from(e: base64::DecodeError) -> Self {
        CliError::Base64(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<DecodeError> for CliError {
    fn from(e: DecodeError) -> Self {
        CliError::Decode(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

/// Configuration from `--config`, or defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

/// Contents of `path`, or all of stdin when no path is given
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match path {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Turn textual input back into wire bytes
pub fn unwrap_buffer(input: &[u8], format: BufferFormat) -> Result<Vec<u8>, CliError> {
    match format {
        BufferFormat::Raw => Ok(input.to_vec()),
        BufferFormat::Hex => {
            let compact: Vec<u8> = input
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            Ok(hex::decode(compact)?)
        }
        BufferFormat::Base64 => Ok(BASE64_STANDARD.decode(input.trim_ascii())?),
    }
}

/// Spell wire bytes in the requested format
pub fn wrap_buffer(bytes: &[u8], format: BufferFormat) -> Vec<u8> {
    match format {
        BufferFormat::Raw => bytes.to_vec(),
        BufferFormat::Hex => format!("{}\n", hex::encode(bytes)).into_bytes(),
        BufferFormat::Base64 => format!("{}\n", BASE64_STANDARD.encode(bytes)).into_bytes(),
    }
}

/// Validate and decode a wire buffer, rendering the resulting stack
pub fn inspect(
    input: &[u8],
    format: BufferFormat,
    as_json: bool,
    config: &Config,
) -> Result<String, CliError> {
    let bytes = unwrap_buffer(input, format)?;
    let stack = Stack::decode_with_limits(&bytes, &config.limits)?;
    tracing::info!(bytes = bytes.len(), depth = stack.depth(), "inspected buffer");
    if as_json {
        Ok(serde_json::to_string_pretty(&stack_to_json(&stack))?)
    } else {
        Ok(stack_to_string(&stack, &config.print))
    }
}

/// Build a wire buffer from a JSON document
///
/// The buffer is validated against the configured limits before it is
/// returned, so anything `encode` writes is accepted by `inspect` under the
/// same configuration.
pub fn encode(input: &[u8], format: BufferFormat, config: &Config) -> Result<Vec<u8>, CliError> {
    let doc: serde_json::Value = serde_json::from_slice(input)?;
    let stack = stack_from_json(&doc);
    ivs::log_stack(&stack, "encoding stack");
    let bytes = stack.serialize();
    Stack::decode_with_limits(&bytes, &config.limits)?;
    Ok(wrap_buffer(&bytes, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENARIO: [u8; 18] = [
        0x01, 0x01, 0x02, 42, 0, 0, 0, 0, 0, 0, 0, 0x04, 2, 0, 0, 0, b'h', b'i',
    ];

    #[test]
    fn test_encode_scenario() {
        let bytes = encode(br#"[true, 42, "hi"]"#, BufferFormat::Raw, &Config::default()).unwrap();
        assert_eq!(bytes, SCENARIO.to_vec());
    }

    #[test]
    fn test_encode_hex() {
        let text = encode(b"[null]", BufferFormat::Hex, &Config::default()).unwrap();
        assert_eq!(text, b"00\n".to_vec());
    }

    fn nested_json(levels: usize) -> Vec<u8> {
        // The outer array is the stack itself
        format!("[{}{}]", "[".repeat(levels), "]".repeat(levels)).into_bytes()
    }

    #[test]
    fn test_encode_respects_depth_limit() {
        let doc = nested_json(70);
        let err = encode(&doc, BufferFormat::Raw, &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Decode(DecodeError::DepthExceeded { limit: 64 })
        ));

        let relaxed = Config::from_toml("[limits]\nmax_depth = 100\n").unwrap();
        let bytes = encode(&doc, BufferFormat::Raw, &relaxed).unwrap();
        let out = inspect(&bytes, BufferFormat::Raw, false, &relaxed).unwrap();
        assert!(out.starts_with("[0] Array[1]"), "{}", out);
    }

    #[test]
    fn test_inspect_raw() {
        let out = inspect(&SCENARIO, BufferFormat::Raw, false, &Config::default()).unwrap();
        assert_eq!(out, "[0] Bool(true)\n[1] Integer(42)\n[2] Text(\"hi\")");
    }

    #[test]
    fn test_inspect_hex_with_whitespace() {
        let input = b"0101 022a000000 00000000\n 0402000000 6869\n";
        let out = inspect(input, BufferFormat::Hex, false, &Config::default()).unwrap();
        assert!(out.ends_with("[2] Text(\"hi\")"), "{}", out);
    }

    #[test]
    fn test_inspect_base64_json() {
        let input = wrap_buffer(&SCENARIO, BufferFormat::Base64);
        let out = inspect(&input, BufferFormat::Base64, true, &Config::default()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc, serde_json::json!([true, 42, "hi"]));
    }

    #[test]
    fn test_inspect_malformed() {
        let err = inspect(&SCENARIO[..10], BufferFormat::Raw, false, &Config::default())
            .unwrap_err();
        match err {
            CliError::Decode(e) => assert!(e.is_truncation()),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_inspect_respects_limits() {
        let config = Config::from_toml("[limits]\nmax_text_len = 1\n").unwrap();
        let err = inspect(&SCENARIO, BufferFormat::Raw, false, &config).unwrap_err();
        assert!(matches!(
            err,
            CliError::Decode(DecodeError::TextTooLong { .. })
        ));
    }

    #[test]
    fn test_bad_hex() {
        assert!(matches!(
            unwrap_buffer(b"zz", BufferFormat::Hex),
            Err(CliError::Hex(_))
        ));
    }

    #[test]
    fn test_read_input_and_config_from_files() {
        let dir = tempfile::tempdir().unwrap();

        let wire = dir.path().join("args.bin");
        std::fs::write(&wire, SCENARIO).unwrap();
        assert_eq!(read_input(Some(&wire)).unwrap(), SCENARIO.to_vec());

        let config_path = dir.path().join("ivs.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "[print]\nindent = 4").unwrap();
        let config = load_config(Some(&config_path)).unwrap();
        assert_eq!(config.print.indent, 4);

        assert!(matches!(
            load_config(Some(&dir.path().join("nope.toml"))),
            Err(CliError::Config(_))
        ));
    }
}
