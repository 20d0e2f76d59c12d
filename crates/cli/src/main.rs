//! ivs - interface value stack diagnostics
//!
//! Decode and pretty-print wire buffers captured at the scripting boundary,
//! or build buffers from JSON for feeding into a host under test.
//!
//! Usage:
//!   ivs inspect args.bin                 # Validate and print a raw buffer
//!   ivs inspect --input-format hex < dump.txt # Same, from hex text on stdin
//!   ivs encode call.json -o args.bin     # JSON array -> wire buffer

mod commands;

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use commands::BufferFormat;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(name = "ivs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and build interface value stack wire buffers", long_about = None)]
struct Cli {
    /// Path to a TOML configuration (decode limits, printer indent)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a wire buffer and print the decoded stack
    Inspect {
        /// Input file (defaults to stdin)
        input: Option<PathBuf>,

        /// How the input buffer is spelled
        #[arg(long = "input-format", value_enum, default_value_t = BufferFormat::Raw)]
        format: BufferFormat,

        /// Print the stack as a JSON array instead
        #[arg(long)]
        json: bool,
    },

    /// Build a wire buffer from a JSON document (an array becomes the stack slots)
    Encode {
        /// Input JSON file (defaults to stdin)
        input: Option<PathBuf>,

        /// How to spell the output buffer
        #[arg(long = "output-format", value_enum, default_value_t = BufferFormat::Raw)]
        format: BufferFormat,

        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Inspect {
            input,
            format,
            json,
        } => commands::read_input(input.as_deref())
            .and_then(|bytes| commands::inspect(&bytes, format, json, &config))
            .map(|text| println!("{}", text)),
        Commands::Encode {
            input,
            format,
            output,
        } => commands::read_input(input.as_deref())
            .and_then(|doc| commands::encode(&doc, format, &config))
            .and_then(|bytes| write_output(output, &bytes)),
        Commands::Completions { shell } => {
            run_completions(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Filter used when `RUST_LOG` is unset; `-v` only raises our own crates
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "warn,ivs=debug" } else { "warn" }
}

fn init_logging(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn write_output(path: Option<PathBuf>, bytes: &[u8]) -> Result<(), commands::CliError> {
    match path {
        Some(path) => {
            std::fs::write(&path, bytes)?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote buffer");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "ivs", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_inspect_flags() {
        let cli = Cli::parse_from(["ivs", "inspect", "--input-format", "hex", "--json", "dump.txt"]);
        match cli.command {
            Commands::Inspect {
                input,
                format,
                json,
            } => {
                assert_eq!(input, Some(PathBuf::from("dump.txt")));
                assert_eq!(format, BufferFormat::Hex);
                assert!(json);
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_verbose_only_raises_own_crates() {
        assert_eq!(default_filter(false), "warn");
        assert_eq!(default_filter(true), "warn,ivs=debug");
        assert!(default_filter(true).parse::<tracing_subscriber::EnvFilter>().is_ok());
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::parse_from(["ivs", "encode", "--config", "ivs.toml", "-o", "out.bin"]);
        assert_eq!(cli.config, Some(PathBuf::from("ivs.toml")));
        assert!(matches!(cli.command, Commands::Encode { .. }));
    }
}
