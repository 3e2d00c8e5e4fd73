// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Follow live class attendance over WebSocket with a server-sent events fallback")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to the attendance channel and print updates as they arrive
    #[command(after_help = "\
Examples:
  rollcall watch -s 42 -t $TOKEN          Follow schedule 42
  rollcall watch -s 42 --no-fallback      Never fall back to the event stream
  ROLLCALL_TOKEN=... rollcall watch -s 42 Read the token from the environment")]
    Watch {
        /// Schedule (session) to follow [env: ROLLCALL_SCHEDULE]
        #[arg(short = 's', long, value_parser = non_empty_string)]
        schedule: Option<String>,

        /// Bearer credential [env: ROLLCALL_TOKEN]
        #[arg(short = 't', long, value_parser = non_empty_string)]
        token: Option<String>,

        /// Config file to use instead of the default lookup
        #[arg(short = 'c', long, value_name = "path")]
        config: Option<PathBuf>,

        /// Only use the WebSocket transport
        #[arg(long)]
        no_fallback: bool,

        /// Output format for each update
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Apply a JSONL file of wire messages to a fresh store and print the result
    #[command(after_help = "\
Examples:
  rollcall replay capture.jsonl           Print every schedule in the capture
  rollcall replay capture.jsonl -s 42     Print schedule 42 only
  rollcall replay capture.jsonl -o json   Print records and stats as JSON")]
    Replay {
        /// JSONL file with one message per line
        file: PathBuf,

        /// Only print this schedule
        #[arg(short = 's', long, value_parser = non_empty_string)]
        schedule: Option<String>,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Config file to use instead of the default lookup
        #[arg(short = 'c', long, value_name = "path")]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
