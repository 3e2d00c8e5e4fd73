// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use yare::parameterized;

#[test]
fn watch_with_all_flags() {
    let cli = Cli::try_parse_from([
        "rollcall",
        "watch",
        "-s",
        "42",
        "--token",
        "abc",
        "--config",
        "/tmp/rc.toml",
        "--no-fallback",
    ])
    .unwrap();

    match cli.command {
        Command::Watch {
            schedule,
            token,
            config,
            no_fallback,
            output,
        } => {
            assert_eq!(schedule.as_deref(), Some("42"));
            assert_eq!(token.as_deref(), Some("abc"));
            assert_eq!(config, Some(PathBuf::from("/tmp/rc.toml")));
            assert!(no_fallback);
            assert_eq!(output, OutputFormat::Text);
        }
        _ => panic!("expected watch"),
    }
}

#[test]
fn watch_flags_are_optional() {
    let cli = Cli::try_parse_from(["rollcall", "watch"]).unwrap();
    match cli.command {
        Command::Watch {
            schedule, token, ..
        } => {
            assert!(schedule.is_none());
            assert!(token.is_none());
        }
        _ => panic!("expected watch"),
    }
}

#[parameterized(
    empty_schedule = { &["rollcall", "watch", "--schedule", ""] },
    blank_token = { &["rollcall", "watch", "--token", "  "] },
    replay_without_file = { &["rollcall", "replay"] },
    bad_output = { &["rollcall", "replay", "f.jsonl", "-o", "yaml"] },
)]
fn rejects(args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn replay_json_output() {
    let cli = Cli::try_parse_from(["rollcall", "replay", "cap.jsonl", "-o", "json", "-s", "7"]).unwrap();
    match cli.command {
        Command::Replay {
            file,
            schedule,
            output,
        } => {
            assert_eq!(file, PathBuf::from("cap.jsonl"));
            assert_eq!(schedule.as_deref(), Some("7"));
            assert_eq!(output, OutputFormat::Json);
        }
        _ => panic!("expected replay"),
    }
}

#[test]
fn verbose_is_global() {
    let cli = Cli::try_parse_from(["rollcall", "replay", "cap.jsonl", "--verbose"]).unwrap();
    assert!(cli.verbose);
}
