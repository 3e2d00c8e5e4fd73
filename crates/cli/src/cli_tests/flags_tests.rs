// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

/// Every short flag maps to the long flag it is documented with.
#[test]
fn test_flag_consistency() {
    use clap::CommandFactory;

    let allowed: std::collections::HashMap<char, &str> = [
        ('v', "verbose"),
        ('s', "schedule"),
        ('t', "token"),
        ('c', "config"),
        ('o', "output"),
    ]
    .into_iter()
    .collect();

    let cmd = Cli::command();
    let mut errors = Vec::new();
    let mut commands = vec![&cmd];
    commands.extend(cmd.get_subcommands());

    for command in commands {
        for arg in command.get_arguments() {
            let (Some(short), Some(long)) = (arg.get_short(), arg.get_long()) else {
                continue;
            };
            if short == 'h' || short == 'V' {
                continue;
            }
            match allowed.get(&short) {
                Some(expected) if *expected == long => {}
                _ => errors.push(format!("{}: -{short} --{long}", command.get_name())),
            }
        }
    }

    assert!(errors.is_empty(), "unexpected short flags: {errors:?}");
}

#[test]
fn test_cli_debug_assert() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
