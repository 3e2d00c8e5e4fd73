// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn test_missing_schedule_has_hint() {
    let msg = Error::MissingSchedule.to_string();
    assert!(msg.contains("no schedule id"));
    assert!(msg.contains("hint: pass --schedule"));
}

#[test]
fn test_missing_credential_has_hint() {
    let msg = Error::MissingCredential.to_string();
    assert!(msg.contains("no credential"));
    assert!(msg.contains("ROLLCALL_TOKEN"));
}

#[test]
fn test_invalid_url_display() {
    let err = Error::InvalidUrl {
        field: "ws_url",
        url: "nope".to_string(),
        reason: "relative URL without a base".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("ws_url"));
    assert!(msg.contains("'nope'"));
}

#[test]
fn test_terminal_connection_reports_attempts() {
    let msg = Error::TerminalConnection { attempts: 5 }.to_string();
    assert!(msg.contains("after 5 failed"));
}

#[test]
fn test_transport_error_converts() {
    let err: Error = TransportError::ConnectionClosed.into();
    assert!(matches!(err, Error::Transport(TransportError::ConnectionClosed)));
}

#[test]
fn test_io_error_converts() {
    let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(err.to_string().starts_with("io error"));
}
