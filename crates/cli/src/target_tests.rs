// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn target() -> ConnectionTarget {
    ConnectionTarget::new(Some("sch-42".into()), Some("t0k en".into())).unwrap()
}

#[parameterized(
    no_schedule = { None, Some("tok") },
    blank_schedule = { Some("  "), Some("tok") },
)]
fn test_missing_schedule(schedule: Option<&str>, token: Option<&str>) {
    let err = ConnectionTarget::new(schedule.map(String::from), token.map(String::from));
    assert!(matches!(err, Err(Error::MissingSchedule)));
}

#[parameterized(
    no_token = { None },
    empty_token = { Some("") },
)]
fn test_missing_token(token: Option<&str>) {
    let err = ConnectionTarget::new(Some("s1".into()), token.map(String::from));
    assert!(matches!(err, Err(Error::MissingCredential)));
}

#[test]
fn test_validate_hand_built_target() {
    let target = ConnectionTarget {
        schedule_id: "s1".into(),
        token: String::new(),
    };
    assert!(matches!(target.validate(), Err(Error::MissingCredential)));
}

#[test]
fn test_debug_redacts_token() {
    let shown = format!("{:?}", target());
    assert!(shown.contains("sch-42"));
    assert!(!shown.contains("t0k"));
}

#[test]
fn test_urls_carry_target() {
    let endpoints = Endpoints::parse("ws://host/ws", "http://host/stream").unwrap();

    let ws = endpoints.url_for(TransportKind::Primary, &target());
    assert_eq!(ws.as_str(), "ws://host/ws?scheduleId=sch-42&token=t0k+en");

    let sse = endpoints.url_for(TransportKind::Fallback, &target());
    assert_eq!(sse.path(), "/stream");
    assert!(sse.query_pairs().any(|(k, v)| k == "token" && v == "t0k en"));
}

#[test]
fn test_existing_query_is_kept_and_target_replaced() {
    let endpoints =
        Endpoints::parse("wss://host/ws?v=2&token=old", "https://host/stream").unwrap();
    let ws = endpoints.url_for(TransportKind::Primary, &target());
    let pairs: Vec<(String, String)> = ws.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("v".to_string(), "2".to_string()),
            ("scheduleId".to_string(), "sch-42".to_string()),
            ("token".to_string(), "t0k en".to_string()),
        ]
    );
}

#[parameterized(
    not_a_url = { "not a url", "http://host/stream" },
    http_socket = { "http://host/ws", "http://host/stream" },
    ws_stream = { "ws://host/ws", "ws://host/stream" },
)]
fn test_invalid_endpoints(primary: &str, fallback: &str) {
    let err = Endpoints::parse(primary, fallback).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl { .. }));
}
