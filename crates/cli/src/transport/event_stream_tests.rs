// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[tokio::test]
async fn open_failure_hides_the_credential() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{addr}/stream?scheduleId=s1&token=supersecret")).unwrap();
    let mut adapter = EventStreamAdapter::new(vec![]);
    let err = adapter.open(&url).await.unwrap_err();

    assert!(matches!(err, TransportError::ConnectionFailed(_)));
    assert!(!err.to_string().contains("supersecret"), "{err}");
    assert!(!adapter.is_open());
}

#[tokio::test]
async fn send_is_unsupported() {
    let mut adapter = EventStreamAdapter::new(vec![]);
    assert!(!adapter.can_send());
    assert!(matches!(
        adapter.send("hi".into()).await,
        Err(TransportError::Unsupported(_))
    ));
}

#[test]
fn unregistered_channels_are_dropped() {
    let adapter = EventStreamAdapter::new(vec!["status_change".into()]);
    assert_eq!(adapter.channel_for(None), Some(None));
    assert_eq!(
        adapter.channel_for(Some("status_change".into())),
        Some(Some("status_change".into()))
    );
    assert_eq!(adapter.channel_for(Some("chat".into())), None);
}
