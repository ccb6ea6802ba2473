/*!
 * Secure Read Tests
 * Sandbox denial, sensitivity signalling and content delivery
 */

use crate::fixtures::{dead_collector_url, mediator, spawn_collector, RecordingSink, Sandbox};
use mockall::mock;
use pretty_assertions::assert_eq;
use ssf_security_mcp::{
    build_mediator, AccessOutcome, AccessType, EmitReceipt, SecurityEventSink,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

mock! {
    pub Sink {}

    impl SecurityEventSink for Sink {
        fn emit(&self, file_path: &Path, access_type: AccessType) -> EmitReceipt;
    }
}

#[tokio::test]
async fn test_sensitive_in_sandbox_returns_content_and_emits_once() {
    let sandbox = Sandbox::new();
    sandbox.write("user-credentials.secret", "token=123");

    let mut sink = MockSink::new();
    sink.expect_emit()
        .withf(|path, access| {
            path.ends_with("user-credentials.secret") && *access == AccessType::FileAccess
        })
        .times(1)
        .returning(|_, _| EmitReceipt::local("event-0-1"));

    let mediator = mediator(sandbox.config(), Arc::new(sink));
    let outcome = mediator
        .read_secure(&sandbox.path("user-credentials.secret"))
        .await;

    assert_eq!(outcome.content(), Some("token=123"));
    assert!(outcome.event_generated());
    assert!(outcome.to_string().contains("SECURITY EVENT GENERATED"));
    assert!(outcome.to_string().ends_with("Content:\ntoken=123"));
}

#[tokio::test]
async fn test_plain_file_emits_nothing() {
    let sandbox = Sandbox::new();
    sandbox.write("public-data.txt", "hello");

    let mut sink = MockSink::new();
    sink.expect_emit().never();

    let mediator = mediator(sandbox.config(), Arc::new(sink));
    let outcome = mediator.read_secure(&sandbox.path("public-data.txt")).await;

    assert_eq!(outcome.content(), Some("hello"));
    assert!(!outcome.event_generated());
    assert!(!outcome.to_string().contains("SECURITY EVENT GENERATED"));
}

#[tokio::test]
async fn test_outside_sandbox_is_denied() {
    let sandbox = Sandbox::new();
    let sink = RecordingSink::new();
    let mediator = mediator(sandbox.config(), sink.clone());

    let outcome = mediator.read_secure("/etc/passwd").await;

    assert!(outcome.is_denied());
    assert_eq!(outcome.content(), None);
    assert!(outcome
        .to_string()
        .starts_with("Access denied: File outside allowed directory"));
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_sensitive_outside_sandbox_is_denied_but_signalled() {
    let sandbox = Sandbox::new();
    let outside = sandbox.write_outside("leaked.secret", "top secret");

    let sink = RecordingSink::new();
    let mediator = mediator(sandbox.config(), sink.clone());
    let outcome = mediator.read_secure(outside.to_str().unwrap()).await;

    assert!(outcome.is_denied());
    assert!(!outcome.to_string().contains("top secret"));
    assert_eq!(sink.paths(), vec![outside]);
}

#[tokio::test]
async fn test_sibling_prefix_directory_is_denied() {
    let sandbox = Sandbox::new();
    let evil = sandbox.write_outside("test-files-evil/data.txt", "stolen");

    let sink = RecordingSink::new();
    let mediator = mediator(sandbox.config(), sink.clone());
    let outcome = mediator.read_secure(evil.to_str().unwrap()).await;

    assert!(outcome.is_denied());
    assert_eq!(outcome.content(), None);
}

#[tokio::test]
async fn test_dotdot_traversal_is_denied() {
    let sandbox = Sandbox::new();
    sandbox.write_outside("outside.txt", "nope");

    let mediator = mediator(sandbox.config(), RecordingSink::new());
    let outcome = mediator
        .read_secure(&sandbox.path("sub/../../outside.txt"))
        .await;

    assert!(outcome.is_denied());
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_link_to_sensitive_outside_target_is_denied_and_signalled() {
    let sandbox = Sandbox::new();
    let target = sandbox.root.parent().unwrap().join("api-key.conf");
    std::os::unix::fs::symlink(&target, sandbox.root.join("notes.txt")).unwrap();

    let sink = RecordingSink::new();
    let mediator = mediator(sandbox.config(), sink.clone());
    let outcome = mediator.read_secure(&sandbox.path("notes.txt")).await;

    assert!(outcome.is_denied());
    assert_eq!(sink.paths(), vec![target.clone()]);

    // The target appearing later still yields no content
    std::fs::write(&target, "key=leaked").unwrap();
    let again = mediator.read_secure(&sandbox.path("notes.txt")).await;
    assert!(again.is_denied());
    assert!(!again.to_string().contains("key=leaked"));
}

#[tokio::test]
async fn test_missing_sensitive_file_is_not_found_but_signalled() {
    let sandbox = Sandbox::new();
    let sink = RecordingSink::new();
    let mediator = mediator(sandbox.config(), sink.clone());

    let outcome = mediator.read_secure(&sandbox.path("missing.credentials")).await;

    assert!(outcome.is_not_found());
    assert!(outcome.to_string().starts_with("File not found: "));
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn test_directory_is_not_a_file() {
    let sandbox = Sandbox::new();
    std::fs::create_dir(sandbox.root.join("nested")).unwrap();

    let mediator = mediator(sandbox.config(), RecordingSink::new());
    let outcome = mediator.read_secure(&sandbox.path("nested")).await;

    assert!(outcome.is_not_found());
}

#[tokio::test]
async fn test_undecodable_content_is_error_text() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.root.join("blob.bin"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let mediator = mediator(sandbox.config(), RecordingSink::new());
    let outcome = mediator.read_secure(&sandbox.path("blob.bin")).await;

    assert!(matches!(outcome, AccessOutcome::Failed { .. }));
    assert!(outcome.to_string().starts_with("Error reading file: "));
}

#[tokio::test]
async fn test_case_insensitive_match_triggers_event() {
    let sandbox = Sandbox::new();
    sandbox.write("My-PASSWORD-list.txt", "hunter2");

    let sink = RecordingSink::new();
    let mediator = mediator(sandbox.config(), sink.clone());
    let outcome = mediator.read_secure(&sandbox.path("My-PASSWORD-list.txt")).await;

    assert_eq!(outcome.content(), Some("hunter2"));
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn test_unreachable_collector_does_not_change_result() {
    let sandbox = Sandbox::new();
    sandbox.write("api-keys.credentials", "key=abc");

    let config = sandbox
        .config()
        .with_collector_url(Some(dead_collector_url().await));
    let (mediator, _emitter) = build_mediator(config).unwrap();

    let started = Instant::now();
    let outcome = mediator.read_secure(&sandbox.path("api-keys.credentials")).await;

    assert_eq!(outcome.content(), Some("key=abc"));
    assert!(outcome.event_generated());
    // Delivery is detached, so the read never waits on the collector
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_collector_receives_scenario_event() {
    let sandbox = Sandbox::new();
    sandbox.write("user-credentials.secret", "token=123");

    let (url, mut bodies) = spawn_collector(200).await;
    let (mediator, _emitter) =
        build_mediator(sandbox.config().with_collector_url(Some(url))).unwrap();

    let outcome = mediator
        .read_secure(&sandbox.path("user-credentials.secret"))
        .await;
    assert!(outcome.to_string().contains("token=123"));

    let body = tokio::time::timeout(Duration::from_secs(5), bodies.recv())
        .await
        .expect("collector saw no request")
        .expect("collector channel closed");
    let event: serde_json::Value = serde_json::from_str(&body).unwrap();
    let data = &event["events"]
        ["https://schemas.openid.net/secevent/caep/event-type/session-risk-change"]
        ["custom_data"];

    assert!(data["file_path"]
        .as_str()
        .unwrap()
        .ends_with("user-credentials.secret"));
    assert_eq!(data["access_type"], "file_access");
    assert!(event["jti"].as_str().unwrap().ends_with("-1"));

    // Exactly one event for one access
    let extra = tokio::time::timeout(Duration::from_millis(300), bodies.recv()).await;
    assert!(extra.is_err());
}
