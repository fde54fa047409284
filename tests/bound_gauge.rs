//! The `bindery_bound` gauge after a restart.
//!
//! Kept in its own binary: the gauge is process-global and other tests
//! move it concurrently.

mod common;

use common::TestServer;

#[tokio::test]
async fn test_bound_gauge_reflects_persisted_owner_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "[store]\nbackend = \"redb\"\npath = \"{}\"\n\n[device]\nkind = \"dummy\"\n",
        dir.path().join("binding.redb").display()
    );

    let first = TestServer::spawn("dummy", &body).await.unwrap();
    first.client("alice").bind().await.unwrap();
    first.stop().await.unwrap();

    // A fresh process would start from zero.
    bindery::metrics::set_bound(false);

    let second = TestServer::spawn("dummy", &body).await.unwrap();
    let (code, body) = second.anonymous().get("metrics").await.unwrap();
    assert_eq!(code, 200);
    let text = body.as_str().expect("metrics are plain text");
    assert!(text.contains("bindery_bound 1"), "{text}");
    second.stop().await.unwrap();
}
