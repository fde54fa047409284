//! Integration tests for guarded `/resource` actions.

mod common;

use common::TestServer;
use common::fakes::{FakeBridge, start_collector};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_owner_acts_other_user_conflicts() {
    let server = TestServer::dummy().await.unwrap();
    let alice = server.client("alice");
    let bob = server.client("bob");

    alice.bind().await.unwrap();

    let (code, body) = alice.post("resource/example").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(body, json!({ "result": "success" }));

    let (code, body) = bob.post("resource/example").await.unwrap();
    assert_eq!(code, 409);
    assert_eq!(body["kind"], "conflict");

    let (code, body) = alice.get("resource").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(body["status"], "example");
}

#[tokio::test]
async fn test_actions_require_binding() {
    let server = TestServer::dummy().await.unwrap();
    let (code, body) = server.client("alice").post("resource/example").await.unwrap();
    assert_eq!(code, 401);
    assert_eq!(body["kind"], "unauthorized");

    let (code, _) = server.client("alice").get("resource").await.unwrap();
    assert_eq!(code, 401);
}

#[tokio::test]
async fn test_guard_runs_before_action_validation() {
    let server = TestServer::dummy().await.unwrap();

    // Not bound: ownership fails first, even for a nonsense action.
    let (code, body) = server.client("alice").post("resource/dance").await.unwrap();
    assert_eq!(code, 401);
    assert_eq!(body["kind"], "unauthorized");

    server.client("alice").bind().await.unwrap();
    let (code, body) = server.client("alice").post("resource/dance").await.unwrap();
    assert_eq!(code, 400);
    assert_eq!(body["kind"], "invalid_action");
}

#[tokio::test]
async fn test_service_routes_absent_in_device_mode() {
    let server = TestServer::dummy().await.unwrap();
    server.client("alice").bind().await.unwrap();
    let (code, _) = server.client("alice").post("service/fake").await.unwrap();
    assert_eq!(code, 404);
}

#[tokio::test]
async fn test_hue_on_off_and_status() {
    let bridge = FakeBridge::default();
    let bridge_url = bridge.start().await.unwrap();
    let server = TestServer::hue(&bridge_url).await.unwrap();
    let alice = server.client("alice");
    alice.bind().await.unwrap();

    let (code, body) = alice.post("resource/on").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(body, json!({ "status": "On" }));
    assert!(bridge.is_on());

    let (code, body) = alice.get("resource").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(body, json!({ "status": "On" }));

    let (code, body) = alice.post("resource/off").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(body, json!({ "status": "Off" }));

    let puts = bridge.puts.lock().unwrap().clone();
    assert_eq!(
        puts,
        vec![
            json!({ "on": true, "sat": 254, "bri": 254, "hue": 10000 }),
            json!({ "on": false }),
        ]
    );
}

#[tokio::test]
async fn test_hue_unreachable_bridge_is_device_failure() {
    let server = TestServer::hue("http://127.0.0.1:9").await.unwrap();
    let alice = server.client("alice");
    alice.bind().await.unwrap();

    let (code, body) = alice.post("resource/on").await.unwrap();
    assert_eq!(code, 502);
    assert_eq!(body["kind"], "device_failure");

    // The binding is untouched by a device failure.
    assert_eq!(
        alice.status().await.unwrap().owner_id.as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn test_action_record_reaches_collector() {
    let (collector, mut records) = start_collector().await.unwrap();
    let server = TestServer::dummy_with_sink(&format!("{collector}/api/data/"))
        .await
        .unwrap();
    let alice = server.client("alice");
    alice.bind().await.unwrap();

    let (code, _) = alice.post("resource/example").await.unwrap();
    assert_eq!(code, 200);

    let record = tokio::time::timeout(Duration::from_secs(5), records.recv())
        .await
        .expect("no record within 5s")
        .expect("collector closed");
    assert_eq!(record["type"], "dummy");
    assert_eq!(record["actor"], "alice");
    assert_eq!(record["boundOwner"], "alice");
    assert_eq!(record["action"], "example");
    assert_eq!(record["result"], json!({ "result": "success" }));
    assert!(record["remoteAddr"].as_str().unwrap().starts_with("127.0.0.1:"));
}

#[tokio::test]
async fn test_unreachable_collector_does_not_fail_action() {
    let server = TestServer::dummy_with_sink("http://127.0.0.1:9/api/data/")
        .await
        .unwrap();
    let alice = server.client("alice");
    alice.bind().await.unwrap();

    let (code, body) = alice.post("resource/example").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(body["result"], "success");
}

#[tokio::test]
async fn test_catalog_registration_posts_description() {
    let (directory, mut posts) = start_collector().await.unwrap();
    let body = format!(
        "[device]\nkind = \"dummy\"\n\n[catalog]\nregistry_url = \"{directory}/api/services/\"\n"
    );
    let _server = TestServer::spawn("dummy", &body).await.unwrap();

    let post = tokio::time::timeout(Duration::from_secs(5), posts.recv())
        .await
        .expect("no registration within 5s")
        .expect("directory closed");
    let raw = post["raw_description"].as_str().expect("raw_description is a string");
    let description: serde_json::Value = serde_json::from_str(raw).unwrap();
    assert_eq!(description["id"], "webeng:dummy:0");
    assert!(description["actions"]["example"].is_object());
}
