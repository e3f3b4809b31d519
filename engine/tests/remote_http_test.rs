//! HTTP remote store against a mock document API

use chrono::Utc;
use vitaltrack_engine::{HttpRemoteStore, RemoteError, RemoteSnapshot, RemoteStore};
use vitaltrack_shared::{HealthMetric, MetricType};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn snapshot_with_weight(value: f64) -> RemoteSnapshot {
    RemoteSnapshot {
        health_metrics: vec![HealthMetric::new(MetricType::Weight, value, Utc::now())],
        ..Default::default()
    }
}

#[tokio::test]
async fn push_puts_snapshot_with_bearer_token() {
    let server = MockServer::start().await;
    let snapshot = snapshot_with_weight(171.0);

    Mock::given(method("PUT"))
        .and(path("/users/user-1/snapshot"))
        .and(header("authorization", "Bearer token-abc"))
        .and(body_json(&snapshot))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(server.uri());
    store.sign_in("user-1", "token-abc");
    store.push("user-1", &snapshot).await.unwrap();
}

#[tokio::test]
async fn pull_decodes_snapshot() {
    let server = MockServer::start().await;
    let snapshot = snapshot_with_weight(182.5);

    Mock::given(method("GET"))
        .and(path("/users/user-1/snapshot"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&snapshot))
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(server.uri());
    store.sign_in("user-1", "token-abc");
    let pulled = store.pull("user-1").await.unwrap();
    assert_eq!(pulled, snapshot);
}

#[tokio::test]
async fn pull_tolerates_missing_collections_in_document() {
    let server = MockServer::start().await;

    // A partial document from an older client decodes with empty defaults
    Mock::given(method("GET"))
        .and(path("/users/user-1/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"health_metrics": []}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(server.uri());
    store.sign_in("user-1", "token-abc");
    let pulled = store.pull("user-1").await.unwrap();
    assert!(pulled.bp_sessions.is_empty());
    assert!(pulled.nutrition_goals.is_none());
}

#[tokio::test]
async fn unauthorized_status_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(server.uri());
    store.sign_in("user-1", "expired");
    let err = store.pull("user-1").await.unwrap_err();
    assert!(matches!(err, RemoteError::Unauthorized));
}

#[tokio::test]
async fn missing_document_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(server.uri());
    store.sign_in("new-user", "token-abc");
    let err = store.pull("new-user").await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound));
}

#[tokio::test]
async fn server_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(server.uri());
    store.sign_in("user-1", "token-abc");
    let err = store.push("user-1", &RemoteSnapshot::default()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Server { status: 500 }));
}

#[tokio::test]
async fn signed_out_store_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = HttpRemoteStore::new(server.uri());
    assert!(!store.is_authenticated());
    assert!(store.current_user_id().is_none());

    let err = store.pull("user-1").await.unwrap_err();
    assert!(matches!(err, RemoteError::Unauthorized));

    store.sign_in("user-1", "token-abc");
    assert_eq!(store.current_user_id().as_deref(), Some("user-1"));
    store.sign_out();
    assert!(!store.is_authenticated());
}
