//! HTTP gateway against a mock API server

use crate::common::{memory_store, sample_fields};
use crate::{assert_err, assert_ok};
use offline_forms::client::{
    ConnectivityObserver, GatewayError, HttpGateway, OfflineError, SubmissionGateway,
    SubmitOutcome, SyncCoordinator,
};
use offline_forms::shared::ServerAck;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> HttpGateway {
    HttpGateway::new(format!("{}/posts", server.uri()))
}

#[tokio::test]
async fn test_posts_fields_as_json() {
    let server = MockServer::start().await;
    let fields = sample_fields("Ana");

    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "name": "Ana",
            "lastName": "Pérez",
            "email": "ana@example.com",
            "category": "general",
            "notes": "sent from the test suite"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 101,
            "name": "Ana"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = assert_ok!(gateway_for(&server).submit(&fields).await);
    assert_eq!(ack, ServerAck { id: 101 });
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .submit(&sample_fields("Ana"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::Status {
            status: 500,
            body: "internal error".to_string()
        }
    );
}

#[tokio::test]
async fn test_missing_id_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    assert_err!(
        gateway_for(&server).submit(&sample_fields("Ana")).await,
        GatewayError::InvalidResponse { .. }
    );
}

#[tokio::test]
async fn test_queued_submission_reaches_server_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = SyncCoordinator::new(
        memory_store().await,
        Arc::new(gateway_for(&server)),
        ConnectivityObserver::new(false),
    );

    let outcome = assert_ok!(coordinator.submit(sample_fields("Ana")).await);
    let SubmitOutcome::QueuedLocally { id } = outcome else {
        panic!("expected queued outcome, got {:?}", outcome);
    };
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    coordinator.network().set_online(true);
    let ack = assert_ok!(coordinator.resync(id).await);
    assert_eq!(ack.id, 42);
    assert_eq!(coordinator.store().pending_count(), 0);

    // purged, so a second resync never reaches the server
    assert_err!(coordinator.resync(id).await, OfflineError::NotFound { .. });
}

#[tokio::test]
async fn test_rejected_resync_leaves_record_queued() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid email"))
        .mount(&server)
        .await;

    let store = memory_store().await;
    let id = assert_ok!(store.save(&sample_fields("Ana")).await);
    let coordinator = SyncCoordinator::new(
        store,
        Arc::new(gateway_for(&server)),
        ConnectivityObserver::new(true),
    );

    let err = coordinator.resync(id).await.unwrap_err();

    assert!(matches!(
        err,
        OfflineError::Gateway(GatewayError::Status { status: 422, .. })
    ));
    assert_eq!(coordinator.store().pending_count(), 1);
    assert_eq!(err.user_message(), "Error sending the form. Please try again.");
}
