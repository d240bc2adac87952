#![cfg(feature = "elasticsearch")]

use serde_json::{json, Value};
use std::sync::Arc;
use tracing_elastic_hook::elastic::{Credentials, ElasticClient};
use tracing_elastic_hook::{
    DispatchError, ElasticHook, HookConfig, LogRecord, ProvisionError, SearchClient, Severity, TransportError,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn build_hook(config: HookConfig) -> Result<ElasticHook, ProvisionError> {
    tokio::task::spawn_blocking(move || ElasticHook::from_config(config))
        .await
        .unwrap()
}

fn client_for(server: &MockServer) -> Arc<dyn SearchClient> {
    Arc::new(ElasticClient::new(server.uri()))
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_index_is_created_then_documents_posted() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/t1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true, "index": "t1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/t1/_doc"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": "created"})))
        .expect(100)
        .mount(&server)
        .await;

    let hook = Arc::new(
        build_hook(HookConfig::new(client_for(&server), "localhost", Severity::Debug, "t1"))
            .await
            .unwrap(),
    );

    let sender = Arc::clone(&hook);
    tokio::task::spawn_blocking(move || {
        for i in 0..100 {
            sender
                .receive(&LogRecord::new(Severity::Info, format!("Hustej msg {i}")))
                .unwrap();
        }
    })
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    let docs: Vec<Value> = requests
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(docs.len(), 100);
    assert!(docs.iter().all(|doc| doc["Host"] == "localhost" && doc["Level"] == "INFO"));
    assert!(docs[0]["Timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(docs[0]["Data"].is_object());
}

#[tokio::test(flavor = "multi_thread")]
async fn existing_index_is_left_alone() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/t1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for _ in 0..2 {
        build_hook(HookConfig::new(client_for(&server), "localhost", Severity::Info, "t1"))
            .await
            .unwrap();
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unacknowledged_creation_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": false})))
        .mount(&server)
        .await;

    let err = build_hook(HookConfig::new(client_for(&server), "localhost", Severity::Info, "t1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisionError::NotAcknowledged), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_on_check_fails_construction() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = build_hook(HookConfig::new(client_for(&server), "localhost", Severity::Info, "t1"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ProvisionError::CheckFailed(TransportError::Status { status: 500, .. })),
        "{err:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_document_returns_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
        .mount(&server)
        .await;

    let hook = build_hook(HookConfig::new(client_for(&server), "localhost", Severity::Info, "t1"))
        .await
        .unwrap();
    let outcome = tokio::task::spawn_blocking(move || hook.receive(&LogRecord::new(Severity::Info, "x")))
        .await
        .unwrap();

    match outcome {
        Err(DispatchError::Transport(TransportError::Status { status, body })) => {
            assert_eq!(status, 400);
            assert_eq!(body, "mapper_parsing_exception");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn legacy_type_and_credentials_are_sent() {
    let server = MockServer::start().await;

    // "elastic:changeme"
    let auth = "Basic ZWxhc3RpYzpjaGFuZ2VtZQ==";
    Mock::given(method("HEAD"))
        .and(header("authorization", auth))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/legacy/log"))
        .and(header("authorization", auth))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElasticClient::new(server.uri()).with_credentials(Credentials {
        user: "elastic".to_string(),
        password: Some("changeme".to_string()),
    });
    let mut config = HookConfig::new(Arc::new(client), "localhost", Severity::Info, "legacy");
    config.doc_type = Some("log".to_string());
    let hook = build_hook(config).await.unwrap();

    tokio::task::spawn_blocking(move || hook.receive(&LogRecord::new(Severity::Warn, "tagged")))
        .await
        .unwrap()
        .unwrap();
}
