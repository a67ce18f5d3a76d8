//! HTTP Backend Tests
//!
//! [`HttpFormsBackend`] against a mock server: request paths, the auth token
//! header, response decoding and error mapping.

use avni_forms_session::{
    AUTH_TOKEN_HEADER, BackendError, ClientConfig, FormSession, FormsBackend, HttpFormsBackend,
    SessionState,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn form_body() -> serde_json::Value {
    json!({
        "uuid": "f-1",
        "name": "Registration",
        "formType": "IndividualProfile",
        "formElementGroups": [{
            "uuid": "g-1",
            "name": "Basics",
            "displayOrder": 1,
            "formElements": [{
                "uuid": "e-1",
                "name": "First name",
                "displayOrder": 1,
                "concept": {"uuid": "c-1", "name": "First name", "dataType": "Text"},
                "keyValues": []
            }]
        }]
    })
}

#[tokio::test]
async fn test_fetch_form_sends_uuid_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forms/export"))
        .and(query_param("formUUID", "f-1"))
        .and(header(AUTH_TOKEN_HEADER, "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(form_body()))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpFormsBackend::new(server.uri()).with_auth_token("secret");
    let form = backend.fetch_form("f-1").await.unwrap();
    assert_eq!(form["name"], json!("Registration"));
}

#[tokio::test]
async fn test_save_form_posts_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/forms"))
        .and(body_partial_json(json!({"uuid": "f-1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpFormsBackend::new(server.uri());
    backend.save_form(&form_body()).await.unwrap();
}

#[tokio::test]
async fn test_server_rejection_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/forms"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("org.avni.server.BadRequest: Duplicate name"),
        )
        .mount(&server)
        .await;

    let backend = HttpFormsBackend::new(server.uri());
    let err = backend.save_form(&form_body()).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Server {
            status: 400,
            body: "org.avni.server.BadRequest: Duplicate name".into(),
        }
    );
}

#[tokio::test]
async fn test_identifier_sources_read_from_embedded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/web/identifierSource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"identifierSource": [
                {"uuid": "is-1", "name": "Household ids", "batchGenerationSize": 100}
            ]},
            "page": {"totalElements": 1}
        })))
        .mount(&server)
        .await;

    let sources = HttpFormsBackend::new(server.uri())
        .identifier_sources()
        .await
        .unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].name, "Household ids");
}

#[tokio::test]
async fn test_identifier_sources_missing_embedded_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/web/identifierSource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"page": {}})))
        .mount(&server)
        .await;

    let sources = HttpFormsBackend::new(server.uri())
        .identifier_sources()
        .await
        .unwrap();
    assert!(sources.is_empty());
}

#[tokio::test]
async fn test_operational_modules_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/web/operationalModules/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subjectTypes": "none"})))
        .mount(&server)
        .await;

    let err = HttpFormsBackend::new(server.uri())
        .operational_modules()
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let config = ClientConfig {
        server_url: "http://127.0.0.1:9".into(),
        timeout_secs: 2,
        ..ClientConfig::default()
    };
    let backend = HttpFormsBackend::from_config(&config).unwrap();
    let err = backend.fetch_form("f-1").await.unwrap_err();
    assert!(matches!(err, BackendError::Network(_)));
}

#[tokio::test]
async fn test_session_round_trip_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forms/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(form_body()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/web/identifierSource"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/web/operationalModules/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subjectTypes": [], "encounterTypes": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/forms"))
        .and(body_partial_json(json!({"name": "Registration form"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = Arc::new(HttpFormsBackend::new(server.uri()));
    let mut session = FormSession::new(backend, "f-1");
    session.load().await.unwrap();
    assert_eq!(session.message(), Some("Failed to load initial data"));

    session.set_name("Registration form").unwrap();
    session.save().await.unwrap();
    assert_eq!(session.state(), &SessionState::Ready);
}
