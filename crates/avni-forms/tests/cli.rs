//! CLI Command Tests
//!
//! The command implementations driven directly, with form files in a
//! temporary directory and a mock server for the server commands.

use avni_forms::cli::config::ConnectionOptions;
use avni_forms::OriginalShapes;
use avni_forms::cli::{fetch, read_form, save, validate};
use avni_forms::session::normalize;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Helpers
// ============================================================================

fn form(element_type: Option<&str>, name: &str) -> Value {
    json!({
        "uuid": "f-1",
        "name": name,
        "formType": "IndividualProfile",
        "formElementGroups": [{
            "uuid": "g-1",
            "name": "Basics",
            "displayOrder": 1,
            "formElements": [{
                "uuid": "e-1",
                "name": "Symptoms",
                "type": element_type,
                "displayOrder": 1,
                "concept": {"uuid": "c-1", "name": "Symptoms", "dataType": "Coded", "answers": [
                    {"uuid": "a-1", "name": "Fever", "order": 0}
                ]},
                "keyValues": []
            }]
        }]
    })
}

fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn connection(server: &MockServer, dir: &Path) -> ConnectionOptions {
    ConnectionOptions {
        config_file: Some(dir.join("absent.toml")),
        server_url: Some(server.uri()),
        ..ConnectionOptions::default()
    }
}

async fn serve_form(server: &MockServer, form: Value) {
    Mock::given(method("GET"))
        .and(path("/forms/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(form))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/web/identifierSource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/web/operationalModules/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

// ============================================================================
// Validate
// ============================================================================

#[rstest]
#[case::valid(Some("SingleSelect"), "Registration", true)]
#[case::missing_select_type(None, "Registration", false)]
#[case::missing_name(Some("SingleSelect"), "", false)]
fn test_validate_file(#[case] element_type: Option<&str>, #[case] name: &str, #[case] valid: bool) {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "form.json", &form(element_type, name));

    let report = validate::validate_file(&file, None).unwrap();
    assert_eq!(report.is_valid(), valid);
}

fn shapes_of(file: &Path) -> OriginalShapes {
    let mut shapes = OriginalShapes::new();
    let mut original = read_form(file).unwrap();
    normalize(&mut original, &mut shapes);
    shapes
}

#[test]
fn test_validate_against_earlier_version() {
    let dir = tempfile::tempdir().unwrap();
    let multi = write(&dir, "multi.json", &form(Some("MultiSelect"), "Registration"));
    let single = write(&dir, "single.json", &form(Some("SingleSelect"), "Registration"));
    let cleared = write(&dir, "cleared.json", &form(Some(""), "Registration"));

    let all_valid = validate::validate(validate::ValidateConfig {
        files: vec![single],
        against: Some(multi.clone()),
        json: false,
        verbose: false,
    })
    .unwrap();
    assert!(all_valid);

    let report = validate::validate_file(&cleared, Some(&shapes_of(&multi))).unwrap();
    assert!(report.element_errors["e-1"].disallowed_change_error);

    let report = validate::validate_file(&cleared, None).unwrap();
    assert!(!report.element_errors["e-1"].disallowed_change_error);
}

#[test]
fn test_validate_reports_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();

    let err = validate::validate_file(&broken, None).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_validate_requires_files() {
    let result = validate::validate(validate::ValidateConfig {
        files: vec![],
        against: None,
        json: true,
        verbose: false,
    });
    assert!(result.is_err());
}

// ============================================================================
// Server commands
// ============================================================================

#[tokio::test]
async fn test_fetch_writes_normalized_form() {
    let server = MockServer::start().await;
    serve_form(&server, form(Some("SingleSelect"), "Registration")).await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("fetched.json");

    fetch::fetch(fetch::FetchConfig {
        form_uuid: "f-1".into(),
        connection: connection(&server, dir.path()),
        output_file: Some(out.clone()),
        pretty: true,
    })
    .await
    .unwrap();

    let fetched: Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    assert_eq!(fetched["formElementGroups"][0]["groupId"], json!("Basics"));
}

#[tokio::test]
async fn test_save_posts_local_file() {
    let server = MockServer::start().await;
    serve_form(&server, form(Some("SingleSelect"), "Registration")).await;
    Mock::given(method("POST"))
        .and(path("/forms"))
        .and(body_partial_json(json!({"name": "Registration v2"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "form.json", &form(Some("SingleSelect"), "Registration v2"));

    save::save(save::SaveConfig {
        file,
        form_uuid: None,
        connection: connection(&server, dir.path()),
        verbose: false,
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_save_refuses_disallowed_change() {
    let server = MockServer::start().await;
    serve_form(&server, form(Some("MultiSelect"), "Registration")).await;
    Mock::given(method("POST"))
        .and(path("/forms"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "form.json", &form(Some(""), "Registration"));

    let err = save::save(save::SaveConfig {
        file,
        form_uuid: None,
        connection: connection(&server, dir.path()),
        verbose: false,
    })
    .await
    .unwrap_err();
    assert!(err.to_string().contains("was not saved"));
}
