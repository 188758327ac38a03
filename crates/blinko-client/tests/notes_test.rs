//! Note submission, upload and config fetch against a mock Blinko server.

use blinko_client::{FileUpload, NoteClient};
use blinko_core::{Attachment, Attachments, ContentType, Error, Settings};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn client() -> NoteClient {
    NoteClient::with_client(reqwest::Client::new())
}

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        target_url: format!("{}/", server.uri()),
        auth_key: "token-123".to_string(),
        summary_tag: "#web/summary".to_string(),
        include_summary_url: true,
        ..Default::default()
    }
}

fn attachment(name: &str) -> Attachment {
    Attachment {
        name: name.to_string(),
        path: format!("/api/file/{}", name),
        size: 10,
        mime_type: "image/png".to_string(),
    }
}

#[tokio::test]
async fn test_submit_posts_composed_note() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/note/upsert"))
        .and(header("Authorization", "Bearer token-123"))
        .and(body_json(json!({
            "content": "Key points\n\nSource: [Post](https://example.com/post)\n\n#web/summary",
            "type": 0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client()
        .submit(
            "Key points",
            "https://example.com/post",
            "Post",
            Attachments::none(),
            ContentType::Summary,
            &settings_for(&server),
        )
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.data, Some(json!({"id": 42})));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_submit_target_with_api_suffix_and_bearer_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/note/upsert"))
        .and(header("Authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.target_url = format!("{}/api/v1/", server.uri());
    settings.auth_key = "bearer token-123".to_string();

    let result = client()
        .submit("x", "", "", Attachments::none(), ContentType::QuickNote, &settings)
        .await;
    assert!(result.success);
}

#[tokio::test]
async fn test_submit_sends_single_and_many_attachments() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/note/upsert"))
        .and(body_json(json!({
            "content": "",
            "type": 0,
            "attachments": [{"name": "a.png", "path": "/api/file/a.png", "size": 10, "type": "image/png"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/note/upsert"))
        .and(body_string_contains("b.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.image_tag = String::new();
    settings.include_image_url = false;

    let single = client()
        .submit("", "", "", attachment("a.png"), ContentType::Image, &settings)
        .await;
    assert_eq!(single.data, Some(json!({"id": 1})));

    let many = client()
        .submit(
            "",
            "",
            "",
            vec![attachment("a.png"), attachment("b.png")],
            ContentType::Image,
            &settings,
        )
        .await;
    assert_eq!(many.data, Some(json!({"id": 2})));
}

#[tokio::test]
async fn test_submit_server_error_is_failure_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/note/upsert"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&server)
        .await;

    let result = client()
        .submit("x", "", "", Attachments::none(), ContentType::QuickNote, &settings_for(&server))
        .await;

    assert!(!result.success);
    assert!(result.data.is_none());
    let error = result.error.unwrap();
    assert!(error.contains("401"), "{}", error);
    assert!(error.contains("Unauthorized"), "{}", error);
}

#[tokio::test]
async fn test_submit_non_json_success_is_failure_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/note/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let result = client()
        .submit("x", "", "", Attachments::none(), ContentType::QuickNote, &settings_for(&server))
        .await;
    assert!(!result.success);
}

#[tokio::test]
async fn test_submit_unreachable_server_is_failure_result() {
    // nothing listens on the discard port
    let settings = Settings {
        target_url: "http://127.0.0.1:9".to_string(),
        auth_key: "token-123".to_string(),
        ..Default::default()
    };

    let result = client()
        .submit("x", "", "", Attachments::none(), ContentType::QuickNote, &settings)
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("Request"));
}

#[tokio::test]
async fn test_upload_returns_attachment() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/file/upload"))
        .and(header("Authorization", "Bearer token-123"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"shot.png\""))
        .and(body_string_contains("image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "filePath": "/api/file/shot-1.png",
            "fileName": "shot-1.png",
            "size": 8,
            "type": "image/png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uploaded = client()
        .upload_attachment(FileUpload::new("shot.png", PNG.to_vec()), &settings_for(&server))
        .await
        .unwrap();

    assert_eq!(
        uploaded,
        Attachment {
            name: "shot-1.png".to_string(),
            path: "/api/file/shot-1.png".to_string(),
            size: 8,
            mime_type: "image/png".to_string(),
        }
    );
}

#[tokio::test]
async fn test_upload_fills_missing_fields_from_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/file/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"filePath": "/api/file/x"})),
        )
        .mount(&server)
        .await;

    let uploaded = client()
        .upload_attachment(FileUpload::new("shot.png", PNG.to_vec()), &settings_for(&server))
        .await
        .unwrap();

    assert_eq!(uploaded.name, "shot.png");
    assert_eq!(uploaded.size, PNG.len() as u64);
    assert_eq!(uploaded.mime_type, "image/png");
}

#[tokio::test]
async fn test_upload_without_file_path_is_format_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/file/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200})))
        .mount(&server)
        .await;

    let err = client()
        .upload_attachment(FileUpload::new("a.png", PNG.to_vec()), &settings_for(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ResponseFormat(_)));
}

#[tokio::test]
async fn test_upload_reported_failure_status_is_format_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/file/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": 500, "filePath": "/api/file/x"})),
        )
        .mount(&server)
        .await;

    let err = client()
        .upload_attachment(FileUpload::new("a.png", PNG.to_vec()), &settings_for(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ResponseFormat(_)));
}

#[tokio::test]
async fn test_upload_http_error_is_remote_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/file/upload"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let err = client()
        .upload_attachment(FileUpload::new("a.png", PNG.to_vec()), &settings_for(&server))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(413));
}

#[tokio::test]
async fn test_fetch_ai_config_and_apply() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/config/list"))
        .and(header("Authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aiModelProvider": "OpenAI",
            "aiApiEndpoint": "https://llm.example.com/v1",
            "aiApiKey": "sk-remote",
            "aiModel": "gpt-4o",
            "isUseAI": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    let config = client().fetch_ai_config(&settings).await.unwrap();
    settings.apply_ai_config(&config).unwrap();

    assert_eq!(settings.model_url, "https://llm.example.com/v1");
    assert_eq!(settings.api_key, "sk-remote");
    assert_eq!(settings.model_name, "gpt-4o");
}

#[tokio::test]
async fn test_fetch_ai_config_unsupported_provider_is_rejected_on_apply() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/config/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aiModelProvider": "Ollama",
            "aiApiEndpoint": "http://localhost:11434"
        })))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    let config = client().fetch_ai_config(&settings).await.unwrap();
    let err = settings.apply_ai_config(&config).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(settings.model_url.is_empty());
}
