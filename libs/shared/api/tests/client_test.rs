use assert_matches::assert_matches;
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_api::PortalClient;
use shared_config::PortalConfig;
use shared_models::ApiError;

fn test_client(base_url: &str) -> PortalClient {
    PortalClient::new(&PortalConfig {
        api_base_url: base_url.to_string(),
        request_timeout_secs: 5,
    })
}

#[tokio::test]
async fn test_bearer_token_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result: Vec<serde_json::Value> = client
        .fetch_data(Method::GET, "/appointments", Some("test-token"), None)
        .await
        .expect("request succeeds");
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_envelope_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Facility is closed on that date"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_data::<serde_json::Value>(Method::POST, "/appointments", None, Some(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Facility is closed on that date");
    assert!(err.is_rejection());
}

#[tokio::test]
async fn test_http_400_with_envelope_body_passes_message_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "duration_minutes out of range"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_ack(Method::POST, "/appointments", None, Some(json!({})))
        .await
        .unwrap_err();
    assert_matches!(err, ApiError::Rejected { status: 400, ref message } if message == "duration_minutes out of range");
}

#[tokio::test]
async fn test_404_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such appointment"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .request::<serde_json::Value>(Method::GET, "/appointments/999", None, None)
        .await
        .unwrap_err();
    assert_matches!(err, ApiError::NotFound(_));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    // Nothing is listening on this port.
    let client = test_client("http://127.0.0.1:1");
    let err = client
        .request::<serde_json::Value>(Method::GET, "/appointments", None, None)
        .await
        .unwrap_err();
    assert_matches!(err, ApiError::Transport(_));
}
