use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use availability_cell::{AvailabilityResolver, AvailabilityStatus};
use shared_api::PortalClient;
use shared_config::PortalConfig;

fn resolver_for(server: &MockServer) -> AvailabilityResolver {
    let client = PortalClient::new(&PortalConfig {
        api_base_url: server.uri(),
        request_timeout_secs: 5,
    });
    AvailabilityResolver::new(Arc::new(client))
}

fn window() -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    let start = Utc.with_ymd_and_hms(2026, 8, 12, 9, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 8, 12, 9, 30, 0).unwrap();
    (start, end)
}

#[tokio::test]
async fn test_conflicts_win_regardless_of_slots() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/availability/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "available": true,
                "available_slots": [{"scheduled_start": "2026-08-12T09:00:00Z"}],
                "conflicts": [{"appointment_id": 7}]
            }
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let (start, end) = window();
    let check = resolver.check_window("tok", 1, None, start, end).await;
    assert!(!check.available);
    assert!(!check.advisory);
}

#[tokio::test]
async fn test_explicitly_empty_slot_list_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/availability/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "available": false, "available_slots": [], "conflicts": [] }
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let (start, end) = window();
    let check = resolver.check_window("tok", 1, None, start, end).await;
    assert!(!check.available);
    assert!(!check.advisory);
}

#[tokio::test]
async fn test_absent_slot_data_is_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/availability/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "available": true }
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let (start, end) = window();
    let check = resolver.check_window("tok", 1, Some(3), start, end).await;
    assert!(check.available);
    assert!(!check.advisory);
}

#[tokio::test]
async fn test_transport_failure_fails_open_with_advisory_tag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/availability/check"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let (start, end) = window();
    let check = resolver.check_window("tok", 1, None, start, end).await;
    assert!(check.available);
    assert!(check.advisory);
    assert_eq!(check.status(), AvailabilityStatus::Unknown);
}

#[tokio::test]
async fn test_non_success_body_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/availability/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "availability backend offline"
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let (start, end) = window();
    let check = resolver.check_window("tok", 1, None, start, end).await;
    assert!(check.available);
    assert!(check.advisory);
}

#[tokio::test]
async fn test_day_with_slots_is_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/availability/slots"))
        .and(query_param("facility_id", "1"))
        .and(query_param("date", "2026-08-12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"scheduled_start": "2026-08-12T09:00:00Z"}]
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let date = NaiveDate::from_ymd_opt(2026, 8, 12).unwrap();
    let status = resolver.check_day("tok", 1, None, date, false).await;
    assert_eq!(status, AvailabilityStatus::Available);
}

#[tokio::test]
async fn test_day_with_empty_slot_list_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/availability/slots"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let date = NaiveDate::from_ymd_opt(2026, 8, 12).unwrap();
    let status = resolver.check_day("tok", 1, None, date, false).await;
    assert_eq!(status, AvailabilityStatus::Unavailable);
}

#[tokio::test]
async fn test_day_query_failure_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/availability/slots"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let date = NaiveDate::from_ymd_opt(2026, 8, 12).unwrap();
    let status = resolver.check_day("tok", 1, None, date, false).await;
    assert_eq!(status, AvailabilityStatus::Unknown);
}

#[tokio::test]
async fn test_local_booking_short_circuits_the_network() {
    let server = MockServer::start().await;
    // Any slot query would be a failure of the local short-circuit.
    Mock::given(method("GET"))
        .and(path("/appointments/availability/slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let date = NaiveDate::from_ymd_opt(2026, 8, 12).unwrap();
    let status = resolver.check_day("tok", 1, None, date, true).await;
    assert_eq!(status, AvailabilityStatus::Available);
}
