//! Integration tests for the practice-management billing client.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tallysync_core::BillingSource;
use tallysync_domain::{DateWindow, PracticeConfig, TallySyncError};
use tallysync_infra::{PracticeClient, StaticTokenProvider};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn window() -> DateWindow {
    DateWindow::new(
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    )
    .unwrap()
}

fn client(server: &MockServer) -> PracticeClient {
    let config = PracticeConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        max_retries: 2,
    };
    PracticeClient::new(&config, Arc::new(StaticTokenProvider::new("test-token")))
        .expect("practice client")
}

#[tokio::test]
async fn fetches_records_with_bearer_auth_and_window_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/timecards"))
        .and(query_param("from", "2024-03-01"))
        .and(query_param("to", "2024-03-31"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Records": [
                { "RecordID": "T-1", "ClientName": "Acme", "StartDate": "2024-03-05" }
            ],
            "TotalCount": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).fetch_records(&window()).await.expect("response");
    let records = response.records.expect("records array");
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn rejected_credentials_surface_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/timecards"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client(&server).fetch_records(&window()).await;
    assert!(matches!(result, Err(TallySyncError::Auth(_))));
}

#[tokio::test]
async fn server_errors_are_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/timecards"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2) // max_retries = 2 attempts total
        .mount(&server)
        .await;

    let result = client(&server).fetch_records(&window()).await;
    assert!(matches!(result, Err(TallySyncError::Network(_))));
}

#[tokio::test]
async fn non_json_body_reads_as_empty_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/timecards"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html>maintenance page</html>"),
        )
        .mount(&server)
        .await;

    let response = client(&server).fetch_records(&window()).await.expect("response");
    assert!(response.records.is_none());
}

#[tokio::test]
async fn health_check_reflects_server_state() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(client(&server).check_health().await.expect("health"));
}

#[tokio::test]
async fn health_check_is_false_when_unreachable() {
    let server = MockServer::start().await;
    let unreachable = client(&server);
    drop(server); // shut the server down so the request fails

    assert!(!unreachable.check_health().await.expect("health"));
}
