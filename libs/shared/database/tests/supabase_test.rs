use assert_matches::assert_matches;
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{header, method, path, query_param};

use shared_database::{StoreError, SupabaseClient};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn client_for(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(&TestConfig::with_supabase(&server.uri()).to_app_config())
}

#[tokio::test]
async fn read_is_retried_once_after_upstream_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reports"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reports"))
        .and(query_param("owner_id", "eq.abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let rows: Vec<Value> = client
        .request(Method::GET, "/rest/v1/reports?owner_id=eq.abc", Some("token"), None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn read_gives_up_after_second_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reports"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result: Result<Vec<Value>, StoreError> = client
        .request(Method::GET, "/rest/v1/reports", Some("token"), None)
        .await;

    assert_matches!(result, Err(StoreError::Unavailable(_)));
}

#[tokio::test]
async fn writes_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result: Result<Vec<Value>, StoreError> = client
        .request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some("token"),
            Some(json!({ "reason": "check-up" })),
            Some(SupabaseClient::representation_headers()),
        )
        .await;

    assert_matches!(result, Err(StoreError::Unavailable(_)));
}

#[tokio::test]
async fn client_errors_are_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(header("apikey", "test-anon-key"))
        .and(header("Authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(401)
            .set_body_json(MockSupabaseResponses::error_response("JWT expired", "PGRST301")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(400)
            .set_body_json(MockSupabaseResponses::error_response("bad filter", "PGRST100")))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let unauthorized: Result<Vec<Value>, StoreError> = client
        .request(Method::GET, "/rest/v1/doctors", Some("token"), None)
        .await;
    assert_matches!(unauthorized, Err(StoreError::Auth(_)));

    let bad_request: Result<Vec<Value>, StoreError> = client
        .request(Method::PATCH, "/rest/v1/doctors", Some("token"), Some(json!({})))
        .await;
    assert_matches!(bad_request, Err(StoreError::Api { status: 400, .. }));
}

#[tokio::test]
async fn conditional_update_sends_filters_and_representation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.42"))
        .and(query_param("status", "eq.pending"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let rows: Vec<Value> = client
        .update("appointments", "id=eq.42&status=eq.pending", "token", json!({ "status": "accepted" }))
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn insert_without_returned_row_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/calendar_queue"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result: Result<Value, StoreError> = client
        .insert("calendar_queue", "token", json!({ "status": "pending" }))
        .await;

    assert_matches!(result, Err(StoreError::Decode(_)));
}
