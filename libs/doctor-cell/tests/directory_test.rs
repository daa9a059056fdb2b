use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::handlers::DoctorState;
use doctor_cell::router::doctor_routes;
use doctor_cell::MemoryDoctorStore;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn memory_app(config: &TestConfig) -> Router {
    doctor_routes(DoctorState::new(config.to_arc(), Arc::new(MemoryDoctorStore::default())))
}

fn bearer(user: &TestUser, config: &TestConfig) -> String {
    format!("Bearer {}", JwtTestUtils::create_test_token(user, &config.jwt_secret, None))
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn request(method: &str, uri: &str, auth: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", auth)
        .header("Content-Type", "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn set_specialty(app: &Router, auth: &str, specialty: &str) {
    let response = app
        .clone()
        .oneshot(request("PUT", "/doctors/me", auth, Some(json!({ "specialty": specialty }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn patients_browse_doctors_by_domain() {
    let config = TestConfig::default();
    let app = memory_app(&config);

    let neuro = TestUser::new("neuro@example.com", "Dr. Brain", shared_models::auth::Role::Doctor);
    let cardio = TestUser::new("cardio@example.com", "Dr. Heart", shared_models::auth::Role::Doctor);
    set_specialty(&app, &bearer(&neuro, &config), "Neurologist").await;
    set_specialty(&app, &bearer(&cardio, &config), "Cardiology").await;

    let patient = bearer(&TestUser::patient("p@example.com"), &config);

    let json = body_json(app.clone().oneshot(request("GET", "/doctors?domain=Neurology", &patient, None)).await.unwrap()).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["doctors"][0]["name"], "Dr. Brain");
    assert_eq!(json["doctors"][0]["specialty"], "Neurology");

    let json = body_json(app.clone().oneshot(request("GET", "/doctors?search=heart", &patient, None)).await.unwrap()).await;
    assert_eq!(json["total"], 1);

    let json = body_json(app.oneshot(request("GET", "/doctors", &patient, None)).await.unwrap()).await;
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn unknown_domain_is_a_bad_request() {
    let config = TestConfig::default();
    let app = memory_app(&config);
    let patient = bearer(&TestUser::patient("p@example.com"), &config);

    let response = app.oneshot(request("GET", "/doctors?domain=Astrology", &patient, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn doctor_profile_starts_with_defaults() {
    let config = TestConfig::default();
    let app = memory_app(&config);
    let doctor = TestUser::doctor("doc@example.com");
    let auth = bearer(&doctor, &config);

    let json = body_json(app.clone().oneshot(request("GET", "/doctors/me", &auth, None)).await.unwrap()).await;
    assert_eq!(json["specialty"], Value::Null);
    assert_eq!(json["experience"], 0);
    assert_eq!(json["accepting_new_patients"], true);
    assert_eq!(json["availability"]["friday"], true);
    assert_eq!(json["availability"]["saturday"], false);
    assert_eq!(json["availability"]["evening_shift"], false);

    let response = app
        .oneshot(request("GET", &format!("/doctors/{}", doctor.id), &auth, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn patients_cannot_edit_doctor_settings() {
    let config = TestConfig::default();
    let app = memory_app(&config);
    let patient = bearer(&TestUser::patient("p@example.com"), &config);

    let response = app
        .oneshot(request("PUT", "/doctors/me", &patient, Some(json!({ "bio": "hi" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_doctor_is_not_found() {
    let config = TestConfig::default();
    let app = memory_app(&config);
    let patient = bearer(&TestUser::patient("p@example.com"), &config);

    let response = app
        .oneshot(request("GET", &format!("/doctors/{}", Uuid::new_v4()), &patient, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn supabase_directory_filters_by_specialty() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase(&mock_server.uri());
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("specialty", "eq.Primary Care"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_profile_response(doctor_id, "Dr. Gray", "General Medicine")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = doctor_routes(DoctorState::from_config(config.to_arc()));
    let patient = bearer(&TestUser::patient("p@example.com"), &config);
    let response = app
        .oneshot(request("GET", "/doctors?domain=Primary%20Care", &patient, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["doctors"][0]["specialty"], "Primary Care");
}
