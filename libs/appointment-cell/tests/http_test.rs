use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::handlers::AppointmentState;
use appointment_cell::router::appointment_routes;
use appointment_cell::MemoryAppointmentStore;
use doctor_cell::MemoryDoctorStore;
use shared_models::Severity;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
use symptom_cell::services::intake::SymptomIntakeService;
use symptom_cell::{MemoryReportStore, Report, SymptomForm};

struct Harness {
    config: TestConfig,
    app: Router,
    reports: Arc<MemoryReportStore>,
}

impl Harness {
    fn new() -> Self {
        let config = TestConfig::default();
        let reports = Arc::new(MemoryReportStore::default());
        let state = AppointmentState::new(
            config.to_arc(),
            Arc::new(MemoryAppointmentStore::default()),
            reports.clone(),
            Arc::new(MemoryDoctorStore::default()),
        );

        Self {
            app: appointment_routes(state),
            config,
            reports,
        }
    }

    async fn report_for(&self, patient: &TestUser) -> Report {
        SymptomIntakeService::new(self.reports.clone())
            .submit(
                &patient.session(),
                SymptomForm {
                    main_symptom: "heart palpitations".to_string(),
                    duration: "2 days".to_string(),
                    severity: Severity::Mild,
                    additional_symptoms: String::new(),
                    medical_history: String::new(),
                    medications: String::new(),
                    allergies: String::new(),
                    consent_given: true,
                },
            )
            .await
            .unwrap()
            .report
    }

    async fn send(&self, method: &str, uri: &str, user: Option<&TestUser>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(
                "Authorization",
                format!("Bearer {}", JwtTestUtils::create_test_token(user, &self.config.jwt_secret, None)),
            );
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

#[tokio::test]
async fn direct_request_flow() {
    let harness = Harness::new();
    let patient = TestUser::patient("patient@example.com");
    let doctor = TestUser::doctor("doctor@example.com");
    let other = TestUser::doctor("other@example.com");
    let report = harness.report_for(&patient).await;

    let (status, created) = harness
        .send(
            "POST",
            "/appointments",
            Some(&patient),
            Some(json!({
                "doctor_id": doctor.id,
                "domain": "Cardiology",
                "report_id": report.id,
                "reason": "Racing heart at night"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["appointment"]["status"], "pending");
    let id = created["appointment"]["id"].as_str().unwrap().to_string();

    let (status, _) = harness.send("POST", &format!("/appointments/{}/accept", id), Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, accepted) = harness.send("POST", &format!("/appointments/{}/accept", id), Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["appointment"]["status"], "accepted");

    let (status, _) = harness.send("POST", &format!("/appointments/{}/reject", id), Some(&doctor), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) = harness.send("GET", "/appointments", Some(&patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn report_behind_appointment_is_readable_by_its_doctor() {
    let harness = Harness::new();
    let patient = TestUser::patient("patient@example.com");
    let doctor = TestUser::doctor("doctor@example.com");
    let report = harness.report_for(&patient).await;

    let (_, created) = harness
        .send(
            "POST",
            "/appointments",
            Some(&patient),
            Some(json!({ "doctor_id": doctor.id, "domain": "Cardiology", "report_id": report.id })),
        )
        .await;
    let id = created["appointment"]["id"].as_str().unwrap().to_string();

    let (status, body) = harness.send("GET", &format!("/appointments/{}/report", id), Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(report.id));
    assert_eq!(body["urgency"], "Low");
}

#[tokio::test]
async fn roles_are_enforced_per_route() {
    let harness = Harness::new();
    let patient = TestUser::patient("patient@example.com");
    let doctor = TestUser::doctor("doctor@example.com");

    let (status, _) = harness.send("GET", "/appointments/pending", Some(&patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = harness.send("GET", "/appointments", Some(&doctor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = harness.send("GET", "/appointments/pending", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = harness.send("GET", "/appointments/pending", Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn foreign_report_is_an_invalid_reference() {
    let harness = Harness::new();
    let owner = TestUser::patient("owner@example.com");
    let intruder = TestUser::patient("intruder@example.com");
    let report = harness.report_for(&owner).await;

    let (status, _) = harness
        .send(
            "POST",
            "/appointments",
            Some(&intruder),
            Some(json!({ "domain": "Cardiology", "report_id": report.id })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
