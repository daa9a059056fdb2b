use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use appointment_cell::{AppointmentService, CreateAppointmentRequest, MemoryAppointmentStore, ScheduleAppointmentRequest};
use dashboard_cell::handlers::DashboardState;
use dashboard_cell::router::dashboard_routes;
use doctor_cell::{DoctorService, MemoryDoctorStore, UpdateDoctorRequest};
use shared_models::Severity;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
use symptom_cell::services::intake::SymptomIntakeService;
use symptom_cell::{MemoryReportStore, SymptomForm};

struct World {
    config: TestConfig,
    appointments: Arc<MemoryAppointmentStore>,
    reports: Arc<MemoryReportStore>,
    doctors: Arc<MemoryDoctorStore>,
}

impl World {
    fn new() -> Self {
        Self {
            config: TestConfig::default(),
            appointments: Arc::new(MemoryAppointmentStore::default()),
            reports: Arc::new(MemoryReportStore::default()),
            doctors: Arc::new(MemoryDoctorStore::default()),
        }
    }

    fn app(&self) -> Router {
        dashboard_routes(DashboardState::new(
            self.config.to_arc(),
            self.appointments.clone(),
            self.reports.clone(),
            self.doctors.clone(),
        ))
    }

    fn appointments(&self) -> AppointmentService {
        AppointmentService::new(self.appointments.clone(), self.reports.clone(), self.doctors.clone())
    }

    async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header(
                "Authorization",
                format!("Bearer {}", JwtTestUtils::create_test_token(user, &self.config.jwt_secret, None)),
            )
            .body(Body::empty())
            .unwrap();

        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn request_for(&self, patient: &TestUser, symptom: &str, doctor: Option<&TestUser>) -> uuid::Uuid {
        let session = patient.session();
        let report = SymptomIntakeService::new(self.reports.clone())
            .submit(
                &session,
                SymptomForm {
                    main_symptom: symptom.to_string(),
                    duration: "3 days".to_string(),
                    severity: Severity::Moderate,
                    additional_symptoms: String::new(),
                    medical_history: String::new(),
                    medications: String::new(),
                    allergies: String::new(),
                    consent_given: true,
                },
            )
            .await
            .unwrap()
            .report;

        self.appointments()
            .request_appointment(
                &session,
                CreateAppointmentRequest {
                    doctor_id: doctor.map(|d| d.id),
                    domain: report.domain,
                    report_id: report.id,
                    reason: String::new(),
                },
            )
            .await
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn dashboards_follow_the_appointment_lifecycle() {
    let world = World::new();
    let patient = TestUser::patient("patient@example.com");
    let doctor = TestUser::doctor("doctor@example.com");
    let admin = TestUser::admin("admin@example.com");

    DoctorService::new(world.doctors.clone())
        .update_profile(
            &doctor.session(),
            UpdateDoctorRequest {
                specialty: Some("Neurology".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let first = world.request_for(&patient, "headache", None).await;
    let second = world.request_for(&patient, "migraine", Some(&doctor)).await;

    let (status, view) = world.get("/dashboard/doctor", &doctor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["stats"]["pending_requests"], 2);
    assert_eq!(view["stats"]["pending_reports"], 2);
    assert_eq!(view["stats"]["unique_patients"], 1);

    let service = world.appointments();
    service.accept(&doctor.session(), first).await.unwrap();
    service.reject(&doctor.session(), second).await.unwrap();
    service
        .schedule(
            &admin.session(),
            first,
            ScheduleAppointmentRequest {
                scheduled_date: Utc::now() + Duration::days(2),
                scheduled_time: "09:30 AM".to_string(),
            },
        )
        .await
        .unwrap();

    let (_, view) = world.get("/dashboard/doctor", &doctor).await;
    assert_eq!(view["stats"]["pending_requests"], 0);
    assert_eq!(view["upcoming_appointments"].as_array().unwrap().len(), 1);

    let (status, view) = world.get("/dashboard/patient", &patient).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["counts"]["upcoming"], 1);
    assert_eq!(view["counts"]["pending"], 0);
    assert_eq!(view["counts"]["past"], 1);
    assert_eq!(view["counts"]["reports"], 2);
    assert_eq!(view["recent_reports"].as_array().unwrap().len(), 2);

    let (status, roster) = world.get("/dashboard/doctor/patients", &doctor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster["total"], 1);
    assert_eq!(roster["patients"][0]["patient_name"], "Test Patient");
    assert_eq!(roster["patients"][0]["appointment_count"], 1);
    assert!(roster["patients"][0]["next_appointment"].is_string());
}

#[tokio::test]
async fn doctor_without_specialty_sees_only_direct_requests() {
    let world = World::new();
    let patient = TestUser::patient("patient@example.com");
    let doctor = TestUser::doctor("new@example.com");

    world.request_for(&patient, "rash", None).await;
    world.request_for(&patient, "acne", Some(&doctor)).await;

    let (status, view) = world.get("/dashboard/doctor", &doctor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["stats"]["pending_requests"], 1);
}

#[tokio::test]
async fn dashboards_are_role_specific() {
    let world = World::new();
    let patient = TestUser::patient("patient@example.com");
    let doctor = TestUser::doctor("doctor@example.com");

    assert_eq!(world.get("/dashboard/doctor", &patient).await.0, StatusCode::FORBIDDEN);
    assert_eq!(world.get("/dashboard/doctor/patients", &patient).await.0, StatusCode::FORBIDDEN);
    assert_eq!(world.get("/dashboard/patient", &doctor).await.0, StatusCode::FORBIDDEN);

    let (status, view) = world.get("/dashboard/patient", &patient).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["counts"]["reports"], 0);
}
