use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::build_appointment_store;
use appointment_cell::handlers::AppointmentState;
use appointment_cell::router::appointment_routes;
use auth_cell::build_user_store;
use auth_cell::handlers::AuthState;
use auth_cell::router::auth_routes;
use dashboard_cell::handlers::DashboardState;
use dashboard_cell::router::dashboard_routes;
use doctor_cell::build_doctor_store;
use doctor_cell::handlers::DoctorState;
use doctor_cell::router::doctor_routes;
use shared_config::AppConfig;
use symptom_cell::build_report_store;
use symptom_cell::handlers::SymptomState;
use symptom_cell::router::symptom_routes;

/// Builds every store once so all cells share the same backend instances.
pub fn create_router(config: Arc<AppConfig>) -> Router {
    let reports = build_report_store(&config);
    let doctors = build_doctor_store(&config);
    let appointments = build_appointment_store(&config);
    let users = build_user_store(&config);

    Router::new()
        .route("/", get(|| async { "Latros Care API is running!" }))
        .merge(auth_routes(AuthState::new(config.clone(), users, doctors.clone())))
        .merge(symptom_routes(SymptomState::new(config.clone(), reports.clone())))
        .merge(doctor_routes(DoctorState::new(config.clone(), doctors.clone())))
        .merge(appointment_routes(AppointmentState::new(
            config.clone(),
            appointments.clone(),
            reports.clone(),
            doctors.clone(),
        )))
        .merge(dashboard_routes(DashboardState::new(config, appointments, reports, doctors)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
    use tower::ServiceExt;

    struct Client {
        app: Router,
        config: TestConfig,
    }

    impl Client {
        async fn call(&self, method: &str, uri: &str, user: &TestUser, body: Option<Value>) -> (StatusCode, Value) {
            let token = JwtTestUtils::create_test_token(user, &self.config.jwt_secret, None);
            let builder = Request::builder()
                .method(method)
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json");
            let request = builder
                .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
                .unwrap();

            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }
    }

    #[tokio::test]
    async fn symptom_to_dashboard_flow() {
        let config = TestConfig::default();
        let client = Client {
            app: create_router(config.to_arc()),
            config,
        };
        let patient = TestUser::patient("patient@example.com");
        let doctor = TestUser::doctor("doctor@example.com");

        let (status, _) = client
            .call("POST", "/auth/register", &doctor, Some(json!({ "display_name": "Dr. Rivera", "role": "doctor" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = client
            .call("PUT", "/doctors/me", &doctor, Some(json!({ "specialty": "Neurologist" })))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, submission) = client
            .call(
                "POST",
                "/symptoms",
                &patient,
                Some(json!({
                    "main_symptom": "Persistent headache",
                    "duration": "4 days",
                    "severity": "moderate",
                    "additional_symptoms": "sensitivity to light",
                    "consent_given": true
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(submission["report"]["domain"], "Neurology");

        let (_, listing) = client.call("GET", "/doctors?domain=Neurology", &patient, None).await;
        assert_eq!(listing["total"], 1);

        let (status, created) = client
            .call(
                "POST",
                "/appointments",
                &patient,
                Some(json!({
                    "domain": "Neurology",
                    "report_id": submission["report"]["id"],
                    "reason": ""
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["appointment"]["id"].as_str().unwrap().to_string();

        let (_, dashboard) = client.call("GET", "/dashboard/doctor", &doctor, None).await;
        assert_eq!(dashboard["stats"]["pending_requests"], 1);

        let (status, accepted) = client
            .call("POST", &format!("/appointments/{}/accept", id), &doctor, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(accepted["appointment"]["doctor_name"], "Dr. Rivera");

        let (_, dashboard) = client.call("GET", "/dashboard/doctor", &doctor, None).await;
        assert_eq!(dashboard["stats"]["pending_requests"], 0);
        assert_eq!(dashboard["stats"]["unique_patients"], 1);

        let (_, dashboard) = client.call("GET", "/dashboard/patient", &patient, None).await;
        assert_eq!(dashboard["counts"]["pending"], 0);
        assert_eq!(dashboard["counts"]["reports"], 1);
    }
}
