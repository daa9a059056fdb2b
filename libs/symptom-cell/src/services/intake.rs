use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_models::auth::{Role, Session};

use crate::models::{Report, SymptomError, SymptomForm, SymptomReport, SymptomSubmission};
use crate::services::classifier::classify_with_keyword;
use crate::services::report::generate_report;
use crate::services::store::ReportStore;

pub struct SymptomIntakeService {
    store: Arc<dyn ReportStore>,
}

impl SymptomIntakeService {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    /// Validates the form, routes it to a domain and stores the symptom
    /// record followed by its report. A symptom record whose report fails to
    /// store is deleted again.
    pub async fn submit(&self, session: &Session, form: SymptomForm) -> Result<SymptomSubmission, SymptomError> {
        debug!("Symptom submission from {}", session.uid);

        if !session.is(Role::Patient) {
            return Err(SymptomError::Forbidden("Only patients can submit symptoms".to_string()));
        }
        validate_form(&form)?;

        let (domain, keyword) = classify_with_keyword(&form.main_symptom, &form.additional_symptoms);
        let now = Utc::now();

        let symptom_report = SymptomReport {
            id: Uuid::new_v4(),
            owner_id: session.uid,
            main_symptom: form.main_symptom.trim().to_string(),
            duration: form.duration,
            severity: form.severity,
            additional_symptoms: form.additional_symptoms,
            medical_history: form.medical_history,
            medications: form.medications,
            allergies: form.allergies,
            consent_given: form.consent_given,
            domain,
            created_at: now,
        };

        let generated = generate_report(&symptom_report.main_symptom, symptom_report.severity);
        let report = Report::from_generated(&symptom_report, generated, now);

        let symptom_report = self
            .store
            .insert_symptom_report(&symptom_report, &session.access_token)
            .await?;
        let report = match self.store.insert_report(&report, &session.access_token).await {
            Ok(report) => report,
            Err(report_error) => {
                error!(
                    "Report for symptom record {} failed to store ({}), removing the record",
                    symptom_report.id, report_error
                );
                if let Err(delete_error) = self
                    .store
                    .delete_symptom_report(symptom_report.id, &session.access_token)
                    .await
                {
                    error!("Symptom record {} left without a report ({})", symptom_report.id, delete_error);
                }
                return Err(report_error.into());
            }
        };

        info!(
            "Symptom report {} routed to {} (keyword: {})",
            symptom_report.id,
            domain,
            keyword.unwrap_or("none")
        );

        Ok(SymptomSubmission {
            next_step: format!("/doctors?domain={}", urlencoding::encode(domain.as_str())),
            symptom_report,
            report,
        })
    }

    pub async fn list_reports(&self, session: &Session) -> Result<Vec<Report>, SymptomError> {
        debug!("Listing reports for {}", session.uid);
        Ok(self.store.reports_for_owner(session.uid, &session.access_token).await?)
    }

    /// Owner or admin only.
    pub async fn get_report(&self, session: &Session, report_id: Uuid) -> Result<Report, SymptomError> {
        let report = self
            .store
            .get_report(report_id, &session.access_token)
            .await?
            .ok_or(SymptomError::ReportNotFound)?;

        if report.owner_id != session.uid && !session.is(Role::Admin) {
            return Err(SymptomError::Forbidden("Not authorized to view this report".to_string()));
        }

        Ok(report)
    }
}

fn validate_form(form: &SymptomForm) -> Result<(), SymptomError> {
    if form.main_symptom.trim().is_empty() {
        return Err(SymptomError::ValidationError("Main symptom is required".to_string()));
    }
    if !form.consent_given {
        return Err(SymptomError::ValidationError(
            "Consent is required before submitting symptoms".to_string(),
        ));
    }
    Ok(())
}
