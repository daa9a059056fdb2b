use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use appointment_cell::{AppointmentService, AppointmentStore};
use doctor_cell::DoctorStore;
use shared_models::auth::{Role, Session};
use symptom_cell::ReportStore;

use crate::models::{DashboardError, DoctorDashboard, PatientDashboard, PatientSummary};
use crate::services::aggregate;

/// Loads the per-caller data sets and hands them to the aggregate
/// functions. Nothing is cached; every call reflects the stores.
pub struct DashboardService {
    appointments: AppointmentService,
    reports: Arc<dyn ReportStore>,
}

impl DashboardService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        reports: Arc<dyn ReportStore>,
        doctors: Arc<dyn DoctorStore>,
    ) -> Self {
        Self {
            appointments: AppointmentService::new(appointments, reports.clone(), doctors),
            reports,
        }
    }

    pub async fn patient_dashboard(&self, session: &Session) -> Result<PatientDashboard, DashboardError> {
        debug!("Building patient dashboard for {}", session.uid);
        require_role(session, Role::Patient)?;

        let (appointments, reports) = futures::try_join!(
            async { self.appointments.for_patient(session).await.map_err(DashboardError::from) },
            async {
                self.reports
                    .reports_for_owner(session.uid, &session.access_token)
                    .await
                    .map_err(DashboardError::from)
            },
        )?;

        Ok(aggregate::patient_dashboard(appointments, reports))
    }

    pub async fn doctor_dashboard(&self, session: &Session, now: DateTime<Utc>) -> Result<DoctorDashboard, DashboardError> {
        debug!("Building doctor dashboard for {}", session.uid);
        require_role(session, Role::Doctor)?;

        let (mine, domain_pending) = futures::try_join!(
            self.appointments.mine(session),
            self.appointments.domain_pending(session),
        )?;

        Ok(aggregate::doctor_dashboard(session.uid, mine, domain_pending, now))
    }

    pub async fn patient_roster(&self, session: &Session, now: DateTime<Utc>) -> Result<Vec<PatientSummary>, DashboardError> {
        require_role(session, Role::Doctor)?;

        let mine = self.appointments.mine(session).await?;
        Ok(aggregate::patient_roster(&mine, now))
    }
}

fn require_role(session: &Session, role: Role) -> Result<(), DashboardError> {
    if session.is(role) {
        Ok(())
    } else {
        Err(DashboardError::Forbidden(format!("This dashboard requires the {} role", role)))
    }
}
