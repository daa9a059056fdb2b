use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::DoctorStore;
use shared_models::auth::{Role, Session};
use shared_models::Domain;
use symptom_cell::{Report, ReportStore};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, CalendarQueueEntry,
    CreateAppointmentRequest, DoctorAssignment, ScheduleAppointmentRequest,
};
use crate::services::calendar_queue::missing_entries;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::queries::merge_pending_requests;
use crate::services::store::AppointmentStore;

const UNKNOWN_DOCTOR: &str = "Doctor";
const UNKNOWN_PATIENT: &str = "Patient";

pub struct AppointmentService {
    appointments: Arc<dyn AppointmentStore>,
    reports: Arc<dyn ReportStore>,
    doctors: Arc<dyn DoctorStore>,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        reports: Arc<dyn ReportStore>,
        doctors: Arc<dyn DoctorStore>,
    ) -> Self {
        Self {
            appointments,
            reports,
            doctors,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    // ==========================================================================
    // PATIENT REQUESTS
    // ==========================================================================

    /// Creates a pending request, either addressed to one doctor or left in
    /// the domain queue when no doctor is given.
    pub async fn request_appointment(
        &self,
        session: &Session,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Appointment request from {} for report {}", session.uid, request.report_id);

        if !session.is(Role::Patient) {
            return Err(AppointmentError::Forbidden("Only patients can request appointments".to_string()));
        }

        let report = self
            .reports
            .get_report(request.report_id, &session.access_token)
            .await?
            .ok_or_else(|| AppointmentError::InvalidReference(format!("Report {} does not exist", request.report_id)))?;

        if report.owner_id != session.uid {
            return Err(AppointmentError::InvalidReference(format!(
                "Report {} does not belong to the requesting patient",
                report.id
            )));
        }
        if report.domain != request.domain {
            return Err(AppointmentError::InvalidReference(format!(
                "Report {} is in {}, not {}",
                report.id, report.domain, request.domain
            )));
        }

        let assignment = match request.doctor_id {
            Some(doctor_id) => Some(
                self.doctor_assignment(doctor_id, &session.access_token)
                    .await
                    .unwrap_or_else(|| placeholder_assignment(doctor_id)),
            ),
            None => None,
        };

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: session.uid,
            patient_name: session.display_name.clone().unwrap_or_else(|| UNKNOWN_PATIENT.to_string()),
            patient_email: session.email.clone(),
            doctor_id: assignment.as_ref().map(|a| a.doctor_id),
            doctor_name: assignment.as_ref().and_then(|a| a.doctor_name.clone()),
            doctor_specialty: assignment.as_ref().and_then(|a| a.doctor_specialty.clone()),
            domain: request.domain,
            report_id: request.report_id,
            reason: request.reason,
            status: AppointmentStatus::Pending,
            scheduled_date: None,
            scheduled_time: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.appointments.insert(&appointment, &session.access_token).await?;
        info!(
            "Appointment {} created ({})",
            stored.id,
            match stored.doctor_id {
                Some(doctor_id) => format!("direct request to {}", doctor_id),
                None => format!("{} domain queue", stored.domain),
            }
        );
        Ok(stored)
    }

    pub async fn for_patient(&self, session: &Session) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.appointments.list_for_patient(session.uid, &session.access_token).await?)
    }

    // ==========================================================================
    // DOCTOR ACTIONS
    // ==========================================================================

    pub async fn accept(&self, session: &Session, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Doctor {} accepting appointment {}", session.uid, appointment_id);
        require_doctor(session)?;

        let observed = self.load(appointment_id, &session.access_token).await?;
        self.lifecycle
            .validate_doctor_action(&observed, session.uid, &AppointmentStatus::Accepted)?;

        let doctor = self
            .doctor_assignment(session.uid, &session.access_token)
            .await
            .unwrap_or_else(|| assignment_on_record(&observed, session.uid));
        let now = Utc::now();
        let entry = CalendarQueueEntry::for_acceptance(&observed, session.uid, now);

        match self
            .appointments
            .accept_with_queue(&observed, &doctor, &entry, now, &session.access_token)
            .await?
        {
            Some(accepted) => {
                info!("Appointment {} accepted by {}", accepted.id, session.uid);
                Ok(accepted)
            }
            None => Err(self.lost_race(appointment_id, session).await),
        }
    }

    pub async fn reject(&self, session: &Session, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Doctor {} rejecting appointment {}", session.uid, appointment_id);
        require_doctor(session)?;

        let observed = self.load(appointment_id, &session.access_token).await?;
        self.lifecycle
            .validate_doctor_action(&observed, session.uid, &AppointmentStatus::Rejected)?;

        let doctor = DoctorAssignment {
            doctor_id: session.uid,
            doctor_name: None,
            doctor_specialty: None,
        };

        match self
            .appointments
            .reject(&observed, &doctor, Utc::now(), &session.access_token)
            .await?
        {
            Some(rejected) => {
                info!("Appointment {} rejected by {}", rejected.id, session.uid);
                Ok(rejected)
            }
            None => Err(self.lost_race(appointment_id, session).await),
        }
    }

    /// Appointments assigned to the calling doctor, in any status.
    pub async fn mine(&self, session: &Session) -> Result<Vec<Appointment>, AppointmentError> {
        require_doctor(session)?;
        Ok(self.appointments.list_for_doctor(session.uid, &session.access_token).await?)
    }

    /// Unclaimed pending requests in the calling doctor's specialty. Empty
    /// until the doctor has set one.
    pub async fn domain_pending(&self, session: &Session) -> Result<Vec<Appointment>, AppointmentError> {
        require_doctor(session)?;

        match self.doctor_specialty(session).await? {
            Some(domain) => Ok(self.appointments.list_domain_pending(domain, &session.access_token).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn pending_for_doctor(&self, session: &Session) -> Result<Vec<Appointment>, AppointmentError> {
        let (mine, domain_pending) = futures::try_join!(self.mine(session), self.domain_pending(session))?;
        Ok(merge_pending_requests(mine, domain_pending))
    }

    /// Enqueues any accepted appointment of the calling doctor that lost its
    /// calendar queue entry.
    pub async fn reconcile_calendar_queue(&self, session: &Session) -> Result<Vec<CalendarQueueEntry>, AppointmentError> {
        require_doctor(session)?;

        let (appointments, queue) = futures::try_join!(
            self.appointments.list_for_doctor(session.uid, &session.access_token),
            self.appointments.queue_for_doctor(session.uid, &session.access_token),
        )?;

        let owed = missing_entries(&appointments, &queue, Utc::now());
        let mut created = Vec::with_capacity(owed.len());
        for entry in owed {
            warn!("Appointment {} was accepted without a queue entry, enqueuing", entry.appointment_id);
            created.push(self.appointments.insert_queue_entry(&entry, &session.access_token).await?);
        }

        Ok(created)
    }

    // ==========================================================================
    // SHARED ACCESS
    // ==========================================================================

    pub async fn get_appointment(&self, session: &Session, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self.load(appointment_id, &session.access_token).await?;

        let visible = match session.role {
            Role::Admin => true,
            Role::Patient => appointment.patient_id == session.uid,
            Role::Doctor => {
                appointment.is_assigned_to(session.uid)
                    || (appointment.is_domain_pending()
                        && self.doctor_specialty(session).await? == Some(appointment.domain))
            }
        };

        if !visible {
            return Err(AppointmentError::Forbidden("Not authorized to view this appointment".to_string()));
        }
        Ok(appointment)
    }

    /// The report behind an appointment, for anyone who may see the appointment.
    pub async fn appointment_report(&self, session: &Session, appointment_id: Uuid) -> Result<Report, AppointmentError> {
        let appointment = self.get_appointment(session, appointment_id).await?;

        self.reports
            .get_report(appointment.report_id, &session.access_token)
            .await?
            .ok_or_else(|| AppointmentError::InvalidReference(format!("Report {} no longer exists", appointment.report_id)))
    }

    /// Write-back from the scheduling side: admin or the assigned doctor.
    pub async fn schedule(
        &self,
        session: &Session,
        appointment_id: Uuid,
        request: ScheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if request.scheduled_time.trim().is_empty() {
            return Err(AppointmentError::ValidationError("Scheduled time is required".to_string()));
        }

        let observed = self.load(appointment_id, &session.access_token).await?;
        match session.role {
            Role::Admin => {}
            Role::Doctor if observed.is_assigned_to(session.uid) => {}
            Role::Doctor => return Err(AppointmentError::Unauthorized),
            Role::Patient => {
                return Err(AppointmentError::Forbidden("Patients cannot schedule appointments".to_string()))
            }
        }
        if observed.status != AppointmentStatus::Accepted {
            return Err(AppointmentError::InvalidStatusTransition(observed.status));
        }

        match self
            .appointments
            .schedule(
                appointment_id,
                request.scheduled_date,
                request.scheduled_time.trim(),
                Utc::now(),
                &session.access_token,
            )
            .await?
        {
            Some(scheduled) => {
                info!("Appointment {} scheduled for {}", scheduled.id, request.scheduled_date);
                Ok(scheduled)
            }
            None => Err(self.lost_race(appointment_id, session).await),
        }
    }

    // ==========================================================================
    // HELPERS
    // ==========================================================================

    async fn load(&self, appointment_id: Uuid, auth_token: &str) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get(appointment_id, auth_token)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Explains a conditional write that matched nothing by re-reading the
    /// record.
    async fn lost_race(&self, appointment_id: Uuid, session: &Session) -> AppointmentError {
        match self.appointments.get(appointment_id, &session.access_token).await {
            Ok(None) => AppointmentError::NotFound,
            Ok(Some(current)) if current.status == AppointmentStatus::Pending => {
                match self.lifecycle.validate_doctor_claim(&current, session.uid) {
                    Err(e) => e,
                    Ok(()) => AppointmentError::InvalidStatusTransition(current.status),
                }
            }
            Ok(Some(current)) => AppointmentError::InvalidStatusTransition(current.status),
            Err(e) => e.into(),
        }
    }

    async fn doctor_specialty(&self, session: &Session) -> Result<Option<Domain>, AppointmentError> {
        Ok(self
            .doctors
            .get(session.uid, &session.access_token)
            .await?
            .and_then(|profile| profile.specialty))
    }

    /// Display details for a doctor, or `None` when the profile cannot be
    /// read. Callers pick the fallback.
    async fn doctor_assignment(&self, doctor_id: Uuid, auth_token: &str) -> Option<DoctorAssignment> {
        match self.doctors.get(doctor_id, auth_token).await {
            Ok(Some(profile)) => Some(DoctorAssignment {
                doctor_id,
                doctor_name: Some(profile.display_name()),
                doctor_specialty: profile.specialty.map(|s| s.to_string()),
            }),
            Ok(None) => {
                warn!("No profile for doctor {}", doctor_id);
                None
            }
            Err(e) => {
                warn!("Doctor lookup for {} failed ({})", doctor_id, e);
                None
            }
        }
    }
}

/// Keeps the details copied at request time when the accepting doctor is the
/// one the request was addressed to.
fn assignment_on_record(observed: &Appointment, doctor_id: Uuid) -> DoctorAssignment {
    if observed.is_assigned_to(doctor_id) && observed.doctor_name.is_some() {
        DoctorAssignment {
            doctor_id,
            doctor_name: observed.doctor_name.clone(),
            doctor_specialty: observed.doctor_specialty.clone(),
        }
    } else {
        placeholder_assignment(doctor_id)
    }
}

fn placeholder_assignment(doctor_id: Uuid) -> DoctorAssignment {
    DoctorAssignment {
        doctor_id,
        doctor_name: Some(UNKNOWN_DOCTOR.to_string()),
        doctor_specialty: None,
    }
}

fn require_doctor(session: &Session) -> Result<(), AppointmentError> {
    if session.is(Role::Doctor) {
        Ok(())
    } else {
        Err(AppointmentError::Forbidden("This action requires the doctor role".to_string()))
    }
}
