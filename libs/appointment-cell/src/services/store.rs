use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::{AppConfig, DataBackend};
use shared_database::{StoreError, SupabaseClient};
use shared_models::Domain;

use crate::models::{
    Appointment, AppointmentStatus, CalendarQueueEntry, DoctorAssignment, QueueStatus,
};

/// Appointment and calendar queue persistence.
///
/// The conditional writes (`accept_with_queue`, `reject`, `schedule`) return
/// `Ok(None)` when the stored record no longer matches the `observed` one
/// the caller decided on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: &Appointment, auth_token: &str) -> Result<Appointment, StoreError>;

    async fn get(&self, appointment_id: Uuid, auth_token: &str) -> Result<Option<Appointment>, StoreError>;

    /// Appointments assigned to `doctor_id`, newest first.
    async fn list_for_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Vec<Appointment>, StoreError>;

    /// Unassigned pending appointments of `domain`, newest first.
    async fn list_domain_pending(&self, domain: Domain, auth_token: &str) -> Result<Vec<Appointment>, StoreError>;

    /// Appointments requested by `patient_id`, newest first.
    async fn list_for_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Vec<Appointment>, StoreError>;

    /// Marks the appointment accepted by `doctor` and records its queue entry
    /// as one logical write.
    async fn accept_with_queue(
        &self,
        observed: &Appointment,
        doctor: &DoctorAssignment,
        entry: &CalendarQueueEntry,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError>;

    async fn reject(
        &self,
        observed: &Appointment,
        doctor: &DoctorAssignment,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError>;

    /// Records the slot on an accepted appointment and marks its queue entry
    /// scheduled. Only the appointment write decides the outcome.
    async fn schedule(
        &self,
        appointment_id: Uuid,
        scheduled_date: DateTime<Utc>,
        scheduled_time: &str,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError>;

    async fn queue_for_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Vec<CalendarQueueEntry>, StoreError>;

    async fn insert_queue_entry(&self, entry: &CalendarQueueEntry, auth_token: &str) -> Result<CalendarQueueEntry, StoreError>;
}

pub fn build_appointment_store(config: &AppConfig) -> Arc<dyn AppointmentStore> {
    match config.data_backend {
        DataBackend::Supabase => Arc::new(SupabaseAppointmentStore::new(config)),
        DataBackend::Memory => Arc::new(MemoryAppointmentStore::default()),
    }
}

// ==============================================================================
// SUPABASE
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// PostgREST filter matching `observed` only while it is still pending
    /// with the same assignment.
    fn pending_precondition(observed: &Appointment) -> String {
        match observed.doctor_id {
            Some(doctor_id) => format!("id=eq.{}&status=eq.pending&doctor_id=eq.{}", observed.id, doctor_id),
            None => format!("id=eq.{}&status=eq.pending&doctor_id=is.null", observed.id),
        }
    }

    async fn list(&self, filters: &str, auth_token: &str) -> Result<Vec<Appointment>, StoreError> {
        let path = format!("/rest/v1/appointments?{}&order=created_at.desc", filters);
        self.supabase.request(Method::GET, &path, Some(auth_token), None).await
    }

    /// Puts an appointment accepted by `doctor_id` back to how `observed` had it.
    async fn revert_acceptance(&self, observed: &Appointment, doctor_id: Uuid, auth_token: &str) -> Result<(), StoreError> {
        let filters = format!("id=eq.{}&status=eq.accepted&doctor_id=eq.{}", observed.id, doctor_id);
        let reverted: Vec<Appointment> = self
            .supabase
            .update(
                "appointments",
                &filters,
                auth_token,
                json!({
                    "status": AppointmentStatus::Pending,
                    "doctor_id": observed.doctor_id,
                    "doctor_name": observed.doctor_name,
                    "doctor_specialty": observed.doctor_specialty,
                    "updated_at": observed.updated_at,
                }),
            )
            .await?;

        if reverted.is_empty() {
            warn!("Revert of appointment {} matched no row", observed.id);
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn insert(&self, appointment: &Appointment, auth_token: &str) -> Result<Appointment, StoreError> {
        debug!("Creating appointment {} in domain {}", appointment.id, appointment.domain);
        self.supabase.insert("appointments", auth_token, json!(appointment)).await
    }

    async fn get(&self, appointment_id: Uuid, auth_token: &str) -> Result<Option<Appointment>, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_for_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Vec<Appointment>, StoreError> {
        self.list(&format!("doctor_id=eq.{}", doctor_id), auth_token).await
    }

    async fn list_domain_pending(&self, domain: Domain, auth_token: &str) -> Result<Vec<Appointment>, StoreError> {
        let filters = format!(
            "domain=eq.{}&status=eq.pending&doctor_id=is.null",
            urlencoding::encode(domain.as_str())
        );
        self.list(&filters, auth_token).await
    }

    async fn list_for_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Vec<Appointment>, StoreError> {
        self.list(&format!("patient_id=eq.{}", patient_id), auth_token).await
    }

    async fn accept_with_queue(
        &self,
        observed: &Appointment,
        doctor: &DoctorAssignment,
        entry: &CalendarQueueEntry,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError> {
        let updated: Vec<Appointment> = self
            .supabase
            .update(
                "appointments",
                &Self::pending_precondition(observed),
                auth_token,
                json!({
                    "status": AppointmentStatus::Accepted,
                    "doctor_id": doctor.doctor_id,
                    "doctor_name": doctor.doctor_name,
                    "doctor_specialty": doctor.doctor_specialty,
                    "updated_at": now,
                }),
            )
            .await?;

        let Some(accepted) = updated.into_iter().next() else {
            return Ok(None);
        };

        if let Err(queue_error) = self.insert_queue_entry(entry, auth_token).await {
            error!(
                "Queue write for appointment {} failed ({}), reverting acceptance",
                accepted.id, queue_error
            );
            if let Err(revert_error) = self.revert_acceptance(observed, doctor.doctor_id, auth_token).await {
                error!(
                    "Revert of appointment {} failed ({}); left accepted without a queue entry until reconciled",
                    accepted.id, revert_error
                );
            }
            return Err(queue_error);
        }

        Ok(Some(accepted))
    }

    async fn reject(
        &self,
        observed: &Appointment,
        doctor: &DoctorAssignment,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError> {
        let updated: Vec<Appointment> = self
            .supabase
            .update(
                "appointments",
                &Self::pending_precondition(observed),
                auth_token,
                json!({
                    "status": AppointmentStatus::Rejected,
                    "doctor_id": doctor.doctor_id,
                    "updated_at": now,
                }),
            )
            .await?;

        Ok(updated.into_iter().next())
    }

    async fn schedule(
        &self,
        appointment_id: Uuid,
        scheduled_date: DateTime<Utc>,
        scheduled_time: &str,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError> {
        let filters = format!("id=eq.{}&status=eq.accepted", appointment_id);
        let updated: Vec<Appointment> = self
            .supabase
            .update(
                "appointments",
                &filters,
                auth_token,
                json!({
                    "scheduled_date": scheduled_date,
                    "scheduled_time": scheduled_time,
                    "updated_at": now,
                }),
            )
            .await?;

        let Some(scheduled) = updated.into_iter().next() else {
            return Ok(None);
        };

        // Best effort once the slot is stored
        let queue_filters = format!("appointment_id=eq.{}", appointment_id);
        match self
            .supabase
            .update::<CalendarQueueEntry>("calendar_queue", &queue_filters, auth_token, json!({ "status": QueueStatus::Scheduled }))
            .await
        {
            Ok(entries) if entries.is_empty() => {
                warn!("Appointment {} scheduled without a calendar queue entry", appointment_id);
            }
            Ok(_) => {}
            Err(e) => {
                error!(
                    "Appointment {} scheduled but its queue entry was not marked ({})",
                    appointment_id, e
                );
            }
        }

        Ok(Some(scheduled))
    }

    async fn queue_for_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Vec<CalendarQueueEntry>, StoreError> {
        let path = format!("/rest/v1/calendar_queue?doctor_id=eq.{}&order=created_at.desc", doctor_id);
        self.supabase.request(Method::GET, &path, Some(auth_token), None).await
    }

    async fn insert_queue_entry(&self, entry: &CalendarQueueEntry, auth_token: &str) -> Result<CalendarQueueEntry, StoreError> {
        let stored: CalendarQueueEntry = self.supabase.insert("calendar_queue", auth_token, json!(entry)).await?;
        info!("Queued appointment {} for scheduling", stored.appointment_id);
        Ok(stored)
    }
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

#[derive(Default)]
struct Tables {
    appointments: Vec<Appointment>,
    calendar_queue: Vec<CalendarQueueEntry>,
}

/// Both collections sit behind one lock, so every conditional write and its
/// queue side effect land together.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    tables: Mutex<Tables>,
}

impl MemoryAppointmentStore {
    pub async fn calendar_queue(&self) -> Vec<CalendarQueueEntry> {
        self.tables.lock().await.calendar_queue.clone()
    }

    /// Drops the queue entry of an appointment, as a lost write would.
    pub async fn remove_queue_entry(&self, appointment_id: Uuid) {
        self.tables
            .lock()
            .await
            .calendar_queue
            .retain(|entry| entry.appointment_id != appointment_id);
    }

    fn newest_first(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        appointments
    }

    fn matches_observed(stored: &Appointment, observed: &Appointment) -> bool {
        stored.status == AppointmentStatus::Pending && stored.doctor_id == observed.doctor_id
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn insert(&self, appointment: &Appointment, _auth_token: &str) -> Result<Appointment, StoreError> {
        self.tables.lock().await.appointments.push(appointment.clone());
        Ok(appointment.clone())
    }

    async fn get(&self, appointment_id: Uuid, _auth_token: &str) -> Result<Option<Appointment>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .cloned())
    }

    async fn list_for_doctor(&self, doctor_id: Uuid, _auth_token: &str) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(Self::newest_first(
            tables.appointments.iter().filter(|a| a.is_assigned_to(doctor_id)).cloned().collect(),
        ))
    }

    async fn list_domain_pending(&self, domain: Domain, _auth_token: &str) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(Self::newest_first(
            tables
                .appointments
                .iter()
                .filter(|a| a.domain == domain && a.is_domain_pending())
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_patient(&self, patient_id: Uuid, _auth_token: &str) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(Self::newest_first(
            tables.appointments.iter().filter(|a| a.patient_id == patient_id).cloned().collect(),
        ))
    }

    async fn accept_with_queue(
        &self,
        observed: &Appointment,
        doctor: &DoctorAssignment,
        entry: &CalendarQueueEntry,
        now: DateTime<Utc>,
        _auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError> {
        let mut tables = self.tables.lock().await;

        let Some(stored) = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == observed.id && Self::matches_observed(a, observed))
        else {
            return Ok(None);
        };

        stored.status = AppointmentStatus::Accepted;
        stored.doctor_id = Some(doctor.doctor_id);
        stored.doctor_name = doctor.doctor_name.clone();
        stored.doctor_specialty = doctor.doctor_specialty.clone();
        stored.updated_at = now;
        let accepted = stored.clone();

        tables.calendar_queue.push(entry.clone());
        Ok(Some(accepted))
    }

    async fn reject(
        &self,
        observed: &Appointment,
        doctor: &DoctorAssignment,
        now: DateTime<Utc>,
        _auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError> {
        let mut tables = self.tables.lock().await;

        Ok(tables
            .appointments
            .iter_mut()
            .find(|a| a.id == observed.id && Self::matches_observed(a, observed))
            .map(|stored| {
                stored.status = AppointmentStatus::Rejected;
                stored.doctor_id = Some(doctor.doctor_id);
                stored.updated_at = now;
                stored.clone()
            }))
    }

    async fn schedule(
        &self,
        appointment_id: Uuid,
        scheduled_date: DateTime<Utc>,
        scheduled_time: &str,
        now: DateTime<Utc>,
        _auth_token: &str,
    ) -> Result<Option<Appointment>, StoreError> {
        let mut tables = self.tables.lock().await;

        let Some(stored) = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id && a.status == AppointmentStatus::Accepted)
        else {
            return Ok(None);
        };

        stored.scheduled_date = Some(scheduled_date);
        stored.scheduled_time = Some(scheduled_time.to_string());
        stored.updated_at = now;
        let scheduled = stored.clone();

        for entry in tables.calendar_queue.iter_mut().filter(|e| e.appointment_id == appointment_id) {
            entry.status = QueueStatus::Scheduled;
        }

        Ok(Some(scheduled))
    }

    async fn queue_for_doctor(&self, doctor_id: Uuid, _auth_token: &str) -> Result<Vec<CalendarQueueEntry>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .calendar_queue
            .iter()
            .filter(|e| e.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    async fn insert_queue_entry(&self, entry: &CalendarQueueEntry, _auth_token: &str) -> Result<CalendarQueueEntry, StoreError> {
        self.tables.lock().await.calendar_queue.push(entry.clone());
        Ok(entry.clone())
    }
}
