use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, CalendarQueueEntry, QueueStatus};

impl CalendarQueueEntry {
    /// Entry produced when `doctor_id` accepts `appointment`.
    pub fn for_acceptance(appointment: &Appointment, doctor_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            doctor_id,
            patient_id: appointment.patient_id,
            domain: appointment.domain,
            status: QueueStatus::Pending,
            created_at: now,
        }
    }
}

/// Queue entries owed for accepted appointments that have none yet.
pub fn missing_entries(
    appointments: &[Appointment],
    queue: &[CalendarQueueEntry],
    now: DateTime<Utc>,
) -> Vec<CalendarQueueEntry> {
    let queued: HashSet<Uuid> = queue.iter().map(|entry| entry.appointment_id).collect();

    appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Accepted && !queued.contains(&a.id))
        .filter_map(|a| a.doctor_id.map(|doctor_id| CalendarQueueEntry::for_acceptance(a, doctor_id, now)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::Domain;

    fn accepted(doctor_id: Uuid) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: "Pat".to_string(),
            patient_email: None,
            doctor_id: Some(doctor_id),
            doctor_name: None,
            doctor_specialty: None,
            domain: Domain::Dermatology,
            report_id: Uuid::new_v4(),
            reason: String::new(),
            status: AppointmentStatus::Accepted,
            scheduled_date: None,
            scheduled_time: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_unqueued_accepted_appointments_are_owed() {
        let doctor = Uuid::new_v4();
        let queued = accepted(doctor);
        let lost = accepted(doctor);
        let mut rejected = accepted(doctor);
        rejected.status = AppointmentStatus::Rejected;

        let queue = vec![CalendarQueueEntry::for_acceptance(&queued, doctor, Utc::now())];
        let owed = missing_entries(&[queued, lost.clone(), rejected], &queue, Utc::now());

        assert_eq!(owed.len(), 1);
        assert_eq!(owed[0].appointment_id, lost.id);
        assert_eq!(owed[0].doctor_id, doctor);
        assert_eq!(owed[0].status, QueueStatus::Pending);
        assert_eq!(owed[0].domain, Domain::Dermatology);
    }
}
