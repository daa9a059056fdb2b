use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use appointment_cell::{merge_pending_requests, Appointment, AppointmentStatus};
use symptom_cell::Report;

use crate::models::{DoctorDashboard, DoctorStats, PatientCounts, PatientDashboard, PatientSummary};

pub const RECENT_REPORT_LIMIT: usize = 3;

/// Splits a patient's appointments into upcoming, pending and past.
/// `reports` is expected newest first.
pub fn patient_dashboard(appointments: Vec<Appointment>, reports: Vec<Report>) -> PatientDashboard {
    let mut upcoming = Vec::new();
    let mut pending = Vec::new();
    let mut past = Vec::new();

    for appointment in appointments {
        match appointment.status {
            AppointmentStatus::Accepted if appointment.scheduled_date.is_some() => upcoming.push(appointment),
            AppointmentStatus::Pending => pending.push(appointment),
            AppointmentStatus::Completed | AppointmentStatus::Rejected => past.push(appointment),
            // Accepted but not yet on the calendar
            AppointmentStatus::Accepted => {}
        }
    }
    upcoming.sort_by_key(|a| a.scheduled_date);

    let counts = PatientCounts {
        upcoming: upcoming.len(),
        pending: pending.len(),
        past: past.len(),
        reports: reports.len(),
    };

    PatientDashboard {
        upcoming,
        pending,
        past,
        recent_reports: reports.into_iter().take(RECENT_REPORT_LIMIT).collect(),
        counts,
    }
}

/// Builds the doctor view from the doctor's own appointments and the
/// unclaimed requests of their domain.
pub fn doctor_dashboard(
    doctor_id: Uuid,
    mine: Vec<Appointment>,
    domain_pending: Vec<Appointment>,
    now: DateTime<Utc>,
) -> DoctorDashboard {
    let today = now.date_naive();

    let mut todays_appointments: Vec<Appointment> = mine
        .iter()
        .filter(|a| a.status == AppointmentStatus::Accepted)
        .filter(|a| a.scheduled_date.is_some_and(|date| date.date_naive() == today))
        .cloned()
        .collect();
    todays_appointments.sort_by_key(|a| a.scheduled_date);

    let mut upcoming_appointments: Vec<Appointment> = mine
        .iter()
        .filter(|a| a.status == AppointmentStatus::Accepted)
        .filter(|a| a.scheduled_date.is_some_and(|date| date >= now))
        .cloned()
        .collect();
    upcoming_appointments.sort_by_key(|a| a.scheduled_date);

    let unique_patients = mine
        .iter()
        .filter(|a| a.doctor_id == Some(doctor_id))
        .map(|a| a.patient_id)
        .collect::<HashSet<_>>()
        .len();

    let pending_requests = merge_pending_requests(mine, domain_pending);

    let stats = DoctorStats {
        pending_requests: pending_requests.len(),
        todays_appointments: todays_appointments.len(),
        unique_patients,
        pending_reports: pending_requests.len(),
    };

    DoctorDashboard {
        pending_requests,
        todays_appointments,
        upcoming_appointments,
        stats,
    }
}

/// Distinct patients the doctor has accepted or seen, ordered by name.
pub fn patient_roster(mine: &[Appointment], now: DateTime<Utc>) -> Vec<PatientSummary> {
    let mut roster: HashMap<Uuid, PatientSummary> = HashMap::new();

    let relevant = mine
        .iter()
        .filter(|a| matches!(a.status, AppointmentStatus::Accepted | AppointmentStatus::Completed));

    for appointment in relevant {
        let summary = roster.entry(appointment.patient_id).or_insert_with(|| PatientSummary {
            patient_id: appointment.patient_id,
            patient_name: appointment.patient_name.clone(),
            patient_email: appointment.patient_email.clone(),
            appointment_count: 0,
            next_appointment: None,
            last_appointment: None,
        });
        summary.appointment_count += 1;

        if let Some(date) = appointment.scheduled_date {
            if date > now {
                summary.next_appointment = Some(summary.next_appointment.map_or(date, |next| next.min(date)));
            } else {
                summary.last_appointment = Some(summary.last_appointment.map_or(date, |last| last.max(date)));
            }
        }
    }

    let mut roster: Vec<PatientSummary> = roster.into_values().collect();
    roster.sort_by(|a, b| a.patient_name.cmp(&b.patient_name).then(a.patient_id.cmp(&b.patient_id)));
    roster
}
