use std::collections::HashSet;

use uuid::Uuid;

use crate::models::Appointment;

pub fn sort_newest_first(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// A doctor's actionable requests: their own pending appointments plus the
/// unclaimed ones of their domain. Each id appears once and the direct
/// assignment wins.
pub fn merge_pending_requests(mine: Vec<Appointment>, domain_pending: Vec<Appointment>) -> Vec<Appointment> {
    let mut merged: Vec<Appointment> = mine.into_iter().filter(|a| a.is_pending()).collect();
    let mut seen: HashSet<Uuid> = merged.iter().map(|a| a.id).collect();

    for appointment in domain_pending {
        if seen.insert(appointment.id) {
            merged.push(appointment);
        }
    }

    sort_newest_first(&mut merged);
    merged
}
