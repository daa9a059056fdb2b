// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {:?} to {:?}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(new_status) {
            warn!("Invalid status transition attempted: {:?} -> {:?}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition(*current_status));
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Accepted,
                AppointmentStatus::Rejected,
            ],
            AppointmentStatus::Accepted => vec![AppointmentStatus::Completed],
            // Terminal states - no transitions allowed
            AppointmentStatus::Rejected => vec![],
            AppointmentStatus::Completed => vec![],
        }
    }

    /// A doctor may act on a request that is unassigned or already theirs.
    pub fn validate_doctor_claim(&self, appointment: &Appointment, doctor_id: Uuid) -> Result<(), AppointmentError> {
        match appointment.doctor_id {
            None => Ok(()),
            Some(assigned) if assigned == doctor_id => Ok(()),
            Some(assigned) => {
                warn!(
                    "Doctor {} tried to act on appointment {} assigned to {}",
                    doctor_id, appointment.id, assigned
                );
                Err(AppointmentError::Unauthorized)
            }
        }
    }

    /// Checks a doctor's move on an appointment: status first, then ownership.
    pub fn validate_doctor_action(
        &self,
        appointment: &Appointment,
        doctor_id: Uuid,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        self.validate_status_transition(&appointment.status, new_status)?;
        self.validate_doctor_claim(appointment, doctor_id)
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
