use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use doctor_cell::{DoctorService, DoctorStore};
use shared_models::auth::{Role, Session};

use crate::models::{AuthError, PatientRecord, RegisterRequest, Registration, UserRecord};
use crate::services::store::UserStore;

/// Writes the account records that follow a sign-up with the identity
/// provider. Each record is created only if missing, so a retried or
/// half-finished registration completes without duplicates.
pub struct RegistrationService {
    users: Arc<dyn UserStore>,
    doctors: Arc<dyn DoctorStore>,
}

impl RegistrationService {
    pub fn new(users: Arc<dyn UserStore>, doctors: Arc<dyn DoctorStore>) -> Self {
        Self { users, doctors }
    }

    pub async fn register(&self, session: &Session, request: RegisterRequest) -> Result<Registration, AuthError> {
        debug!("Registration bootstrap for {} as {}", session.uid, request.role);

        let display_name = request.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(AuthError::ValidationError("Display name is required".to_string()));
        }
        if request.role != session.role {
            return Err(AuthError::Forbidden(format!(
                "Signed-in account has the {} role, not {}",
                session.role, request.role
            )));
        }

        let token = &session.access_token;
        let now = Utc::now();

        let user = match self.users.get_user(session.uid, token).await? {
            Some(existing) => existing,
            None => {
                let record = UserRecord {
                    uid: session.uid,
                    email: session.email.clone(),
                    display_name: display_name.clone(),
                    role: session.role,
                    created_at: now,
                };
                self.users.insert_user(&record, token).await?
            }
        };

        let mut registration = Registration {
            user,
            patient: None,
            doctor: None,
        };

        match session.role {
            Role::Patient => {
                let patient = match self.users.get_patient(session.uid, token).await? {
                    Some(existing) => existing,
                    None => {
                        let record = PatientRecord {
                            user_id: session.uid,
                            name: display_name,
                            email: session.email.clone(),
                            created_at: now,
                        };
                        self.users.insert_patient(&record, token).await?
                    }
                };
                registration.patient = Some(patient);
            }
            Role::Doctor => {
                let named = Session {
                    display_name: Some(display_name),
                    ..session.clone()
                };
                let profile = DoctorService::new(self.doctors.clone()).ensure_profile(&named).await?;
                registration.doctor = Some(profile);
            }
            Role::Admin => {}
        }

        info!("Registered {} as {}", session.uid, session.role);
        Ok(registration)
    }
}
