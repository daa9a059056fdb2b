use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::auth::{Role, Session};
use shared_models::Domain;

use crate::models::{DoctorError, DoctorProfile, DoctorSearchQuery, UpdateDoctorRequest};
use crate::services::matching::{filter_doctors, parse_specialty};
use crate::services::store::DoctorStore;

pub struct DoctorService {
    store: Arc<dyn DoctorStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn DoctorStore>) -> Self {
        Self { store }
    }

    /// Doctors a patient can browse, optionally narrowed to a domain and a
    /// search term.
    pub async fn search_doctors(&self, query: &DoctorSearchQuery, auth_token: &str) -> Result<Vec<DoctorProfile>, DoctorError> {
        debug!("Searching doctors: {:?}", query);

        let domain = match query.domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(label) => Some(label.parse::<Domain>().map_err(DoctorError::ValidationError)?),
            None => None,
        };

        let doctors = self.store.list(domain, auth_token).await?;
        Ok(filter_doctors(doctors, domain, query.search.as_deref()))
    }

    pub async fn get_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<DoctorProfile, DoctorError> {
        self.store
            .get(doctor_id, auth_token)
            .await?
            .ok_or(DoctorError::NotFound)
    }

    /// Returns the caller's profile, creating the default one on first use.
    pub async fn ensure_profile(&self, session: &Session) -> Result<DoctorProfile, DoctorError> {
        if !session.is(Role::Doctor) {
            return Err(DoctorError::UnauthorizedAccess);
        }

        if let Some(profile) = self.store.get(session.uid, &session.access_token).await? {
            return Ok(profile);
        }

        let profile = DoctorProfile::new_default(
            session.uid,
            session.display_name.as_deref().unwrap_or("Doctor"),
            session.email.as_deref().unwrap_or_default(),
            Utc::now(),
        );
        let profile = self.store.insert(&profile, &session.access_token).await?;
        info!("Created default doctor profile for {}", session.uid);
        Ok(profile)
    }

    pub async fn update_profile(&self, session: &Session, request: UpdateDoctorRequest) -> Result<DoctorProfile, DoctorError> {
        let mut profile = self.ensure_profile(session).await?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(DoctorError::ValidationError("Name cannot be empty".to_string()));
            }
            profile.name = name.trim().to_string();
        }
        if let Some(label) = request.specialty {
            profile.specialty = parse_specialty(&label).map_err(DoctorError::ValidationError)?;
        }
        if let Some(fee) = request.consultation_fee {
            if fee < 0.0 {
                return Err(DoctorError::ValidationError("Consultation fee cannot be negative".to_string()));
            }
            profile.consultation_fee = Some(fee);
        }
        if let Some(qualifications) = request.qualifications {
            profile.qualifications = qualifications;
        }
        if let Some(experience) = request.experience {
            profile.experience = experience;
        }
        if let Some(bio) = request.bio {
            profile.bio = bio;
        }
        if let Some(accepting) = request.accepting_new_patients {
            profile.accepting_new_patients = accepting;
        }
        if let Some(availability) = request.availability {
            profile.availability = availability;
        }
        profile.updated_at = Utc::now();

        let updated = self.store.update(&profile, &session.access_token).await?;
        info!("Doctor {} updated profile (specialty: {:?})", session.uid, updated.specialty);
        Ok(updated)
    }
}
