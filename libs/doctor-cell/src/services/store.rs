use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_config::{AppConfig, DataBackend};
use shared_database::{StoreError, SupabaseClient};
use shared_models::Domain;

use crate::models::DoctorProfile;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorStore: Send + Sync {
    async fn get(&self, user_id: Uuid, auth_token: &str) -> Result<Option<DoctorProfile>, StoreError>;

    async fn insert(&self, profile: &DoctorProfile, auth_token: &str) -> Result<DoctorProfile, StoreError>;

    /// Replaces the stored profile. `NotFound` when there is none.
    async fn update(&self, profile: &DoctorProfile, auth_token: &str) -> Result<DoctorProfile, StoreError>;

    async fn list(&self, specialty: Option<Domain>, auth_token: &str) -> Result<Vec<DoctorProfile>, StoreError>;
}

pub fn build_doctor_store(config: &AppConfig) -> Arc<dyn DoctorStore> {
    match config.data_backend {
        DataBackend::Supabase => Arc::new(SupabaseDoctorStore::new(config)),
        DataBackend::Memory => Arc::new(MemoryDoctorStore::default()),
    }
}

pub struct SupabaseDoctorStore {
    supabase: SupabaseClient,
}

impl SupabaseDoctorStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl DoctorStore for SupabaseDoctorStore {
    async fn get(&self, user_id: Uuid, auth_token: &str) -> Result<Option<DoctorProfile>, StoreError> {
        let path = format!("/rest/v1/doctors?user_id=eq.{}", user_id);
        let rows: Vec<DoctorProfile> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, profile: &DoctorProfile, auth_token: &str) -> Result<DoctorProfile, StoreError> {
        debug!("Creating doctor profile for {}", profile.user_id);
        self.supabase.insert("doctors", auth_token, json!(profile)).await
    }

    async fn update(&self, profile: &DoctorProfile, auth_token: &str) -> Result<DoctorProfile, StoreError> {
        debug!("Updating doctor profile for {}", profile.user_id);
        let filters = format!("user_id=eq.{}", profile.user_id);
        let rows: Vec<DoctorProfile> = self
            .supabase
            .update("doctors", &filters, auth_token, json!(profile))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("Doctor {}", profile.user_id)))
    }

    async fn list(&self, specialty: Option<Domain>, auth_token: &str) -> Result<Vec<DoctorProfile>, StoreError> {
        let path = match specialty {
            Some(domain) => format!(
                "/rest/v1/doctors?specialty=eq.{}&order=name.asc",
                urlencoding::encode(domain.as_str())
            ),
            None => "/rest/v1/doctors?order=name.asc".to_string(),
        };
        self.supabase.request(Method::GET, &path, Some(auth_token), None).await
    }
}

#[derive(Default)]
pub struct MemoryDoctorStore {
    doctors: RwLock<HashMap<Uuid, DoctorProfile>>,
}

#[async_trait]
impl DoctorStore for MemoryDoctorStore {
    async fn get(&self, user_id: Uuid, _auth_token: &str) -> Result<Option<DoctorProfile>, StoreError> {
        Ok(self.doctors.read().await.get(&user_id).cloned())
    }

    async fn insert(&self, profile: &DoctorProfile, _auth_token: &str) -> Result<DoctorProfile, StoreError> {
        self.doctors.write().await.insert(profile.user_id, profile.clone());
        Ok(profile.clone())
    }

    async fn update(&self, profile: &DoctorProfile, _auth_token: &str) -> Result<DoctorProfile, StoreError> {
        let mut doctors = self.doctors.write().await;
        match doctors.get_mut(&profile.user_id) {
            Some(existing) => {
                *existing = profile.clone();
                Ok(profile.clone())
            }
            None => Err(StoreError::NotFound(format!("Doctor {}", profile.user_id))),
        }
    }

    async fn list(&self, specialty: Option<Domain>, _auth_token: &str) -> Result<Vec<DoctorProfile>, StoreError> {
        Ok(self
            .doctors
            .read()
            .await
            .values()
            .filter(|d| specialty.is_none() || d.specialty == specialty)
            .cloned()
            .collect())
    }
}
