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

use crate::models::{PatientRecord, UserRecord};

/// Account records written at sign-up.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, uid: Uuid, auth_token: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn insert_user(&self, user: &UserRecord, auth_token: &str) -> Result<UserRecord, StoreError>;

    async fn get_patient(&self, user_id: Uuid, auth_token: &str) -> Result<Option<PatientRecord>, StoreError>;

    async fn insert_patient(&self, patient: &PatientRecord, auth_token: &str) -> Result<PatientRecord, StoreError>;
}

pub fn build_user_store(config: &AppConfig) -> Arc<dyn UserStore> {
    match config.data_backend {
        DataBackend::Supabase => Arc::new(SupabaseUserStore::new(config)),
        DataBackend::Memory => Arc::new(MemoryUserStore::default()),
    }
}

// ==============================================================================
// SUPABASE
// ==============================================================================

pub struct SupabaseUserStore {
    supabase: SupabaseClient,
}

impl SupabaseUserStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl UserStore for SupabaseUserStore {
    async fn get_user(&self, uid: Uuid, auth_token: &str) -> Result<Option<UserRecord>, StoreError> {
        let path = format!("/rest/v1/users?uid=eq.{}", uid);
        let rows: Vec<UserRecord> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_user(&self, user: &UserRecord, auth_token: &str) -> Result<UserRecord, StoreError> {
        debug!("Creating user record for {} ({})", user.uid, user.role);
        self.supabase.insert("users", auth_token, json!(user)).await
    }

    async fn get_patient(&self, user_id: Uuid, auth_token: &str) -> Result<Option<PatientRecord>, StoreError> {
        let path = format!("/rest/v1/patients?user_id=eq.{}", user_id);
        let rows: Vec<PatientRecord> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_patient(&self, patient: &PatientRecord, auth_token: &str) -> Result<PatientRecord, StoreError> {
        debug!("Creating patient record for {}", patient.user_id);
        self.supabase.insert("patients", auth_token, json!(patient)).await
    }
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    patients: RwLock<HashMap<Uuid, PatientRecord>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, uid: Uuid, _auth_token: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(&uid).cloned())
    }

    async fn insert_user(&self, user: &UserRecord, _auth_token: &str) -> Result<UserRecord, StoreError> {
        self.users.write().await.insert(user.uid, user.clone());
        Ok(user.clone())
    }

    async fn get_patient(&self, user_id: Uuid, _auth_token: &str) -> Result<Option<PatientRecord>, StoreError> {
        Ok(self.patients.read().await.get(&user_id).cloned())
    }

    async fn insert_patient(&self, patient: &PatientRecord, _auth_token: &str) -> Result<PatientRecord, StoreError> {
        self.patients.write().await.insert(patient.user_id, patient.clone());
        Ok(patient.clone())
    }
}
