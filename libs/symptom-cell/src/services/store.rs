use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_config::{AppConfig, DataBackend};
use shared_database::{StoreError, SupabaseClient};

use crate::models::{Report, SymptomReport};

/// Persistence for symptom submissions and the reports derived from them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert_symptom_report(&self, record: &SymptomReport, auth_token: &str) -> Result<SymptomReport, StoreError>;

    async fn insert_report(&self, report: &Report, auth_token: &str) -> Result<Report, StoreError>;

    /// Removes a symptom record whose report could not be stored.
    async fn delete_symptom_report(&self, record_id: Uuid, auth_token: &str) -> Result<(), StoreError>;

    /// Reports owned by `owner_id`, newest first.
    async fn reports_for_owner(&self, owner_id: Uuid, auth_token: &str) -> Result<Vec<Report>, StoreError>;

    async fn get_report(&self, report_id: Uuid, auth_token: &str) -> Result<Option<Report>, StoreError>;
}

pub fn build_report_store(config: &AppConfig) -> Arc<dyn ReportStore> {
    match config.data_backend {
        DataBackend::Supabase => Arc::new(SupabaseReportStore::new(config)),
        DataBackend::Memory => Arc::new(MemoryReportStore::default()),
    }
}

// ==============================================================================
// SUPABASE
// ==============================================================================

pub struct SupabaseReportStore {
    supabase: SupabaseClient,
}

impl SupabaseReportStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl ReportStore for SupabaseReportStore {
    async fn insert_symptom_report(&self, record: &SymptomReport, auth_token: &str) -> Result<SymptomReport, StoreError> {
        debug!("Storing symptom report {} for {}", record.id, record.owner_id);
        self.supabase.insert("symptoms", auth_token, json!(record)).await
    }

    async fn insert_report(&self, report: &Report, auth_token: &str) -> Result<Report, StoreError> {
        debug!("Storing report {} for symptom report {}", report.id, report.symptom_report_id);
        self.supabase.insert("reports", auth_token, json!(report)).await
    }

    async fn delete_symptom_report(&self, record_id: Uuid, auth_token: &str) -> Result<(), StoreError> {
        let path = format!("/rest/v1/symptoms?id=eq.{}", record_id);
        let _deleted: Vec<SymptomReport> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                Some(auth_token),
                None,
                Some(SupabaseClient::representation_headers()),
            )
            .await?;
        Ok(())
    }

    async fn reports_for_owner(&self, owner_id: Uuid, auth_token: &str) -> Result<Vec<Report>, StoreError> {
        let path = format!("/rest/v1/reports?owner_id=eq.{}&order=created_at.desc", owner_id);
        self.supabase.request(Method::GET, &path, Some(auth_token), None).await
    }

    async fn get_report(&self, report_id: Uuid, auth_token: &str) -> Result<Option<Report>, StoreError> {
        let path = format!("/rest/v1/reports?id=eq.{}", report_id);
        let rows: Vec<Report> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;
        Ok(rows.into_iter().next())
    }
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

#[derive(Default)]
pub struct MemoryReportStore {
    symptoms: RwLock<Vec<SymptomReport>>,
    reports: RwLock<Vec<Report>>,
}

impl MemoryReportStore {
    pub async fn symptom_reports(&self) -> Vec<SymptomReport> {
        self.symptoms.read().await.clone()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert_symptom_report(&self, record: &SymptomReport, _auth_token: &str) -> Result<SymptomReport, StoreError> {
        self.symptoms.write().await.push(record.clone());
        Ok(record.clone())
    }

    async fn insert_report(&self, report: &Report, _auth_token: &str) -> Result<Report, StoreError> {
        self.reports.write().await.push(report.clone());
        Ok(report.clone())
    }

    async fn delete_symptom_report(&self, record_id: Uuid, _auth_token: &str) -> Result<(), StoreError> {
        self.symptoms.write().await.retain(|s| s.id != record_id);
        Ok(())
    }

    async fn reports_for_owner(&self, owner_id: Uuid, _auth_token: &str) -> Result<Vec<Report>, StoreError> {
        let mut reports: Vec<Report> = self
            .reports
            .read()
            .await
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn get_report(&self, report_id: Uuid, _auth_token: &str) -> Result<Option<Report>, StoreError> {
        Ok(self.reports.read().await.iter().find(|r| r.id == report_id).cloned())
    }
}
