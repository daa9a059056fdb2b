pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use services::classifier::classify_domain;
pub use services::report::generate_report;
pub use services::store::{build_report_store, MemoryReportStore, ReportStore, SupabaseReportStore};
