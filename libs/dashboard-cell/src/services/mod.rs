pub mod aggregate;
pub mod dashboard;

pub use aggregate::{doctor_dashboard, patient_dashboard, patient_roster};
pub use dashboard::DashboardService;
