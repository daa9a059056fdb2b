pub mod auth;
pub mod error;
pub mod medical;

pub use medical::{Domain, Severity, Urgency};
