pub mod guard;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use guard::{authorize, home_for, GuardDecision, NavItem, RoleHome};
pub use models::*;
pub use services::*;
