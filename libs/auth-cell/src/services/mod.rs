pub mod registration;
pub mod store;

pub use registration::RegistrationService;
pub use store::{build_user_store, MemoryUserStore, SupabaseUserStore, UserStore};
