pub mod appointment;
pub mod calendar_queue;
pub mod lifecycle;
pub mod queries;
pub mod store;

pub use appointment::AppointmentService;
pub use lifecycle::AppointmentLifecycleService;
pub use store::{build_appointment_store, AppointmentStore, MemoryAppointmentStore, SupabaseAppointmentStore};
