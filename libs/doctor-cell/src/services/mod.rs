pub mod doctor;
pub mod matching;
pub mod store;

pub use doctor::DoctorService;
pub use store::{build_doctor_store, DoctorStore, MemoryDoctorStore, SupabaseDoctorStore};
