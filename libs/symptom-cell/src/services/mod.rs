pub mod classifier;
pub mod intake;
pub mod report;
pub mod store;
