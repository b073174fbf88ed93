//! Domain models for the Clinic Pharmacy Management backend

mod dashboard;
mod inventory;
mod patient;
mod report;
mod sale;

pub use dashboard::*;
pub use inventory::*;
pub use patient::*;
pub use report::*;
pub use sale::*;
