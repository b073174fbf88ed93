//! Shared types and models for the Clinic Pharmacy Management backend
//!
//! Everything in this crate is free of I/O: domain records, time windows,
//! validation rules and the merge/rank helpers used by reporting.

pub mod aggregate;
pub mod models;
pub mod types;
pub mod validation;

pub use aggregate::*;
pub use models::*;
pub use types::*;
pub use validation::*;
