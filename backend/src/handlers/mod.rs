//! HTTP request handlers

pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod patients;
pub mod sales;
pub mod user;

pub use dashboard::*;
pub use health::*;
pub use inventory::*;
pub use patients::*;
pub use sales::*;
pub use user::*;
