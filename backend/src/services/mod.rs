//! Business logic services for the Clinic Pharmacy Management backend

pub mod dashboard;
pub mod inventory;
pub mod patient;
pub mod reporting;
pub mod sale;

pub use dashboard::DashboardService;
pub use inventory::InventoryService;
pub use patient::PatientService;
pub use reporting::ReportingService;
pub use sale::SaleService;
