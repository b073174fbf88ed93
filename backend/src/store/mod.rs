//! Persistence interface consumed by the services
//!
//! The services only see these traits. [`PgStore`] backs them with
//! PostgreSQL and [`MemoryStore`] keeps everything in process.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use shared::{
    top_selling, DashboardFacet, FilterCriteria, GroupCount, InventoryItem, InventoryItemPatch,
    MonthlyProfitSeries, Patient, PatientInput, ProfitSummary, SaleRecord, SourceClinic,
    TopSellingItem, WindowBounds,
};

use crate::error::{AppError, AppResult};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Outcome of a conditional stock decrement
#[derive(Debug, Clone, PartialEq)]
pub enum StockDecrement {
    /// Stock was reduced; carries the item as committed
    Applied(InventoryItem),
    /// The item holds fewer units than requested; nothing changed
    Insufficient { available: i32 },
    /// No item with that id
    Missing,
}

/// A sale taken out of the ledger together with its stock restoration
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedSale {
    pub sale: SaleRecord,
    /// The item with its units put back; `None` if the item was deleted
    pub restored: Option<InventoryItem>,
}

/// Raised when putting units back would push a stock count past `i32::MAX`
pub(crate) fn stock_overflow() -> AppError {
    AppError::Validation {
        field: "quantityInStock".to_string(),
        message: "Restored stock would exceed the largest storable quantity".to_string(),
    }
}

/// Stock-keeping records
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Insert a new item; a taken batch number is a conflict
    async fn insert_item(&self, item: InventoryItem) -> AppResult<InventoryItem>;

    async fn find_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>>;

    /// All items, newest first
    async fn list_items(&self) -> AppResult<Vec<InventoryItem>>;

    /// Apply `patch` to the stored item and validate the result, as one
    /// serialized read-modify-write. `None` if the item does not exist.
    async fn update_item(&self, id: Uuid, patch: InventoryItemPatch) -> AppResult<Option<InventoryItem>>;

    async fn delete_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>>;

    /// Atomically subtract `quantity` if at least that many units are in stock
    async fn decrement_stock(&self, id: Uuid, quantity: i32) -> AppResult<StockDecrement>;

    /// Atomically add `quantity` back. `None` if the item no longer exists;
    /// an overflowing count is rejected and leaves the item unchanged.
    async fn restore_stock(&self, id: Uuid, quantity: i32) -> AppResult<Option<InventoryItem>>;

    /// Items whose stock is at or below their reorder level, in store order
    async fn low_stock_items(&self) -> AppResult<Vec<InventoryItem>>;
}

/// Append-mostly log of sales
#[async_trait]
pub trait SaleLedger: Send + Sync {
    async fn append_sale(&self, sale: SaleRecord) -> AppResult<SaleRecord>;

    async fn find_sale(&self, id: Uuid) -> AppResult<Option<SaleRecord>>;

    /// Remove a sale and put its units back into stock as one atomic step
    ///
    /// `None` if the sale was already gone. Of two concurrent calls for the
    /// same sale exactly one sees it. If restoring would overflow the item's
    /// stock, neither the sale nor the item changes.
    async fn remove_sale(&self, id: Uuid) -> AppResult<Option<RemovedSale>>;

    /// Sales created inside `bounds`, oldest first
    async fn sales_between(&self, bounds: WindowBounds) -> AppResult<Vec<SaleRecord>>;

    /// Sum of profit over `bounds`; zero when nothing matched
    async fn profit_between(&self, bounds: WindowBounds) -> AppResult<Decimal> {
        let sales = self.sales_between(bounds).await?;
        Ok(ProfitSummary::of(&sales).total_profit)
    }

    /// Item names ranked by units sold, all time. Ties go to the name sold
    /// first.
    async fn top_selling(&self, limit: usize) -> AppResult<Vec<TopSellingItem>> {
        let sales = self.sales_between(WindowBounds::UNBOUNDED).await?;
        Ok(top_selling(&sales, limit))
    }

    /// Profit per calendar month of sale creation
    async fn monthly_profit(&self) -> AppResult<MonthlyProfitSeries> {
        let sales = self.sales_between(WindowBounds::UNBOUNDED).await?;
        Ok(MonthlyProfitSeries::from_sales(&sales))
    }
}

/// Patient records of every clinic source
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Insert a patient; a phone number already used in the same clinic is
    /// a conflict
    async fn insert_patient(&self, patient: Patient) -> AppResult<Patient>;

    async fn find_patient(&self, clinic: SourceClinic, id: Uuid) -> AppResult<Option<Patient>>;

    async fn find_patient_by_phone(&self, clinic: SourceClinic, phone: &str) -> AppResult<Option<Patient>>;

    async fn list_patients(&self, clinic: SourceClinic) -> AppResult<Vec<Patient>>;

    /// Apply `input` and validate against the clinic's rules as one
    /// serialized read-modify-write. `None` if the patient does not exist.
    async fn update_patient(
        &self,
        clinic: SourceClinic,
        id: Uuid,
        input: PatientInput,
    ) -> AppResult<Option<Patient>>;

    async fn delete_patient(&self, clinic: SourceClinic, id: Uuid) -> AppResult<bool>;

    async fn count_patients(&self, clinic: SourceClinic, filter: &FilterCriteria) -> AppResult<i64>;

    /// Grouped counts of one facet. The month facet only counts records
    /// that carry a creation timestamp.
    async fn group_patients(
        &self,
        clinic: SourceClinic,
        filter: &FilterCriteria,
        facet: DashboardFacet,
    ) -> AppResult<Vec<GroupCount>>;
}

/// Liveness of the backing store
#[async_trait]
pub trait StoreHealth: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> AppResult<()>;
}

/// Handles to every store, cloned into each request
#[derive(Clone)]
pub struct Stores {
    pub inventory: Arc<dyn InventoryStore>,
    pub sales: Arc<dyn SaleLedger>,
    pub patients: Arc<dyn PatientStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Serve every concern from one backend
    pub fn from_backend<S>(store: S) -> Self
    where
        S: InventoryStore + SaleLedger + PatientStore + StoreHealth + 'static,
    {
        let store = Arc::new(store);
        Self {
            inventory: store.clone(),
            sales: store.clone(),
            patients: store.clone(),
            health: store,
        }
    }

    pub fn memory() -> Self {
        Self::from_backend(MemoryStore::new())
    }
}
