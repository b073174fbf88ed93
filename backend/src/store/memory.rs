//! In-process store
//!
//! Each collection sits behind its own lock. Check-then-act operations run
//! entirely under the write lock, which gives them the same atomicity as the
//! conditional updates of the Postgres store. Operations spanning two
//! collections lock sales before items.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::{
    group_sum, validate_inventory_item, validate_patient, DashboardFacet, FilterCriteria,
    GroupCount, InventoryItem, InventoryItemPatch, Patient, PatientInput, SaleRecord,
    SourceClinic, WindowBounds,
};

use super::{
    stock_overflow, InventoryStore, PatientStore, RemovedSale, SaleLedger, StockDecrement,
    StoreHealth,
};
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<Vec<InventoryItem>>,
    sales: RwLock<Vec<SaleRecord>>,
    patients: RwLock<Vec<Patient>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn batch_conflict() -> AppError {
    AppError::Conflict {
        resource: "batchNumber".to_string(),
        message: "Batch number already exists".to_string(),
    }
}

fn phone_conflict() -> AppError {
    AppError::Conflict {
        resource: "phone".to_string(),
        message: "Phone number already exists".to_string(),
    }
}

/// Add `quantity` to the item's stock in place
fn put_back(item: &mut InventoryItem, quantity: i32) -> AppResult<()> {
    item.quantity_in_stock = item
        .quantity_in_stock
        .checked_add(quantity)
        .ok_or_else(stock_overflow)?;
    item.updated_at = Utc::now();
    Ok(())
}

fn phone_taken(patients: &[Patient], clinic: SourceClinic, phone: Option<&str>, except: Option<Uuid>) -> bool {
    let Some(phone) = phone.filter(|p| !p.is_empty()) else {
        return false;
    };
    patients.iter().any(|p| {
        p.source_clinic == clinic && p.phone.as_deref() == Some(phone) && Some(p.id) != except
    })
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn insert_item(&self, item: InventoryItem) -> AppResult<InventoryItem> {
        let mut items = self.items.write().await;
        if items.iter().any(|i| i.batch_number == item.batch_number) {
            return Err(batch_conflict());
        }
        items.push(item.clone());
        Ok(item)
    }

    async fn find_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| i.id == id).cloned())
    }

    async fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        let items = self.items.read().await;
        let mut all = items.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_item(&self, id: Uuid, patch: InventoryItemPatch) -> AppResult<Option<InventoryItem>> {
        let mut items = self.items.write().await;
        let Some(pos) = items.iter().position(|i| i.id == id) else {
            return Ok(None);
        };

        let mut updated = items[pos].clone();
        updated.apply(patch, Utc::now());
        validate_inventory_item(&updated)?;
        if items
            .iter()
            .any(|i| i.id != id && i.batch_number == updated.batch_number)
        {
            return Err(batch_conflict());
        }

        items[pos] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>> {
        let mut items = self.items.write().await;
        Ok(items
            .iter()
            .position(|i| i.id == id)
            .map(|pos| items.remove(pos)))
    }

    async fn decrement_stock(&self, id: Uuid, quantity: i32) -> AppResult<StockDecrement> {
        let mut items = self.items.write().await;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(StockDecrement::Missing);
        };
        if item.quantity_in_stock < quantity {
            return Ok(StockDecrement::Insufficient {
                available: item.quantity_in_stock,
            });
        }
        item.quantity_in_stock -= quantity;
        item.updated_at = Utc::now();
        Ok(StockDecrement::Applied(item.clone()))
    }

    async fn restore_stock(&self, id: Uuid, quantity: i32) -> AppResult<Option<InventoryItem>> {
        let mut items = self.items.write().await;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        put_back(item, quantity)?;
        Ok(Some(item.clone()))
    }

    async fn low_stock_items(&self) -> AppResult<Vec<InventoryItem>> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|i| i.is_low_stock()).cloned().collect())
    }
}

#[async_trait]
impl SaleLedger for MemoryStore {
    async fn append_sale(&self, sale: SaleRecord) -> AppResult<SaleRecord> {
        let mut sales = self.sales.write().await;
        sales.push(sale.clone());
        Ok(sale)
    }

    async fn find_sale(&self, id: Uuid) -> AppResult<Option<SaleRecord>> {
        let sales = self.sales.read().await;
        Ok(sales.iter().find(|s| s.id == id).cloned())
    }

    async fn remove_sale(&self, id: Uuid) -> AppResult<Option<RemovedSale>> {
        let mut sales = self.sales.write().await;
        let Some(pos) = sales.iter().position(|s| s.id == id) else {
            return Ok(None);
        };

        let mut items = self.items.write().await;
        let sale = &sales[pos];
        let restored = match items.iter_mut().find(|i| i.id == sale.pharmacy_item) {
            Some(item) => {
                put_back(item, sale.quantity_sold)?;
                Some(item.clone())
            }
            None => None,
        };

        let sale = sales.remove(pos);
        Ok(Some(RemovedSale { sale, restored }))
    }

    async fn sales_between(&self, bounds: WindowBounds) -> AppResult<Vec<SaleRecord>> {
        let sales = self.sales.read().await;
        let mut matched: Vec<SaleRecord> = sales
            .iter()
            .filter(|s| bounds.contains(s.created_at))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn insert_patient(&self, patient: Patient) -> AppResult<Patient> {
        let mut patients = self.patients.write().await;
        if phone_taken(&patients, patient.source_clinic, patient.phone.as_deref(), None) {
            return Err(phone_conflict());
        }
        patients.push(patient.clone());
        Ok(patient)
    }

    async fn find_patient(&self, clinic: SourceClinic, id: Uuid) -> AppResult<Option<Patient>> {
        let patients = self.patients.read().await;
        Ok(patients
            .iter()
            .find(|p| p.source_clinic == clinic && p.id == id)
            .cloned())
    }

    async fn find_patient_by_phone(&self, clinic: SourceClinic, phone: &str) -> AppResult<Option<Patient>> {
        let patients = self.patients.read().await;
        Ok(patients
            .iter()
            .find(|p| p.source_clinic == clinic && p.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn list_patients(&self, clinic: SourceClinic) -> AppResult<Vec<Patient>> {
        let patients = self.patients.read().await;
        Ok(patients
            .iter()
            .filter(|p| p.source_clinic == clinic)
            .cloned()
            .collect())
    }

    async fn update_patient(
        &self,
        clinic: SourceClinic,
        id: Uuid,
        input: PatientInput,
    ) -> AppResult<Option<Patient>> {
        let mut patients = self.patients.write().await;
        let Some(pos) = patients
            .iter()
            .position(|p| p.source_clinic == clinic && p.id == id)
        else {
            return Ok(None);
        };

        let mut updated = patients[pos].clone();
        updated.apply(input, Utc::now());
        validate_patient(&updated, &clinic.rules())?;
        if phone_taken(&patients, clinic, updated.phone.as_deref(), Some(id)) {
            return Err(phone_conflict());
        }

        patients[pos] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_patient(&self, clinic: SourceClinic, id: Uuid) -> AppResult<bool> {
        let mut patients = self.patients.write().await;
        match patients
            .iter()
            .position(|p| p.source_clinic == clinic && p.id == id)
        {
            Some(pos) => {
                patients.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_patients(&self, clinic: SourceClinic, filter: &FilterCriteria) -> AppResult<i64> {
        let patients = self.patients.read().await;
        let count = patients
            .iter()
            .filter(|p| p.source_clinic == clinic && filter.matches(p))
            .count();
        Ok(count as i64)
    }

    async fn group_patients(
        &self,
        clinic: SourceClinic,
        filter: &FilterCriteria,
        facet: DashboardFacet,
    ) -> AppResult<Vec<GroupCount>> {
        let patients = self.patients.read().await;
        let matching = patients
            .iter()
            .filter(|p| p.source_clinic == clinic && filter.matches(p));

        let groups = match facet {
            DashboardFacet::Gender => group_sum(matching, |p| p.gender.clone(), |_| 1i64),
            DashboardFacet::Diagnosis => group_sum(matching, |p| p.diagnosis.clone(), |_| 1i64),
            DashboardFacet::CreationMonth => {
                let mut months = group_sum(
                    matching.filter(|p| p.created_at.is_some()),
                    |p| p.created_at.map(|at| at.month()),
                    |_| 1i64,
                );
                months.sort_by_key(|(month, _)| *month);
                months
                    .into_iter()
                    .map(|(month, count)| (month.map(|m| m.to_string()), count))
                    .collect()
            }
        };

        Ok(groups
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
