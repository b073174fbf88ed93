//! PostgreSQL store
//!
//! Stock changes use conditional single-statement updates, so the database
//! row is the serialization point for concurrent sales. Admin edits lock the
//! row with `SELECT ... FOR UPDATE` for the read-modify-write. Sale reports
//! aggregate in SQL rather than loading the ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::{
    validate_inventory_item, validate_patient, DashboardFacet, FilterCriteria, GroupCount,
    InventoryItem, InventoryItemPatch, MonthlyProfit, MonthlyProfitSeries, Patient, PatientInput,
    SaleRecord, SourceClinic, TopSellingItem, TreatmentItem, Vaccination, WindowBounds,
};

use super::{
    stock_overflow, InventoryStore, PatientStore, RemovedSale, SaleLedger, StockDecrement,
    StoreHealth,
};
use crate::error::{AppError, AppResult};

macro_rules! item_columns {
    () => {
        "id, item_name, category, quantity_in_stock, reorder_level, cost_price, selling_price, \
         batch_number, expiry_date, supplier, purchase_date, location, created_at, updated_at"
    };
}

macro_rules! sale_columns {
    () => {
        "id, pharmacy_item, item_name, quantity_sold, selling_price, cost_price, profit, created_at"
    };
}

macro_rules! patient_columns {
    () => {
        "id, source_clinic, first_name, last_name, age, gender, phone, address, region, district, \
         health_provider_type, medical_history, current_medications, allergies, diagnosis, \
         physical_exam, lab_results, treatment_plan, vaccinations, next_appointment, reason, \
         created_at, updated_at"
    };
}

/// Predicate shared by every dashboard query; `$1` is the clinic
macro_rules! patient_filter {
    () => {
        "source_clinic = $1 \
         AND ($2::text IS NULL OR region = $2) \
         AND ($3::text IS NULL OR district = $3) \
         AND ($4::timestamptz IS NULL OR created_at >= $4)"
    };
}

/// Row for pharmacy_items queries
#[derive(Debug, FromRow)]
struct InventoryRow {
    id: Uuid,
    item_name: String,
    category: String,
    quantity_in_stock: i32,
    reorder_level: i32,
    cost_price: Decimal,
    selling_price: Decimal,
    batch_number: String,
    expiry_date: DateTime<Utc>,
    supplier: String,
    purchase_date: DateTime<Utc>,
    location: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        Self {
            id: row.id,
            item_name: row.item_name,
            category: row.category,
            quantity_in_stock: row.quantity_in_stock,
            reorder_level: row.reorder_level,
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            batch_number: row.batch_number,
            expiry_date: row.expiry_date,
            supplier: row.supplier,
            purchase_date: row.purchase_date,
            location: row.location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row for sales queries
#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    pharmacy_item: Uuid,
    item_name: String,
    quantity_sold: i32,
    selling_price: Decimal,
    cost_price: Decimal,
    profit: Decimal,
    created_at: DateTime<Utc>,
}

impl From<SaleRow> for SaleRecord {
    fn from(row: SaleRow) -> Self {
        Self {
            id: row.id,
            pharmacy_item: row.pharmacy_item,
            item_name: row.item_name,
            quantity_sold: row.quantity_sold,
            selling_price: row.selling_price,
            cost_price: row.cost_price,
            profit: row.profit,
            created_at: row.created_at,
        }
    }
}

/// Row for patients queries
#[derive(Debug, FromRow)]
struct PatientRow {
    id: Uuid,
    source_clinic: String,
    first_name: Option<String>,
    last_name: Option<String>,
    age: Option<i32>,
    gender: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    region: Option<String>,
    district: Option<String>,
    health_provider_type: Option<String>,
    medical_history: Option<String>,
    current_medications: Option<String>,
    allergies: Option<String>,
    diagnosis: Option<String>,
    physical_exam: Option<String>,
    lab_results: Option<String>,
    treatment_plan: Json<Vec<TreatmentItem>>,
    vaccinations: Json<Vec<Vaccination>>,
    next_appointment: Option<DateTime<Utc>>,
    reason: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<PatientRow> for Patient {
    type Error = AppError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let source_clinic = row.source_clinic.parse::<SourceClinic>().map_err(AppError::Internal)?;
        Ok(Self {
            id: row.id,
            source_clinic,
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            gender: row.gender,
            phone: row.phone,
            address: row.address,
            region: row.region,
            district: row.district,
            health_provider_type: row.health_provider_type,
            medical_history: row.medical_history,
            current_medications: row.current_medications,
            allergies: row.allergies,
            diagnosis: row.diagnosis,
            physical_exam: row.physical_exam,
            lab_results: row.lab_results,
            treatment_plan: row.treatment_plan.0,
            vaccinations: row.vaccinations.0,
            next_appointment: row.next_appointment,
            reason: row.reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_patients(rows: Vec<PatientRow>) -> AppResult<Vec<Patient>> {
    rows.into_iter().map(Patient::try_from).collect()
}

fn batch_conflict(err: sqlx::Error) -> AppError {
    AppError::from_unique_violation(err, "batchNumber", "Batch number already exists")
}

fn phone_conflict(err: sqlx::Error) -> AppError {
    AppError::from_unique_violation(err, "phone", "Phone number already exists")
}

/// PostgreSQL-backed implementation of every store
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db).await
    }

    async fn save_item(
        tx: &mut Transaction<'_, Postgres>,
        item: &InventoryItem,
    ) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, InventoryRow>(concat!(
            "UPDATE pharmacy_items SET item_name = $2, category = $3, quantity_in_stock = $4, \
             reorder_level = $5, cost_price = $6, selling_price = $7, batch_number = $8, \
             expiry_date = $9, supplier = $10, purchase_date = $11, location = $12, updated_at = $13 \
             WHERE id = $1 RETURNING ",
            item_columns!()
        ))
        .bind(item.id)
        .bind(&item.item_name)
        .bind(&item.category)
        .bind(item.quantity_in_stock)
        .bind(item.reorder_level)
        .bind(item.cost_price)
        .bind(item.selling_price)
        .bind(&item.batch_number)
        .bind(item.expiry_date)
        .bind(&item.supplier)
        .bind(item.purchase_date)
        .bind(&item.location)
        .bind(item.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(batch_conflict)?;

        Ok(row.into())
    }

    async fn save_patient(
        tx: &mut Transaction<'_, Postgres>,
        patient: &Patient,
    ) -> AppResult<Patient> {
        let row = sqlx::query_as::<_, PatientRow>(concat!(
            "UPDATE patients SET first_name = $2, last_name = $3, age = $4, gender = $5, phone = $6, \
             address = $7, region = $8, district = $9, health_provider_type = $10, \
             medical_history = $11, current_medications = $12, allergies = $13, diagnosis = $14, \
             physical_exam = $15, lab_results = $16, treatment_plan = $17, vaccinations = $18, \
             next_appointment = $19, reason = $20, updated_at = $21 \
             WHERE id = $1 RETURNING ",
            patient_columns!()
        ))
        .bind(patient.id)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(&patient.phone)
        .bind(&patient.address)
        .bind(&patient.region)
        .bind(&patient.district)
        .bind(&patient.health_provider_type)
        .bind(&patient.medical_history)
        .bind(&patient.current_medications)
        .bind(&patient.allergies)
        .bind(&patient.diagnosis)
        .bind(&patient.physical_exam)
        .bind(&patient.lab_results)
        .bind(Json(&patient.treatment_plan))
        .bind(Json(&patient.vaccinations))
        .bind(patient.next_appointment)
        .bind(&patient.reason)
        .bind(patient.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(phone_conflict)?;

        row.try_into()
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn insert_item(&self, item: InventoryItem) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, InventoryRow>(concat!(
            "INSERT INTO pharmacy_items (",
            item_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING ",
            item_columns!()
        ))
        .bind(item.id)
        .bind(&item.item_name)
        .bind(&item.category)
        .bind(item.quantity_in_stock)
        .bind(item.reorder_level)
        .bind(item.cost_price)
        .bind(item.selling_price)
        .bind(&item.batch_number)
        .bind(item.expiry_date)
        .bind(&item.supplier)
        .bind(item.purchase_date)
        .bind(&item.location)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(batch_conflict)?;

        Ok(row.into())
    }

    async fn find_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, InventoryRow>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM pharmacy_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, InventoryRow>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM pharmacy_items ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_item(&self, id: Uuid, patch: InventoryItemPatch) -> AppResult<Option<InventoryItem>> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, InventoryRow>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM pharmacy_items WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let mut item = InventoryItem::from(current);
        item.apply(patch, Utc::now());
        validate_inventory_item(&item)?;

        let saved = Self::save_item(&mut tx, &item).await?;
        tx.commit().await?;

        Ok(Some(saved))
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, InventoryRow>(concat!(
            "DELETE FROM pharmacy_items WHERE id = $1 RETURNING ",
            item_columns!()
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn decrement_stock(&self, id: Uuid, quantity: i32) -> AppResult<StockDecrement> {
        let row = sqlx::query_as::<_, InventoryRow>(concat!(
            "UPDATE pharmacy_items \
             SET quantity_in_stock = quantity_in_stock - $2, updated_at = NOW() \
             WHERE id = $1 AND quantity_in_stock >= $2 \
             RETURNING ",
            item_columns!()
        ))
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.db)
        .await?;

        if let Some(row) = row {
            return Ok(StockDecrement::Applied(row.into()));
        }

        let available = sqlx::query_scalar::<_, i32>(
            "SELECT quantity_in_stock FROM pharmacy_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(match available {
            Some(available) => StockDecrement::Insufficient { available },
            None => StockDecrement::Missing,
        })
    }

    async fn restore_stock(&self, id: Uuid, quantity: i32) -> AppResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, InventoryRow>(concat!(
            "UPDATE pharmacy_items \
             SET quantity_in_stock = quantity_in_stock + $2, updated_at = NOW() \
             WHERE id = $1 AND quantity_in_stock <= 2147483647 - $2 \
             RETURNING ",
            item_columns!()
        ))
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.db)
        .await?;

        if let Some(row) = row {
            return Ok(Some(row.into()));
        }

        let exists = sqlx::query_scalar::<_, i32>(
            "SELECT quantity_in_stock FROM pharmacy_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        match exists {
            Some(_) => Err(stock_overflow()),
            None => Ok(None),
        }
    }

    async fn low_stock_items(&self) -> AppResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, InventoryRow>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM pharmacy_items WHERE quantity_in_stock <= reorder_level ORDER BY created_at"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl SaleLedger for PgStore {
    async fn append_sale(&self, sale: SaleRecord) -> AppResult<SaleRecord> {
        let row = sqlx::query_as::<_, SaleRow>(concat!(
            "INSERT INTO sales (",
            sale_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            sale_columns!()
        ))
        .bind(sale.id)
        .bind(sale.pharmacy_item)
        .bind(&sale.item_name)
        .bind(sale.quantity_sold)
        .bind(sale.selling_price)
        .bind(sale.cost_price)
        .bind(sale.profit)
        .bind(sale.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn find_sale(&self, id: Uuid) -> AppResult<Option<SaleRecord>> {
        let row = sqlx::query_as::<_, SaleRow>(concat!(
            "SELECT ",
            sale_columns!(),
            " FROM sales WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn remove_sale(&self, id: Uuid) -> AppResult<Option<RemovedSale>> {
        let mut tx = self.db.begin().await?;

        // A concurrent removal blocks on the row lock, then finds nothing
        let sale = sqlx::query_as::<_, SaleRow>(concat!(
            "DELETE FROM sales WHERE id = $1 RETURNING ",
            sale_columns!()
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(sale) = sale.map(SaleRecord::from) else {
            return Ok(None);
        };

        let stock = sqlx::query_scalar::<_, i32>(
            "SELECT quantity_in_stock FROM pharmacy_items WHERE id = $1 FOR UPDATE",
        )
        .bind(sale.pharmacy_item)
        .fetch_optional(&mut *tx)
        .await?;

        let restored = match stock {
            Some(stock) => {
                let restocked = stock.checked_add(sale.quantity_sold).ok_or_else(stock_overflow)?;
                let row = sqlx::query_as::<_, InventoryRow>(concat!(
                    "UPDATE pharmacy_items SET quantity_in_stock = $2, updated_at = NOW() \
                     WHERE id = $1 RETURNING ",
                    item_columns!()
                ))
                .bind(sale.pharmacy_item)
                .bind(restocked)
                .fetch_one(&mut *tx)
                .await?;
                Some(InventoryItem::from(row))
            }
            None => None,
        };

        tx.commit().await?;
        Ok(Some(RemovedSale { sale, restored }))
    }

    async fn sales_between(&self, bounds: WindowBounds) -> AppResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(concat!(
            "SELECT ",
            sale_columns!(),
            " FROM sales \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
               AND ($2::timestamptz IS NULL OR created_at < $2) \
             ORDER BY created_at"
        ))
        .bind(bounds.start)
        .bind(bounds.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn profit_between(&self, bounds: WindowBounds) -> AppResult<Decimal> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(profit), 0) FROM sales \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
               AND ($2::timestamptz IS NULL OR created_at < $2)",
        )
        .bind(bounds.start)
        .bind(bounds.end)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }

    async fn top_selling(&self, limit: usize) -> AppResult<Vec<TopSellingItem>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT item_name, SUM(quantity_sold)::int8 AS total_sold FROM sales \
             GROUP BY item_name \
             ORDER BY total_sold DESC, MIN(created_at), item_name \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(item_name, total_sold)| TopSellingItem {
                item_name,
                total_sold,
            })
            .collect())
    }

    async fn monthly_profit(&self) -> AppResult<MonthlyProfitSeries> {
        let rows = sqlx::query_as::<_, (i32, i32, Decimal)>(
            "SELECT EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::int4 AS year, \
                    EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int4 AS month, \
                    SUM(profit) AS total_profit \
             FROM sales GROUP BY 1, 2 ORDER BY 1, 2",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|(year, month, total_profit)| -> AppResult<MonthlyProfit> {
                let month = u32::try_from(month)
                    .map_err(|_| AppError::Internal(format!("Invalid month {month} in sales")))?;
                Ok(MonthlyProfit {
                    year,
                    month,
                    total_profit,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PatientStore for PgStore {
    async fn insert_patient(&self, patient: Patient) -> AppResult<Patient> {
        let row = sqlx::query_as::<_, PatientRow>(concat!(
            "INSERT INTO patients (",
            patient_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22, $23) RETURNING ",
            patient_columns!()
        ))
        .bind(patient.id)
        .bind(patient.source_clinic.as_str())
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(&patient.phone)
        .bind(&patient.address)
        .bind(&patient.region)
        .bind(&patient.district)
        .bind(&patient.health_provider_type)
        .bind(&patient.medical_history)
        .bind(&patient.current_medications)
        .bind(&patient.allergies)
        .bind(&patient.diagnosis)
        .bind(&patient.physical_exam)
        .bind(&patient.lab_results)
        .bind(Json(&patient.treatment_plan))
        .bind(Json(&patient.vaccinations))
        .bind(patient.next_appointment)
        .bind(&patient.reason)
        .bind(patient.created_at)
        .bind(patient.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(phone_conflict)?;

        row.try_into()
    }

    async fn find_patient(&self, clinic: SourceClinic, id: Uuid) -> AppResult<Option<Patient>> {
        let row = sqlx::query_as::<_, PatientRow>(concat!(
            "SELECT ",
            patient_columns!(),
            " FROM patients WHERE source_clinic = $1 AND id = $2"
        ))
        .bind(clinic.as_str())
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Patient::try_from).transpose()
    }

    async fn find_patient_by_phone(&self, clinic: SourceClinic, phone: &str) -> AppResult<Option<Patient>> {
        let row = sqlx::query_as::<_, PatientRow>(concat!(
            "SELECT ",
            patient_columns!(),
            " FROM patients WHERE source_clinic = $1 AND phone = $2"
        ))
        .bind(clinic.as_str())
        .bind(phone)
        .fetch_optional(&self.db)
        .await?;

        row.map(Patient::try_from).transpose()
    }

    async fn list_patients(&self, clinic: SourceClinic) -> AppResult<Vec<Patient>> {
        let rows = sqlx::query_as::<_, PatientRow>(concat!(
            "SELECT ",
            patient_columns!(),
            " FROM patients WHERE source_clinic = $1 ORDER BY created_at DESC NULLS LAST"
        ))
        .bind(clinic.as_str())
        .fetch_all(&self.db)
        .await?;

        into_patients(rows)
    }

    async fn update_patient(
        &self,
        clinic: SourceClinic,
        id: Uuid,
        input: PatientInput,
    ) -> AppResult<Option<Patient>> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, PatientRow>(concat!(
            "SELECT ",
            patient_columns!(),
            " FROM patients WHERE source_clinic = $1 AND id = $2 FOR UPDATE"
        ))
        .bind(clinic.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let mut patient = Patient::try_from(current)?;
        patient.apply(input, Utc::now());
        validate_patient(&patient, &clinic.rules())?;

        let saved = Self::save_patient(&mut tx, &patient).await?;
        tx.commit().await?;

        Ok(Some(saved))
    }

    async fn delete_patient(&self, clinic: SourceClinic, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM patients WHERE source_clinic = $1 AND id = $2")
            .bind(clinic.as_str())
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_patients(&self, clinic: SourceClinic, filter: &FilterCriteria) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(concat!(
            "SELECT COUNT(*) FROM patients WHERE ",
            patient_filter!()
        ))
        .bind(clinic.as_str())
        .bind(&filter.region)
        .bind(&filter.district)
        .bind(filter.created_since)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn group_patients(
        &self,
        clinic: SourceClinic,
        filter: &FilterCriteria,
        facet: DashboardFacet,
    ) -> AppResult<Vec<GroupCount>> {
        let sql = match facet {
            DashboardFacet::Gender => concat!(
                "SELECT gender AS key, COUNT(*) AS count FROM patients WHERE ",
                patient_filter!(),
                " GROUP BY gender ORDER BY count DESC, key"
            ),
            DashboardFacet::Diagnosis => concat!(
                "SELECT diagnosis AS key, COUNT(*) AS count FROM patients WHERE ",
                patient_filter!(),
                " GROUP BY diagnosis ORDER BY count DESC, key"
            ),
            DashboardFacet::CreationMonth => concat!(
                "SELECT (EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int4)::text AS key, \
                 COUNT(*) AS count FROM patients WHERE ",
                patient_filter!(),
                " AND created_at IS NOT NULL \
                 GROUP BY EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC') \
                 ORDER BY EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')"
            ),
        };

        let rows = sqlx::query_as::<_, (Option<String>, i64)>(sql)
            .bind(clinic.as_str())
            .bind(&filter.region)
            .bind(&filter.district)
            .bind(filter.created_since)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect())
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
