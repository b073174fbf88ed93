//! Cross-clinic dashboard tests
//!
//! Merging of the per-source facets, filtering by region, district and
//! time window, and all-or-nothing failure across sources.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use clinic_pharmacy_backend::config::DashboardConfig;
use clinic_pharmacy_backend::error::{AppError, AppResult};
use clinic_pharmacy_backend::services::DashboardService;
use clinic_pharmacy_backend::store::{MemoryStore, PatientStore, Stores};
use shared::{
    ChartEntry, DashboardFacet, DashboardWindow, FilterCriteria, GroupCount, Patient, PatientInput,
    SourceClinic,
};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

fn dashboard_config() -> DashboardConfig {
    DashboardConfig {
        top_n: 10,
        monthly_buckets: 12,
    }
}

fn entry(name: &str, value: i64) -> ChartEntry {
    ChartEntry {
        name: name.to_string(),
        value,
    }
}

struct Seed {
    clinic: SourceClinic,
    gender: Option<&'static str>,
    diagnosis: Option<&'static str>,
    region: &'static str,
    district: &'static str,
    created_at: Option<DateTime<Utc>>,
}

fn patient(seed: &Seed) -> Patient {
    let input = PatientInput {
        gender: seed.gender.map(str::to_string),
        diagnosis: seed.diagnosis.map(str::to_string),
        region: Some(seed.region.to_string()),
        district: Some(seed.district.to_string()),
        ..Default::default()
    };
    let mut patient = Patient::register(seed.clinic, input, now());
    patient.diagnosis = seed.diagnosis.map(str::to_string);
    patient.created_at = seed.created_at;
    patient
}

/// Five patients spread over the three clinics; one legacy record has no
/// creation timestamp
async fn seeded() -> Stores {
    let seeds = [
        Seed {
            clinic: SourceClinic::Main,
            gender: Some("Male"),
            diagnosis: Some("Flu"),
            region: "Coast",
            district: "Mvita",
            created_at: Some(at(2024, 3, 10)),
        },
        Seed {
            clinic: SourceClinic::Main,
            gender: Some("Female"),
            diagnosis: Some("Flu"),
            region: "Coast",
            district: "Kilifi",
            created_at: Some(at(2024, 3, 12)),
        },
        Seed {
            clinic: SourceClinic::Clinic2,
            gender: Some("Male"),
            diagnosis: Some("Malaria"),
            region: "Rift",
            district: "Nakuru",
            created_at: Some(at(2024, 1, 5)),
        },
        Seed {
            clinic: SourceClinic::Clinic2,
            gender: Some("Female"),
            diagnosis: Some("Flu"),
            region: "Coast",
            district: "Kilifi",
            created_at: None,
        },
        Seed {
            clinic: SourceClinic::Clinic3,
            gender: None,
            diagnosis: None,
            region: "Coast",
            district: "Mvita",
            created_at: Some(at(2023, 12, 1)),
        },
    ];

    let stores = Stores::memory();
    for seed in &seeds {
        stores.patients.insert_patient(patient(seed)).await.unwrap();
    }
    stores
}

// ============================================================================
// Merging
// ============================================================================

#[tokio::test]
async fn test_unfiltered_dashboard_merges_every_clinic() {
    let stores = seeded().await;
    let stats = DashboardService::new(&stores, &dashboard_config())
        .get_dashboard_stats(None, None, None, now())
        .await
        .unwrap();

    assert_eq!(stats.totals.total_patients, 5);
    assert_eq!(stats.totals.total_visits, 5);
    assert_eq!(stats.totals.male, 2);
    assert_eq!(stats.totals.female, 2);

    assert_eq!(
        stats.gender_chart,
        vec![entry("Male", 2), entry("Female", 2), entry("Unknown", 1)]
    );
    assert_eq!(
        stats.diagnosis_chart,
        vec![entry("Flu", 3), entry("Malaria", 1), entry("Unknown", 1)]
    );
}

#[tokio::test]
async fn test_monthly_chart_skips_undated_records() {
    let stores = seeded().await;
    let stats = DashboardService::new(&stores, &dashboard_config())
        .get_dashboard_stats(None, None, None, now())
        .await
        .unwrap();

    assert_eq!(
        stats.monthly_chart,
        vec![entry("Mar", 2), entry("Jan", 1), entry("Dec", 1)]
    );
    let charted: i64 = stats.monthly_chart.iter().map(|e| e.value).sum();
    assert_eq!(charted, stats.totals.total_patients - 1);
}

#[tokio::test]
async fn test_charts_are_truncated_to_top_n() {
    let stores = seeded().await;
    let config = DashboardConfig {
        top_n: 1,
        monthly_buckets: 2,
    };
    let stats = DashboardService::new(&stores, &config)
        .get_dashboard_stats(None, None, None, now())
        .await
        .unwrap();

    assert_eq!(stats.gender_chart, vec![entry("Male", 2)]);
    assert_eq!(stats.diagnosis_chart, vec![entry("Flu", 3)]);
    assert_eq!(stats.monthly_chart.len(), 2);
    // male and female are read off the truncated chart
    assert_eq!(stats.totals.male, 2);
    assert_eq!(stats.totals.female, 0);
    assert_eq!(stats.totals.total_patients, 5);
}

#[tokio::test]
async fn test_empty_dashboard() {
    let stores = Stores::memory();
    let stats = DashboardService::new(&stores, &dashboard_config())
        .get_dashboard_stats(None, None, Some(DashboardWindow::All), now())
        .await
        .unwrap();

    assert_eq!(stats.totals.total_patients, 0);
    assert!(stats.gender_chart.is_empty());
    assert!(stats.diagnosis_chart.is_empty());
    assert!(stats.monthly_chart.is_empty());
}

// ============================================================================
// Filters
// ============================================================================

#[tokio::test]
async fn test_region_filter() {
    let stores = seeded().await;
    let stats = DashboardService::new(&stores, &dashboard_config())
        .get_dashboard_stats(Some("Coast"), None, None, now())
        .await
        .unwrap();

    assert_eq!(stats.totals.total_patients, 4);
    assert_eq!(stats.totals.male, 1);
    assert_eq!(stats.totals.female, 2);
}

#[tokio::test]
async fn test_region_and_district_filter() {
    let stores = seeded().await;
    let stats = DashboardService::new(&stores, &dashboard_config())
        .get_dashboard_stats(Some("Coast"), Some("Mvita"), None, now())
        .await
        .unwrap();

    assert_eq!(stats.totals.total_patients, 2);
    assert_eq!(stats.gender_chart, vec![entry("Male", 1), entry("Unknown", 1)]);
}

#[tokio::test]
async fn test_empty_filter_values_are_ignored() {
    let stores = seeded().await;
    let stats = DashboardService::new(&stores, &dashboard_config())
        .get_dashboard_stats(Some(""), Some(""), None, now())
        .await
        .unwrap();
    assert_eq!(stats.totals.total_patients, 5);
}

#[tokio::test]
async fn test_time_windows() {
    let stores = seeded().await;
    let service = DashboardService::new(&stores, &dashboard_config());

    let totals = |window| {
        let service = service.clone();
        async move {
            service
                .get_dashboard_stats(None, None, Some(window), now())
                .await
                .unwrap()
                .totals
                .total_patients
        }
    };

    assert_eq!(totals(DashboardWindow::Week).await, 2);
    assert_eq!(totals(DashboardWindow::Month).await, 2);
    // The undated record never satisfies a lower bound
    assert_eq!(totals(DashboardWindow::Year).await, 4);
    assert_eq!(totals(DashboardWindow::All).await, 5);
}

// ============================================================================
// Failure Across Sources
// ============================================================================

/// Patient store whose third clinic is unreachable
struct FlakyPatients {
    inner: MemoryStore,
}

impl FlakyPatients {
    fn check(clinic: SourceClinic) -> AppResult<()> {
        if clinic == SourceClinic::Clinic3 {
            return Err(AppError::Internal("clinic3 unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PatientStore for FlakyPatients {
    async fn insert_patient(&self, patient: Patient) -> AppResult<Patient> {
        self.inner.insert_patient(patient).await
    }

    async fn find_patient(&self, clinic: SourceClinic, id: Uuid) -> AppResult<Option<Patient>> {
        self.inner.find_patient(clinic, id).await
    }

    async fn find_patient_by_phone(&self, clinic: SourceClinic, phone: &str) -> AppResult<Option<Patient>> {
        self.inner.find_patient_by_phone(clinic, phone).await
    }

    async fn list_patients(&self, clinic: SourceClinic) -> AppResult<Vec<Patient>> {
        self.inner.list_patients(clinic).await
    }

    async fn update_patient(
        &self,
        clinic: SourceClinic,
        id: Uuid,
        input: PatientInput,
    ) -> AppResult<Option<Patient>> {
        self.inner.update_patient(clinic, id, input).await
    }

    async fn delete_patient(&self, clinic: SourceClinic, id: Uuid) -> AppResult<bool> {
        self.inner.delete_patient(clinic, id).await
    }

    async fn count_patients(&self, clinic: SourceClinic, filter: &FilterCriteria) -> AppResult<i64> {
        self.inner.count_patients(clinic, filter).await
    }

    async fn group_patients(
        &self,
        clinic: SourceClinic,
        filter: &FilterCriteria,
        facet: DashboardFacet,
    ) -> AppResult<Vec<GroupCount>> {
        Self::check(clinic)?;
        self.inner.group_patients(clinic, filter, facet).await
    }
}

#[tokio::test]
async fn test_one_failing_source_fails_the_dashboard() {
    let memory = Arc::new(MemoryStore::new());
    let stores = Stores {
        inventory: memory.clone(),
        sales: memory.clone(),
        patients: Arc::new(FlakyPatients {
            inner: MemoryStore::new(),
        }),
        health: memory,
    };

    let result = DashboardService::new(&stores, &dashboard_config())
        .get_dashboard_stats(None, None, None, now())
        .await;
    assert!(matches!(result, Err(AppError::Internal(_))));
}
