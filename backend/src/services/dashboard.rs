//! Cross-clinic patient dashboard
//!
//! Every clinic source is queried concurrently, and within a source the four
//! facet queries run concurrently too. The per-source rows are only merged
//! once every query has succeeded, so a failure never yields partial charts.

use chrono::{DateTime, TimeZone};
use futures::future::try_join_all;
use std::sync::Arc;

use shared::{
    merge_grouped_counts, merge_grouped_counts_with, month_label, DashboardFacet, DashboardStats,
    DashboardTotals, DashboardWindow, FilterCriteria, GroupCount, SourceClinic,
};

use crate::config::DashboardConfig;
use crate::error::AppResult;
use crate::store::{PatientStore, Stores};

/// Raw facet results of one clinic source
struct SourceFacets {
    total: i64,
    gender: Vec<GroupCount>,
    diagnosis: Vec<GroupCount>,
    monthly: Vec<GroupCount>,
}

#[derive(Clone)]
pub struct DashboardService {
    patients: Arc<dyn PatientStore>,
    top_n: usize,
    monthly_buckets: usize,
}

impl DashboardService {
    pub fn new(stores: &Stores, config: &DashboardConfig) -> Self {
        Self {
            patients: stores.patients.clone(),
            top_n: config.top_n,
            monthly_buckets: config.monthly_buckets,
        }
    }

    pub async fn get_dashboard_stats<Tz: TimeZone>(
        &self,
        region: Option<&str>,
        district: Option<&str>,
        window: Option<DashboardWindow>,
        now: DateTime<Tz>,
    ) -> AppResult<DashboardStats> {
        let filter = FilterCriteria::build(region, district, window, now);
        tracing::debug!(?filter, "Building dashboard stats");

        let sources = try_join_all(
            SourceClinic::ALL
                .iter()
                .map(|&clinic| self.source_facets(clinic, &filter)),
        )
        .await?;

        let mut total_patients = 0;
        let mut gender = Vec::with_capacity(sources.len());
        let mut diagnosis = Vec::with_capacity(sources.len());
        let mut monthly = Vec::with_capacity(sources.len());
        for source in sources {
            total_patients += source.total;
            gender.push(source.gender);
            diagnosis.push(source.diagnosis);
            monthly.push(source.monthly);
        }

        let gender_chart = merge_grouped_counts(gender, self.top_n);
        let diagnosis_chart = merge_grouped_counts(diagnosis, self.top_n);
        let monthly_chart = merge_grouped_counts_with(monthly, self.monthly_buckets, month_label);

        let count_of = |name: &str| {
            gender_chart
                .iter()
                .find(|entry| entry.name == name)
                .map_or(0, |entry| entry.value)
        };

        let totals = DashboardTotals {
            total_patients,
            male: count_of("Male"),
            female: count_of("Female"),
            total_visits: total_patients,
        };

        Ok(DashboardStats {
            totals,
            gender_chart,
            diagnosis_chart,
            monthly_chart,
        })
    }

    async fn source_facets(&self, clinic: SourceClinic, filter: &FilterCriteria) -> AppResult<SourceFacets> {
        let store = &self.patients;
        let (total, gender, diagnosis, monthly) = tokio::try_join!(
            store.count_patients(clinic, filter),
            store.group_patients(clinic, filter, DashboardFacet::Gender),
            store.group_patients(clinic, filter, DashboardFacet::Diagnosis),
            store.group_patients(clinic, filter, DashboardFacet::CreationMonth),
        )?;

        Ok(SourceFacets {
            total,
            gender,
            diagnosis,
            monthly,
        })
    }
}
