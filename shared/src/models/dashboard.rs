//! Dashboard aggregation models

use chrono::{DateTime, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Patient;

/// One row of a per-source grouped count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    /// Absent keys are reported under `"Unknown"` once merged
    #[serde(rename = "_id")]
    pub key: Option<String>,
    pub count: i64,
}

impl GroupCount {
    pub fn new(key: Option<&str>, count: i64) -> Self {
        Self {
            key: key.map(str::to_string),
            count,
        }
    }
}

/// A merged, ranked `{name, value}` row; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub name: String,
    pub value: i64,
}

/// Dimension of the dashboard aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardFacet {
    Gender,
    Diagnosis,
    /// Month of year (1-12) of the creation timestamp
    CreationMonth,
}

/// Named lower bound on patient creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardWindow {
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl DashboardWindow {
    /// Earliest creation time admitted by the window, if any
    pub fn lower_bound<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Option<DateTime<Utc>> {
        let now = now.with_timezone(&Utc);
        match self {
            DashboardWindow::Week => Some(now - chrono::Duration::days(7)),
            DashboardWindow::Month => now.checked_sub_months(Months::new(1)),
            DashboardWindow::Year => now.checked_sub_months(Months::new(12)),
            DashboardWindow::All => None,
        }
    }
}

impl FromStr for DashboardWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(DashboardWindow::Week),
            "month" => Ok(DashboardWindow::Month),
            "year" => Ok(DashboardWindow::Year),
            "all" => Ok(DashboardWindow::All),
            other => Err(format!("Unknown time filter: {}", other)),
        }
    }
}

/// Match predicate applied identically to every patient source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub region: Option<String>,
    pub district: Option<String>,
    pub created_since: Option<DateTime<Utc>>,
}

impl FilterCriteria {
    /// Combine the optional equality filters with the window's lower bound.
    /// Empty strings count as "no filter".
    pub fn build<Tz: TimeZone>(
        region: Option<&str>,
        district: Option<&str>,
        window: Option<DashboardWindow>,
        now: DateTime<Tz>,
    ) -> Self {
        let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            region: non_empty(region),
            district: non_empty(district),
            created_since: window.and_then(|w| w.lower_bound(now)),
        }
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        if let Some(region) = &self.region {
            if patient.region.as_deref() != Some(region.as_str()) {
                return false;
            }
        }
        if let Some(district) = &self.district {
            if patient.district.as_deref() != Some(district.as_str()) {
                return false;
            }
        }
        if let Some(since) = self.created_since {
            // A missing timestamp never satisfies a lower bound
            match patient.created_at {
                Some(created_at) if created_at >= since => {}
                _ => return false,
            }
        }
        true
    }
}

/// Headline numbers of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub total_patients: i64,
    pub male: i64,
    pub female: i64,
    pub total_visits: i64,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub totals: DashboardTotals,
    pub gender_chart: Vec<ChartEntry>,
    pub diagnosis_chart: Vec<ChartEntry>,
    pub monthly_chart: Vec<ChartEntry>,
}
