//! Sales report models

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use super::SaleRecord;
use crate::aggregate::{group_sum, rank_desc};

/// Total profit over a window; zero when nothing matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSummary {
    pub total_profit: Decimal,
}

impl ProfitSummary {
    pub fn of<'a>(sales: impl IntoIterator<Item = &'a SaleRecord>) -> Self {
        Self {
            total_profit: sales.into_iter().map(|s| s.profit).sum(),
        }
    }
}

/// Units sold per item name, all time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingItem {
    pub item_name: String,
    pub total_sold: i64,
}

/// Rank item names by units sold. Ties keep the order in which the names
/// first appear in `sales`.
pub fn top_selling<'a>(sales: impl IntoIterator<Item = &'a SaleRecord>, limit: usize) -> Vec<TopSellingItem> {
    let totals = group_sum(
        sales,
        |s| s.item_name.clone(),
        |s| i64::from(s.quantity_sold),
    );
    rank_desc(totals, limit, |(_, sold)| *sold)
        .into_iter()
        .map(|(item_name, total_sold)| TopSellingItem {
            item_name,
            total_sold,
        })
        .collect()
}

/// Profit of one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProfit {
    pub year: i32,
    pub month: u32,
    pub total_profit: Decimal,
}

/// Profit per `(year, month)` of sale creation (UTC), oldest month first
///
/// The series is finite and can be iterated any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyProfitSeries {
    buckets: BTreeMap<(i32, u32), Decimal>,
}

impl MonthlyProfitSeries {
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a SaleRecord>) -> Self {
        let mut buckets = BTreeMap::new();
        for sale in sales {
            let key = (sale.created_at.year(), sale.created_at.month());
            *buckets.entry(key).or_insert(Decimal::ZERO) += sale.profit;
        }
        Self { buckets }
    }

    pub fn iter(&self) -> impl Iterator<Item = MonthlyProfit> + '_ {
        self.buckets
            .iter()
            .map(|(&(year, month), &total_profit)| MonthlyProfit {
                year,
                month,
                total_profit,
            })
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Collect already-grouped rows; repeated months are summed
impl FromIterator<MonthlyProfit> for MonthlyProfitSeries {
    fn from_iter<I: IntoIterator<Item = MonthlyProfit>>(rows: I) -> Self {
        let mut buckets = BTreeMap::new();
        for row in rows {
            *buckets.entry((row.year, row.month)).or_insert(Decimal::ZERO) += row.total_profit;
        }
        Self { buckets }
    }
}

impl Serialize for MonthlyProfitSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sale(name: &str, qty: i32, profit: Decimal, y: i32, m: u32, d: u32) -> SaleRecord {
        SaleRecord {
            id: Uuid::new_v4(),
            pharmacy_item: Uuid::new_v4(),
            item_name: name.to_string(),
            quantity_sold: qty,
            selling_price: Decimal::ZERO,
            cost_price: Decimal::ZERO,
            profit,
            created_at: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_profit_summary_of_nothing_is_zero() {
        assert_eq!(ProfitSummary::of(&[]).total_profit, Decimal::ZERO);
    }

    #[test]
    fn test_top_selling_groups_by_name() {
        let sales = vec![
            sale("Paracetamol", 3, dec("1"), 2024, 1, 1),
            sale("Amoxicillin", 5, dec("1"), 2024, 1, 2),
            sale("Paracetamol", 4, dec("1"), 2024, 1, 3),
            sale("Ibuprofen", 5, dec("1"), 2024, 1, 4),
        ];
        let top = top_selling(&sales, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].item_name, "Paracetamol");
        assert_eq!(top[0].total_sold, 7);
        // tie between Amoxicillin and Ibuprofen resolves to first seen
        assert_eq!(top[1].item_name, "Amoxicillin");
    }

    #[test]
    fn test_monthly_series_is_chronological() {
        let sales = vec![
            sale("A", 1, dec("10"), 2024, 3, 5),
            sale("A", 1, dec("5"), 2023, 12, 31),
            sale("A", 1, dec("2.5"), 2024, 3, 20),
        ];
        let series = MonthlyProfitSeries::from_sales(&sales);
        let rows: Vec<_> = series.iter().collect();
        assert_eq!(
            rows,
            vec![
                MonthlyProfit { year: 2023, month: 12, total_profit: dec("5") },
                MonthlyProfit { year: 2024, month: 3, total_profit: dec("12.5") },
            ]
        );
        // restartable
        assert_eq!(series.iter().count(), 2);
    }

    #[test]
    fn test_monthly_series_from_grouped_rows() {
        let series: MonthlyProfitSeries = vec![
            MonthlyProfit { year: 2024, month: 2, total_profit: dec("7") },
            MonthlyProfit { year: 2023, month: 11, total_profit: dec("1.5") },
        ]
        .into_iter()
        .collect();
        let months: Vec<_> = series.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(months, vec![(2023, 11), (2024, 2)]);
    }

    #[test]
    fn test_monthly_series_serializes_as_array() {
        let series = MonthlyProfitSeries::from_sales(&[sale("A", 1, dec("4"), 2024, 5, 1)]);
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json[0]["year"], 2024);
        assert_eq!(json[0]["month"], 5);
        assert_eq!(json[0]["totalProfit"], 4.0);
    }
}
