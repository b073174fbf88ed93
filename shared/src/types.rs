//! Common types used across the platform

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` interval over creation timestamps.
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowBounds {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl WindowBounds {
    pub const UNBOUNDED: WindowBounds = WindowBounds { start: None, end: None };

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at < end)
    }
}

/// Named reporting window over sale timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Local midnight to now
    Today,
    /// `now - n days` to now
    LastDays(u32),
    /// Local midnight `n - 1` days ago to now, so the window covers `n`
    /// calendar days including today
    TrailingDays(u32),
    /// First day of the current month to now
    ThisMonth,
    /// Explicit inclusive calendar dates
    Range { start: NaiveDate, end: NaiveDate },
    All,
}

impl TimeWindow {
    /// Explicit range; `end` must not precede `start`
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self, &'static str> {
        if end < start {
            return Err("End date must not be before start date");
        }
        Ok(TimeWindow::Range { start, end })
    }

    /// Resolve the window against `now`, in `now`'s time zone
    pub fn bounds<Tz: TimeZone>(&self, now: DateTime<Tz>) -> WindowBounds {
        let tz = now.timezone();
        let today = now.date_naive();
        let now_utc = now.with_timezone(&Utc);

        match *self {
            TimeWindow::Today => WindowBounds {
                start: Some(start_of_day(&tz, today)),
                end: Some(now_utc),
            },
            TimeWindow::LastDays(days) => WindowBounds {
                start: Some(now_utc - Duration::days(i64::from(days))),
                end: Some(now_utc),
            },
            TimeWindow::TrailingDays(days) => {
                let first = today - Duration::days(i64::from(days.saturating_sub(1)));
                WindowBounds {
                    start: Some(start_of_day(&tz, first)),
                    end: Some(now_utc),
                }
            }
            TimeWindow::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                WindowBounds {
                    start: Some(start_of_day(&tz, first)),
                    end: Some(now_utc),
                }
            }
            TimeWindow::Range { start, end } => WindowBounds {
                start: Some(start_of_day(&tz, start)),
                end: end.succ_opt().map(|next| start_of_day(&tz, next)),
            },
            TimeWindow::All => WindowBounds::UNBOUNDED,
        }
    }
}

/// Midnight of `date` in `tz`, as UTC
///
/// When midnight does not exist locally (DST gap) the earliest valid instant
/// of that day is used.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=3)
        .find_map(|h| {
            tz.from_local_datetime(&(midnight + Duration::hours(h)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_today_starts_at_local_midnight() {
        let now = at(2024, 3, 15, 14, 30);
        let b = TimeWindow::Today.bounds(now);
        assert_eq!(b.start, Some(at(2024, 3, 15, 0, 0)));
        assert_eq!(b.end, Some(now));
    }

    #[test]
    fn test_today_respects_offset() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).unwrap();
        let b = TimeWindow::Today.bounds(now);
        // 00:00 at +03:00 is 21:00 UTC the previous day
        assert_eq!(b.start, Some(at(2024, 3, 14, 21, 0)));
    }

    #[test]
    fn test_last_days_is_rolling() {
        let now = at(2024, 3, 15, 14, 30);
        let b = TimeWindow::LastDays(7).bounds(now);
        assert_eq!(b.start, Some(at(2024, 3, 8, 14, 30)));
    }

    #[test]
    fn test_trailing_days_is_calendar_aligned() {
        let now = at(2024, 3, 15, 14, 30);
        let b = TimeWindow::TrailingDays(7).bounds(now);
        assert_eq!(b.start, Some(at(2024, 3, 9, 0, 0)));
        let b = TimeWindow::TrailingDays(1).bounds(now);
        assert_eq!(b.start, Some(at(2024, 3, 15, 0, 0)));
    }

    #[test]
    fn test_this_month() {
        let b = TimeWindow::ThisMonth.bounds(at(2024, 2, 29, 10, 0));
        assert_eq!(b.start, Some(at(2024, 2, 1, 0, 0)));
    }

    #[test]
    fn test_range_includes_whole_end_day() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let b = TimeWindow::range(start, end).unwrap().bounds(at(2024, 6, 1, 0, 0));
        assert!(b.contains(at(2024, 1, 31, 23, 59)));
        assert!(!b.contains(at(2024, 2, 1, 0, 0)));
        assert!(b.contains(at(2024, 1, 1, 0, 0)));
        assert!(!b.contains(at(2023, 12, 31, 23, 59)));
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(TimeWindow::range(start, end).is_err());
    }

    #[test]
    fn test_bounds_are_half_open() {
        let now = at(2024, 3, 15, 14, 30);
        let b = TimeWindow::Today.bounds(now);
        assert!(!b.contains(now));
        assert!(b.contains(at(2024, 3, 15, 0, 0)));
    }

    #[test]
    fn test_all_is_unbounded() {
        assert!(TimeWindow::All.bounds(Utc::now()).contains(at(1999, 1, 1, 0, 0)));
    }
}
