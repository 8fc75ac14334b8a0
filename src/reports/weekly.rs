//! Trailing-7-day attendance aggregation for the dashboard.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::models::attendance::{AttendanceStatus, DatedStatus};

/// One bar of the 7-day chart.
#[derive(Debug, Clone, Serialize)]
pub struct DayPoint {
    pub date: NaiveDate,
    /// Short weekday label ("Mon" .. "Sun").
    pub day: String,
    pub approved: i64,
}

#[derive(Debug, Serialize)]
pub struct WeeklyReport {
    /// Rounded percentage of approved records among weekday (Mon-Fri)
    /// records in the window; 0 when there are no weekday records.
    pub rate: u32,
    /// Approved count per day, oldest first, weekends included.
    pub series: Vec<DayPoint>,
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Aggregate a user's records over the 7 calendar days ending at `today`
/// (inclusive). Weekend records show up in the chart series but never count
/// toward the rate, in either direction.
pub fn weekly_report(today: NaiveDate, records: &[DatedStatus]) -> WeeklyReport {
    let mut series = Vec::with_capacity(7);
    let mut weekday_total = 0i64;
    let mut weekday_approved = 0i64;

    for back in (0..7).rev() {
        let date = today - Days::new(back);
        let date_str = date.format("%Y-%m-%d").to_string();

        let day_records: Vec<&DatedStatus> =
            records.iter().filter(|r| r.date == date_str).collect();
        let approved = day_records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Approved)
            .count() as i64;

        if !is_weekend(date.weekday()) {
            weekday_total += day_records.len() as i64;
            weekday_approved += approved;
        }

        series.push(DayPoint {
            date,
            day: date.format("%a").to_string(),
            approved,
        });
    }

    let rate = if weekday_total > 0 {
        (100.0 * weekday_approved as f64 / weekday_total as f64).round() as u32
    } else {
        0
    };

    WeeklyReport { rate, series }
}
