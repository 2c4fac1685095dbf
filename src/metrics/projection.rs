//! Short-horizon sales projection.
//!
//! A plain moving-average extrapolation: the count of sales in the trailing
//! 30 days divided by 30, multiplied out. No smoothing, no seasonality.

use chrono::{Duration, NaiveDate};

use super::types::Projection;
use crate::dates::{days_remaining_in_month, month_start};
use crate::models::Sale;
use crate::numeric::{percentage, round1, round2};

/// Length of the trailing window the daily rate is taken from.
pub const TRAILING_DAYS: i64 = 30;

pub fn project(sales: &[Sale], today: NaiveDate, monthly_quota: u32) -> Projection {
    let window_start = today - Duration::days(TRAILING_DAYS);
    let this_month = month_start(today);

    let mut trailing = 0usize;
    let mut so_far_this_month = 0usize;
    for day in sales.iter().filter_map(Sale::sale_day) {
        if day > window_start && day <= today {
            trailing += 1;
        }
        if day >= this_month && day <= today {
            so_far_this_month += 1;
        }
    }

    let daily_rate = trailing as f64 / TRAILING_DAYS as f64;
    let rest_of_month = (daily_rate * days_remaining_in_month(today) as f64).round() as u64;

    let quota_probability_pct = if monthly_quota == 0 {
        100.0
    } else {
        percentage(
            (so_far_this_month as u64 + rest_of_month) as f64,
            f64::from(monthly_quota),
        )
        .min(100.0)
    };

    Projection {
        daily_rate: round2(daily_rate),
        next_week: (daily_rate * 7.0).round() as u64,
        next_month: (daily_rate * 30.0).round() as u64,
        rest_of_month,
        sales_this_month: so_far_this_month,
        monthly_quota,
        quota_probability_pct: round1(quota_probability_pct),
    }
}
