//! Period-over-period comparison.

use std::collections::BTreeMap;

use super::types::{DayCount, Trend, TrendComparison};
use crate::models::Sale;
use crate::numeric::{round2, saturating_total};

/// Growth beyond this many percent (either way) counts as a trend.
pub const TREND_THRESHOLD_PCT: f64 = 5.0;

/// `(current - previous) / previous * 100`, or 0 when the baseline is 0.
pub fn growth_pct(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Compare `current` against `previous`. Best and worst days are taken from
/// `current` only; ties resolve to the earliest day.
pub fn compare_trend(current: &[Sale], previous: &[Sale]) -> TrendComparison {
    let sales_growth = growth_pct(current.len() as f64, previous.len() as f64);
    let amount_growth = growth_pct(total_amount(current) as f64, total_amount(previous) as f64);

    let per_day = daily_counts(current);
    let mut best_day: Option<DayCount> = None;
    let mut worst_day: Option<DayCount> = None;
    for (&date, &count) in &per_day {
        if best_day.as_ref().map_or(true, |best| count > best.count) {
            best_day = Some(DayCount { date, count });
        }
        if worst_day.as_ref().map_or(true, |worst| count < worst.count) {
            worst_day = Some(DayCount { date, count });
        }
    }

    let trend = if sales_growth > TREND_THRESHOLD_PCT {
        Trend::Rising
    } else if sales_growth < -TREND_THRESHOLD_PCT {
        Trend::Falling
    } else {
        Trend::Stable
    };

    TrendComparison {
        sales_growth_pct: round2(sales_growth),
        amount_growth_pct: round2(amount_growth),
        best_day,
        worst_day,
        trend,
    }
}

fn total_amount(sales: &[Sale]) -> u64 {
    saturating_total(sales.iter().map(|s| s.amount))
}

fn daily_counts(sales: &[Sale]) -> BTreeMap<chrono::NaiveDate, usize> {
    let mut per_day = BTreeMap::new();
    for day in sales.iter().filter_map(Sale::sale_day) {
        *per_day.entry(day).or_insert(0) += 1;
    }
    per_day
}
