//! Value objects produced by the metrics engine.
//!
//! Each one is built from a snapshot of sales and keeps no reference to it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::status::Stage;

/// KPIs over a `[start, end]` window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_sales: usize,
    pub total_amount: u64,
    /// Rounded to the nearest peso; 0 for an empty window.
    pub average_sale: u64,
    pub pending: usize,
    pub completed: usize,
    pub rejected: usize,
    /// completed / total * 100.
    pub conversion_rate: f64,
    /// Mean days from sale to scheduled delivery, over sales that have one.
    pub avg_resolution_days: f64,
    pub sales_per_day: f64,
    pub days_in_window: i64,
    pub quota_target: u64,
    pub quota_met: bool,
    pub quota_pct: f64,
}

/// Per-executive rollup, ranked by sale count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveMetrics {
    /// 1-based.
    pub rank: usize,
    pub executive: String,
    pub total_sales: usize,
    pub total_amount: u64,
    pub average_sale: u64,
    pub pending: usize,
    pub completed: usize,
    pub rejected: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub stage: Stage,
    pub count: usize,
    pub total_amount: u64,
    pub percentage: f64,
    pub avg_days_in_stage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Current period against the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendComparison {
    pub sales_growth_pct: f64,
    pub amount_growth_pct: f64,
    pub best_day: Option<DayCount>,
    pub worst_day: Option<DayCount>,
    pub trend: Trend,
}

/// Moving-average extrapolation of the recent sales rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub daily_rate: f64,
    pub next_week: u64,
    pub next_month: u64,
    pub rest_of_month: u64,
    pub sales_this_month: usize,
    pub monthly_quota: u32,
    pub quota_probability_pct: f64,
}
