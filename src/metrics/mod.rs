//! # Metrics Engine
//!
//! Five independent aggregations over an in-memory `&[Sale]`. All of them are
//! pure: they never mutate their input, never fail, and anything malformed
//! (unparsable dates, zero amounts) simply drops out or counts as 0.
//!
//! - `period_metrics`: KPIs for a `[start, end]` window
//! - `executive_rollup`: per-executive counters, ranked
//! - `pipeline`: distribution across the fixed stage list
//! - `compare_trend`: current vs previous period
//! - `project`: moving-average projection for the week/month
//!
//! Status text is bucketed by [`status::classify_status`] everywhere.

pub mod executives;
pub mod period;
pub mod pipeline;
pub mod projection;
pub mod status;
pub mod trend;
pub mod types;

pub use executives::executive_rollup;
pub use period::{days_in_window, period_metrics, sales_in_window};
pub use pipeline::pipeline;
pub use projection::project;
pub use status::{classify_status, Outcome, OutcomeCounts, Stage, StatusClass};
pub use trend::compare_trend;
pub use types::{
    DayCount, ExecutiveMetrics, PeriodMetrics, PipelineStage, Projection, Trend, TrendComparison,
};
