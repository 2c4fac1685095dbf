//! Dashboard metrics routes.
//!
//! GET /metrics/period      - KPIs for a window (default: this month so far)
//! GET /metrics/executives  - Per-executive rollup, ranked
//! GET /metrics/pipeline    - Stage distribution for the operating year
//! GET /metrics/trend       - Window vs. the preceding window of equal length
//! GET /metrics/projection  - Moving-average projection and quota odds

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{Duration, Local, NaiveDate};
use tracing::info;

use super::{api_error, ordered, query_date, upstream_error, ApiError, AppState};
use crate::dates::month_start;
use crate::metrics::projection::TRAILING_DAYS;
use crate::metrics::{
    compare_trend, days_in_window, executive_rollup, period_metrics, pipeline, project,
    sales_in_window, ExecutiveMetrics, PeriodMetrics, PipelineStage, Projection, TrendComparison,
};
use crate::models::{ApiResponse, MetricsQuery, Sale};

/// Build the metrics router.
pub fn router() -> Router {
    Router::new()
        .route("/metrics/period", get(period))
        .route("/metrics/executives", get(executives))
        .route("/metrics/pipeline", get(pipeline_stages))
        .route("/metrics/trend", get(trend))
        .route("/metrics/projection", get(projection))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Requested window, defaulting to the current month through `today`.
fn month_window(query: &MetricsQuery, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let start = query_date("fecha_inicio", query.fecha_inicio.as_deref())?
        .unwrap_or_else(|| month_start(today));
    let end = query_date("fecha_fin", query.fecha_fin.as_deref())?.unwrap_or(today);
    ordered(start, end)?;
    Ok((start, end))
}

fn owned(sales: Vec<&Sale>) -> Vec<Sale> {
    sales.into_iter().cloned().collect()
}

async fn period(
    Extension(state): Extension<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<ApiResponse<PeriodMetrics>>, ApiError> {
    let (start, end) = month_window(&query, today())?;
    let daily_quota = query.cuota_diaria.unwrap_or(state.quotas.daily);

    let sales = state
        .repository
        .fetch_sales(None, Some(start), Some(end))
        .await
        .map_err(upstream_error)?;
    let metrics = period_metrics(&sales, start, end, daily_quota);

    info!(
        start = %start,
        end = %end,
        total = metrics.total_sales,
        quota_met = metrics.quota_met,
        "Period metrics computed"
    );

    Ok(Json(ApiResponse {
        data: metrics,
        message: format!("Métricas del {} al {}", start, end),
    }))
}

async fn executives(
    Extension(state): Extension<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<ApiResponse<Vec<ExecutiveMetrics>>>, ApiError> {
    let start = query_date("fecha_inicio", query.fecha_inicio.as_deref())?;
    let end = query_date("fecha_fin", query.fecha_fin.as_deref())?;
    let bounds = (start.is_some() || end.is_some())
        .then(|| (start.unwrap_or(NaiveDate::MIN), end.unwrap_or(NaiveDate::MAX)));
    if let Some((from, to)) = bounds {
        ordered(from, to)?;
    }

    let sales = state
        .repository
        .fetch_sales(None, start, end)
        .await
        .map_err(upstream_error)?;

    // Fixture data ignores the requested window, so filter here as well.
    let sales = match bounds {
        Some((from, to)) => owned(sales_in_window(&sales, from, to)),
        None => sales,
    };

    let rollup = executive_rollup(&sales);
    info!(executives = rollup.len(), sales = sales.len(), "Executive rollup computed");

    Ok(Json(ApiResponse {
        message: format!("{} ejecutivos", rollup.len()),
        data: rollup,
    }))
}

async fn pipeline_stages(
    Extension(state): Extension<AppState>,
) -> Result<Json<ApiResponse<Vec<PipelineStage>>>, ApiError> {
    let sales = state
        .repository
        .fetch_sales(None, None, None)
        .await
        .map_err(upstream_error)?;
    let stages = pipeline(&sales, today());

    Ok(Json(ApiResponse {
        data: stages,
        message: format!("Pipeline de {} ventas", sales.len()),
    }))
}

async fn trend(
    Extension(state): Extension<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<ApiResponse<TrendComparison>>, ApiError> {
    let (start, end) = month_window(&query, today())?;
    let (previous_start, previous_end) = preceding_window(start, end).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("no preceding window exists for {} a {}", start, end),
        )
    })?;

    let sales = state
        .repository
        .fetch_sales(None, Some(previous_start), Some(end))
        .await
        .map_err(upstream_error)?;
    let current = owned(sales_in_window(&sales, start, end));
    let previous = owned(sales_in_window(&sales, previous_start, previous_end));
    let comparison = compare_trend(&current, &previous);

    info!(
        current = current.len(),
        previous = previous.len(),
        trend = ?comparison.trend,
        "Trend computed"
    );

    Ok(Json(ApiResponse {
        data: comparison,
        message: format!(
            "{} a {} frente a {} a {}",
            start, end, previous_start, previous_end
        ),
    }))
}

async fn projection(
    Extension(state): Extension<AppState>,
) -> Result<Json<ApiResponse<Projection>>, ApiError> {
    let today = today();
    // The trailing window always reaches back past the first of the month.
    let sales = state
        .repository
        .fetch_sales(None, Some(today - Duration::days(TRAILING_DAYS)), Some(today))
        .await
        .map_err(upstream_error)?;
    let projection = project(&sales, today, state.quotas.monthly);

    Ok(Json(ApiResponse {
        data: projection,
        message: format!("Proyección al {}", today),
    }))
}

/// The window of equal length that ends the day before `start`, or `None`
/// when it would fall before the earliest representable date.
pub(crate) fn preceding_window(start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let length = days_in_window(start, end);
    let previous_end = start.checked_sub_signed(Duration::days(1))?;
    let previous_start = previous_end.checked_sub_signed(Duration::days(length - 1))?;
    Some((previous_start, previous_end))
}
