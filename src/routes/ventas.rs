//! Sales listing routes.
//!
//! GET /ventas?ejecutivo_id&fecha_inicio&fecha_fin - Normalized sales

use axum::extract::Query;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tracing::info;

use super::{ordered, query_date, upstream_error, ApiError, AppState};
use crate::models::{ApiResponse, Sale, SalesQuery};

/// Build the sales router.
pub fn router() -> Router {
    Router::new().route("/ventas", get(list_sales))
}

/// List sales, optionally for one executive and date range.
///
/// Missing bounds are defaulted by the data source (operating year start
/// through today for live data).
async fn list_sales(
    Extension(state): Extension<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<ApiResponse<Vec<Sale>>>, ApiError> {
    let start = query_date("fecha_inicio", query.fecha_inicio.as_deref())?;
    let end = query_date("fecha_fin", query.fecha_fin.as_deref())?;
    if let (Some(start), Some(end)) = (start, end) {
        ordered(start, end)?;
    }

    let sales = state
        .repository
        .fetch_sales(query.ejecutivo_id.as_deref(), start, end)
        .await
        .map_err(upstream_error)?;

    info!(count = sales.len(), executive = ?query.ejecutivo_id, "Sales listed");

    let message = format!("{} ventas", sales.len());
    Ok(Json(ApiResponse {
        data: sales,
        message,
    }))
}
