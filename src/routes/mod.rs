//! HTTP route modules for the sales dashboard.
//!
//! - `health`: liveness and active data source
//! - `ventas`: normalized sales listing
//! - `metrics`: period, executive, pipeline, trend and projection views

pub mod health;
pub mod metrics;
pub mod ventas;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use tracing::{error, warn};

use crate::config::QuotaConfig;
use crate::dates::parse_date;
use crate::error::CrmError;
use crate::models::ErrorResponse;
use crate::repository::SalesRepository;

/// State shared with every handler through an `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<SalesRepository>,
    pub quotas: QuotaConfig,
}

impl AppState {
    pub fn new(repository: SalesRepository, quotas: QuotaConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            quotas,
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Upstream failures map to `502 Bad Gateway`.
pub(crate) fn upstream_error(e: CrmError) -> ApiError {
    error!(error = %e, status = ?e.status(), "CRM request failed");
    api_error(StatusCode::BAD_GATEWAY, format!("CRM unavailable: {}", e))
}

/// Parse an optional date query parameter (`YYYY-MM-DD` or any CRM date form).
pub(crate) fn query_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    let raw = match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw,
        None => return Ok(None),
    };
    match parse_date(raw) {
        Some(date) => Ok(Some(date)),
        None => {
            warn!(parameter = %name, value = %raw, "Rejected unparsable date");
            Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("invalid {}: expected YYYY-MM-DD, got {:?}", name, raw),
            ))
        }
    }
}

/// Reject windows whose end precedes their start.
pub(crate) fn ordered(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if end < start {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("fecha_fin ({}) is before fecha_inicio ({})", end, start),
        ));
    }
    Ok(())
}
