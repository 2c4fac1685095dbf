//! Live CRM data source.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::debug;

use super::{DataSource, DateWindow};
use crate::crm::{CrmClient, RequestOptions, SALES_ENDPOINT};
use crate::dates::{default_window, QUERY_DATE_FORMAT};
use crate::error::CrmResult;
use crate::mapper::map_records;
use crate::models::{CrmEnvelope, RawSale, Sale};

pub struct LiveCrmSource {
    client: CrmClient,
}

impl LiveCrmSource {
    pub fn new(client: CrmClient) -> Self {
        Self { client }
    }

    /// Listing query for a window, with missing bounds defaulted for `today`.
    pub fn listing_options(window: DateWindow, today: NaiveDate) -> RequestOptions {
        let (start, end) = resolve_window(window, today);
        RequestOptions::get()
            .query("sel_fil", "1")
            .query("page", "1")
            .query("sel_ini_des", start.format(QUERY_DATE_FORMAT).to_string())
            .query("sel_ini_has", end.format(QUERY_DATE_FORMAT).to_string())
    }
}

/// Fill missing bounds: operating-year start and today.
pub fn resolve_window(window: DateWindow, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (default_start, default_end) = default_window(today);
    (
        window.start.unwrap_or(default_start),
        window.end.unwrap_or(default_end),
    )
}

#[async_trait]
impl DataSource for LiveCrmSource {
    async fn fetch(&self, window: DateWindow) -> CrmResult<Vec<Sale>> {
        let options = Self::listing_options(window, Local::now().date_naive());
        let envelope: CrmEnvelope<Vec<RawSale>> =
            self.client.request(SALES_ENDPOINT, &options).await?;
        let raw = envelope.into_inf()?;
        debug!(records = raw.len(), "Mapping CRM sales records");
        Ok(map_records(&raw))
    }

    fn name(&self) -> &'static str {
        "live"
    }
}
