//! Sales repository façade.
//!
//! The data source is chosen once, at construction, from configuration:
//!
//! - credentials configured: [`LiveCrmSource`] (session → client → mapper)
//! - no credentials: [`FixtureSource`] (fixed dataset, no network)
//!
//! A configured source that fails returns the error. It never falls back to
//! fixture data, so an upstream outage can't pass for "no sales".

pub mod fixture;
pub mod live;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{error, info};

use crate::config::CrmConfig;
use crate::crm::{CrmClient, ReqwestTransport, SessionManager, Transport};
use crate::error::CrmResult;
use crate::models::Sale;

pub use fixture::FixtureSource;
pub use live::LiveCrmSource;

/// Optional date bounds for a listing; each missing bound gets a default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// A producer of normalized sales.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, window: DateWindow) -> CrmResult<Vec<Sale>>;

    /// Short name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}

pub struct SalesRepository {
    source: Arc<dyn DataSource>,
}

impl SalesRepository {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Pick the data source for `config`, using the production transport.
    pub fn from_config(config: &CrmConfig) -> CrmResult<Self> {
        if !config.is_configured() {
            return Ok(Self::with_transport(config, None));
        }
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.timeout)?);
        Ok(Self::with_transport(config, Some(transport)))
    }

    /// Pick the data source for `config` over a given transport.
    ///
    /// The transport is ignored (and never called) when no credentials are set.
    pub fn with_transport(config: &CrmConfig, transport: Option<Arc<dyn Transport>>) -> Self {
        let source: Arc<dyn DataSource> = match (&config.credentials, transport) {
            (Some(credentials), Some(transport)) => {
                let sessions = Arc::new(SessionManager::new(
                    transport.clone(),
                    config,
                    credentials.clone(),
                ));
                let client = CrmClient::new(
                    transport,
                    sessions,
                    config.base_url.clone(),
                    config.service_id.clone(),
                );
                Arc::new(LiveCrmSource::new(client))
            }
            _ => Arc::new(FixtureSource::new()),
        };
        info!(source = source.name(), "Sales data source selected");
        Self { source }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// List sales, optionally for one executive (id or name) and date range.
    pub async fn fetch_sales(
        &self,
        executive: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CrmResult<Vec<Sale>> {
        let sales = self
            .source
            .fetch(DateWindow { start, end })
            .await
            .map_err(|e| {
                error!(source = self.source.name(), error = %e, "Failed to fetch sales");
                e
            })?;

        let sales = match executive.map(str::trim).filter(|e| !e.is_empty()) {
            Some(executive) => sales
                .into_iter()
                .filter(|sale| sale.assigned_to(executive))
                .collect(),
            None => sales,
        };

        info!(source = self.source.name(), count = sales.len(), "Sales fetched");
        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::crm::testing::{login_ok, ScriptedTransport};
    use crate::crm::{HttpResponse, SALES_ENDPOINT};
    use crate::error::CrmError;

    fn configured() -> CrmConfig {
        CrmConfig {
            base_url: "http://crm.test".into(),
            credentials: Some(Credentials {
                username: "ventas".into(),
                password: "secreto".into(),
            }),
            ..CrmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unconfigured_uses_fixtures_without_network() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let repo = SalesRepository::with_transport(&CrmConfig::default(), Some(transport.clone()));

        let first = repo.fetch_sales(None, None, None).await.unwrap();
        let second = repo.fetch_sales(None, None, None).await.unwrap();

        assert_eq!(repo.source_name(), "fixture");
        assert_eq!(first.len(), fixture::FIXTURE_COUNT);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].sale_date >= w[1].sale_date));
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_live_failure_propagates_instead_of_fixtures() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            login_ok("tok-1"),
            Ok(HttpResponse::new(503, "Service Unavailable")),
        ]));
        let repo = SalesRepository::with_transport(&configured(), Some(transport.clone()));
        assert_eq!(repo.source_name(), "live");

        let result = repo.fetch_sales(None, None, None).await;
        assert!(matches!(result, Err(CrmError::Api { status: 503, .. })));
        assert_eq!(transport.calls_to(SALES_ENDPOINT), 1);
    }

    #[tokio::test]
    async fn test_business_error_surfaces() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            login_ok("tok-1"),
            Ok(HttpResponse::new(200, r#"{"err": true, "msg": "Filtro inválido"}"#)),
        ]));
        let repo = SalesRepository::with_transport(&configured(), Some(transport));

        match repo.fetch_sales(None, None, None).await {
            Err(CrmError::UpstreamBusiness(msg)) => assert_eq!(msg, "Filtro inválido"),
            other => panic!("expected business error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_executive_filter_matches_id_or_name() {
        let repo = SalesRepository::new(Arc::new(FixtureSource::new()));
        let all = repo.fetch_sales(None, None, None).await.unwrap();

        let by_name = repo
            .fetch_sales(Some("camila rojas"), None, None)
            .await
            .unwrap();
        assert!(!by_name.is_empty());
        assert!(by_name.iter().all(|s| s.executive_name == "Camila Rojas"));

        let id = by_name[0].executive_id.clone().unwrap();
        let by_id = repo.fetch_sales(Some(&id), None, None).await.unwrap();
        assert_eq!(by_id, by_name);

        let blank = repo.fetch_sales(Some("  "), None, None).await.unwrap();
        assert_eq!(blank.len(), all.len());

        let nobody = repo.fetch_sales(Some("Nadie"), None, None).await.unwrap();
        assert!(nobody.is_empty());
    }
}
