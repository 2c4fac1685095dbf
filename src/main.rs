//! # Sales Dashboard
//!
//! Serves normalized CRM sales and dashboard metrics over HTTP.
//!
//! ## Data source
//!
//! - `CRM_USERNAME` and `CRM_PASSWORD` set: live SmartCRM listing
//! - otherwise: the built-in fixture dataset, no network access

use sales_dashboard_core::config::Config;
use sales_dashboard_core::repository::SalesRepository;
use sales_dashboard_core::{create_app, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_dashboard_core=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting sales dashboard");

    let config = Config::from_env();
    info!(
        crm = %config.crm.base_url,
        configured = config.crm.is_configured(),
        policy = ?config.crm.session_policy,
        timeout = ?config.crm.timeout,
        daily_quota = config.quotas.daily,
        monthly_quota = config.quotas.monthly,
        "Configuration loaded"
    );

    let repository = SalesRepository::from_config(&config.crm)?;
    let app = create_app(AppState::new(repository, config.quotas));

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
