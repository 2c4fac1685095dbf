//! Runtime configuration for the sales dashboard service.
//!
//! Everything is read from environment variables (a `.env` file is honoured
//! by `main` through `dotenvy`). Missing CRM credentials are not an error:
//! they switch the repository to the fixture data source.

use std::time::Duration;

/// Default upstream CRM base URL.
pub const DEFAULT_CRM_BASE_URL: &str = "https://api.smartcrm.cl";

/// Default service identity sent in the `X-Servicio` header.
pub const DEFAULT_SERVICE_ID: &str = "dashboard-ventas";

/// Per-attempt timeout for outbound CRM calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Daily sales target used by period metrics.
pub const DEFAULT_DAILY_QUOTA: u32 = 5;

/// Monthly sales target used by the projection.
pub const DEFAULT_MONTHLY_QUOTA: u32 = 150;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// How the session manager treats a token it already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Discard the token and log in again before every request.
    #[default]
    RenewPerRequest,
    /// Keep the token until the CRM answers 401.
    ReuseUntilRejected,
}

impl SessionPolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "renew" | "renew_per_request" => Some(SessionPolicy::RenewPerRequest),
            "reuse" | "reuse_until_rejected" => Some(SessionPolicy::ReuseUntilRejected),
            _ => None,
        }
    }
}

/// Login credentials for the upstream CRM.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection settings for the upstream CRM.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub base_url: String,
    pub api_key: String,
    pub service_id: String,
    /// `None` when no username/password pair is configured.
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    pub session_policy: SessionPolicy,
}

impl CrmConfig {
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CRM_BASE_URL.to_string(),
            api_key: String::new(),
            service_id: DEFAULT_SERVICE_ID.to_string(),
            credentials: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_policy: SessionPolicy::default(),
        }
    }
}

/// Quota targets fed into the metrics engine.
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    pub daily: u32,
    pub monthly: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily: DEFAULT_DAILY_QUOTA,
            monthly: DEFAULT_MONTHLY_QUOTA,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub crm: CrmConfig,
    pub quotas: QuotaConfig,
    pub bind_addr: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparsable numbers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials = match (non_empty("CRM_USERNAME"), non_empty("CRM_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        let timeout_secs = non_empty("CRM_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let session_policy = non_empty("CRM_SESSION_POLICY")
            .and_then(|v| SessionPolicy::parse(&v))
            .unwrap_or_default();

        let crm = CrmConfig {
            base_url: non_empty("CRM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_CRM_BASE_URL.to_string()),
            api_key: non_empty("CRM_API_KEY").unwrap_or_default(),
            service_id: non_empty("CRM_SERVICE_ID")
                .unwrap_or_else(|| DEFAULT_SERVICE_ID.to_string()),
            credentials,
            timeout: Duration::from_secs(timeout_secs),
            session_policy,
        };

        let quotas = QuotaConfig {
            daily: non_empty("DAILY_QUOTA")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_DAILY_QUOTA),
            monthly: non_empty("MONTHLY_QUOTA")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MONTHLY_QUOTA),
        };

        Self {
            crm,
            quotas,
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
