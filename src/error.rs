//! Error taxonomy for the CRM acquisition path.
//!
//! Only `Api { status: 401, .. }` is ever retried, and only once, by
//! [`crate::crm::CrmClient`]. Every other variant propagates to the caller.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to the upstream CRM.
#[derive(Debug, Error)]
pub enum CrmError {
    /// Upstream rejected the configured credentials (`err: true` on login).
    #[error("CRM authentication failed: {0}")]
    Authentication(String),

    /// Upstream answered with a non-2xx HTTP status.
    #[error("CRM API error: status {status}")]
    Api { status: u16, body: String },

    /// Body was an HTML page, failed to parse as JSON, or lacked a required field.
    #[error("Malformed CRM response: {0}")]
    MalformedResponse(String),

    /// A 2xx envelope carrying `err: true` and a business message.
    #[error("CRM rejected the request: {0}")]
    UpstreamBusiness(String),

    /// Connection-level failure before any status was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A single attempt exceeded its time budget.
    #[error("CRM request timed out after {0:?}")]
    Timeout(Duration),
}

impl CrmError {
    /// HTTP status carried by the error, when the upstream produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            CrmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for the one status the client answers with a fresh login.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

pub type CrmResult<T> = Result<T, CrmError>;
