//! Upstream CRM acquisition.
//!
//! - `transport`: the HTTP seam (`Transport`, `ReqwestTransport`)
//! - `session`: token acquisition and renewal policy
//! - `client`: authenticated requests with the one-shot 401 retry

pub mod client;
pub mod session;
pub mod transport;

pub use client::{CrmClient, RequestOptions};
pub use session::{Session, SessionManager};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub const LOGIN_ENDPOINT: &str = "/Auth/Login/";
pub const SALES_ENDPOINT: &str = "/Admin/Referido/";

/// Identifies the calling service on every request.
pub const SERVICE_HEADER: &str = "X-Servicio";
/// API key sent with the login request.
pub const API_KEY_HEADER: &str = "X-Api-Key";
/// Session token sent with authenticated requests.
pub const TOKEN_HEADER: &str = "X-Auth-Token";
