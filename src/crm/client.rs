//! Authenticated CRM client with the single-retry protocol.
//!
//! 1. Obtain a session from [`SessionManager`] (by default a fresh login)
//! 2. Send the request with the token and service-identity headers
//! 3. On 401: renew the session once and repeat the identical request once
//! 4. Any other non-2xx is a `CrmError::Api`; HTML or bad JSON is
//!    `CrmError::MalformedResponse`

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::crm::session::SessionManager;
use crate::crm::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::crm::{SERVICE_HEADER, TOKEN_HEADER};
use crate::error::CrmResult;

/// Method, query and body of a CRM call; the client adds URL and auth.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub query: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: HttpMethod::Get,
            query: Vec::new(),
            form: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

pub struct CrmClient {
    transport: Arc<dyn Transport>,
    sessions: Arc<SessionManager>,
    base_url: String,
    service_id: String,
}

impl CrmClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        sessions: Arc<SessionManager>,
        base_url: impl Into<String>,
        service_id: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            sessions,
            base_url: base_url.into(),
            service_id: service_id.into(),
        }
    }

    /// Perform an authenticated call and decode the JSON body into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> CrmResult<T> {
        let session = self.sessions.session_for_request().await?;
        let mut response = self.send(endpoint, options, session.token()).await?;

        if response.status == 401 {
            warn!(endpoint = %endpoint, "CRM rejected the session, logging in again and retrying once");
            let session = self.sessions.renew().await?;
            response = self.send(endpoint, options, session.token()).await?;
        }

        response.error_for_status()?.json()
    }

    async fn send(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        token: &str,
    ) -> CrmResult<HttpResponse> {
        let request = self.build_request(endpoint, options, token);
        debug!(endpoint = %endpoint, query = ?options.query, "Sending CRM request");
        self.transport.send(&request).await
    }

    fn build_request(&self, endpoint: &str, options: &RequestOptions, token: &str) -> HttpRequest {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        let mut request = HttpRequest::new(options.method, url)
            .header(SERVICE_HEADER, &self.service_id)
            .header(TOKEN_HEADER, token);
        request.query = options.query.clone();
        request.form = options.form.clone();
        request
    }
}
