//! HTTP transport seam for CRM calls.
//!
//! `SessionManager` and `CrmClient` never touch `reqwest` directly; they go
//! through [`Transport`], so tests can script upstream behaviour and count
//! calls without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CrmError, CrmResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A fully-described outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// Form-encoded body, if any.
    pub form: Option<Vec<(String, String)>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            form: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response. The body is kept as text so it can be
/// checked for HTML before any JSON parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the body is an HTML document (an upstream error page).
    pub fn is_html(&self) -> bool {
        let head: String = self
            .body
            .trim_start()
            .chars()
            .take(16)
            .collect::<String>()
            .to_ascii_lowercase();
        head.starts_with("<!doctype") || head.starts_with("<html")
    }

    /// Parse the body as JSON, rejecting HTML pages outright.
    pub fn json<T: DeserializeOwned>(&self) -> CrmResult<T> {
        if self.is_html() {
            return Err(CrmError::MalformedResponse(format!(
                "expected JSON, got an HTML page (status {})",
                self.status
            )));
        }
        serde_json::from_str(&self.body)
            .map_err(|e| CrmError::MalformedResponse(format!("invalid JSON: {}", e)))
    }

    /// Convert a non-2xx response into `CrmError::Api`.
    pub fn error_for_status(self) -> CrmResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CrmError::Api {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Something that can execute an [`HttpRequest`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> CrmResult<HttpResponse>;
}

/// Production transport backed by `reqwest`, one timeout per attempt.
pub struct ReqwestTransport {
    http: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> CrmResult<Self> {
        // The per-attempt deadline lives in `send` so it surfaces as `CrmError::Timeout`.
        let http = Client::builder().build()?;
        Ok(Self { http, timeout })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> CrmResult<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
            HttpMethod::Post => self.http.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let attempt = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, CrmError>(HttpResponse { status, body })
        };

        let response = tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| CrmError::Timeout(self.timeout))??;

        debug!(
            url = %request.url,
            status = response.status,
            bytes = response.body.len(),
            "CRM response received"
        );
        Ok(response)
    }
}
