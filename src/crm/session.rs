//! CRM session management.
//!
//! The session token is the only shared mutable state in the acquisition
//! path. It lives behind an async mutex that is held for the whole
//! check-and-login sequence, so concurrent callers never issue overlapping
//! logins or observe a half-replaced token.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{CrmConfig, Credentials, SessionPolicy};
use crate::crm::transport::{HttpMethod, HttpRequest, Transport};
use crate::crm::{API_KEY_HEADER, LOGIN_ENDPOINT, SERVICE_HEADER};
use crate::error::{CrmError, CrmResult};
use crate::models::{CrmEnvelope, LoginInfo};

/// An authenticated CRM session.
#[derive(Clone)]
pub struct Session {
    token: String,
    acquired_at: Instant,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn age(&self) -> std::time::Duration {
        self.acquired_at.elapsed()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("age", &self.age())
            .finish()
    }
}

/// Acquires and holds the CRM token.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    login_url: String,
    api_key: String,
    service_id: String,
    credentials: Credentials,
    policy: SessionPolicy,
    current: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, config: &CrmConfig, credentials: Credentials) -> Self {
        Self {
            transport,
            login_url: format!("{}{}", config.base_url, LOGIN_ENDPOINT),
            api_key: config.api_key.clone(),
            service_id: config.service_id.clone(),
            credentials,
            policy: config.session_policy,
            current: Mutex::new(None),
        }
    }

    /// Log in with the configured credentials and cache the new session.
    pub async fn login(&self) -> CrmResult<Session> {
        let mut current = self.current.lock().await;
        let session = self.authenticate().await?;
        *current = Some(session.clone());
        Ok(session)
    }

    /// Session to use for the next request, according to the policy.
    ///
    /// `RenewPerRequest` drops whatever is cached and logs in again;
    /// `ReuseUntilRejected` returns the cached session when there is one.
    pub async fn session_for_request(&self) -> CrmResult<Session> {
        let mut current = self.current.lock().await;
        match self.policy {
            SessionPolicy::RenewPerRequest => {
                *current = None;
            }
            SessionPolicy::ReuseUntilRejected => {
                if let Some(session) = current.as_ref() {
                    debug!(age = ?session.age(), "Reusing cached CRM session");
                    return Ok(session.clone());
                }
            }
        }
        let session = self.authenticate().await?;
        *current = Some(session.clone());
        Ok(session)
    }

    /// Discard the cached session and log in again, regardless of policy.
    pub async fn renew(&self) -> CrmResult<Session> {
        let mut current = self.current.lock().await;
        *current = None;
        let session = self.authenticate().await?;
        *current = Some(session.clone());
        Ok(session)
    }

    pub async fn has_session(&self) -> bool {
        self.current.lock().await.is_some()
    }

    /// One login round-trip. Callers hold the `current` lock.
    async fn authenticate(&self) -> CrmResult<Session> {
        let mut request = HttpRequest::new(HttpMethod::Post, self.login_url.as_str())
            .header(SERVICE_HEADER, &self.service_id)
            .header(API_KEY_HEADER, &self.api_key);
        request.form = Some(vec![
            ("log_usu".to_string(), self.credentials.username.clone()),
            ("log_cla".to_string(), self.credentials.password.clone()),
        ]);

        let response = self.transport.send(&request).await?.error_for_status()?;
        let envelope: CrmEnvelope<LoginInfo> = response.json()?;

        if envelope.err {
            warn!(username = %self.credentials.username, msg = %envelope.msg, "CRM login rejected");
            return Err(CrmError::Authentication(envelope.msg));
        }

        let token = envelope
            .inf
            .and_then(|info| info.adm_tok)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| CrmError::MalformedResponse("login response without adm_tok".into()))?;

        info!(username = %self.credentials.username, "CRM login succeeded");
        Ok(Session {
            token,
            acquired_at: Instant::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::testing::{login_ok, ScriptedTransport};
    use crate::crm::transport::HttpResponse;

    fn manager(transport: Arc<ScriptedTransport>, policy: SessionPolicy) -> SessionManager {
        let config = CrmConfig {
            base_url: "http://crm.test".into(),
            api_key: "key-123".into(),
            service_id: "dashboard-ventas".into(),
            session_policy: policy,
            ..CrmConfig::default()
        };
        let credentials = Credentials {
            username: "ventas".into(),
            password: "secreto".into(),
        };
        SessionManager::new(transport, &config, credentials)
    }

    #[tokio::test]
    async fn test_login_sends_form_and_identity_headers() {
        let transport = Arc::new(ScriptedTransport::new(vec![login_ok("tok-1")]));
        let sessions = manager(transport.clone(), SessionPolicy::RenewPerRequest);

        let session = sessions.login().await.unwrap();
        assert_eq!(session.token(), "tok-1");
        assert!(sessions.has_session().await);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let login = &requests[0];
        assert_eq!(login.method, HttpMethod::Post);
        assert_eq!(login.url, "http://crm.test/Auth/Login/");
        assert_eq!(login.header_value(SERVICE_HEADER), Some("dashboard-ventas"));
        assert_eq!(login.header_value(API_KEY_HEADER), Some("key-123"));
        let form = login.form.as_ref().unwrap();
        assert!(form.contains(&("log_usu".to_string(), "ventas".to_string())));
        assert!(form.contains(&("log_cla".to_string(), "secreto".to_string())));
    }

    #[tokio::test]
    async fn test_login_err_true_is_authentication_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(
            200,
            r#"{"err": true, "msg": "Usuario o clave incorrecta", "inf": null}"#,
        ))]));
        let sessions = manager(transport, SessionPolicy::RenewPerRequest);

        match sessions.login().await {
            Err(CrmError::Authentication(msg)) => assert_eq!(msg, "Usuario o clave incorrecta"),
            other => panic!("expected authentication error, got {:?}", other),
        }
        assert!(!sessions.has_session().await);
    }

    #[tokio::test]
    async fn test_login_without_token_is_malformed() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(
            200,
            r#"{"err": false, "msg": "ok", "inf": {"adm_tok": ""}}"#,
        ))]));
        let sessions = manager(transport, SessionPolicy::RenewPerRequest);
        assert!(matches!(
            sessions.login().await,
            Err(CrmError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_renew_policy_logs_in_for_every_request() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            login_ok("tok-1"),
            login_ok("tok-2"),
        ]));
        let sessions = manager(transport.clone(), SessionPolicy::RenewPerRequest);

        assert_eq!(sessions.session_for_request().await.unwrap().token(), "tok-1");
        assert_eq!(sessions.session_for_request().await.unwrap().token(), "tok-2");
        assert_eq!(transport.calls_to(LOGIN_ENDPOINT), 2);
    }

    #[tokio::test]
    async fn test_reuse_policy_keeps_token_until_renewed() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            login_ok("tok-1"),
            login_ok("tok-2"),
        ]));
        let sessions = manager(transport.clone(), SessionPolicy::ReuseUntilRejected);

        assert_eq!(sessions.session_for_request().await.unwrap().token(), "tok-1");
        assert_eq!(sessions.session_for_request().await.unwrap().token(), "tok-1");
        assert_eq!(transport.calls_to(LOGIN_ENDPOINT), 1);

        assert_eq!(sessions.renew().await.unwrap().token(), "tok-2");
        assert_eq!(transport.calls_to(LOGIN_ENDPOINT), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_login_when_reusing() {
        let transport = Arc::new(ScriptedTransport::new(vec![login_ok("tok-1")]));
        let sessions = Arc::new(manager(transport.clone(), SessionPolicy::ReuseUntilRejected));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sessions = sessions.clone();
                tokio::spawn(async move { sessions.session_for_request().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().token(), "tok-1");
        }
        assert_eq!(transport.calls_to(LOGIN_ENDPOINT), 1);
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session {
            token: "super-secret".into(),
            acquired_at: Instant::now(),
        };
        assert!(!format!("{:?}", session).contains("super-secret"));
    }
}
