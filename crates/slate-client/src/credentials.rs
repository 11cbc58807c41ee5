//! Credential lifecycle management.
//!
//! Owns the current access credential and the login session used to renew
//! it. Refresh is single-flight: a fast read path serves the common case,
//! and concurrent callers that all observe a stale credential serialize on
//! the write lock, with a double-check so only the first performs the
//! login round-trip.

use chrono::Utc;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use slate_models::Credential;

use crate::error::{ClientError, ClientResult};
use crate::metrics::record_credential_refresh;
use crate::types::AuthResponse;

/// Login session and the credential it produced.
#[derive(Debug, Default)]
struct Session {
    hostname: Option<String>,
    login: Option<String>,
    password: Option<String>,
    credential: Option<Credential>,
}

/// Thread-safe credential store with single-flight refresh.
pub struct CredentialStore {
    http: Client,
    session: RwLock<Session>,
}

impl CredentialStore {
    /// Create an empty store. No credential is held until
    /// [`authenticate`](Self::authenticate) succeeds.
    pub fn new(http: Client) -> Self {
        Self {
            http,
            session: RwLock::new(Session::default()),
        }
    }

    /// Log in with Basic auth and store the resulting credential.
    ///
    /// On any failure (network, non-2xx, malformed body) the previously
    /// held session and credential are left untouched.
    pub async fn authenticate(
        &self,
        hostname: &str,
        login: &str,
        password: &str,
    ) -> ClientResult<Credential> {
        let credential = Self::login_request(&self.http, hostname, login, password).await?;

        let mut session = self.session.write().await;
        session.hostname = Some(hostname.to_string());
        session.login = Some(login.to_string());
        session.password = Some(password.to_string());
        session.credential = Some(credential.clone());

        debug!(access_key_id = %credential.access_key_id, "Authenticated against {}", hostname);
        Ok(credential)
    }

    /// Get a usable (access key id, secret) pair, re-authenticating when the
    /// held credential is absent or inside the usability margin.
    ///
    /// Refresh failure propagates as [`ClientError::AuthenticationFailed`];
    /// a stale credential is never handed out as a fallback.
    pub async fn get_valid(&self) -> ClientResult<(String, String)> {
        // Fast path: check read lock first.
        {
            let session = self.session.read().await;
            if let Some(credential) = session.credential.as_ref() {
                if credential.is_usable(Utc::now().naive_utc()) {
                    return Ok((
                        credential.access_key_id.clone(),
                        credential.secret_access_key.clone(),
                    ));
                }
            }
        }

        // Slow path: acquire write lock and refresh.
        let mut session = self.session.write().await;

        // Double-check: another task may have refreshed while we waited.
        if let Some(credential) = session.credential.as_ref() {
            if credential.is_usable(Utc::now().naive_utc()) {
                return Ok((
                    credential.access_key_id.clone(),
                    credential.secret_access_key.clone(),
                ));
            }
        }

        let (hostname, login, password) = match (
            session.hostname.as_deref(),
            session.login.as_deref(),
            session.password.as_deref(),
        ) {
            (Some(h), Some(l), Some(p)) => (h.to_string(), l.to_string(), p.to_string()),
            _ => {
                return Err(ClientError::auth_failed(
                    "no login session held; call authenticate first",
                ))
            }
        };

        warn!("Credential stale or missing, re-authenticating against {}", hostname);
        let credential = Self::login_request(&self.http, &hostname, &login, &password).await?;
        let pair = (
            credential.access_key_id.clone(),
            credential.secret_access_key.clone(),
        );
        session.credential = Some(credential);
        Ok(pair)
    }

    /// Clear all held state: hostname, login, password and credential.
    pub async fn reset(&self) {
        let mut session = self.session.write().await;
        *session = Session::default();
    }

    /// Whether a credential is currently held (usable or not).
    pub async fn has_credential(&self) -> bool {
        self.session.read().await.credential.is_some()
    }

    /// Perform the Basic-auth login round-trip.
    async fn login_request(
        http: &Client,
        hostname: &str,
        login: &str,
        password: &str,
    ) -> ClientResult<Credential> {
        let url = format!("{}/authenticate", hostname);

        let response = http
            .post(&url)
            .basic_auth(login, Some(password))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ClientError::auth_failed(format!("login request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::auth_failed(format!(
                "login rejected with HTTP {}: {}",
                status, body
            )));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| ClientError::auth_failed(format!("malformed login response: {}", e)))?;

        let credential =
            Credential::from_parts(auth.id, auth.secret_access_key, &auth.expiry_date)
                .map_err(|e| ClientError::auth_failed(e.to_string()))?;

        record_credential_refresh();
        Ok(credential)
    }
}
