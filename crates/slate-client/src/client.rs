//! Slate service client.
//!
//! Every domain call builds its headers through [`SlateClient::signed_headers`],
//! the single choke point that pairs credential refresh with request signing.
//! The timestamp inside the signature and the `Date` header always reference
//! the identical instant; the service rejects the request otherwise.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, DATE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

use slate_models::{
    Asset, AssetId, Chain, ChainId, Episode, EpisodeId, Marker, MediaObjectId, Panel,
    RevisionedPanel, Sequence, SequenceId, SequenceRevision, Show, ShowId,
};

use crate::credentials::CredentialStore;
use crate::error::{ClientError, ClientResult};
use crate::metrics::record_request;
use crate::sign::{sign_request, RequestContent};
use crate::types::{
    DialoguesEnvelope, EpisodesEnvelope, NewPanelRequest, NewRevisionMetadata,
    NewSequenceRevisionRequest, PanelsEnvelope, QuicktimeExportRequest, QuicktimeExportResponse,
    SequencesEnvelope, ShowsEnvelope, DEFAULT_PANEL_DURATION,
};

/// Content type sent with (and signed into) every request.
const CONTENT_TYPE_JSON: &str = "application/json";

/// RFC-1123 format of the `Date` header, e.g. `Wed, 21 Oct 2015 07:28:00 GMT`.
const DATE_HEADER_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

// =============================================================================
// Configuration
// =============================================================================

/// Client configuration.
#[derive(Debug, Clone)]
pub struct SlateConfig {
    /// Base URL of the service, scheme included.
    pub hostname: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
}

impl SlateConfig {
    /// Create a config for the given hostname with default timeouts.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let hostname = std::env::var("SLATE_HOSTNAME").map_err(|_| {
            ClientError::auth_failed("SLATE_HOSTNAME must be set to reach the service")
        })?;
        if hostname.is_empty() {
            return Err(ClientError::auth_failed("SLATE_HOSTNAME cannot be empty"));
        }

        let timeout_secs: u64 = std::env::var("SLATE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        let connect_timeout_secs: u64 = std::env::var("SLATE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let mut config = Self::new(hostname);
        config.timeout = Duration::from_secs(timeout_secs);
        config.connect_timeout = Duration::from_secs(connect_timeout_secs);
        Ok(config)
    }
}

// =============================================================================
// Export scope
// =============================================================================

/// Addressing for an export submission: which show, sequence and revision a
/// chain renders, optionally scoped to an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportScope {
    pub show: ShowId,
    pub sequence: SequenceId,
    pub revision: u32,
    pub episode: Option<EpisodeId>,
}

impl ExportScope {
    pub fn new(show: ShowId, sequence: SequenceId, revision: u32) -> Self {
        Self {
            show,
            sequence,
            revision,
            episode: None,
        }
    }

    /// Scope the export to an episode of an episodic show.
    pub fn with_episode(mut self, episode: EpisodeId) -> Self {
        self.episode = Some(episode);
        self
    }

    /// URL path of the quicktime export endpoint for this scope.
    pub(crate) fn export_path(&self) -> String {
        match self.episode {
            Some(episode) => format!(
                "/show/{}/episode/{}/sequence/{}/revision/{}/export/quicktime",
                self.show, episode, self.sequence, self.revision
            ),
            None => format!(
                "/show/{}/sequence/{}/revision/{}/export/quicktime",
                self.show, self.sequence, self.revision
            ),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Authenticated client for the service's HTTP API.
pub struct SlateClient {
    http: Client,
    config: SlateConfig,
    credentials: Arc<CredentialStore>,
}

impl Clone for SlateClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

impl SlateClient {
    /// Create a new client.
    pub fn new(config: SlateConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("slate-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Network)?;

        let credentials = Arc::new(CredentialStore::new(http.clone()));

        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(SlateConfig::from_env()?)
    }

    /// The credential store shared by all clones of this client.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Log in and hold the resulting credential for subsequent calls.
    pub async fn authenticate(&self, login: &str, password: &str) -> ClientResult<()> {
        self.credentials
            .authenticate(&self.config.hostname, login, password)
            .await?;
        Ok(())
    }

    /// Fully log out, dropping the held credential and login session.
    pub async fn logout(&self) {
        self.credentials.reset().await;
    }

    // =========================================================================
    // Request gate
    // =========================================================================

    /// Build the signed headers for one request.
    ///
    /// Captures a single UTC instant, obtains a usable credential (refreshing
    /// through the login endpoint when needed), and signs with that instant.
    async fn signed_headers(
        &self,
        content: &RequestContent,
        path: &str,
        method: &str,
    ) -> ClientResult<HeaderMap> {
        let now: NaiveDateTime = Utc::now().naive_utc();
        let (access_key_id, secret_access_key) = self.credentials.get_valid().await?;
        let token = sign_request(
            &access_key_id,
            &secret_access_key,
            method,
            path,
            content,
            CONTENT_TYPE_JSON,
            now,
        )?;

        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token)
                .map_err(|_| ClientError::invalid_response("authorization token is not ASCII"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        headers.insert(
            DATE,
            HeaderValue::from_str(&now.format(DATE_HEADER_FORMAT).to_string())
                .map_err(|_| ClientError::invalid_response("date header is not ASCII"))?,
        );
        Ok(headers)
    }

    /// Execute a request future with tracing and metrics.
    async fn execute<T, F>(&self, operation: &'static str, path: &str, fut: F) -> ClientResult<T>
    where
        F: std::future::Future<Output = ClientResult<T>>,
    {
        let span = info_span!("slate_request", operation = %operation, path = %path);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(0),
        };
        record_request(operation, status, latency_ms);

        result
    }

    /// Signed GET returning a deserialized JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.config.hostname, path);

        self.execute(operation, path, async {
            let headers = self.signed_headers(&RequestContent::Empty, path, "GET").await?;
            let response = self.http.get(&url).headers(headers).send().await?;
            Self::read_json(response, path).await
        })
        .await
    }

    /// Signed POST of a JSON body, returning a deserialized JSON body.
    ///
    /// The outgoing bytes are the same compact serialization the signature
    /// hashed; serializing twice would risk a mismatch.
    async fn post_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        body: Value,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.config.hostname, path);

        self.execute(operation, path, async {
            let payload = serde_json::to_string(&body)?;
            let content = RequestContent::Json(body);
            let headers = self.signed_headers(&content, path, "POST").await?;
            let response = self
                .http
                .post(&url)
                .headers(headers)
                .body(payload)
                .send()
                .await?;
            Self::read_json(response, path).await
        })
        .await
    }

    /// Map a response to a typed body or a typed error.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> ClientResult<T> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => response
                .json()
                .await
                .map_err(|e| ClientError::invalid_response(format!("{}: {}", path, e))),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ClientError::from_http_status(
                    status.as_u16(),
                    format!("{}: {}", path, body),
                ))
            }
        }
    }

    // =========================================================================
    // Listing endpoints
    // =========================================================================

    /// Retrieve the list of shows.
    pub async fn get_shows(&self) -> ClientResult<Vec<Show>> {
        let envelope: ShowsEnvelope = self.get_json("get_shows", "/shows").await?;
        Ok(envelope.shows)
    }

    /// Retrieve the list of episodes of a show.
    pub async fn get_episodes(&self, show: ShowId) -> ClientResult<Vec<Episode>> {
        let path = format!("/show/{}/episodes", show);
        let envelope: EpisodesEnvelope = self.get_json("get_episodes", &path).await?;
        Ok(envelope.episodes)
    }

    /// Retrieve the list of sequences of a show, optionally scoped to an
    /// episode.
    pub async fn get_sequences(
        &self,
        show: ShowId,
        episode: Option<EpisodeId>,
    ) -> ClientResult<Vec<Sequence>> {
        let path = match episode {
            Some(episode) => format!("/show/{}/episode/{}/sequences", show, episode),
            None => format!("/show/{}/sequences", show),
        };
        let envelope: SequencesEnvelope = self.get_json("get_sequences", &path).await?;
        Ok(envelope.sequences)
    }

    /// Retrieve one sequence revision, markers included.
    pub async fn get_sequence_revision(
        &self,
        show: ShowId,
        sequence: SequenceId,
        revision: u32,
    ) -> ClientResult<SequenceRevision> {
        let path = format!("/show/{}/sequence/{}/revision/{}", show, sequence, revision);
        self.get_json("get_sequence_revision", &path).await
    }

    /// Retrieve the panels of a sequence revision, in timeline order.
    pub async fn get_panels(
        &self,
        show: ShowId,
        sequence: SequenceId,
        revision: u32,
    ) -> ClientResult<Vec<Panel>> {
        let path = format!(
            "/show/{}/sequence/{}/revision/{}/panels",
            show, sequence, revision
        );
        let envelope: PanelsEnvelope = self.get_json("get_panels", &path).await?;
        Ok(envelope.panels)
    }

    /// Retrieve the dialogues of a sequence revision. Dialogue payloads are
    /// opaque to this client.
    pub async fn get_dialogues(
        &self,
        show: ShowId,
        sequence: SequenceId,
        revision: u32,
    ) -> ClientResult<Vec<Value>> {
        let path = format!(
            "/show/{}/sequence/{}/revision/{}/dialogues",
            show, sequence, revision
        );
        let envelope: DialoguesEnvelope = self.get_json("get_dialogues", &path).await?;
        Ok(envelope.dialogues)
    }

    /// Retrieve an asset with its media objects.
    pub async fn get_asset(&self, asset: AssetId) -> ClientResult<Asset> {
        let path = format!("/asset/{}", asset);
        self.get_json("get_asset", &path).await
    }

    /// Retrieve an export chain's current state.
    pub async fn get_chain(&self, chain: ChainId) -> ClientResult<Chain> {
        let path = format!("/chain/{}", chain);
        self.get_json("get_chain", &path).await
    }

    // =========================================================================
    // Media download
    // =========================================================================

    /// Download a media object's data to `target`, returning the number of
    /// bytes written.
    pub async fn download_media_object(
        &self,
        target: &Path,
        media_object: MediaObjectId,
    ) -> ClientResult<u64> {
        let path = format!("/file/{}/data", media_object);
        let url = format!("{}{}", self.config.hostname, path);

        self.execute("download_media_object", &path, async {
            let headers = self.signed_headers(&RequestContent::Empty, &path, "GET").await?;
            let response = self.http.get(&url).headers(headers).send().await?;

            match response.status() {
                StatusCode::OK => {
                    let bytes = response.bytes().await?;
                    tokio::fs::write(target, &bytes).await?;
                    debug!(
                        media_object = %media_object,
                        bytes = bytes.len(),
                        "Downloaded media object to {}",
                        target.display()
                    );
                    Ok(bytes.len() as u64)
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    Err(ClientError::from_http_status(
                        status.as_u16(),
                        format!("{}: {}", path, body),
                    ))
                }
            }
        })
        .await
    }

    // =========================================================================
    // Mutating endpoints
    // =========================================================================

    /// Submit a quicktime export for the given panel revisions, producing the
    /// chain id that tracks the render.
    pub async fn start_quicktime_export(
        &self,
        scope: &ExportScope,
        panel_revisions: &[RevisionedPanel],
        include_dialogue: bool,
    ) -> ClientResult<ChainId> {
        let path = scope.export_path();
        let body = serde_json::to_value(QuicktimeExportRequest {
            include_dialogue,
            panel_revisions,
        })?;
        let response: QuicktimeExportResponse =
            self.post_json("start_quicktime_export", &path, body).await?;
        Ok(response.chain_id)
    }

    /// Create a new sequence revision from revisioned panels and markers.
    pub async fn new_sequence_revision(
        &self,
        show: ShowId,
        sequence: SequenceId,
        revisioned_panels: &[RevisionedPanel],
        markers: &[Marker],
        comment: &str,
    ) -> ClientResult<SequenceRevision> {
        let path = format!("/show/{}/sequence/{}/revision", show, sequence);
        let body = serde_json::to_value(NewSequenceRevisionRequest {
            comment,
            imported: false,
            meta_data: NewRevisionMetadata {
                annotations: [],
                audio_timings: [],
                highlights: [],
                markers,
            },
            revisioned_panels,
        })?;
        self.post_json("new_sequence_revision", &path, body).await
    }

    /// Create a blank panel, optionally pre-linked to an asset. The duration
    /// defaults to [`DEFAULT_PANEL_DURATION`] timeline units.
    pub async fn new_panel(
        &self,
        show: ShowId,
        sequence: SequenceId,
        asset: Option<AssetId>,
        duration: Option<u64>,
    ) -> ClientResult<Panel> {
        let path = format!("/show/{}/sequence/{}/panel", show, sequence);
        let body = serde_json::to_value(NewPanelRequest {
            duration: duration.unwrap_or(DEFAULT_PANEL_DURATION),
            asset: asset.map(|asset_id| slate_models::PanelAsset { asset_id }),
        })?;
        self.post_json("new_panel", &path, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_requires_hostname() {
        std::env::remove_var("SLATE_HOSTNAME");
        assert!(SlateConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_default_timeouts() {
        std::env::set_var("SLATE_HOSTNAME", "https://slate.example.com");
        std::env::remove_var("SLATE_TIMEOUT_SECS");
        std::env::remove_var("SLATE_CONNECT_TIMEOUT_SECS");
        let config = SlateConfig::from_env().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        std::env::remove_var("SLATE_HOSTNAME");
    }

    #[test]
    fn test_export_path_without_episode() {
        let scope = ExportScope::new(ShowId(1), SequenceId(2), 3);
        assert_eq!(
            scope.export_path(),
            "/show/1/sequence/2/revision/3/export/quicktime"
        );
    }

    #[test]
    fn test_export_path_with_episode() {
        let scope = ExportScope::new(ShowId(1), SequenceId(2), 3).with_episode(EpisodeId(9));
        assert_eq!(
            scope.export_path(),
            "/show/1/episode/9/sequence/2/revision/3/export/quicktime"
        );
    }
}
