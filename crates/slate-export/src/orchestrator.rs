//! Export chain orchestration.
//!
//! Drives a quicktime export from submission to a terminal state: submit the
//! chain, poll its status at a fixed interval, and resolve the completed
//! chain's output asset to a media object id. Submission and polling are
//! strictly sequential; there is never more than one in-flight poll per
//! chain.

use std::time::Duration;

use metrics::counter;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use slate_client::{ExportScope, SlateClient};
use slate_models::{ChainId, ChainStatus, MediaObjectId, RevisionedPanel, ShotGroup};

use crate::error::{ExportError, ExportResult};

/// Total chain status polls, by outcome.
const EXPORT_POLLS_TOTAL: &str = "slate_export_polls_total";

/// Caller decision returned by the poll callback.
///
/// The callback is the only cancellation point: the loop otherwise runs
/// until the chain reaches a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollControl {
    Continue,
    Cancel,
}

/// Exporter configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Delay between consecutive status polls.
    pub poll_interval: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl ExporterConfig {
    /// Set the delay between consecutive status polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Drives asynchronous quicktime exports through the service client.
///
/// The exporter holds no per-chain state; independent exports can be driven
/// by independent exporter instances sharing one client. The client's
/// credential store is the only shared mutable resource, and its refresh is
/// single-flight.
pub struct QuicktimeExporter {
    client: SlateClient,
    config: ExporterConfig,
}

impl QuicktimeExporter {
    /// Create an exporter with the default poll interval.
    pub fn new(client: SlateClient) -> Self {
        Self::with_config(client, ExporterConfig::default())
    }

    pub fn with_config(client: SlateClient, config: ExporterConfig) -> Self {
        Self { client, config }
    }

    /// Submit an export for the given panel revisions.
    pub async fn submit(
        &self,
        scope: &ExportScope,
        panel_revisions: &[RevisionedPanel],
        include_dialogue: bool,
    ) -> ExportResult<ChainId> {
        let chain = self
            .client
            .start_quicktime_export(scope, panel_revisions, include_dialogue)
            .await
            .map_err(ExportError::SubmissionFailed)?;

        info!(chain = %chain, panels = panel_revisions.len(), "Submitted quicktime export");
        Ok(chain)
    }

    /// Poll a chain until it reaches a terminal state.
    ///
    /// While the chain is queued or in progress, `on_poll` is invoked with
    /// the current retry count (0-based) before each sleep; returning
    /// [`PollControl::Cancel`] terminates the loop with
    /// [`ExportError::Cancelled`]. The loop itself has no deadline: callers
    /// wanting one should wrap this future in `tokio::time::timeout`.
    ///
    /// On completion the chain's result asset is resolved and the id of its
    /// first artwork media object returned.
    pub async fn poll<F>(&self, chain: ChainId, mut on_poll: F) -> ExportResult<MediaObjectId>
    where
        F: FnMut(u32) -> PollControl,
    {
        let mut retry: u32 = 0;

        loop {
            let state = self
                .client
                .get_chain(chain)
                .await
                .map_err(|e| ExportError::PollFailed { chain, source: e })?;

            counter!(EXPORT_POLLS_TOTAL, "status" => state.status.as_str()).increment(1);

            match state.status {
                ChainStatus::Queued | ChainStatus::InProgress => {
                    debug!(chain = %chain, retry, status = %state.status, "Chain still rendering");
                    if on_poll(retry) == PollControl::Cancel {
                        warn!(chain = %chain, retry, "Export cancelled by caller");
                        return Err(ExportError::Cancelled { polls: retry });
                    }
                    sleep(self.config.poll_interval).await;
                    retry += 1;
                }
                ChainStatus::Errored | ChainStatus::TimedOut => {
                    warn!(chain = %chain, status = %state.status, "Chain failed server-side");
                    return Err(ExportError::Failed {
                        chain,
                        status: state.status,
                    });
                }
                ChainStatus::Completed => {
                    return self.resolve_result(chain, state.results).await;
                }
            }
        }
    }

    /// Submit an export for one shot group and poll it to completion.
    ///
    /// Dialogue is never burned into per-shot exports; the shot's panels
    /// carry their original full-timeline positions.
    pub async fn export_shot<F>(
        &self,
        scope: &ExportScope,
        group: &ShotGroup,
        on_poll: F,
    ) -> ExportResult<MediaObjectId>
    where
        F: FnMut(u32) -> PollControl,
    {
        info!(shot = %group.shot_name, panels = group.panels.len(), "Exporting shot");
        let chain = self.submit(scope, &group.panels, false).await?;
        self.poll(chain, on_poll).await
    }

    /// Resolve a completed chain's output to its first artwork media object.
    async fn resolve_result(
        &self,
        chain: ChainId,
        results: Option<slate_models::ChainResults>,
    ) -> ExportResult<MediaObjectId> {
        let results = results.ok_or_else(|| ExportError::ResultUnresolvable {
            chain,
            reason: "completed chain carries no results".into(),
        })?;

        let asset = self.client.get_asset(results.asset_id).await.map_err(|e| {
            ExportError::ResultUnresolvable {
                chain,
                reason: e.to_string(),
            }
        })?;

        let artwork = asset
            .first_artwork()
            .ok_or_else(|| ExportError::ResultUnresolvable {
                chain,
                reason: format!("result asset {} has no artwork rendition", results.asset_id),
            })?;

        info!(chain = %chain, media_object = %artwork.id, "Export completed");
        Ok(artwork.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use slate_client::{ClientError, SlateConfig};
    use slate_models::{SequenceId, ShowId};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn authenticated_client(server: &MockServer) -> SlateClient {
        let expiry = (Utc::now() + chrono::Duration::hours(10))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "test-key",
                "secret_access_key": "test-secret",
                "expiry_date": expiry,
            })))
            .mount(server)
            .await;

        let client = SlateClient::new(SlateConfig::new(server.uri())).unwrap();
        client.authenticate("user", "pass").await.unwrap();
        client
    }

    fn fast_exporter(client: SlateClient) -> QuicktimeExporter {
        QuicktimeExporter::with_config(
            client,
            ExporterConfig::default().with_poll_interval(Duration::from_millis(5)),
        )
    }

    async fn mount_chain_status(server: &MockServer, chain: i64, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/chain/{}", chain)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_poll_invokes_callback_then_resolves_result() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        // Two in-progress polls, then the mock expires and the chain reads
        // as completed.
        Mock::given(method("GET"))
            .and(path("/chain/5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 5, "status": "in progress"})),
            )
            .up_to_n_times(2)
            .mount(&server)
            .await;
        mount_chain_status(
            &server,
            5,
            json!({"id": 5, "status": "completed", "results": {"assetID": 41}}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/asset/41"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "asset_id": 41,
                "media_objects": {
                    "artwork": [{"id": 91, "name": "sh010.mov"}],
                    "thumbnail": [{"id": 92, "name": "sh010.png"}]
                }
            })))
            .mount(&server)
            .await;

        let mut retries = Vec::new();
        let media_object = fast_exporter(client)
            .poll(ChainId(5), |retry| {
                retries.push(retry);
                PollControl::Continue
            })
            .await
            .unwrap();

        assert_eq!(retries, [0, 1]);
        assert_eq!(media_object, MediaObjectId(91));
    }

    #[tokio::test]
    async fn test_errored_chain_fails_without_asset_resolution() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        mount_chain_status(&server, 5, json!({"id": 5, "status": "errored"})).await;

        let mut invoked = false;
        let err = fast_exporter(client)
            .poll(ChainId(5), |_| {
                invoked = true;
                PollControl::Continue
            })
            .await
            .unwrap_err();

        // Terminal failure: no callback, no asset fetch.
        assert!(!invoked);
        match err {
            ExportError::Failed { chain, status } => {
                assert_eq!(chain, ChainId(5));
                assert_eq!(status, ChainStatus::Errored);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        let asset_requests = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path().starts_with("/asset/"))
            .count();
        assert_eq!(asset_requests, 0);
    }

    #[tokio::test]
    async fn test_timed_out_chain_fails() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        mount_chain_status(&server, 6, json!({"id": 6, "status": "timed out"})).await;

        let err = fast_exporter(client)
            .poll(ChainId(6), |_| PollControl::Continue)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::Failed {
                status: ChainStatus::TimedOut,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_callback_cancellation_stops_polling() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        mount_chain_status(&server, 7, json!({"id": 7, "status": "queued"})).await;

        let err = fast_exporter(client)
            .poll(ChainId(7), |_| PollControl::Cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Cancelled { polls: 0 }));

        let chain_polls = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/chain/7")
            .count();
        assert_eq!(chain_polls, 1);
    }

    #[tokio::test]
    async fn test_transport_failure_mid_poll() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/chain/8"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = fast_exporter(client)
            .poll(ChainId(8), |_| PollControl::Continue)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::PollFailed {
                chain: ChainId(8),
                source: ClientError::RequestFailed(_),
            }
        ));
    }

    #[tokio::test]
    async fn test_completed_chain_without_results_is_unresolvable() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        mount_chain_status(&server, 9, json!({"id": 9, "status": "completed"})).await;

        let err = fast_exporter(client)
            .poll(ChainId(9), |_| PollControl::Continue)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ResultUnresolvable { .. }));
    }

    #[tokio::test]
    async fn test_submit_failure() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/show/1/sequence/2/revision/3/export/quicktime"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let scope = ExportScope::new(ShowId(1), SequenceId(2), 3);
        let err = fast_exporter(client)
            .submit(&scope, &[], false)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::SubmissionFailed(_)));
    }

    #[tokio::test]
    async fn test_export_shot_end_to_end() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/show/1/sequence/2/revision/3/export/quicktime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chain_id": 12})))
            .mount(&server)
            .await;
        mount_chain_status(
            &server,
            12,
            json!({"id": 12, "status": "completed", "results": {"assetID": 50}}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/asset/50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "asset_id": 50,
                "media_objects": {"artwork": [{"id": 70, "name": "shot.mov"}], "thumbnail": []}
            })))
            .mount(&server)
            .await;

        let scope = ExportScope::new(ShowId(1), SequenceId(2), 3);
        let group = ShotGroup::new("sh010");
        let media_object = fast_exporter(client)
            .export_shot(&scope, &group, |_| PollControl::Continue)
            .await
            .unwrap();
        assert_eq!(media_object, MediaObjectId(70));
    }
}
