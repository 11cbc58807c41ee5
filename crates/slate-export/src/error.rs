//! Export error types.

use thiserror::Error;

use slate_client::ClientError;
use slate_models::{ChainId, ChainStatus, PanelId};

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while mapping a timeline or driving an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export submission was rejected or never reached the service.
    #[error("Export submission failed: {0}")]
    SubmissionFailed(#[source] ClientError),

    /// The chain reached a terminal failure state server-side.
    #[error("Chain {chain} ended with status '{status}'")]
    Failed { chain: ChainId, status: ChainStatus },

    /// A transport failure interrupted the poll loop.
    #[error("Polling chain {chain} failed: {source}")]
    PollFailed {
        chain: ChainId,
        #[source]
        source: ClientError,
    },

    /// The chain completed but its output asset could not be resolved.
    #[error("Chain {chain} completed but its result is unresolvable: {reason}")]
    ResultUnresolvable { chain: ChainId, reason: String },

    /// A panel's asset lookup failed while building the per-shot media
    /// mapping. The whole mapping is abandoned; no partial result exists.
    #[error("Asset resolution failed for panel {panel}: {reason}")]
    AssetResolutionFailed { panel: PanelId, reason: String },

    /// The caller's poll callback requested cancellation.
    #[error("Export cancelled by caller after {polls} polls")]
    Cancelled { polls: u32 },
}
