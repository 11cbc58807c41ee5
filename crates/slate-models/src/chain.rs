//! Asynchronous export chains.
//!
//! A chain is a server-side rendering job tracked by id and polled for
//! status. Transitions are forward-only; a chain is never reset.

use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, ChainId};

/// Chain processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChainStatus {
    /// Waiting for a render worker.
    #[default]
    #[serde(rename = "queued")]
    Queued,
    /// Actively rendering.
    #[serde(rename = "in progress")]
    InProgress,
    /// Finished successfully; results are available.
    #[serde(rename = "completed")]
    Completed,
    /// Failed server-side.
    #[serde(rename = "errored")]
    Errored,
    /// Gave up server-side after exceeding the service's own deadline.
    #[serde(rename = "timed out")]
    TimedOut,
}

impl ChainStatus {
    /// Get the wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainStatus::Queued => "queued",
            ChainStatus::InProgress => "in progress",
            ChainStatus::Completed => "completed",
            ChainStatus::Errored => "errored",
            ChainStatus::TimedOut => "timed out",
        }
    }

    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChainStatus::Completed | ChainStatus::Errored | ChainStatus::TimedOut
        )
    }
}

impl std::fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of a completed chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainResults {
    #[serde(rename = "assetID")]
    pub asset_id: AssetId,
}

/// A server-side export job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub id: ChainId,
    pub status: ChainStatus,
    /// Present only once the chain has completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ChainResults>,
}
