//! Shared data models for the Slate service client.
//!
//! This crate provides Serde-serializable types for:
//! - Credentials and expiry arithmetic
//! - Shows, episodes, sequences and sequence revisions
//! - Panels, markers and per-shot groupings
//! - Assets, media objects and export chains

pub mod asset;
pub mod chain;
pub mod credential;
pub mod marker;
pub mod panel;
pub mod shot;
pub mod show;

mod ids;

// Re-export common types
pub use asset::{Asset, MediaObject, MediaObjectGroups};
pub use chain::{Chain, ChainResults, ChainStatus};
pub use credential::{Credential, CredentialError, CREDENTIAL_REFRESH_MARGIN_HOURS};
pub use ids::{AssetId, ChainId, EpisodeId, MediaObjectId, PanelId, SequenceId, ShowId};
pub use marker::{Marker, MarkerTrack};
pub use panel::{Panel, PanelAsset, RevisionedPanel};
pub use shot::{ShotGroup, ShotMedia, ShotMediaRef};
pub use show::{Episode, RevisionMetadata, Sequence, SequenceRevision, Show};
