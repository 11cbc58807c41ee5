//! Shows, episodes, sequences and sequence revisions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{EpisodeId, SequenceId, ShowId};
use crate::marker::{Marker, MarkerTrack};

/// A production (film or episodic series) tracked by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: ShowId,
    #[serde(default)]
    pub title: String,
    /// Episodic shows nest sequences under episodes.
    #[serde(default)]
    pub episodic: bool,
}

/// An episode of an episodic show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    #[serde(default)]
    pub title: String,
}

/// A sequence of panels within a show or episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: SequenceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of revisions the sequence has accumulated.
    #[serde(default)]
    pub revision_count: u32,
}

/// Timeline metadata carried by a sequence revision.
///
/// Annotations, audio timings and highlights are opaque to this client and
/// pass through untouched; only markers are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevisionMetadata {
    #[serde(default)]
    pub annotations: Vec<Value>,
    #[serde(default)]
    pub audio_timings: Vec<Value>,
    #[serde(default)]
    pub highlights: Vec<Value>,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

/// A numbered revision of a sequence's panel timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRevision {
    pub revision: u32,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub imported: bool,
    #[serde(default)]
    pub meta_data: RevisionMetadata,
}

impl SequenceRevision {
    /// Build the ordered marker track from this revision's metadata.
    ///
    /// Markers arrive in document order; the track sorts them by start and
    /// collapses duplicate starts to the latest name.
    pub fn marker_track(&self) -> MarkerTrack {
        MarkerTrack::from_markers(self.meta_data.markers.iter().cloned())
    }
}
