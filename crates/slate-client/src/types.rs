//! Service request/response wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use slate_models::{
    ChainId, Episode, Marker, Panel, PanelAsset, RevisionedPanel, Sequence, Show,
};

/// Default duration, in timeline units, for a newly created blank panel.
pub const DEFAULT_PANEL_DURATION: u64 = 12;

/// Login response from `/authenticate`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub id: String,
    pub secret_access_key: String,
    pub expiry_date: String,
}

/// List envelopes returned by the collection endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ShowsEnvelope {
    pub shows: Vec<Show>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EpisodesEnvelope {
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SequencesEnvelope {
    pub sequences: Vec<Sequence>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PanelsEnvelope {
    pub panels: Vec<Panel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DialoguesEnvelope {
    pub dialogues: Vec<Value>,
}

/// Body of an export submission.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct QuicktimeExportRequest<'a> {
    pub include_dialogue: bool,
    pub panel_revisions: &'a [RevisionedPanel],
}

/// Response to an export submission.
#[derive(Debug, Deserialize)]
pub(crate) struct QuicktimeExportResponse {
    pub chain_id: ChainId,
}

/// Metadata block of a sequence-revision creation body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewRevisionMetadata<'a> {
    pub annotations: [Value; 0],
    pub audio_timings: [Value; 0],
    pub highlights: [Value; 0],
    pub markers: &'a [Marker],
}

/// Body of a sequence-revision creation.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewSequenceRevisionRequest<'a> {
    pub comment: &'a str,
    pub imported: bool,
    pub meta_data: NewRevisionMetadata<'a>,
    pub revisioned_panels: &'a [RevisionedPanel],
}

/// Body of a blank-panel creation.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewPanelRequest {
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<PanelAsset>,
}
