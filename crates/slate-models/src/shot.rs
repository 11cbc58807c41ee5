//! Per-shot groupings derived from the panel timeline.
//!
//! These are recomputed per export request and never persisted.

use serde::{Deserialize, Serialize};

use crate::ids::{MediaObjectId, PanelId};
use crate::panel::RevisionedPanel;

/// Panels belonging to one named shot, in timeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotGroup {
    pub shot_name: String,
    pub panels: Vec<RevisionedPanel>,
}

impl ShotGroup {
    pub fn new(shot_name: impl Into<String>) -> Self {
        Self {
            shot_name: shot_name.into(),
            panels: Vec::new(),
        }
    }
}

/// Reference to one media object resolved for a panel within a shot.
///
/// Field names match the wire shape the export API consumes: `id` is the
/// panel id, `mo` the media object id, `pos` the panel's index in the
/// original full timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotMediaRef {
    pub name: String,
    pub id: PanelId,
    pub revision_number: u32,
    pub pos: usize,
    pub mo: MediaObjectId,
}

/// Artwork and thumbnail media objects resolved for one shot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotMedia {
    pub artwork: Vec<ShotMediaRef>,
    pub thumbnails: Vec<ShotMediaRef>,
}
