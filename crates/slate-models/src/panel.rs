//! Storyboard panels and their revision wire format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{AssetId, PanelId};

/// Reference from a panel to its visual asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelAsset {
    pub asset_id: AssetId,
}

/// The atomic storyboard unit, as returned by the panel listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub panel_id: PanelId,
    pub revision_number: u32,
    /// Length of the panel in timeline units.
    #[serde(default)]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<PanelAsset>,
    /// Dialogue payload is opaque to the client; it is carried through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue: Option<Value>,
}

/// A panel formatted for a sequence revision or an export submission.
///
/// `pos` is the panel's index in the original full sequence-revision
/// timeline, not its index within any shot group. The export API relies on
/// that distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionedPanel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue: Option<Value>,
    pub duration: u64,
    pub id: PanelId,
    pub revision_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<PanelAsset>,
    pub pos: usize,
}

impl RevisionedPanel {
    /// Format a panel as a revisioned panel at `pos`; every other field
    /// passes through unchanged.
    pub fn from_panel(panel: &Panel, pos: usize) -> Self {
        Self {
            dialogue: panel.dialogue.clone(),
            duration: panel.duration,
            id: panel.panel_id,
            revision_number: panel.revision_number,
            asset: panel.asset,
            pos,
        }
    }
}
