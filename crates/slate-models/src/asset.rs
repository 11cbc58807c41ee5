//! Assets and their renditioned media objects.

use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, MediaObjectId};

/// A renditioned artifact attached to an asset (artwork image, thumbnail,
/// or rendered video).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaObject {
    pub id: MediaObjectId,
    #[serde(default)]
    pub name: String,
}

/// Media objects grouped by rendition kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaObjectGroups {
    #[serde(default)]
    pub artwork: Vec<MediaObject>,
    #[serde(default)]
    pub thumbnail: Vec<MediaObject>,
}

/// A visual asset referenced by panels and export results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    #[serde(default)]
    pub media_objects: MediaObjectGroups,
}

impl Asset {
    /// First artwork media object, if the asset has one.
    pub fn first_artwork(&self) -> Option<&MediaObject> {
        self.media_objects.artwork.first()
    }

    /// First thumbnail media object, if the asset has one.
    pub fn first_thumbnail(&self) -> Option<&MediaObject> {
        self.media_objects.thumbnail.first()
    }
}
