//! Integer identifier newtypes for service-assigned IDs.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the inner integer.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a show.
    ShowId
);
define_id!(
    /// Unique identifier for an episode.
    EpisodeId
);
define_id!(
    /// Unique identifier for a sequence.
    SequenceId
);
define_id!(
    /// Unique identifier for a panel.
    PanelId
);
define_id!(
    /// Unique identifier for an asset.
    AssetId
);
define_id!(
    /// Unique identifier for a media object attached to an asset.
    MediaObjectId
);
define_id!(
    /// Unique identifier for an asynchronous export chain.
    ChainId
);
