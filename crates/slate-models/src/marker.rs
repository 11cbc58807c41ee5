//! Timeline markers denoting shot boundaries.

use serde::{Deserialize, Serialize};

/// A named boundary on the panel timeline, marking the start of a shot.
///
/// `start` is measured in cumulative panel-duration units from the beginning
/// of the sequence revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub start: u64,
    pub name: String,
}

impl Marker {
    pub fn new(start: u64, name: impl Into<String>) -> Self {
        Self {
            start,
            name: name.into(),
        }
    }
}

/// An ordered collection of markers.
///
/// Markers are kept sorted by `start` ascending. Duplicate start values
/// collapse to the latest name (last write wins under sorted insertion).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerTrack {
    markers: Vec<Marker>,
}

impl MarkerTrack {
    /// Build a track from markers in any order.
    pub fn from_markers(markers: impl IntoIterator<Item = Marker>) -> Self {
        let mut track = Self::default();
        for marker in markers {
            track.insert(marker);
        }
        track
    }

    /// Insert a marker, replacing any existing marker with the same start.
    pub fn insert(&mut self, marker: Marker) {
        match self.markers.binary_search_by_key(&marker.start, |m| m.start) {
            Ok(i) => self.markers[i] = marker,
            Err(i) => self.markers.insert(i, marker),
        }
    }

    /// The shot a timeline position falls into: the marker with the greatest
    /// `start` that does not exceed `position`. Positions before the first
    /// marker belong to no shot.
    pub fn shot_at(&self, position: u64) -> Option<&Marker> {
        match self.markers.binary_search_by_key(&position, |m| m.start) {
            Ok(i) => Some(&self.markers[i]),
            Err(0) => None,
            Err(i) => Some(&self.markers[i - 1]),
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_sorts_by_start() {
        let track = MarkerTrack::from_markers([Marker::new(8, "C"), Marker::new(0, "A"), Marker::new(3, "B")]);
        let names: Vec<_> = track.markers().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_duplicate_start_last_write_wins() {
        let track = MarkerTrack::from_markers([Marker::new(3, "old"), Marker::new(3, "new")]);
        assert_eq!(track.len(), 1);
        assert_eq!(track.markers()[0].name, "new");
    }

    #[test]
    fn test_shot_at_floor_assignment() {
        let track = MarkerTrack::from_markers([Marker::new(0, "A"), Marker::new(3, "B")]);
        assert_eq!(track.shot_at(0).unwrap().name, "A");
        assert_eq!(track.shot_at(2).unwrap().name, "A");
        assert_eq!(track.shot_at(3).unwrap().name, "B");
        assert_eq!(track.shot_at(100).unwrap().name, "B");
    }

    #[test]
    fn test_shot_at_before_first_marker() {
        let track = MarkerTrack::from_markers([Marker::new(5, "A")]);
        assert!(track.shot_at(4).is_none());
    }
}
