/// Playlist domain type
use crate::types::Track;
use serde::{Deserialize, Serialize};

/// Ordered collection of tracks
///
/// Order defines sequential traversal. A playlist is replaced wholesale on
/// every load; there are no methods for adding or removing single tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Create a playlist from tracks in play order
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Create an explicitly empty playlist
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single-track playlist holding the fallback track
    pub fn fallback() -> Self {
        Self::new(vec![Track::fallback()])
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the playlist has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`, if any
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Track at `index`, or the fallback track when out of range
    pub fn current_or_fallback(&self, index: usize) -> Track {
        self.get(index).cloned().unwrap_or_else(Track::fallback)
    }

    /// All tracks in play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Iterate over tracks in play order
    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }
}

impl From<Vec<Track>> for Playlist {
    fn from(tracks: Vec<Track>) -> Self {
        Self::new(tracks)
    }
}

impl FromIterator<Track> for Playlist {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
