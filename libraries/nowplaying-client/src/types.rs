//! Wire types for the playlist backend API.

use nowplaying_core::TrackPatch;
use serde::{Deserialize, Serialize};

/// Response of `GET /api/music/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MusicListResponse {
    #[serde(default)]
    pub musics: Vec<MusicSummary>,
}

/// One entry of the music index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
}

/// Response of `GET /api/music/info/{id}`.
///
/// Every field is optional; missing ones are filled in by the loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MusicInfoResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub music_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl MusicInfoResponse {
    /// Merge this detail payload with its index entry.
    ///
    /// Detail fields win; title and artist fall back to the index entry.
    /// Locators are passed through `normalize`.
    pub fn into_patch(self, summary: &MusicSummary, normalize: impl Fn(&str) -> String) -> TrackPatch {
        TrackPatch {
            id: self.id.or(Some(summary.id)),
            name: self.title.or_else(|| summary.title.clone()),
            artist: self.artist.or_else(|| summary.artist.clone()),
            album: None,
            url: self.music_url.as_deref().map(&normalize),
            cover_art_url: self.thumbnail_url.as_deref().map(&normalize),
        }
    }
}
