/// Track domain type
use serde::{Deserialize, Serialize};

const FALLBACK_NAME: &str = "Neon Skyline";
const FALLBACK_ARTIST: &str = "Syn City FM";
const FALLBACK_ALBUM: &str = "Terminal Dreams";
const FALLBACK_URL: &str = "https://cdn.pixabay.com/download/audio/2024/05/25/audio_a0f651350a.mp3?filename=the-grid-2077-198564.mp3";
const FALLBACK_COVER_ART_URL: &str = "/themes/dracula.png";

/// One playable audio item with its metadata
///
/// Tracks are built once (by the playlist loader or [`Track::fallback`]) and
/// never mutated afterwards; the `with_*` builders consume and return `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Backend identifier, absent for built-in tracks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Track title
    pub name: String,

    /// Artist name
    pub artist: String,

    /// Album name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Playable resource locator
    pub url: String,

    /// Artwork locator
    pub cover_art_url: String,
}

impl Track {
    /// Create a new track without id or album
    pub fn new(
        name: impl Into<String>,
        artist: impl Into<String>,
        url: impl Into<String>,
        cover_art_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            artist: artist.into(),
            album: None,
            url: url.into(),
            cover_art_url: cover_art_url.into(),
        }
    }

    /// Attach a backend identifier
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach an album name
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Built-in placeholder shown when no playlist is available
    pub fn fallback() -> Self {
        Self::new(
            FALLBACK_NAME,
            FALLBACK_ARTIST,
            FALLBACK_URL,
            FALLBACK_COVER_ART_URL,
        )
        .with_album(FALLBACK_ALBUM)
    }

    /// Whether this is the built-in placeholder
    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }
}

/// Partially known track metadata
///
/// Remote metadata is not always complete. A patch keeps whatever fields were
/// present and [`TrackPatch::resolve`] fills the rest from a base track, so a
/// missing field never turns into a hard failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPatch {
    /// Backend identifier
    pub id: Option<i64>,

    /// Track title
    pub name: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Playable resource locator
    pub url: Option<String>,

    /// Artwork locator
    pub cover_art_url: Option<String>,
}

impl TrackPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the patch carries any field at all
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.url.is_none()
            && self.cover_art_url.is_none()
    }

    /// Build a full track, taking every missing field from `base`
    pub fn resolve(self, base: &Track) -> Track {
        Track {
            id: self.id.or(base.id),
            name: self.name.unwrap_or_else(|| base.name.clone()),
            artist: self.artist.unwrap_or_else(|| base.artist.clone()),
            album: self.album.or_else(|| base.album.clone()),
            url: self.url.unwrap_or_else(|| base.url.clone()),
            cover_art_url: self
                .cover_art_url
                .unwrap_or_else(|| base.cover_art_url.clone()),
        }
    }
}
