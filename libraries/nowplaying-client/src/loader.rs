//! Playlist loader for the Now Playing backend.

use crate::config::LoaderConfig;
use crate::endpoint::{ensure_absolute_url, BackendEndpoint};
use crate::error::{request_error, Result};
use crate::types::{MusicInfoResponse, MusicListResponse, MusicSummary};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use nowplaying_core::{LoadError, Playlist, PlaylistSource, Track};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Loads the playlist from the backend's music API.
///
/// The index (`/api/music/list`) is fetched first, then the detail record of
/// every entry (`/api/music/info/{id}`) concurrently. A single failing
/// request fails the whole load.
///
/// # Example
///
/// ```ignore
/// use nowplaying_client::{BackendEndpoint, PlaylistLoader};
/// use tokio_util::sync::CancellationToken;
///
/// let loader = PlaylistLoader::new(BackendEndpoint::new("https://music.example.com"))?;
/// let playlist = loader.load(&CancellationToken::new()).await?;
/// println!("Loaded {} tracks", playlist.len());
/// ```
#[derive(Debug, Clone)]
pub struct PlaylistLoader {
    http: Client,
    endpoint: BackendEndpoint,
}

impl PlaylistLoader {
    /// Create a loader for `endpoint`.
    pub fn new(endpoint: BackendEndpoint) -> Result<Self> {
        // No request timeout: a load only ends by completing or being cancelled
        let http = Client::builder()
            .user_agent(format!("NowPlaying/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoadError::request(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    /// Create a loader from configuration.
    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        Self::new(config.endpoint())
    }

    /// Backend this loader talks to.
    pub fn endpoint(&self) -> &BackendEndpoint {
        &self.endpoint
    }

    /// Fetch the full playlist.
    ///
    /// Returns [`LoadError::Cancelled`] as soon as `cancel` fires; requests
    /// still in flight are dropped.
    pub async fn load(&self, cancel: &CancellationToken) -> Result<Playlist> {
        let index = self.fetch_index(cancel).await?;

        if index.is_empty() {
            info!(base = %self.endpoint, "Backend returned an empty playlist");
            return Ok(Playlist::empty());
        }

        let tracks = try_join_all(index.iter().map(|entry| self.fetch_track(entry, cancel))).await?;

        info!(base = %self.endpoint, tracks = tracks.len(), "Loaded playlist");
        Ok(Playlist::new(tracks))
    }

    /// Fetch the music index.
    pub async fn fetch_index(&self, cancel: &CancellationToken) -> Result<Vec<MusicSummary>> {
        let url = self.endpoint.url("api/music/list");
        let list: MusicListResponse = self.get_json(&url, cancel).await?;

        debug!(entries = list.musics.len(), "Fetched music index");
        Ok(list.musics)
    }

    /// Fetch the detail record of one index entry and build its track.
    async fn fetch_track(&self, entry: &MusicSummary, cancel: &CancellationToken) -> Result<Track> {
        let url = self.endpoint.url(&format!("api/music/info/{}", entry.id));
        let info: MusicInfoResponse = self.get_json(&url, cancel).await?;

        // Missing fields come from the index entry, then the fallback track
        let base = self.endpoint.as_str();
        let patch = info.into_patch(entry, |locator| ensure_absolute_url(locator, base));

        Ok(patch.resolve(&Track::fallback()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, cancel: &CancellationToken) -> Result<T> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(url = %url, "Request cancelled");
                Err(LoadError::Cancelled)
            }
            result = self.fetch_json(url) => result,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "Fetching");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| request_error(&e))?;

        serde_json::from_slice(&body)
            .map_err(|e| LoadError::parse(format!("Failed to parse response from {}: {}", url, e)))
    }
}

#[async_trait]
impl PlaylistSource for PlaylistLoader {
    async fn load(&self, cancel: &CancellationToken) -> std::result::Result<Playlist, LoadError> {
        PlaylistLoader::load(self, cancel).await
    }
}
