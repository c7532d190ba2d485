//! Now Playing Client
//!
//! HTTP playlist loader for the Now Playing backend.
//!
//! # Features
//!
//! - **Playlist loading**: index plus per-track detail requests, fetched concurrently
//! - **Cancellation**: every request races a `CancellationToken`
//! - **Address resolution**: configured address, page location, or development default
//! - **Metadata defaulting**: missing fields are filled from the index entry or
//!   the fallback track instead of failing the load
//!
//! # Example
//!
//! ```ignore
//! use nowplaying_client::{LoaderConfig, PlaylistLoader};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = PlaylistLoader::from_config(&LoaderConfig::from_env())?;
//!     let playlist = loader.load(&CancellationToken::new()).await?;
//!
//!     for track in &playlist {
//!         println!("{} - {}", track.artist, track.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod endpoint;
mod error;
mod loader;
mod types;

pub use config::{LoaderConfig, API_BASE_URL_ENV, BACKEND_BASE_URL_ENV};
pub use endpoint::{ensure_absolute_url, BackendEndpoint, DEFAULT_BACKEND_BASE_URL};
pub use error::Result;
pub use loader::PlaylistLoader;
pub use types::{MusicInfoResponse, MusicListResponse, MusicSummary};
