//! Now Playing Core
//!
//! Platform-agnostic types, traits, and error handling shared by the
//! Now Playing libraries.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackPatch`, `Playlist` and the built-in fallback track
//! - **Host Traits**: `AudioOutput` (the host's audio resource) and
//!   `PlaylistSource` (anything that can produce a playlist)
//! - **Error Handling**: `LoadError` and `DeviceError`
//!
//! # Example
//!
//! ```rust
//! use nowplaying_core::{Playlist, Track};
//!
//! let track = Track::new(
//!     "Night Drive",
//!     "Syn City FM",
//!     "https://music.example.com/night-drive.mp3",
//!     "https://music.example.com/night-drive.png",
//! )
//! .with_id(7);
//!
//! let playlist = Playlist::new(vec![track]);
//! assert_eq!(playlist.len(), 1);
//!
//! // An empty playlist reports the fallback track
//! assert_eq!(Playlist::empty().current_or_fallback(0), Track::fallback());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{DeviceError, LoadError};
pub use traits::{AudioOutput, OutputEvent, OutputSink, PlayAttempt, PlaylistSource, SourceId};
pub use types::{Playlist, Track, TrackPatch};
