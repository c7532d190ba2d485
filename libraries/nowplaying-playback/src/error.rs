//! Error types for playback coordination

use nowplaying_core::DeviceError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The coordinator task has shut down
    #[error("Playback coordinator stopped")]
    CoordinatorStopped,

    /// Device events can only be consumed by one subscriber
    #[error("Device events already subscribed")]
    AlreadySubscribed,

    /// Audio device error
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
