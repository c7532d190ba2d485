/// Core error types for Now Playing
use thiserror::Error;

/// Failure to acquire a playlist
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Network-level failure (connect, reset, body read)
    #[error("Request failed: {0}")]
    Request(String),

    /// Server answered with a non-success status
    #[error("Server returned {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Backend address could not be used
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The load was cancelled or superseded
    #[error("Load cancelled")]
    Cancelled,
}

impl LoadError {
    /// Create a request error
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Whether this error only means the caller stopped waiting
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failure reported by the audio output resource
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The host declined to start playback (e.g. autoplay policy)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// Runtime failure of the output resource
    #[error("Audio output error: {0}")]
    Output(String),

    /// The resource has already been released
    #[error("Audio device released")]
    Released,
}

impl DeviceError {
    /// Create a rejected-playback error
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::PlaybackRejected(msg.into())
    }

    /// Create an output error
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }
}
