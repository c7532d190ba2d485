/// Host-facing traits for Now Playing
use crate::error::{DeviceError, LoadError};
use crate::types::Playlist;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Identifies one source assignment on an audio output
///
/// Every call to [`AudioOutput::set_source`] carries a fresh id, and every
/// [`OutputEvent`] names the id it belongs to. Consumers use it to drop
/// events that arrive after the source has been replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

impl SourceId {
    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Notification emitted by an audio output
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Playback position advanced
    TimeUpdate {
        /// Source the update belongs to
        source: SourceId,
        /// Elapsed time
        position: Duration,
        /// Total length, if the host knows it yet
        duration: Option<Duration>,
    },

    /// The source played through to its end
    Ended {
        /// Source that finished
        source: SourceId,
    },

    /// The output failed while handling the source
    Error {
        /// Source that failed
        source: SourceId,
        /// Host-provided description
        message: String,
    },
}

impl OutputEvent {
    /// Source this event is attributed to
    pub fn source(&self) -> SourceId {
        match self {
            Self::TimeUpdate { source, .. } | Self::Ended { source } | Self::Error { source, .. } => {
                *source
            }
        }
    }
}

/// Channel an output pushes its events into
pub type OutputSink = UnboundedSender<OutputEvent>;

/// Pending start request
///
/// Resolves once the host has actually started (or refused to start) playback.
/// The future owns everything it needs so it can outlive the call that created it.
pub type PlayAttempt = BoxFuture<'static, Result<(), DeviceError>>;

/// The host's audio-output resource
///
/// Implementers wrap whatever actually renders sound (a browser media element,
/// a platform player, a simulated clock). Decoding and mixing stay on the host
/// side; this trait only covers transport and reporting.
pub trait AudioOutput: Send {
    /// Start delivering events into `sink`, replacing any previous sink
    fn attach(&mut self, sink: OutputSink);

    /// Stop delivering events
    fn detach(&mut self);

    /// Assign a new source, stopping whatever was playing
    ///
    /// Subsequent events carry `source`.
    ///
    /// # Errors
    /// Returns an error if the host cannot accept the locator
    fn set_source(&mut self, source: SourceId, url: &str) -> Result<(), DeviceError>;

    /// Drop the current source, if any
    fn clear_source(&mut self);

    /// Move the playback position of the current source
    ///
    /// # Errors
    /// Returns an error if no source is assigned or the host refuses to seek
    fn set_position(&mut self, position: Duration) -> Result<(), DeviceError>;

    /// Ask the host to start or resume playback
    fn start(&mut self) -> PlayAttempt;

    /// Pause playback, keeping the current position
    fn stop(&mut self);

    /// Elapsed time of the current source
    fn position(&self) -> Duration;

    /// Total length of the current source, if known
    fn duration(&self) -> Option<Duration>;
}

/// Anything that can produce a playlist
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Produce a fresh playlist
    ///
    /// Implementations must stop work and return [`LoadError::Cancelled`]
    /// once `cancel` fires.
    async fn load(&self, cancel: &CancellationToken) -> Result<Playlist, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_advance() {
        let first = SourceId::default();
        let second = first.next();
        assert_eq!(second.get(), 1);
        assert!(second > first);
        assert_eq!(second.to_string(), "source#1");
    }

    #[test]
    fn events_report_their_source() {
        let source = SourceId::new(4);
        let events = [
            OutputEvent::TimeUpdate {
                source,
                position: Duration::from_secs(1),
                duration: None,
            },
            OutputEvent::Ended { source },
            OutputEvent::Error {
                source,
                message: "decode failure".to_string(),
            },
        ];

        assert!(events.iter().all(|event| event.source() == source));
    }
}
