//! Audio device adapter
//!
//! Boundary object between the coordinator and the host's [`AudioOutput`].
//! It owns the output exclusively, stamps every source assignment with a
//! fresh [`SourceId`], and turns raw output events into [`DeviceEvent`]s
//! that only ever describe the current source.

use crate::error::{PlaybackError, Result};
use futures_util::FutureExt;
use nowplaying_core::{AudioOutput, DeviceError, OutputEvent, PlayAttempt, SourceId};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Device-driven event, already attributed to the current source
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Playback position as a fraction of the duration, in `[0, 1]`
    Progress(f64),
    /// The source played to its end
    Ended,
    /// The output failed
    Error(DeviceError),
}

/// A [`DeviceEvent`] together with the source it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceNotification {
    pub source: SourceId,
    pub event: DeviceEvent,
}

/// Result of a play attempt
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySettlement {
    pub source: SourceId,
    pub result: std::result::Result<(), DeviceError>,
}

/// A play attempt that has not settled yet
///
/// Resolves to a [`PlaySettlement`] naming the source the attempt was made
/// for, so late settlements can be told apart from current ones.
pub struct PendingPlay {
    source: SourceId,
    attempt: PlayAttempt,
}

impl PendingPlay {
    /// Source this attempt was made for
    pub fn source(&self) -> SourceId {
        self.source
    }
}

impl Future for PendingPlay {
    type Output = PlaySettlement;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let source = self.source;
        self.attempt
            .poll_unpin(cx)
            .map(|result| PlaySettlement { source, result })
    }
}

impl std::fmt::Debug for PendingPlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPlay")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Convert a position report into a progress fraction
///
/// Unknown, zero, or non-finite durations report `0`. The result is clamped
/// to `[0, 1]`.
pub fn progress_fraction(position: Duration, duration: Option<Duration>) -> f64 {
    let Some(duration) = duration.filter(|d| !d.is_zero()) else {
        return 0.0;
    };

    let fraction = position.as_secs_f64() / duration.as_secs_f64();
    if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Wrapper around the host audio output
pub struct AudioDeviceAdapter {
    output: Box<dyn AudioOutput>,
    current: SourceId,
    generation: Arc<AtomicU64>,
    released: CancellationToken,
    events: Option<mpsc::UnboundedReceiver<OutputEvent>>,
    url: Option<String>,
    failed: bool,
}

impl AudioDeviceAdapter {
    /// Take ownership of `output` and start collecting its events
    pub fn new(mut output: Box<dyn AudioOutput>) -> Self {
        let (sink, events) = mpsc::unbounded_channel();
        output.attach(sink);

        Self {
            output,
            current: SourceId::default(),
            generation: Arc::new(AtomicU64::new(0)),
            released: CancellationToken::new(),
            events: Some(events),
            url: None,
            failed: false,
        }
    }

    /// Subscribe to device events
    ///
    /// Only one subscription can exist. It ends once the adapter is released.
    pub fn subscribe(&mut self) -> Result<DeviceSubscription> {
        if self.is_released() {
            return Err(PlaybackError::Device(DeviceError::Released));
        }

        let events = self.events.take().ok_or(PlaybackError::AlreadySubscribed)?;

        Ok(DeviceSubscription {
            events,
            generation: Arc::clone(&self.generation),
            released: self.released.clone(),
            ended: None,
        })
    }

    /// Source id of the most recent assignment
    pub fn current_source(&self) -> SourceId {
        self.current
    }

    /// Locator of the loaded source, if any
    pub fn loaded_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Whether [`release`](Self::release) has run
    pub fn is_released(&self) -> bool {
        self.released.is_cancelled()
    }

    /// Load `url` from the start, and start it when `want_playing` is set
    ///
    /// Returns the pending start, if one was requested.
    pub fn load_and_play(
        &mut self,
        url: &str,
        want_playing: bool,
    ) -> std::result::Result<Option<PendingPlay>, DeviceError> {
        self.ensure_active()?;

        self.url = Some(url.to_string());
        self.assign_source()?;

        Ok(want_playing.then(|| self.start()))
    }

    /// Start or resume the loaded source
    ///
    /// After an output error the source is assigned again first.
    pub fn play(&mut self) -> std::result::Result<PendingPlay, DeviceError> {
        self.ensure_active()?;

        if self.url.is_none() {
            return Err(DeviceError::output("no source loaded"));
        }

        if self.failed {
            debug!(source = %self.current, "Reassigning source after output error");
            self.assign_source()?;
        }

        Ok(self.start())
    }

    /// Pause, keeping the position
    pub fn pause(&mut self) {
        if !self.is_released() {
            self.output.stop();
        }
    }

    /// Move to `fraction` of the current source's duration
    ///
    /// Returns `false` when the duration is not known yet and nothing moved.
    pub fn seek(&mut self, fraction: f64) -> std::result::Result<bool, DeviceError> {
        self.ensure_active()?;

        let Some(duration) = self.output.duration().filter(|d| !d.is_zero()) else {
            return Ok(false);
        };

        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.output.set_position(duration.mul_f64(fraction))?;
        Ok(true)
    }

    /// Record that the output failed, so the next [`play`](Self::play)
    /// assigns the source again
    ///
    /// Events and play settlements still in flight for the failed source
    /// are dropped from here on.
    pub fn mark_failed(&mut self) {
        if self.is_released() {
            return;
        }

        let failed = self.current;
        self.bump_source();
        self.failed = true;

        debug!(source = %failed, "Source marked failed");
    }

    /// Drop the current source
    pub fn unload(&mut self) {
        if self.is_released() {
            return;
        }

        self.output.stop();
        // Anything still in flight for the old source is now stale
        self.bump_source();
        self.output.clear_source();
        self.url = None;
        self.failed = false;
    }

    /// Stop playback and let go of the output
    ///
    /// Idempotent. Ends the event subscription.
    pub fn release(&mut self) {
        if self.is_released() {
            return;
        }

        self.output.stop();
        self.output.clear_source();
        self.output.detach();
        self.url = None;
        self.released.cancel();

        debug!("Audio device released");
    }

    fn ensure_active(&self) -> std::result::Result<(), DeviceError> {
        if self.is_released() {
            Err(DeviceError::Released)
        } else {
            Ok(())
        }
    }

    fn assign_source(&mut self) -> std::result::Result<(), DeviceError> {
        let url = self.url.clone().ok_or_else(|| DeviceError::output("no source loaded"))?;
        let source = self.bump_source();

        trace!(source = %source, url = %url, "Assigning source");

        let assigned = self
            .output
            .set_source(source, &url)
            .and_then(|()| self.output.set_position(Duration::ZERO));

        match assigned {
            Ok(()) => {
                self.failed = false;
                Ok(())
            }
            Err(e) => {
                warn!(source = %source, error = %e, "Failed to assign source");
                self.failed = true;
                Err(e)
            }
        }
    }

    fn bump_source(&mut self) -> SourceId {
        self.current = self.current.next();
        self.generation.store(self.current.get(), Ordering::SeqCst);
        self.current
    }

    fn start(&mut self) -> PendingPlay {
        PendingPlay {
            source: self.current,
            attempt: self.output.start(),
        }
    }
}

impl Drop for AudioDeviceAdapter {
    fn drop(&mut self) {
        self.release();
    }
}

/// Stream of device events for the current source
///
/// Events from superseded sources are dropped, and `Ended` is delivered at
/// most once per source.
pub struct DeviceSubscription {
    events: mpsc::UnboundedReceiver<OutputEvent>,
    generation: Arc<AtomicU64>,
    released: CancellationToken,
    ended: Option<SourceId>,
}

impl DeviceSubscription {
    /// Next event for the current source
    ///
    /// Returns `None` once the adapter has been released or the output
    /// dropped its sink. Cancel safe.
    pub async fn recv(&mut self) -> Option<DeviceNotification> {
        loop {
            let event = tokio::select! {
                biased;
                () = self.released.cancelled() => return None,
                event = self.events.recv() => event?,
            };

            if let Some(notification) = self.accept(event) {
                return Some(notification);
            }
        }
    }

    fn accept(&mut self, event: OutputEvent) -> Option<DeviceNotification> {
        let current = SourceId::new(self.generation.load(Ordering::SeqCst));
        let source = event.source();

        if source != current {
            trace!(source = %source, current = %current, "Dropping stale device event");
            return None;
        }

        let event = match event {
            OutputEvent::TimeUpdate {
                position, duration, ..
            } => DeviceEvent::Progress(progress_fraction(position, duration)),
            OutputEvent::Ended { .. } => {
                if self.ended == Some(source) {
                    return None;
                }
                self.ended = Some(source);
                DeviceEvent::Ended
            }
            OutputEvent::Error { message, .. } => DeviceEvent::Error(DeviceError::Output(message)),
        };

        Some(DeviceNotification { source, event })
    }
}
