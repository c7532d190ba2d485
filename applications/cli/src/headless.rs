//! Clock-driven audio output
//!
//! Stands in for a real audio resource: every source is treated as a track
//! of fixed length, and a tokio interval advances the position while
//! "playing". Nothing is decoded or rendered.

use futures_util::future::{self, FutureExt};
use nowplaying_core::{AudioOutput, DeviceError, OutputEvent, OutputSink, PlayAttempt, SourceId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Clock {
    source: Option<SourceId>,
    position: Duration,
}

pub struct HeadlessOutput {
    track_length: Duration,
    tick: Duration,
    sink: Option<OutputSink>,
    clock: Arc<Mutex<Clock>>,
    ticker: Option<CancellationToken>,
}

impl HeadlessOutput {
    pub fn new(track_length: Duration, tick: Duration) -> Self {
        Self {
            track_length,
            tick,
            sink: None,
            clock: Arc::new(Mutex::new(Clock::default())),
            ticker: None,
        }
    }

    /// Whether the clock is currently running
    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn clock(&self) -> MutexGuard<'_, Clock> {
        lock(&self.clock)
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

fn lock(clock: &Mutex<Clock>) -> MutexGuard<'_, Clock> {
    clock.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AudioOutput for HeadlessOutput {
    fn attach(&mut self, sink: OutputSink) {
        self.sink = Some(sink);
    }

    fn detach(&mut self) {
        self.stop_ticker();
        self.sink = None;
    }

    fn set_source(&mut self, source: SourceId, url: &str) -> Result<(), DeviceError> {
        if url.is_empty() {
            return Err(DeviceError::output("empty source locator"));
        }

        self.stop_ticker();

        let mut clock = self.clock();
        clock.source = Some(source);
        clock.position = Duration::ZERO;

        debug!(source = %source, url = %url, "Source assigned");
        Ok(())
    }

    fn clear_source(&mut self) {
        self.stop_ticker();

        let mut clock = self.clock();
        clock.source = None;
        clock.position = Duration::ZERO;
    }

    fn set_position(&mut self, position: Duration) -> Result<(), DeviceError> {
        let mut clock = self.clock();
        if clock.source.is_none() {
            return Err(DeviceError::output("no source assigned"));
        }
        clock.position = position.min(self.track_length);
        Ok(())
    }

    fn start(&mut self) -> PlayAttempt {
        let Some(source) = self.clock().source else {
            return future::ready(Err(DeviceError::output("no source assigned"))).boxed();
        };
        let Some(sink) = self.sink.clone() else {
            return future::ready(Err(DeviceError::Released)).boxed();
        };

        if self.is_running() {
            return future::ready(Ok(())).boxed();
        }

        let token = CancellationToken::new();
        self.ticker = Some(token.clone());

        let clock = Arc::clone(&self.clock);
        let length = self.track_length;
        let tick = self.tick;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let position = {
                    let mut clock = lock(&clock);
                    // stop() may have run between the tick and the lock
                    if token.is_cancelled() || clock.source != Some(source) {
                        break;
                    }
                    clock.position = (clock.position + tick).min(length);
                    clock.position
                };

                trace!(source = %source, ?position, "Tick");

                let update = OutputEvent::TimeUpdate {
                    source,
                    position,
                    duration: Some(length),
                };
                if sink.send(update).is_err() {
                    break;
                }

                if position >= length {
                    let _ = sink.send(OutputEvent::Ended { source });
                    break;
                }
            }

            token.cancel();
        });

        future::ready(Ok(())).boxed()
    }

    fn stop(&mut self) {
        self.stop_ticker();
    }

    fn position(&self) -> Duration {
        self.clock().position
    }

    fn duration(&self) -> Option<Duration> {
        self.clock().source.map(|_| self.track_length)
    }
}

impl Drop for HeadlessOutput {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
