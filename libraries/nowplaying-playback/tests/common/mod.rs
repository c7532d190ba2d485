//! Shared test doubles for coordinator tests

#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::future::{self, FutureExt};
use nowplaying_core::{
    AudioOutput, DeviceError, LoadError, OutputEvent, OutputSink, PlayAttempt, Playlist,
    PlaylistSource, SourceId, Track,
};
use nowplaying_playback::{
    AudioDeviceAdapter, CoordinatorConfig, CoordinatorHandle, PlaybackCoordinator,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

// ===== Audio output =====

/// How `start` answers
#[derive(Debug, Clone, PartialEq)]
pub enum StartMode {
    /// Resolve successfully right away
    Accept,
    /// Reject right away
    Reject,
    /// Stay pending until the test settles it
    Hold,
}

#[derive(Default)]
struct OutputState {
    sink: Option<OutputSink>,
    source: Option<SourceId>,
    urls: Vec<String>,
    playing: bool,
    duration: Option<Duration>,
    position: Duration,
    start_mode: Option<StartMode>,
    held: Vec<oneshot::Sender<Result<(), DeviceError>>>,
    starts: usize,
    stops: usize,
    released: bool,
}

/// Test-side view of a [`MockOutput`]
#[derive(Clone, Default)]
pub struct OutputProbe {
    state: Arc<Mutex<OutputState>>,
}

impl OutputProbe {
    pub fn set_start_mode(&self, mode: StartMode) {
        self.state.lock().unwrap().start_mode = Some(mode);
    }

    pub fn set_duration(&self, duration: Option<Duration>) {
        self.state.lock().unwrap().duration = duration;
    }

    pub fn current_source(&self) -> Option<SourceId> {
        self.state.lock().unwrap().source
    }

    /// Every URL assigned so far, in order
    pub fn urls(&self) -> Vec<String> {
        self.state.lock().unwrap().urls.clone()
    }

    pub fn last_url(&self) -> Option<String> {
        self.state.lock().unwrap().urls.last().cloned()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    pub fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    pub fn starts(&self) -> usize {
        self.state.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.state.lock().unwrap().stops
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().unwrap().released
    }

    /// Settle the oldest held start
    pub fn settle_held(&self, result: Result<(), DeviceError>) {
        let mut state = self.state.lock().unwrap();
        assert!(!state.held.is_empty(), "no start is being held");
        let tx = state.held.remove(0);
        if result.is_ok() {
            state.playing = true;
        }
        let _ = tx.send(result);
    }

    pub fn emit(&self, event: OutputEvent) {
        let state = self.state.lock().unwrap();
        if let Some(sink) = &state.sink {
            let _ = sink.send(event);
        }
    }

    fn current(&self) -> SourceId {
        self.current_source().expect("a source is assigned")
    }

    pub fn emit_time(&self, position: Duration, duration: Option<Duration>) {
        let source = self.current();
        self.emit(OutputEvent::TimeUpdate {
            source,
            position,
            duration,
        });
    }

    pub fn emit_ended(&self) {
        let source = self.current();
        self.emit(OutputEvent::Ended { source });
    }

    pub fn emit_error(&self, message: &str) {
        let source = self.current();
        self.emit(OutputEvent::Error {
            source,
            message: message.to_string(),
        });
    }
}

/// Scriptable [`AudioOutput`]
pub struct MockOutput {
    probe: OutputProbe,
}

impl MockOutput {
    pub fn new() -> (Self, OutputProbe) {
        let probe = OutputProbe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }

    fn state(&self) -> std::sync::MutexGuard<'_, OutputState> {
        self.probe.state.lock().unwrap()
    }
}

impl AudioOutput for MockOutput {
    fn attach(&mut self, sink: OutputSink) {
        self.state().sink = Some(sink);
    }

    fn detach(&mut self) {
        let mut state = self.state();
        state.sink = None;
        state.released = true;
    }

    fn set_source(&mut self, source: SourceId, url: &str) -> Result<(), DeviceError> {
        let mut state = self.state();
        state.source = Some(source);
        state.urls.push(url.to_string());
        state.playing = false;
        state.position = Duration::ZERO;
        Ok(())
    }

    fn clear_source(&mut self) {
        let mut state = self.state();
        state.source = None;
        state.playing = false;
    }

    fn set_position(&mut self, position: Duration) -> Result<(), DeviceError> {
        self.state().position = position;
        Ok(())
    }

    fn start(&mut self) -> PlayAttempt {
        let mut state = self.state();
        state.starts += 1;

        match state.start_mode.clone().unwrap_or(StartMode::Accept) {
            StartMode::Accept => {
                state.playing = true;
                future::ready(Ok(())).boxed()
            }
            StartMode::Reject => {
                future::ready(Err(DeviceError::rejected("autoplay blocked"))).boxed()
            }
            StartMode::Hold => {
                let (tx, rx) = oneshot::channel();
                state.held.push(tx);
                async move { rx.await.unwrap_or(Err(DeviceError::Released)) }.boxed()
            }
        }
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.stops += 1;
        state.playing = false;
    }

    fn position(&self) -> Duration {
        self.state().position
    }

    fn duration(&self) -> Option<Duration> {
        self.state().duration
    }
}

// ===== Playlist sources =====

/// Source whose loads stay pending until the test resolves them
#[derive(Clone, Default)]
pub struct ControlledSource {
    pending: Arc<Mutex<Vec<Option<oneshot::Sender<Result<Playlist, LoadError>>>>>>,
    ignore_cancellation: bool,
}

impl ControlledSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads keep running after their token fires
    pub fn ignoring_cancellation() -> Self {
        Self {
            ignore_cancellation: true,
            ..Self::default()
        }
    }

    /// Number of loads started so far
    pub fn started(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Resolve the `index`-th load (0-based, in start order)
    pub fn resolve(&self, index: usize, result: Result<Playlist, LoadError>) {
        let tx = self.pending.lock().unwrap()[index]
            .take()
            .expect("load already resolved");
        let _ = tx.send(result);
    }
}

#[async_trait]
impl PlaylistSource for ControlledSource {
    async fn load(&self, cancel: &CancellationToken) -> Result<Playlist, LoadError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push(Some(tx));

        let result = async { rx.await.unwrap_or(Err(LoadError::Cancelled)) };

        if self.ignore_cancellation {
            return result.await;
        }

        tokio::select! {
            () = cancel.cancelled() => Err(LoadError::Cancelled),
            result = result => result,
        }
    }
}

// ===== Helpers =====

pub fn track(id: i64) -> Track {
    Track::new(
        format!("Track {}", id),
        "Test Artist",
        format!("https://music.example.com/{}.mp3", id),
        format!("https://music.example.com/{}.png", id),
    )
    .with_id(id)
}

pub fn playlist(n: i64) -> Playlist {
    (0..n).map(track).collect()
}

pub struct Harness {
    pub handle: CoordinatorHandle,
    pub output: OutputProbe,
    pub source: ControlledSource,
    pub task: tokio::task::JoinHandle<()>,
}

pub fn spawn_with(source: ControlledSource, config: CoordinatorConfig) -> Harness {
    let (output, probe) = MockOutput::new();
    let adapter = AudioDeviceAdapter::new(Box::new(output));
    let (handle, task) =
        PlaybackCoordinator::spawn(adapter, Arc::new(source.clone()), config).unwrap();

    Harness {
        handle,
        output: probe,
        source,
        task,
    }
}

pub fn spawn() -> Harness {
    spawn_with(
        ControlledSource::new(),
        CoordinatorConfig::default().with_rng_seed(7),
    )
}

/// Spawn and install a playlist of `n` tracks
pub async fn spawn_loaded(n: i64) -> Harness {
    let harness = spawn();
    harness.handle.set_playlist(playlist(n)).unwrap();
    harness.handle.sync().await.unwrap();
    harness
}
