//! Playback coordinator
//!
//! A single tokio task owns the playback state, the audio device adapter and
//! every in-flight playlist load. Transport commands reach it through a
//! [`CoordinatorHandle`]; observers read [`PlaybackSnapshot`]s from a `watch`
//! channel that is updated once per handled message.
//!
//! Asynchronous work never blocks the task: loads and play attempts are
//! parked in `FuturesUnordered` sets and their results come back through
//! the same `select!` loop as commands and device events. Each of them is
//! tagged (load generation, source id, attempt number) so that anything
//! superseded while in flight is dropped on arrival.

use crate::device::{
    AudioDeviceAdapter, DeviceEvent, DeviceNotification, DeviceSubscription, PendingPlay,
    PlaySettlement,
};
use crate::error::{PlaybackError, Result};
use crate::selector::{next_index, previous_index};
use crate::state::{clamp_percent, PlaybackSnapshot, PlaybackState};
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use nowplaying_core::{DeviceError, LoadError, Playlist, PlaylistSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Coordinator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Start with shuffle enabled
    pub shuffle: bool,

    /// Seed for shuffle selection (random when `None`)
    pub rng_seed: Option<u64>,
}

impl CoordinatorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with shuffle enabled or disabled
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Use a fixed seed for shuffle selection
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

#[derive(Debug)]
enum Command {
    PlayPause,
    Next,
    Previous,
    ToggleShuffle,
    Seek(f64),
    Load,
    CancelLoad,
    SetPlaylist(Playlist),
    Sync(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Client side of a running coordinator
///
/// Cheap to clone. The coordinator shuts down once every handle is dropped.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
}

impl CoordinatorHandle {
    /// Toggle between playing and paused
    pub fn play_pause(&self) -> Result<()> {
        self.send(Command::PlayPause)
    }

    /// Move to the next track (random while shuffling)
    pub fn next(&self) -> Result<()> {
        self.send(Command::Next)
    }

    /// Move to the previous track (always sequential)
    pub fn previous(&self) -> Result<()> {
        self.send(Command::Previous)
    }

    /// Flip shuffle mode
    pub fn toggle_shuffle(&self) -> Result<()> {
        self.send(Command::ToggleShuffle)
    }

    /// Seek to `percent` of the current track (clamped to `[0, 100]`)
    pub fn seek(&self, percent: f64) -> Result<()> {
        self.send(Command::Seek(percent))
    }

    /// Start loading a playlist, superseding any load in flight
    pub fn load(&self) -> Result<()> {
        self.send(Command::Load)
    }

    /// Cancel the load in flight, if any
    pub fn cancel_load(&self) -> Result<()> {
        self.send(Command::CancelLoad)
    }

    /// Replace the playlist directly
    pub fn set_playlist(&self, playlist: Playlist) -> Result<()> {
        self.send(Command::SetPlaylist(playlist))
    }

    /// Wait until every command sent before this call has been handled
    pub async fn sync(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Sync(tx))?;
        rx.await.map_err(|_| PlaybackError::CoordinatorStopped)
    }

    /// Stop the coordinator and release the audio device
    ///
    /// Resolves once teardown has finished.
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown(tx))?;
        // A dropped reply also means the task is gone
        let _ = rx.await;
        Ok(())
    }

    /// Receiver for snapshot updates
    ///
    /// The current snapshot counts as seen; `changed()` wakes on the next one.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        let mut snapshots = self.snapshots.clone();
        snapshots.borrow_and_update();
        snapshots
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::CoordinatorStopped)
    }
}

struct LoadOutcome {
    generation: u64,
    result: std::result::Result<Playlist, LoadError>,
}

/// The coordinator task
pub struct PlaybackCoordinator {
    state: PlaybackState,
    adapter: AudioDeviceAdapter,
    events: DeviceSubscription,
    source: Arc<dyn PlaylistSource>,
    rng: StdRng,
    snapshots: watch::Sender<PlaybackSnapshot>,

    loads: FuturesUnordered<BoxFuture<'static, LoadOutcome>>,
    load_generation: u64,
    load_token: Option<CancellationToken>,

    plays: FuturesUnordered<BoxFuture<'static, (u64, PlaySettlement)>>,
    play_attempt: u64,
}

impl PlaybackCoordinator {
    /// Spawn a coordinator on the current tokio runtime
    ///
    /// Nothing is loaded until [`CoordinatorHandle::load`] or
    /// [`CoordinatorHandle::set_playlist`] is called.
    ///
    /// # Errors
    /// Fails if the adapter's events are already subscribed or it has been
    /// released.
    pub fn spawn(
        mut adapter: AudioDeviceAdapter,
        source: Arc<dyn PlaylistSource>,
        config: CoordinatorConfig,
    ) -> Result<(CoordinatorHandle, JoinHandle<()>)> {
        let events = adapter.subscribe()?;

        let state = PlaybackState::new(config.shuffle);
        let (snapshots, snapshot_rx) = watch::channel(state.snapshot());
        let (commands, command_rx) = mpsc::unbounded_channel();

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let coordinator = Self {
            state,
            adapter,
            events,
            source,
            rng,
            snapshots,
            loads: FuturesUnordered::new(),
            load_generation: 0,
            load_token: None,
            plays: FuturesUnordered::new(),
            play_attempt: 0,
        };

        let task = tokio::spawn(coordinator.run(command_rx));

        let handle = CoordinatorHandle {
            commands,
            snapshots: snapshot_rx,
        };

        Ok((handle, task))
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        debug!("Playback coordinator started");

        let mut shutdown_reply = None;

        loop {
            tokio::select! {
                biased;

                Some(notification) = self.events.recv() => {
                    self.on_device_event(notification);
                }
                Some((attempt, settlement)) = self.plays.next() => {
                    self.on_play_settled(attempt, settlement);
                }
                Some(outcome) = self.loads.next() => {
                    self.on_load_finished(outcome);
                }
                command = commands.recv() => match command {
                    Some(Command::Shutdown(reply)) => {
                        shutdown_reply = Some(reply);
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => break,
                },
            }

            self.publish();
        }

        self.teardown();

        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
    }

    fn handle_command(&mut self, command: Command) {
        debug!(?command, "Handling command");

        match command {
            Command::PlayPause => self.play_pause(),
            Command::Next => self.skip(true),
            Command::Previous => self.skip(false),
            Command::ToggleShuffle => {
                if !self.state.is_empty() {
                    self.state.is_shuffling = !self.state.is_shuffling;
                }
            }
            Command::Seek(percent) => self.seek(percent),
            Command::Load => self.start_load(),
            Command::CancelLoad => self.cancel_load(),
            Command::SetPlaylist(playlist) => self.apply_playlist(playlist),
            Command::Sync(reply) => {
                let _ = reply.send(());
            }
            // Handled by the run loop
            Command::Shutdown(_) => {}
        }
    }

    fn play_pause(&mut self) {
        if self.state.is_empty() {
            return;
        }

        if self.state.is_playing {
            self.state.is_playing = false;
            self.adapter.pause();
            return;
        }

        self.state.is_playing = true;
        match self.adapter.play() {
            Ok(pending) => self.track_play(pending),
            Err(e) => self.on_play_failed(&e),
        }
    }

    fn skip(&mut self, forward: bool) {
        if self.state.is_empty() {
            return;
        }

        let total = self.state.playlist.len();
        self.state.index = if forward {
            next_index(self.state.index, total, self.state.is_shuffling, &mut self.rng)
        } else {
            previous_index(self.state.index, total)
        };

        self.load_current();
    }

    fn seek(&mut self, percent: f64) {
        if self.state.is_empty() || percent.is_nan() {
            return;
        }

        let percent = clamp_percent(percent);
        match self.adapter.seek(percent / 100.0) {
            Ok(true) => self.state.progress_percent = percent,
            Ok(false) => debug!(percent, "Duration unknown, seek ignored"),
            Err(e) => self.on_device_error(&e),
        }
    }

    /// Load the track at the current index from the start, keeping the
    /// current play intent
    fn load_current(&mut self) {
        self.state.progress_percent = 0.0;
        self.invalidate_plays();

        let Some(url) = self.state.current_track().map(|track| track.url.clone()) else {
            self.adapter.unload();
            return;
        };

        debug!(index = self.state.index, url = %url, playing = self.state.is_playing, "Loading track");

        match self.adapter.load_and_play(&url, self.state.is_playing) {
            Ok(Some(pending)) => self.track_play(pending),
            Ok(None) => {}
            Err(e) => self.on_device_error(&e),
        }
    }

    fn apply_playlist(&mut self, playlist: Playlist) {
        info!(tracks = playlist.len(), "Playlist replaced");

        self.state.reset(playlist);
        self.load_current();
    }

    fn start_load(&mut self) {
        if let Some(previous) = self.load_token.take() {
            previous.cancel();
        }

        self.load_generation += 1;
        let generation = self.load_generation;
        let token = CancellationToken::new();
        self.load_token = Some(token.clone());

        debug!(generation, "Starting playlist load");

        let source = Arc::clone(&self.source);
        self.loads.push(
            async move {
                let result = source.load(&token).await;
                LoadOutcome { generation, result }
            }
            .boxed(),
        );
    }

    fn cancel_load(&mut self) {
        if let Some(token) = self.load_token.take() {
            debug!(generation = self.load_generation, "Cancelling playlist load");
            token.cancel();
            // Whatever the cancelled load still produces is stale
            self.load_generation += 1;
        }
    }

    fn on_load_finished(&mut self, outcome: LoadOutcome) {
        let LoadOutcome { generation, result } = outcome;

        if generation != self.load_generation {
            debug!(generation, latest = self.load_generation, "Discarding stale load result");
            return;
        }

        self.load_token = None;

        match result {
            Ok(playlist) => {
                info!(generation, tracks = playlist.len(), "Playlist loaded");
                self.apply_playlist(playlist);
            }
            Err(LoadError::Cancelled) => {
                debug!(generation, "Playlist load cancelled");
            }
            Err(e) => {
                error!(generation, error = %e, "Failed to load playlist, using fallback track");
                self.apply_playlist(Playlist::fallback());
            }
        }
    }

    /// Settle `pending` right away when it is already resolved, otherwise
    /// park it until it is
    fn track_play(&mut self, mut pending: PendingPlay) {
        self.play_attempt += 1;
        let attempt = self.play_attempt;

        match (&mut pending).now_or_never() {
            Some(settlement) => self.on_play_settled(attempt, settlement),
            None => self
                .plays
                .push(pending.map(move |settlement| (attempt, settlement)).boxed()),
        }
    }

    /// Make every play attempt in flight stale
    fn invalidate_plays(&mut self) {
        self.play_attempt += 1;
    }

    fn on_play_settled(&mut self, attempt: u64, settlement: PlaySettlement) {
        let PlaySettlement { source, result } = settlement;

        if source != self.adapter.current_source() {
            debug!(source = %source, "Ignoring play settlement for replaced source");
            return;
        }

        match result {
            Ok(()) if !self.state.is_playing => {
                // Paused while the start was pending
                self.adapter.pause();
            }
            Ok(()) => debug!(source = %source, "Playback started"),
            Err(e) if attempt == self.play_attempt => self.on_play_failed(&e),
            Err(e) => debug!(source = %source, error = %e, "Ignoring superseded play failure"),
        }
    }

    fn on_play_failed(&mut self, error: &DeviceError) {
        match error {
            DeviceError::PlaybackRejected(_) => {
                warn!(error = %error, "Playback rejected");
                self.state.is_playing = false;
            }
            _ => self.on_device_error(error),
        }
    }

    fn on_device_error(&mut self, error: &DeviceError) {
        warn!(index = self.state.index, error = %error, "Audio device error");

        self.adapter.pause();
        self.adapter.mark_failed();
        self.state.is_playing = false;
        self.state.progress_percent = 0.0;
    }

    fn on_device_event(&mut self, notification: DeviceNotification) {
        let DeviceNotification { source, event } = notification;

        if source != self.adapter.current_source() || self.state.is_empty() {
            return;
        }

        match event {
            DeviceEvent::Progress(fraction) => self.state.set_progress_fraction(fraction),
            DeviceEvent::Ended => {
                // Auto-advance always plays; a lone track restarts
                self.state.is_playing = true;
                self.skip(true);
            }
            DeviceEvent::Error(e) => self.on_device_error(&e),
        }
    }

    fn publish(&self) {
        let next = self.state.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn teardown(&mut self) {
        if let Some(token) = self.load_token.take() {
            token.cancel();
        }
        self.loads.clear();
        self.plays.clear();
        self.adapter.release();

        info!("Playback coordinator stopped");
    }
}
