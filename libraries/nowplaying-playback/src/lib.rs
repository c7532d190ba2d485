//! Now Playing - Playback Coordination
//!
//! Keeps a playlist, transport controls and a progress indicator in step
//! with an audio output whose state changes asynchronously.
//!
//! This crate provides:
//! - Track selection (sequential, shuffled, always-sequential previous)
//! - An adapter that owns the host audio output and filters its events
//! - A coordinator task that owns playback state and publishes snapshots
//!
//! # Architecture
//!
//! `nowplaying-playback` has no knowledge of HTTP or of any audio backend:
//! - Playlists come from a [`PlaylistSource`](nowplaying_core::PlaylistSource)
//! - Sound comes from an [`AudioOutput`](nowplaying_core::AudioOutput)
//!
//! Both are injected when the coordinator is spawned.
//!
//! # Example
//!
//! ```rust,ignore
//! use nowplaying_playback::{AudioDeviceAdapter, CoordinatorConfig, PlaybackCoordinator};
//! use std::sync::Arc;
//!
//! let adapter = AudioDeviceAdapter::new(Box::new(my_output));
//! let (handle, _task) =
//!     PlaybackCoordinator::spawn(adapter, Arc::new(my_loader), CoordinatorConfig::default())?;
//!
//! handle.load()?;
//!
//! let mut snapshots = handle.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     let snapshot = snapshots.borrow().clone();
//!     println!("{} ({:.0}%)", snapshot.current_track.name, snapshot.progress_percent);
//! }
//! ```

mod coordinator;
pub mod device;
mod error;
pub mod selector;
mod state;

// Public exports
pub use coordinator::{CoordinatorConfig, CoordinatorHandle, PlaybackCoordinator};
pub use device::{AudioDeviceAdapter, DeviceEvent, DeviceNotification, DeviceSubscription, PendingPlay, PlaySettlement};
pub use error::{PlaybackError, Result};
pub use state::PlaybackSnapshot;
