//! Playback state and the snapshots published to observers

use nowplaying_core::{Playlist, Track};
use serde::{Deserialize, Serialize};

/// Consistent view of playback, published after every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Active track, or the fallback track while no playlist is loaded
    pub current_track: Track,

    /// Position of the active track in the playlist
    pub current_index: usize,

    /// Number of tracks in the playlist (0 while empty)
    pub track_count: usize,

    /// Whether playback is (optimistically) running
    pub is_playing: bool,

    /// Whether `next` picks a random track
    pub is_shuffling: bool,

    /// Position in the active track, in `[0, 100]`
    pub progress_percent: f64,
}

impl PlaybackSnapshot {
    /// Whether no playlist is loaded
    pub fn is_empty(&self) -> bool {
        self.track_count == 0
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        PlaybackState::new(false).snapshot()
    }
}

/// Mutable playback state, owned by the coordinator task
#[derive(Debug, Clone, Default)]
pub(crate) struct PlaybackState {
    pub playlist: Playlist,
    pub index: usize,
    pub is_playing: bool,
    pub is_shuffling: bool,
    pub progress_percent: f64,
}

impl PlaybackState {
    pub fn new(is_shuffling: bool) -> Self {
        Self {
            is_shuffling,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.index)
    }

    /// Replace the playlist and rewind to its first track, paused
    pub fn reset(&mut self, playlist: Playlist) {
        self.playlist = playlist;
        self.index = 0;
        self.progress_percent = 0.0;
        self.is_playing = false;
    }

    /// Set progress from a `[0, 1]` fraction
    pub fn set_progress_fraction(&mut self, fraction: f64) {
        self.progress_percent = clamp_percent(fraction * 100.0);
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let empty = self.is_empty();

        PlaybackSnapshot {
            current_track: self.playlist.current_or_fallback(self.index),
            current_index: if empty { 0 } else { self.index },
            track_count: self.playlist.len(),
            is_playing: self.is_playing && !empty,
            is_shuffling: self.is_shuffling,
            progress_percent: if empty { 0.0 } else { clamp_percent(self.progress_percent) },
        }
    }
}

/// Clamp to `[0, 100]`, mapping NaN to 0
pub(crate) fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(n: i64) -> Playlist {
        (0..n)
            .map(|i| Track::new(format!("Track {}", i), "Artist", format!("/{}.mp3", i), "/c.png").with_id(i))
            .collect()
    }

    #[test]
    fn empty_state_reports_fallback() {
        let snapshot = PlaybackSnapshot::default();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.current_track, Track::fallback());
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.progress_percent, 0.0);
    }

    #[test]
    fn reset_rewinds_and_pauses() {
        let mut state = PlaybackState::new(true);
        state.reset(playlist(3));
        state.index = 2;
        state.is_playing = true;
        state.progress_percent = 40.0;

        state.reset(playlist(2));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.current_index, 0);
        assert_eq!(snapshot.track_count, 2);
        assert!(!snapshot.is_playing);
        assert!(snapshot.is_shuffling);
        assert_eq!(snapshot.progress_percent, 0.0);
    }

    #[test]
    fn progress_is_clamped() {
        let mut state = PlaybackState::new(false);
        state.reset(playlist(1));

        state.set_progress_fraction(1.7);
        assert_eq!(state.snapshot().progress_percent, 100.0);

        state.set_progress_fraction(f64::NAN);
        assert_eq!(state.snapshot().progress_percent, 0.0);

        state.set_progress_fraction(0.25);
        assert_eq!(state.snapshot().progress_percent, 25.0);
    }

    #[test]
    fn snapshot_serializes() {
        let json = serde_json::to_value(PlaybackSnapshot::default()).unwrap();
        assert_eq!(json["current_track"]["name"], "Neon Skyline");
        assert_eq!(json["is_playing"], false);
    }
}
