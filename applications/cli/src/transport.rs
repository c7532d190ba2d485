//! Terminal transport controls
//!
//! Single-letter commands read from stdin, and the one-line rendering of a
//! snapshot printed after every change.

use nowplaying_playback::{CoordinatorHandle, PlaybackSnapshot, Result};
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str =
    "commands: p play/pause, n next, b previous, s shuffle, f <pct> seek, r reload, q quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    PlayPause,
    Next,
    Previous,
    ToggleShuffle,
    Seek(f64),
    Reload,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Seek needs a percentage between 0 and 100")]
    MissingPercent,
}

impl FromStr for TransportCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Err(ParseCommandError::Empty);
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "p" | "play" | "pause" => Self::PlayPause,
            "n" | "next" => Self::Next,
            "b" | "back" | "prev" => Self::Previous,
            "s" | "shuffle" => Self::ToggleShuffle,
            "f" | "seek" => {
                let percent = parts
                    .next()
                    .and_then(|p| p.trim_end_matches('%').parse::<f64>().ok())
                    .filter(|p| p.is_finite())
                    .ok_or(ParseCommandError::MissingPercent)?;
                Self::Seek(percent)
            }
            "r" | "reload" => Self::Reload,
            "h" | "?" | "help" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

impl TransportCommand {
    /// Forward the command to the coordinator
    ///
    /// `Help` and `Quit` are handled by the caller and do nothing here.
    pub fn apply(self, handle: &CoordinatorHandle) -> Result<()> {
        match self {
            Self::PlayPause => handle.play_pause(),
            Self::Next => handle.next(),
            Self::Previous => handle.previous(),
            Self::ToggleShuffle => handle.toggle_shuffle(),
            Self::Seek(percent) => handle.seek(percent),
            Self::Reload => handle.load(),
            Self::Help | Self::Quit => Ok(()),
        }
    }
}

/// One-line status for a snapshot
pub fn render_snapshot(snapshot: &PlaybackSnapshot) -> String {
    let state = if snapshot.is_playing { "playing" } else { "paused" };
    let position = if snapshot.is_empty() {
        "-/-".to_string()
    } else {
        format!("{}/{}", snapshot.current_index + 1, snapshot.track_count)
    };
    let shuffle = if snapshot.is_shuffling { " shuffle" } else { "" };

    format!(
        "[{}] {} - {} ({}, {:.0}%{})",
        position,
        snapshot.current_track.name,
        snapshot.current_track.artist,
        state,
        snapshot.progress_percent,
        shuffle
    )
}
