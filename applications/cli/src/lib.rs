//! Now Playing - headless host
//!
//! Runs the playback coordinator against the real playlist backend and a
//! simulated audio output, driven from the terminal.

pub mod config;
pub mod error;
pub mod headless;
pub mod logging;
pub mod transport;

pub use config::CliConfig;
pub use error::ConfigError;
pub use headless::HeadlessOutput;
pub use transport::{render_snapshot, TransportCommand};
