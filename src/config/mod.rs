//! Configuration loading for the lesson player.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! defaults so a lesson can still be played.

mod defaults;
mod io;
mod models;

pub use io::{load_config, parse_config};
pub use models::{LogLevel, PlayerConfig, SequencerTiming};
