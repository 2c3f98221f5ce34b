//! Lesson playback for picture-and-sentence lessons.
//!
//! The sequencing core lives in [`sequencer`]; [`runtime`] wires it to the
//! backend, the asset cache and an audio output.

pub mod api;
pub mod audio;
pub mod cache;
pub mod cancellation;
pub mod config;
pub mod content;
pub mod images;
pub mod model;
pub mod navigation;
pub mod progress;
pub mod runtime;
pub mod sequencer;
pub mod terminal;
