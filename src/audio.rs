//! Clip playback backends for the `PlaybackHandle`.
//!
//! Clips are fetched through the asset cache and played on the caller's
//! worker thread, which blocks until the clip finishes or is cancelled.

use crate::cache::AssetCache;
use crate::cancellation::CancellationToken;
use crate::sequencer::AudioOutput;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Waits out each clip's length without an audio device. Keeps sequencing
/// timing realistic on headless machines.
pub struct SilentOutput {
    cache: AssetCache,
    fallback: Duration,
}

impl SilentOutput {
    pub fn new(cache: AssetCache, fallback: Duration) -> Self {
        Self { cache, fallback }
    }
}

impl AudioOutput for SilentOutput {
    fn play(&self, url: &str, cancel: &CancellationToken) -> Result<()> {
        let path = self
            .cache
            .fetch(url)
            .with_context(|| format!("Fetching clip {url}"))?;
        if !path.is_file() {
            anyhow::bail!("Clip not found at {}", path.display());
        }
        let length = clip_duration(&path).unwrap_or(self.fallback);
        debug!(%url, length_ms = length.as_millis(), "Silent playback");
        cancel.sleep(length);
        Ok(())
    }
}

/// Duration of a WAV file, or `None` when it cannot be read as WAV.
pub fn clip_duration(path: &Path) -> Option<Duration> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    let frames = reader.duration() as f64;
    Some(Duration::from_secs_f64(frames / spec.sample_rate as f64))
}

#[cfg(feature = "audio-output")]
pub use device::RodioOutput;

#[cfg(feature = "audio-output")]
mod device {
    use super::*;
    use rodio::{Decoder, OutputStream, Sink};
    use std::fs::File;
    use std::io::BufReader;

    const POLL: Duration = Duration::from_millis(20);

    /// Plays clips on the default output device.
    pub struct RodioOutput {
        cache: AssetCache,
    }

    impl RodioOutput {
        pub fn new(cache: AssetCache) -> Self {
            Self { cache }
        }
    }

    impl AudioOutput for RodioOutput {
        fn play(&self, url: &str, cancel: &CancellationToken) -> Result<()> {
            let path = self
                .cache
                .fetch(url)
                .with_context(|| format!("Fetching clip {url}"))?;
            let (_stream, handle) =
                OutputStream::try_default().context("Opening audio output")?;
            let sink = Sink::try_new(&handle).context("Creating sink")?;
            let reader = BufReader::new(File::open(&path)?);
            let source = Decoder::new(reader).context("Decoding clip")?;
            sink.append(source);
            sink.play();

            while !sink.empty() {
                if !cancel.sleep(POLL) {
                    debug!(%url, "Stopping clip");
                    sink.stop();
                    break;
                }
            }
            Ok(())
        }
    }
}
