//! Sole owner of the audio output.
//!
//! Each clip plays on its own worker thread; the worker posts exactly one
//! `Message::AudioResolved` back to the runtime, stamped with the generation
//! the clip was started under.

use super::messages::{AudioResolution, EndReason, Generation, Message};
use crate::cancellation::CancellationToken;
use anyhow::Result;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, info, warn};

/// Something that can play one clip to completion.
///
/// `play` blocks the calling worker thread until the clip ends, fails, or the
/// token is cancelled; it must return promptly after cancellation.
pub trait AudioOutput: Send + Sync {
    fn play(&self, url: &str, cancel: &CancellationToken) -> Result<()>;
}

#[derive(Debug)]
struct ActiveClip {
    generation: Generation,
    cancel: CancellationToken,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub started: u64,
    pub cancelled: u64,
    pub settled: u64,
}

pub struct PlaybackHandle {
    output: Arc<dyn AudioOutput>,
    events: Sender<Message>,
    active: Option<ActiveClip>,
    stats: PlaybackStats,
}

impl PlaybackHandle {
    pub fn new(output: Arc<dyn AudioOutput>, events: Sender<Message>) -> Self {
        Self {
            output,
            events,
            active: None,
            stats: PlaybackStats::default(),
        }
    }

    /// Begin playing `url`. Any clip still playing is cancelled first.
    pub fn start(&mut self, generation: Generation, url: String) {
        self.cancel();
        let cancel = CancellationToken::new();
        self.active = Some(ActiveClip {
            generation,
            cancel: cancel.clone(),
        });
        self.stats.started += 1;
        info!(%generation, %url, "Starting clip");

        let output = Arc::clone(&self.output);
        let events = self.events.clone();
        let spawned = thread::Builder::new()
            .name(format!("clip-{generation}"))
            .spawn(move || {
                let outcome = output.play(&url, &cancel);
                let resolution = resolve(outcome, &cancel, &url);
                let _ = events.send(Message::AudioResolved {
                    generation,
                    resolution,
                });
            });
        if let Err(err) = spawned {
            warn!(%generation, "Failed to spawn playback worker: {err}");
            let _ = self.events.send(Message::AudioResolved {
                generation,
                resolution: AudioResolution::Ended(EndReason::Failed),
            });
        }
    }

    /// Stop the active clip, if any. Its worker reports `Cancelled`.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel.cancel();
        self.stats.cancelled += 1;
        debug!(generation = %active.generation, "Cancelled clip");
        true
    }

    /// Forget the active clip once its resolution has arrived.
    pub fn settle(&mut self, generation: Generation) {
        if self.active_generation() == Some(generation) {
            self.active = None;
            self.stats.settled += 1;
        }
    }

    pub fn active_generation(&self) -> Option<Generation> {
        self.active.as_ref().map(|clip| clip.generation)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn resolve(outcome: Result<()>, cancel: &CancellationToken, url: &str) -> AudioResolution {
    if cancel.is_cancelled() {
        return AudioResolution::Cancelled;
    }
    match outcome {
        Ok(()) => AudioResolution::Ended(EndReason::Natural),
        Err(err) => {
            warn!(%url, "Clip failed to play; treating as ended: {err:#}");
            AudioResolution::Ended(EndReason::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Plays until cancelled, or for `length` if given.
    struct FakeOutput {
        length: Option<Duration>,
        fail: bool,
    }

    impl AudioOutput for FakeOutput {
        fn play(&self, _url: &str, cancel: &CancellationToken) -> Result<()> {
            if self.fail {
                anyhow::bail!("decoder rejected clip");
            }
            match self.length {
                Some(length) => {
                    cancel.sleep(length);
                }
                None => while cancel.sleep(Duration::from_millis(20)) {},
            }
            Ok(())
        }
    }

    fn handle(output: FakeOutput) -> (PlaybackHandle, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel();
        (PlaybackHandle::new(Arc::new(output), tx), rx)
    }

    fn next_resolution(rx: &mpsc::Receiver<Message>) -> (Generation, AudioResolution) {
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            Message::AudioResolved {
                generation,
                resolution,
            } => (generation, resolution),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn natural_end_is_reported() {
        let (mut playback, rx) = handle(FakeOutput {
            length: Some(Duration::from_millis(5)),
            fail: false,
        });
        let generation = Generation::default().next();
        playback.start(generation, "a1".into());

        assert_eq!(
            next_resolution(&rx),
            (generation, AudioResolution::Ended(EndReason::Natural))
        );
        playback.settle(generation);
        assert!(!playback.is_active());
    }

    #[test]
    fn failure_resolves_as_ended() {
        let (mut playback, rx) = handle(FakeOutput {
            length: None,
            fail: true,
        });
        let generation = Generation::default().next();
        playback.start(generation, "broken".into());
        assert_eq!(
            next_resolution(&rx),
            (generation, AudioResolution::Ended(EndReason::Failed))
        );
    }

    #[test]
    fn starting_again_cancels_the_previous_clip() {
        let (mut playback, rx) = handle(FakeOutput {
            length: None,
            fail: false,
        });
        let first = Generation::default().next();
        let second = first.next();
        playback.start(first, "a1".into());
        playback.start(second, "b1".into());

        assert_eq!(playback.active_generation(), Some(second));
        assert_eq!(next_resolution(&rx), (first, AudioResolution::Cancelled));

        assert!(playback.cancel());
        assert_eq!(next_resolution(&rx), (second, AudioResolution::Cancelled));
        assert!(!playback.cancel());
        assert_eq!(playback.stats().started, 2);
        assert_eq!(playback.stats().cancelled, 2);
    }

    #[test]
    fn settle_ignores_superseded_generation() {
        let (mut playback, _rx) = handle(FakeOutput {
            length: None,
            fail: false,
        });
        let first = Generation::default().next();
        let second = first.next();
        playback.start(first, "a1".into());
        playback.start(second, "b1".into());
        playback.settle(first);
        assert_eq!(playback.active_generation(), Some(second));
    }
}
