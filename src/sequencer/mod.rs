//! Lesson playback sequencing.
//!
//! `SequenceController` is a pure reducer: it consumes `Message`s and returns
//! the `Effect`s the runtime must perform. `PlaybackHandle` and `Scheduler`
//! are owned by the runtime and only ever act on those effects.

mod completion;
mod controller;
mod messages;
mod playback;
mod readiness;
mod recorder;
mod scheduler;
mod state;

pub use completion::{CompletionCoordinator, CompletionRequest, CompletionStatus};
pub use controller::SequenceController;
pub use messages::{
    AudioResolution, Effect, EndReason, Generation, Message, Notice, PendingKind, ScheduledAction,
};
pub use playback::{AudioOutput, PlaybackHandle, PlaybackStats};
pub use readiness::ReadinessGate;
pub use recorder::PracticeRecorder;
pub use scheduler::Scheduler;
pub use state::{Phase, PlaybackState, PlayerSnapshot};
