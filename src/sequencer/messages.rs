use super::completion::CompletionRequest;
use crate::model::{Lesson, LessonId, Sentence};
use crate::navigation::NavigationIntent;
use crate::progress::CompletionSummary;
use std::fmt;
use std::time::Duration;

/// Monotonic stamp attached to every asynchronous operation the controller
/// starts. A resolution whose stamp differs from the controller's current one
/// belongs to a superseded operation and is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an audio operation finished. `Ended` does not imply the clip was heard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioResolution {
    Ended(EndReason),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Natural,
    Failed,
    NoClip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Advance,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAction {
    pub generation: Generation,
    pub kind: PendingKind,
}

/// Inputs to the sequencer: user commands and asynchronous resolutions.
#[derive(Debug, Clone)]
pub enum Message {
    LessonRequested(LessonId),
    LessonLoaded {
        request_id: u64,
        lesson: Lesson,
        sentences: Vec<Sentence>,
    },
    LessonLoadFailed {
        request_id: u64,
        lesson_id: LessonId,
        error: String,
    },
    ImageLoaded {
        generation: Generation,
    },
    ImageFailed {
        generation: Generation,
        error: String,
    },
    OverrideReadiness,
    AudioResolved {
        generation: Generation,
        resolution: AudioResolution,
    },
    TimerFired(ScheduledAction),
    GoToNext,
    GoToPrevious,
    ToggleAutoplay,
    ReplayAudio,
    Finish,
    PracticeAgain,
    CompletionReported {
        attempt: u64,
        result: Result<CompletionSummary, String>,
    },
    NextLesson,
    BackToGallery,
    Dismount,
    Quit,
}

/// One-shot information for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    LessonLoadFailed { lesson_id: LessonId, error: String },
    ImageFailed { index: usize, error: String },
    CompletionRecorded(CompletionSummary),
    CompletionFailed(String),
}

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchLesson {
        request_id: u64,
        lesson_id: LessonId,
    },
    LoadImage {
        generation: Generation,
        url: String,
    },
    StartAudio {
        generation: Generation,
        url: String,
    },
    CancelAudio,
    Schedule {
        action: ScheduledAction,
        delay: Duration,
    },
    CancelSchedule,
    ReportCompletion(CompletionRequest),
    Navigate(NavigationIntent),
    Notify(Notice),
    Quit,
}
