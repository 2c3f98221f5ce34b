use super::completion::CompletionStatus;
use super::readiness::ReadinessGate;
use super::recorder::PracticeRecorder;
use crate::model::{LessonId, SentenceId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Presenting,
    Finished,
}

/// Mutable sequencing state for the active lesson. Only the controller
/// writes it.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    pub(super) phase: Phase,
    pub(super) current_index: usize,
    pub(super) autoplay: bool,
    pub(super) gate: ReadinessGate,
    pub(super) recorder: PracticeRecorder,
}

impl PlaybackState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn recorder(&self) -> &PracticeRecorder {
        &self.recorder
    }
}

/// Read-only view handed to presenters after every reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub lesson_id: Option<LessonId>,
    pub title: Option<String>,
    pub heading: Option<String>,
    pub phase: Phase,
    pub index: usize,
    pub total: usize,
    pub autoplay: bool,
    pub ready: bool,
    /// The gate was opened by the learner without a loaded picture.
    pub overridden: bool,
    pub visited: Vec<SentenceId>,
    pub visited_count: usize,
    pub current_text: Option<String>,
    pub completion: CompletionStatus,
    pub progress_pct: f32,
}

pub(super) fn progress_pct(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (index + 1) as f32 / total as f32 * 100.0
}
