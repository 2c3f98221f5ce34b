//! One completion report per lesson attempt.

use super::messages::Notice;
use crate::model::LessonId;
use crate::progress::CompletionSummary;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub attempt: u64,
    pub lesson_id: LessonId,
    pub visited_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CompletionStatus {
    NotStarted,
    Reporting,
    Recorded { summary: CompletionSummary },
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct CompletionCoordinator {
    attempt: u64,
    fired: bool,
    status: CompletionStatus,
}

impl Default for CompletionCoordinator {
    fn default() -> Self {
        Self {
            attempt: 0,
            fired: false,
            status: CompletionStatus::NotStarted,
        }
    }
}

impl CompletionCoordinator {
    /// Start a fresh attempt; a report still in flight for the previous
    /// attempt will be ignored when it lands.
    pub fn begin_attempt(&mut self) {
        self.attempt = self.attempt.wrapping_add(1);
        self.fired = false;
        self.status = CompletionStatus::NotStarted;
    }

    /// Forget the outcome shown for the previous lesson. The attempt number
    /// moves on so a report still in flight is dropped when it lands.
    pub fn abandon(&mut self) {
        self.begin_attempt();
    }

    /// Issue the completion report for this attempt. Returns `None` if the
    /// attempt already reported.
    pub fn on_finish(
        &mut self,
        lesson_id: &LessonId,
        visited_count: usize,
    ) -> Option<CompletionRequest> {
        if self.fired {
            debug!(attempt = self.attempt, "Completion already reported");
            return None;
        }
        self.fired = true;
        self.status = CompletionStatus::Reporting;
        info!(
            lesson = %lesson_id,
            attempt = self.attempt,
            visited_count,
            "Reporting lesson completion"
        );
        Some(CompletionRequest {
            attempt: self.attempt,
            lesson_id: lesson_id.clone(),
            visited_count,
        })
    }

    /// Accept the reporter's answer. A failure is surfaced once and never
    /// retried.
    pub fn on_report(
        &mut self,
        attempt: u64,
        result: Result<CompletionSummary, String>,
    ) -> Option<Notice> {
        if attempt != self.attempt || self.status != CompletionStatus::Reporting {
            debug!(
                attempt,
                current = self.attempt,
                "Ignoring stale completion report"
            );
            return None;
        }
        match result {
            Ok(summary) => {
                self.status = CompletionStatus::Recorded {
                    summary: summary.clone(),
                };
                Some(Notice::CompletionRecorded(summary))
            }
            Err(error) => {
                warn!(attempt, "Completion report failed: {error}");
                self.status = CompletionStatus::Failed {
                    error: error.clone(),
                };
                Some(Notice::CompletionFailed(error))
            }
        }
    }

    pub fn status(&self) -> &CompletionStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MasteryState;

    fn summary() -> CompletionSummary {
        CompletionSummary {
            updated_streak: 3,
            mastery: MasteryState {
                completed_lessons: 5,
                mastered_count: 40,
            },
        }
    }

    #[test]
    fn fires_once_per_attempt() {
        let mut coordinator = CompletionCoordinator::default();
        coordinator.begin_attempt();
        let id = LessonId::new("l1");
        let request = coordinator.on_finish(&id, 3).unwrap();
        assert_eq!(request.visited_count, 3);
        assert!(coordinator.on_finish(&id, 3).is_none());

        coordinator.begin_attempt();
        assert!(coordinator.on_finish(&id, 1).is_some());
    }

    #[test]
    fn failure_is_surfaced_once() {
        let mut coordinator = CompletionCoordinator::default();
        coordinator.begin_attempt();
        let request = coordinator.on_finish(&LessonId::new("l1"), 2).unwrap();

        let notice = coordinator.on_report(request.attempt, Err("network down".into()));
        assert_eq!(
            notice,
            Some(Notice::CompletionFailed("network down".to_string()))
        );
        assert!(
            coordinator
                .on_report(request.attempt, Err("network down".into()))
                .is_none()
        );
        assert_eq!(
            coordinator.status(),
            &CompletionStatus::Failed {
                error: "network down".to_string()
            }
        );
    }

    #[test]
    fn report_for_previous_attempt_is_dropped() {
        let mut coordinator = CompletionCoordinator::default();
        coordinator.begin_attempt();
        let stale = coordinator.on_finish(&LessonId::new("l1"), 2).unwrap();
        coordinator.begin_attempt();

        assert!(coordinator.on_report(stale.attempt, Ok(summary())).is_none());
        assert_eq!(coordinator.status(), &CompletionStatus::NotStarted);
    }

    #[test]
    fn abandon_clears_outcome_and_drops_late_report() {
        let mut coordinator = CompletionCoordinator::default();
        coordinator.begin_attempt();
        let first = coordinator.on_finish(&LessonId::new("l1"), 2).unwrap();
        coordinator.on_report(first.attempt, Err("offline".into()));

        coordinator.abandon();
        assert_eq!(coordinator.status(), &CompletionStatus::NotStarted);

        coordinator.begin_attempt();
        let second = coordinator.on_finish(&LessonId::new("l2"), 1).unwrap();
        coordinator.abandon();
        assert!(coordinator.on_report(second.attempt, Ok(summary())).is_none());
        assert_eq!(coordinator.status(), &CompletionStatus::NotStarted);
    }
}
