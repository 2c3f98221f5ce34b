//! Progress reporter: records a finished lesson on the backend.

use crate::api::{ApiClient, ApiError};
use crate::model::LessonId;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Learner counters returned after a lesson is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub updated_streak: u32,
    pub mastery: MasteryState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasteryState {
    pub completed_lessons: usize,
    pub mastered_count: u32,
}

pub trait ProgressReporter: Send + Sync {
    fn report_completion(
        &self,
        lesson_id: &LessonId,
        visited_count: usize,
    ) -> Result<CompletionSummary, ApiError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionBody<'a> {
    lesson_id: &'a LessonId,
    sentences_practiced: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionResponse {
    #[serde(default)]
    user: Option<UserStats>,
    #[serde(default)]
    streak: Option<u32>,
    #[serde(default)]
    completed_lessons: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStats {
    #[serde(default)]
    streak: u32,
    #[serde(default, alias = "masteredCount", alias = "totalMastered")]
    mastered_sentences: u32,
}

impl From<CompletionResponse> for CompletionSummary {
    fn from(response: CompletionResponse) -> Self {
        let (streak, mastered) = response
            .user
            .map(|u| (u.streak, u.mastered_sentences))
            .unwrap_or((0, 0));
        CompletionSummary {
            updated_streak: response.streak.unwrap_or(streak),
            mastery: MasteryState {
                completed_lessons: response.completed_lessons.len(),
                mastered_count: mastered,
            },
        }
    }
}

pub struct HttpProgressReporter {
    api: ApiClient,
}

impl HttpProgressReporter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl ProgressReporter for HttpProgressReporter {
    fn report_completion(
        &self,
        lesson_id: &LessonId,
        visited_count: usize,
    ) -> Result<CompletionSummary, ApiError> {
        let body = CompletionBody {
            lesson_id,
            sentences_practiced: visited_count,
        };
        let response: CompletionResponse = self
            .api
            .post_json(&format!("user/complete-lesson/{lesson_id}"), &body)?;
        let summary = CompletionSummary::from(response);
        info!(
            lesson = %lesson_id,
            visited_count,
            streak = summary.updated_streak,
            "Recorded lesson completion"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_backend_field_names() {
        let id = LessonId::new("l1");
        let body = CompletionBody {
            lesson_id: &id,
            sentences_practiced: 3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["lessonId"], "l1");
        assert_eq!(json["sentencesPracticed"], 3);
    }

    #[test]
    fn summary_reads_streak_and_completed_lessons() {
        let raw = r#"{
            "user": { "streak": 4, "masteredSentences": 31 },
            "completedLessons": ["a", "b"]
        }"#;
        let response: CompletionResponse = serde_json::from_str(raw).unwrap();
        let summary = CompletionSummary::from(response);
        assert_eq!(summary.updated_streak, 4);
        assert_eq!(summary.mastery.completed_lessons, 2);
        assert_eq!(summary.mastery.mastered_count, 31);
    }

    #[test]
    fn top_level_streak_wins_over_user_streak() {
        let raw = r#"{
            "streak": 5,
            "user": { "name": "x" },
            "completedLessons": ["a"]
        }"#;
        let response: CompletionResponse = serde_json::from_str(raw).unwrap();
        let summary = CompletionSummary::from(response);
        assert_eq!(summary.updated_streak, 5);
        assert_eq!(summary.mastery.completed_lessons, 1);

        let both: CompletionResponse =
            serde_json::from_str(r#"{ "streak": 7, "user": { "streak": 6 } }"#).unwrap();
        assert_eq!(CompletionSummary::from(both).updated_streak, 7);
    }

    #[test]
    fn summary_tolerates_missing_user() {
        let response: CompletionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(CompletionSummary::from(response).updated_streak, 0);
    }
}
