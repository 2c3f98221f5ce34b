//! Lesson content provider: sentences and lesson metadata.

use crate::api::{ApiClient, ApiError};
use crate::model::{Lesson, LessonId, Sentence, order_sentences};
use serde::Deserialize;
use tracing::info;

pub trait LessonContentProvider: Send + Sync {
    /// Ordered sentence list for a lesson.
    fn fetch_sentences(&self, lesson_id: &LessonId) -> Result<Vec<Sentence>, ApiError>;

    fn fetch_lesson_meta(&self, lesson_id: &LessonId) -> Result<Lesson, ApiError>;

    /// Lessons of one topic, ordered by their position in the topic.
    fn fetch_sibling_lessons(&self, topic_id: &str) -> Result<Vec<Lesson>, ApiError>;
}

#[derive(Deserialize)]
struct SentencesEnvelope {
    #[serde(default)]
    sentences: Vec<Sentence>,
}

#[derive(Deserialize)]
struct LessonEnvelope {
    #[serde(default)]
    lesson: Option<Lesson>,
    #[serde(rename = "updatedLesson", default)]
    updated_lesson: Option<Lesson>,
}

#[derive(Deserialize)]
struct LessonsEnvelope {
    #[serde(default)]
    lessons: Vec<Lesson>,
}

pub struct HttpContentProvider {
    api: ApiClient,
}

impl HttpContentProvider {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl LessonContentProvider for HttpContentProvider {
    fn fetch_sentences(&self, lesson_id: &LessonId) -> Result<Vec<Sentence>, ApiError> {
        let envelope: SentencesEnvelope = self
            .api
            .get_json(&format!("sentences/lesson/{lesson_id}"))?;
        info!(
            lesson = %lesson_id,
            count = envelope.sentences.len(),
            "Fetched lesson sentences"
        );
        Ok(order_sentences(envelope.sentences))
    }

    fn fetch_lesson_meta(&self, lesson_id: &LessonId) -> Result<Lesson, ApiError> {
        let envelope: LessonEnvelope = self.api.get_json(&format!("lessons/{lesson_id}"))?;
        envelope
            .lesson
            .or(envelope.updated_lesson)
            .ok_or_else(|| ApiError::NotFound(format!("lesson {lesson_id}")))
    }

    fn fetch_sibling_lessons(&self, topic_id: &str) -> Result<Vec<Lesson>, ApiError> {
        let envelope: LessonsEnvelope = self.api.get_json(&format!("lessons?topic={topic_id}"))?;
        Ok(order_lessons(envelope.lessons))
    }
}

/// Order lessons by position in their topic, then by part number.
pub fn order_lessons(mut lessons: Vec<Lesson>) -> Vec<Lesson> {
    lessons.sort_by_key(|l| (l.order, l.part_number));
    lessons
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_sentence_envelope() {
        let raw = r#"{ "sentences": [
            { "_id": "b", "text": "Two", "order": 2, "audio": { "url": "b.mp3" } },
            { "_id": "a", "text": "One", "order": 1, "audio": { "url": "a.mp3" } }
        ] }"#;
        let envelope: SentencesEnvelope = serde_json::from_str(raw).unwrap();
        let ordered = order_sentences(envelope.sentences);
        assert_eq!(ordered[0].text, "One");
        assert_eq!(ordered[1].audio_url.as_deref(), Some("b.mp3"));
    }

    #[test]
    fn lesson_envelope_accepts_updated_lesson_key() {
        let raw = r#"{ "updatedLesson": { "_id": "l7", "title": "Food" } }"#;
        let envelope: LessonEnvelope = serde_json::from_str(raw).unwrap();
        let lesson = envelope.lesson.or(envelope.updated_lesson).unwrap();
        assert_eq!(lesson.id, LessonId::new("l7"));
    }

    #[test]
    fn orders_lessons_by_position_then_part() {
        let raw = r#"{ "lessons": [
            { "_id": "x", "order": 2, "partNumber": 1 },
            { "_id": "y", "order": 1, "partNumber": 2 },
            { "_id": "z", "order": 1, "partNumber": 1 }
        ] }"#;
        let envelope: LessonsEnvelope = serde_json::from_str(raw).unwrap();
        let ids: Vec<_> = order_lessons(envelope.lessons)
            .into_iter()
            .map(|l| l.id.0)
            .collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
    }
}
