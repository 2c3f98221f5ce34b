//! Lesson content as delivered by the backend.
//!
//! Everything here is read-only once fetched; the sequencer only ever holds an
//! ordered `Vec<Sentence>` for the active lesson plus the `Lesson` metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(pub String);

impl LessonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(pub String);

impl SentenceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Media attachment as the backend nests it (`{ "url": ... }`).
#[derive(Debug, Clone, Default, Deserialize)]
struct AssetRef {
    #[serde(default)]
    url: Option<String>,
}

/// One learning item: a picture, the narrated text, and its audio clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSentence")]
pub struct Sentence {
    pub id: SentenceId,
    pub text: String,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub order: i64,
}

#[derive(Deserialize)]
struct WireSentence {
    #[serde(rename = "_id", alias = "id")]
    id: SentenceId,
    #[serde(default)]
    text: String,
    #[serde(default)]
    image: Option<AssetRef>,
    #[serde(default)]
    audio: Option<AssetRef>,
    #[serde(default)]
    order: i64,
}

impl From<WireSentence> for Sentence {
    fn from(wire: WireSentence) -> Self {
        Self {
            id: wire.id,
            text: wire.text,
            image_url: non_empty(wire.image.and_then(|asset| asset.url)),
            audio_url: non_empty(wire.audio.and_then(|asset| asset.url)),
            order: wire.order,
        }
    }
}

fn non_empty(url: Option<String>) -> Option<String> {
    url.filter(|u| !u.trim().is_empty())
}

/// Sort sentences by their ordinal position, keeping backend order for ties.
pub fn order_sentences(mut sentences: Vec<Sentence>) -> Vec<Sentence> {
    sentences.sort_by_key(|s| s.order);
    sentences
}

/// Topic reference; the backend sends either a bare id or a populated object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicRef {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id", default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl TopicRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            TopicRef::Id(id) => Some(id.as_str()),
            TopicRef::Populated { id, .. } => id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(rename = "_id", alias = "id")]
    pub id: LessonId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic: Option<TopicRef>,
    #[serde(rename = "partNumber", default = "default_part_number")]
    pub part_number: u32,
    #[serde(default)]
    pub order: i64,
}

fn default_part_number() -> u32 {
    1
}

impl Lesson {
    /// Stand-in metadata when only the id is known.
    pub fn untitled(id: LessonId) -> Self {
        Self {
            id,
            title: String::new(),
            topic: None,
            part_number: default_part_number(),
            order: 0,
        }
    }

    pub fn topic_name(&self) -> &str {
        match &self.topic {
            Some(TopicRef::Populated {
                name: Some(name), ..
            }) if !name.is_empty() => name.as_str(),
            Some(TopicRef::Id(id)) if !id.is_empty() => id.as_str(),
            _ => "General Topic",
        }
    }

    pub fn topic_id(&self) -> Option<&str> {
        self.topic.as_ref().and_then(TopicRef::id)
    }

    /// Short heading used by the success view, e.g. `Greetings • PART 2`.
    pub fn heading(&self) -> String {
        format!("{} • PART {}", self.topic_name(), self.part_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_nested_asset_urls() {
        let raw = r#"{
            "_id": "s1",
            "text": "The cat sleeps.",
            "image": { "url": "https://cdn.example/cat.png" },
            "audio": { "url": "https://cdn.example/cat.mp3" },
            "order": 2
        }"#;
        let sentence: Sentence = serde_json::from_str(raw).unwrap();
        assert_eq!(sentence.id, SentenceId::new("s1"));
        assert_eq!(
            sentence.image_url.as_deref(),
            Some("https://cdn.example/cat.png")
        );
        assert_eq!(
            sentence.audio_url.as_deref(),
            Some("https://cdn.example/cat.mp3")
        );
        assert_eq!(sentence.order, 2);
    }

    #[test]
    fn missing_or_blank_audio_becomes_none() {
        let raw = r#"{ "_id": "s2", "text": "x", "audio": { "url": "  " } }"#;
        let sentence: Sentence = serde_json::from_str(raw).unwrap();
        assert!(sentence.audio_url.is_none());
        assert!(sentence.image_url.is_none());
    }

    #[test]
    fn orders_sentences_stably() {
        let make = |id: &str, order| Sentence {
            id: SentenceId::new(id),
            text: String::new(),
            image_url: None,
            audio_url: None,
            order,
        };
        let ordered = order_sentences(vec![make("c", 3), make("a", 1), make("b", 1)]);
        let ids: Vec<_> = ordered.iter().map(|s| s.id.0.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn lesson_topic_accepts_object_or_id() {
        let populated: Lesson = serde_json::from_str(
            r#"{ "_id": "l1", "title": "Hi", "topic": { "_id": "t1", "name": "Greetings" }, "partNumber": 2 }"#,
        )
        .unwrap();
        assert_eq!(populated.topic_name(), "Greetings");
        assert_eq!(populated.topic_id(), Some("t1"));
        assert_eq!(populated.heading(), "Greetings • PART 2");

        let bare: Lesson = serde_json::from_str(r#"{ "_id": "l2", "topic": "t9" }"#).unwrap();
        assert_eq!(bare.topic_id(), Some("t9"));
        assert_eq!(bare.part_number, 1);

        let none: Lesson = serde_json::from_str(r#"{ "_id": "l3" }"#).unwrap();
        assert_eq!(none.topic_name(), "General Topic");
    }
}
