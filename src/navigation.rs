//! Navigation intents emitted by the player and the sinks that act on them.

use crate::content::LessonContentProvider;
use crate::model::{Lesson, LessonId};
use crate::sequencer::Message;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    NextLesson { current: LessonId },
    Gallery,
}

pub trait NavigationSink {
    fn navigate(&mut self, intent: NavigationIntent);
}

/// Lesson that follows `current` among its topic siblings, if any.
pub fn resolve_next_lesson(siblings: &[Lesson], current: &LessonId) -> Option<LessonId> {
    let position = siblings.iter().position(|l| &l.id == current)?;
    siblings.get(position + 1).map(|l| l.id.clone())
}

/// Resolves "next lesson" through the content provider and feeds the result
/// back to the player as a lesson change. Falls back to the gallery.
pub struct TopicNavigator {
    content: Arc<dyn LessonContentProvider>,
    events: Sender<Message>,
}

impl TopicNavigator {
    pub fn new(content: Arc<dyn LessonContentProvider>, events: Sender<Message>) -> Self {
        Self { content, events }
    }
}

impl NavigationSink for TopicNavigator {
    fn navigate(&mut self, intent: NavigationIntent) {
        match intent {
            NavigationIntent::Gallery => {
                info!("Returning to lesson gallery");
                let _ = self.events.send(Message::Dismount);
            }
            NavigationIntent::NextLesson { current } => {
                let content = Arc::clone(&self.content);
                let events = self.events.clone();
                let spawned = thread::Builder::new()
                    .name("next-lesson".to_string())
                    .spawn(move || {
                        let next = next_lesson_for(content.as_ref(), &current);
                        let message = match next {
                            Some(next) => {
                                info!(from = %current, to = %next, "Advancing to next lesson");
                                Message::LessonRequested(next)
                            }
                            None => {
                                info!(lesson = %current, "No next lesson; returning to gallery");
                                Message::Dismount
                            }
                        };
                        let _ = events.send(message);
                    });
                if let Err(err) = spawned {
                    warn!("Failed to spawn next-lesson lookup: {err}");
                }
            }
        }
    }
}

fn next_lesson_for(content: &dyn LessonContentProvider, current: &LessonId) -> Option<LessonId> {
    let lesson = match content.fetch_lesson_meta(current) {
        Ok(lesson) => lesson,
        Err(err) => {
            warn!(lesson = %current, "Failed to load lesson metadata: {err}");
            return None;
        }
    };
    let topic = lesson.topic_id()?;
    match content.fetch_sibling_lessons(topic) {
        Ok(siblings) => resolve_next_lesson(&siblings, current),
        Err(err) => {
            warn!(topic, "Failed to load sibling lessons: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str) -> Lesson {
        Lesson {
            id: LessonId::new(id),
            title: String::new(),
            topic: None,
            part_number: 1,
            order: 0,
        }
    }

    #[test]
    fn resolves_following_lesson() {
        let siblings = vec![lesson("a"), lesson("b"), lesson("c")];
        assert_eq!(
            resolve_next_lesson(&siblings, &LessonId::new("b")),
            Some(LessonId::new("c"))
        );
    }

    #[test]
    fn last_or_unknown_lesson_has_no_successor() {
        let siblings = vec![lesson("a"), lesson("b")];
        assert_eq!(resolve_next_lesson(&siblings, &LessonId::new("b")), None);
        assert_eq!(resolve_next_lesson(&siblings, &LessonId::new("zz")), None);
    }
}
