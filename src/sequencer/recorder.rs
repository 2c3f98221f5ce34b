use crate::model::SentenceId;
use std::collections::HashSet;

/// Sentences the learner has heard during the current attempt, in the order
/// they were first heard.
#[derive(Debug, Clone, Default)]
pub struct PracticeRecorder {
    seen: HashSet<SentenceId>,
    order: Vec<SentenceId>,
}

impl PracticeRecorder {
    /// Returns `false` when the id was already recorded.
    pub fn record(&mut self, id: &SentenceId) -> bool {
        if !self.seen.insert(id.clone()) {
            return false;
        }
        self.order.push(id.clone());
        true
    }

    pub fn contains(&self, id: &SentenceId) -> bool {
        self.seen.contains(id)
    }

    pub fn count(&self) -> usize {
        self.order.len()
    }

    pub fn snapshot(&self) -> Vec<SentenceId> {
        self.order.clone()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_each_id_once_in_first_seen_order() {
        let mut recorder = PracticeRecorder::default();
        assert!(recorder.record(&SentenceId::new("b")));
        assert!(recorder.record(&SentenceId::new("a")));
        assert!(!recorder.record(&SentenceId::new("b")));

        assert_eq!(recorder.count(), 2);
        assert_eq!(
            recorder.snapshot(),
            vec![SentenceId::new("b"), SentenceId::new("a")]
        );

        recorder.clear();
        assert_eq!(recorder.count(), 0);
        assert!(!recorder.contains(&SentenceId::new("a")));
    }
}
