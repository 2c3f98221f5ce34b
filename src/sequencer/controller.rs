use super::completion::CompletionCoordinator;
use super::messages::{
    AudioResolution, Effect, EndReason, Generation, Message, Notice, PendingKind, ScheduledAction,
};
use super::state::{Phase, PlaybackState, PlayerSnapshot, progress_pct};
use crate::config::SequencerTiming;
use crate::model::{Lesson, LessonId, Sentence, order_sentences};
use crate::navigation::NavigationIntent;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Single writer of the playback state for one player.
///
/// Every asynchronous operation it asks for is stamped: lesson fetches with
/// `request_id`, image loads, clips and scheduled actions with the current
/// `Generation`, completion reports with the attempt number. Any resolution
/// carrying an outdated stamp is logged and dropped.
#[derive(Debug)]
pub struct SequenceController {
    timing: SequencerTiming,
    lesson_id: Option<LessonId>,
    lesson: Option<Lesson>,
    sentences: Vec<Sentence>,
    state: PlaybackState,
    generation: Generation,
    request_id: u64,
    audio_in_flight: Option<Generation>,
    pending: Option<ScheduledAction>,
    completion: CompletionCoordinator,
}

impl SequenceController {
    pub fn new(timing: SequencerTiming) -> Self {
        Self {
            timing,
            lesson_id: None,
            lesson: None,
            sentences: Vec::new(),
            state: PlaybackState::default(),
            generation: Generation::default(),
            request_id: 0,
            audio_in_flight: None,
            pending: None,
            completion: CompletionCoordinator::default(),
        }
    }

    pub fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::LessonRequested(lesson_id) => {
                self.teardown(&mut effects);
                info!(lesson = %lesson_id, request_id = self.request_id, "Requesting lesson");
                self.lesson_id = Some(lesson_id.clone());
                effects.push(Effect::FetchLesson {
                    request_id: self.request_id,
                    lesson_id,
                });
            }
            Message::LessonLoaded {
                request_id,
                lesson,
                sentences,
            } => {
                if request_id != self.request_id {
                    debug!(
                        request_id,
                        current = self.request_id,
                        "Ignoring stale lesson load"
                    );
                } else {
                    self.install_lesson(lesson, sentences, &mut effects);
                }
            }
            Message::LessonLoadFailed {
                request_id,
                lesson_id,
                error,
            } => {
                if request_id != self.request_id {
                    debug!(request_id, "Ignoring stale lesson load failure");
                } else {
                    warn!(lesson = %lesson_id, "Lesson failed to load: {error}");
                    effects.push(Effect::Notify(Notice::LessonLoadFailed { lesson_id, error }));
                }
            }
            Message::ImageLoaded { generation } => {
                if !self.is_current(generation) {
                    debug!(%generation, current = %self.generation, "Ignoring stale image load");
                } else if self.state.gate.mark_ready() {
                    info!(index = self.state.current_index, "Image ready");
                    self.maybe_start_audio(&mut effects);
                } else {
                    debug!(index = self.state.current_index, "Image already ready");
                }
            }
            Message::ImageFailed { generation, error } => {
                if !self.is_current(generation) {
                    debug!(%generation, "Ignoring stale image failure");
                } else {
                    let index = self.state.current_index;
                    warn!(index, "Image failed to load; audio stays gated: {error}");
                    effects.push(Effect::Notify(Notice::ImageFailed { index, error }));
                }
            }
            Message::OverrideReadiness => {
                if self.state.phase != Phase::Presenting {
                    debug!(phase = ?self.state.phase, "Readiness override ignored");
                } else if self.state.gate.force_open() {
                    info!(index = self.state.current_index, "Readiness overridden");
                    self.maybe_start_audio(&mut effects);
                }
            }
            Message::AudioResolved {
                generation,
                resolution,
            } => {
                if self.audio_in_flight != Some(generation) {
                    debug!(%generation, ?resolution, "Ignoring stale audio resolution");
                } else {
                    self.audio_in_flight = None;
                    match resolution {
                        AudioResolution::Cancelled => {
                            debug!(%generation, "Clip cancelled");
                        }
                        AudioResolution::Ended(reason) => {
                            self.on_audio_ended(reason, &mut effects);
                        }
                    }
                }
            }
            Message::TimerFired(action) => {
                if self.pending != Some(action) {
                    debug!(?action, "Ignoring stale scheduled action");
                } else {
                    self.pending = None;
                    match action.kind {
                        PendingKind::Advance => self.go_to_next(&mut effects),
                        PendingKind::Finish => self.finish(&mut effects),
                    }
                }
            }
            Message::GoToNext => self.go_to_next(&mut effects),
            Message::GoToPrevious => self.go_to_previous(&mut effects),
            Message::ToggleAutoplay => {
                self.state.autoplay = !self.state.autoplay;
                info!(autoplay = self.state.autoplay, "Toggled autoplay");
                let advance_pending = self
                    .pending
                    .is_some_and(|action| action.kind == PendingKind::Advance);
                if !self.state.autoplay && advance_pending {
                    self.pending = None;
                    effects.push(Effect::CancelSchedule);
                }
            }
            Message::ReplayAudio => self.replay(&mut effects),
            Message::Finish => self.finish(&mut effects),
            Message::PracticeAgain => self.practice_again(&mut effects),
            Message::CompletionReported { attempt, result } => {
                if let Some(notice) = self.completion.on_report(attempt, result) {
                    effects.push(Effect::Notify(notice));
                }
            }
            Message::NextLesson => match &self.lesson_id {
                Some(current) => effects.push(Effect::Navigate(NavigationIntent::NextLesson {
                    current: current.clone(),
                })),
                None => debug!("Next lesson requested without a lesson"),
            },
            Message::BackToGallery => {
                effects.push(Effect::Navigate(NavigationIntent::Gallery));
            }
            Message::Dismount => {
                info!("Dismounting player");
                self.teardown(&mut effects);
            }
            Message::Quit => {
                self.teardown(&mut effects);
                effects.push(Effect::Quit);
            }
        }

        effects
    }

    /// Present `sentences` for `lesson`, replacing whatever was active.
    pub fn load_lesson(&mut self, lesson: Lesson, sentences: Vec<Sentence>) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.teardown(&mut effects);
        self.install_lesson(lesson, sentences, &mut effects);
        effects
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_sentence(&self) -> Option<&Sentence> {
        match self.state.phase {
            Phase::Idle => None,
            _ => self.sentences.get(self.state.current_index),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn completion(&self) -> &CompletionCoordinator {
        &self.completion
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let total = self.sentences.len();
        let index = self.state.current_index;
        PlayerSnapshot {
            lesson_id: self.lesson_id.clone(),
            title: self.lesson.as_ref().map(|l| l.title.clone()),
            heading: self.lesson.as_ref().map(Lesson::heading),
            phase: self.state.phase,
            index,
            total,
            autoplay: self.state.autoplay,
            ready: self.state.gate.is_ready(),
            overridden: self.state.gate.is_overridden(),
            visited: self.state.recorder.snapshot(),
            visited_count: self.state.recorder.count(),
            current_text: self.current_sentence().map(|s| s.text.clone()),
            completion: self.completion.status().clone(),
            progress_pct: progress_pct(index, total),
        }
    }

    fn install_lesson(&mut self, lesson: Lesson, sentences: Vec<Sentence>, effects: &mut Vec<Effect>) {
        self.lesson_id = Some(lesson.id.clone());
        self.sentences = order_sentences(sentences);
        self.state = PlaybackState::default();
        self.completion.begin_attempt();
        info!(
            lesson = %lesson.id,
            title = %lesson.title,
            sentences = self.sentences.len(),
            "Lesson loaded"
        );
        self.lesson = Some(lesson);

        if self.sentences.is_empty() {
            info!("Lesson has no sentences; staying idle");
            return;
        }
        self.state.phase = Phase::Presenting;
        self.enter_index(0, effects);
    }

    fn go_to_next(&mut self, effects: &mut Vec<Effect>) {
        if self.state.phase != Phase::Presenting
            || self.state.current_index + 1 >= self.sentences.len()
        {
            debug!(index = self.state.current_index, "Next ignored");
            return;
        }
        self.cancel_outstanding(effects);
        self.enter_index(self.state.current_index + 1, effects);
    }

    fn go_to_previous(&mut self, effects: &mut Vec<Effect>) {
        if self.state.phase != Phase::Presenting || self.state.current_index == 0 {
            debug!(index = self.state.current_index, "Previous ignored");
            return;
        }
        self.cancel_outstanding(effects);
        self.state.autoplay = false;
        self.enter_index(self.state.current_index - 1, effects);
    }

    fn replay(&mut self, effects: &mut Vec<Effect>) {
        if self.state.phase != Phase::Presenting || !self.state.gate.is_ready() {
            debug!(phase = ?self.state.phase, "Replay ignored");
            return;
        }
        self.cancel_outstanding(effects);
        self.generation = self.generation.next();
        info!(index = self.state.current_index, generation = %self.generation, "Replaying clip");
        self.start_current_audio(effects);
    }

    fn finish(&mut self, effects: &mut Vec<Effect>) {
        if self.state.phase != Phase::Presenting {
            debug!(phase = ?self.state.phase, "Finish ignored");
            return;
        }
        self.cancel_outstanding(effects);
        self.state.phase = Phase::Finished;
        let visited = self.state.recorder.count();
        info!(visited, "Lesson finished");
        if let Some(lesson_id) = self.lesson_id.clone() {
            if let Some(request) = self.completion.on_finish(&lesson_id, visited) {
                effects.push(Effect::ReportCompletion(request));
            }
        }
    }

    fn practice_again(&mut self, effects: &mut Vec<Effect>) {
        if self.state.phase != Phase::Finished {
            debug!(phase = ?self.state.phase, "Practice again ignored");
            return;
        }
        self.cancel_outstanding(effects);
        self.completion.begin_attempt();
        self.state.recorder.clear();
        self.state.autoplay = false;
        self.state.phase = Phase::Presenting;
        info!("Practicing lesson again");
        self.enter_index(0, effects);
    }

    /// Cancel the clip and scheduled action this controller still tracks.
    fn cancel_outstanding(&mut self, effects: &mut Vec<Effect>) {
        if self.audio_in_flight.take().is_some() {
            effects.push(Effect::CancelAudio);
        }
        if self.pending.take().is_some() {
            effects.push(Effect::CancelSchedule);
        }
    }

    fn teardown(&mut self, effects: &mut Vec<Effect>) {
        self.cancel_outstanding(effects);
        self.generation = self.generation.next();
        self.request_id += 1;
        self.lesson_id = None;
        self.lesson = None;
        self.sentences.clear();
        self.state = PlaybackState::default();
        self.completion.abandon();
    }

    fn enter_index(&mut self, index: usize, effects: &mut Vec<Effect>) {
        self.generation = self.generation.next();
        self.state.current_index = index;
        self.state.gate.reset();
        info!(index, generation = %self.generation, "Presenting item");

        let image_url = self
            .sentences
            .get(index)
            .and_then(|sentence| sentence.image_url.clone());
        match image_url {
            Some(url) => effects.push(Effect::LoadImage {
                generation: self.generation,
                url,
            }),
            None => debug!(index, "Item has no image; waiting for override"),
        }
    }

    fn maybe_start_audio(&mut self, effects: &mut Vec<Effect>) {
        if self.state.gate.claim_playback() {
            self.start_current_audio(effects);
        }
    }

    fn start_current_audio(&mut self, effects: &mut Vec<Effect>) {
        let audio_url = self
            .sentences
            .get(self.state.current_index)
            .and_then(|sentence| sentence.audio_url.clone());
        match audio_url {
            Some(url) => {
                self.audio_in_flight = Some(self.generation);
                effects.push(Effect::StartAudio {
                    generation: self.generation,
                    url,
                });
            }
            None => {
                debug!(index = self.state.current_index, "Item has no clip");
                self.on_audio_ended(EndReason::NoClip, effects);
            }
        }
    }

    fn on_audio_ended(&mut self, reason: EndReason, effects: &mut Vec<Effect>) {
        let index = self.state.current_index;
        if let Some(sentence) = self.sentences.get(index) {
            if self.state.recorder.record(&sentence.id) {
                debug!(index, sentence = %sentence.id, "Recorded visit");
            }
        }
        let is_last = index + 1 == self.sentences.len();
        info!(index, ?reason, autoplay = self.state.autoplay, "Clip ended");

        if is_last {
            self.state.autoplay = false;
            self.arm(PendingKind::Finish, self.timing.finish_delay, effects);
        } else if self.state.autoplay {
            self.arm(PendingKind::Advance, self.timing.advance_delay, effects);
        }
    }

    fn arm(&mut self, kind: PendingKind, delay: Duration, effects: &mut Vec<Effect>) {
        let action = ScheduledAction {
            generation: self.generation,
            kind,
        };
        self.pending = Some(action);
        effects.push(Effect::Schedule { action, delay });
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.state.phase == Phase::Presenting && generation == self.generation
    }
}
