//! Drives a `SequenceController` against real collaborators.
//!
//! The runtime thread is the only place effects are performed. It owns the
//! `PlaybackHandle` and the `Scheduler`, blocks on its inbound channel no
//! longer than the next scheduled deadline, and spawns short-lived workers
//! for fetches, image loads and completion reports. Workers only ever post a
//! `Message` back.

use crate::config::SequencerTiming;
use crate::content::LessonContentProvider;
use crate::images::ImageLoader;
use crate::model::{Lesson, LessonId};
use crate::navigation::{NavigationSink, TopicNavigator};
use crate::progress::ProgressReporter;
use crate::sequencer::{
    AudioOutput, CompletionRequest, Effect, Message, Notice, PlaybackHandle, PlaybackStats,
    PlayerSnapshot, ScheduledAction, Scheduler, SequenceController,
};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Presentation layer fed after every reduction.
pub trait Presenter {
    fn render(&mut self, snapshot: &PlayerSnapshot);
    fn notify(&mut self, notice: &Notice);
}

/// External collaborators the runtime talks to.
#[derive(Clone)]
pub struct Services {
    pub content: Arc<dyn LessonContentProvider>,
    pub reporter: Arc<dyn ProgressReporter>,
    pub images: Arc<dyn ImageLoader>,
    pub audio: Arc<dyn AudioOutput>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub playback: PlaybackStats,
    pub actions_armed: u64,
    pub actions_fired: u64,
}

pub struct Runtime {
    controller: SequenceController,
    playback: PlaybackHandle,
    scheduler: Scheduler<ScheduledAction>,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    services: Services,
    navigation: Box<dyn NavigationSink>,
    presenter: Box<dyn Presenter>,
    quitting: bool,
}

impl Runtime {
    pub fn new(timing: SequencerTiming, services: Services, presenter: Box<dyn Presenter>) -> Self {
        let (tx, rx) = mpsc::channel();
        let playback = PlaybackHandle::new(Arc::clone(&services.audio), tx.clone());
        let navigation = Box::new(TopicNavigator::new(
            Arc::clone(&services.content),
            tx.clone(),
        ));
        Self {
            controller: SequenceController::new(timing),
            playback,
            scheduler: Scheduler::new(),
            tx,
            rx,
            services,
            navigation,
            presenter,
            quitting: false,
        }
    }

    pub fn set_navigation(&mut self, navigation: Box<dyn NavigationSink>) {
        self.navigation = navigation;
    }

    /// Handle for posting messages from other threads (input, signals).
    pub fn sender(&self) -> Sender<Message> {
        self.tx.clone()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.controller.snapshot()
    }

    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            playback: self.playback.stats(),
            actions_armed: self.scheduler.armed_total(),
            actions_fired: self.scheduler.fired_total(),
        }
    }

    /// Process messages until `Quit`.
    pub fn run(&mut self) {
        info!("Player runtime started");
        while !self.quitting {
            let Some(message) = self.next_message(None) else {
                break;
            };
            self.dispatch(message);
        }
        info!("Player runtime stopped");
    }

    /// Process messages until `done` accepts a snapshot or `deadline` passes.
    /// Returns whether `done` was satisfied.
    pub fn run_until(
        &mut self,
        deadline: Instant,
        mut done: impl FnMut(&PlayerSnapshot) -> bool,
    ) -> bool {
        if done(&self.controller.snapshot()) {
            return true;
        }
        while !self.quitting {
            let Some(message) = self.next_message(Some(deadline)) else {
                return false;
            };
            self.dispatch(message);
            if done(&self.controller.snapshot()) {
                return true;
            }
        }
        false
    }

    /// Next message to reduce: a due scheduled action first, then the inbound
    /// channel. `None` once `limit` passes or every sender is gone.
    fn next_message(&mut self, limit: Option<Instant>) -> Option<Message> {
        loop {
            let now = Instant::now();
            if let Some(action) = self.scheduler.take_due(now) {
                return Some(Message::TimerFired(action));
            }
            if limit.is_some_and(|limit| now >= limit) {
                return None;
            }
            let wake = match (self.scheduler.time_until_due(now), limit) {
                (Some(wait), Some(limit)) => Some((now + wait).min(limit)),
                (Some(wait), None) => Some(now + wait),
                (None, limit) => limit,
            };
            let received = match wake {
                Some(wake) => self.rx.recv_timeout(wake.saturating_duration_since(now)),
                None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(message) => return Some(message),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn dispatch(&mut self, message: Message) {
        if let Message::AudioResolved { generation, .. } = &message {
            self.playback.settle(*generation);
        }
        let effects = self.controller.reduce(message);
        for effect in effects {
            self.run_effect(effect);
        }
        self.presenter.render(&self.controller.snapshot());
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchLesson {
                request_id,
                lesson_id,
            } => {
                let content = Arc::clone(&self.services.content);
                self.spawn_worker("lesson-fetch", move || {
                    fetch_lesson(content.as_ref(), request_id, lesson_id)
                });
            }
            Effect::LoadImage { generation, url } => {
                let images = Arc::clone(&self.services.images);
                self.spawn_worker("image-load", move || match images.load(&url) {
                    Ok(_) => Message::ImageLoaded { generation },
                    Err(err) => Message::ImageFailed {
                        generation,
                        error: err.to_string(),
                    },
                });
            }
            Effect::StartAudio { generation, url } => self.playback.start(generation, url),
            Effect::CancelAudio => {
                self.playback.cancel();
            }
            Effect::Schedule { action, delay } => {
                debug!(?action, delay_ms = delay.as_millis(), "Arming scheduled action");
                self.scheduler.schedule(action, delay, Instant::now());
            }
            Effect::CancelSchedule => {
                self.scheduler.cancel();
            }
            Effect::ReportCompletion(request) => {
                let reporter = Arc::clone(&self.services.reporter);
                self.spawn_worker("completion-report", move || {
                    report_completion(reporter.as_ref(), request)
                });
            }
            Effect::Navigate(intent) => self.navigation.navigate(intent),
            Effect::Notify(notice) => self.presenter.notify(&notice),
            Effect::Quit => {
                self.playback.cancel();
                self.scheduler.cancel();
                self.quitting = true;
            }
        }
    }

    fn spawn_worker<F>(&self, name: &str, work: F)
    where
        F: FnOnce() -> Message + Send + 'static,
    {
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _ = tx.send(work());
            });
        if let Err(err) = spawned {
            warn!(worker = name, "Failed to spawn worker: {err}");
        }
    }
}

fn fetch_lesson(
    content: &dyn LessonContentProvider,
    request_id: u64,
    lesson_id: LessonId,
) -> Message {
    let sentences = match content.fetch_sentences(&lesson_id) {
        Ok(sentences) => sentences,
        Err(err) => {
            return Message::LessonLoadFailed {
                request_id,
                lesson_id,
                error: err.to_string(),
            };
        }
    };
    let lesson = match content.fetch_lesson_meta(&lesson_id) {
        Ok(lesson) => lesson,
        Err(err) => {
            warn!(lesson = %lesson_id, "Lesson metadata unavailable: {err}");
            Lesson::untitled(lesson_id)
        }
    };
    Message::LessonLoaded {
        request_id,
        lesson,
        sentences,
    }
}

fn report_completion(reporter: &dyn ProgressReporter, request: CompletionRequest) -> Message {
    let result = reporter
        .report_completion(&request.lesson_id, request.visited_count)
        .map_err(|err| err.to_string());
    Message::CompletionReported {
        attempt: request.attempt,
        result,
    }
}
