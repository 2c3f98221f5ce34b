//! Line-oriented terminal front-end: key bindings, stdin reader, presenter.

use crate::config::PlayerConfig;
use crate::runtime::Presenter;
use crate::sequencer::{CompletionStatus, Message, Notice, Phase, PlayerSnapshot};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    ToggleAutoplay,
    Replay,
    OverrideReady,
    PracticeAgain,
    NextLesson,
    Gallery,
    Quit,
}

impl Command {
    pub fn message(self) -> Message {
        match self {
            Command::Next => Message::GoToNext,
            Command::Previous => Message::GoToPrevious,
            Command::ToggleAutoplay => Message::ToggleAutoplay,
            Command::Replay => Message::ReplayAudio,
            Command::OverrideReady => Message::OverrideReadiness,
            Command::PracticeAgain => Message::PracticeAgain,
            Command::NextLesson => Message::NextLesson,
            Command::Gallery => Message::BackToGallery,
            Command::Quit => Message::Quit,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Command::Next => "next",
            Command::Previous => "previous",
            Command::ToggleAutoplay => "autoplay",
            Command::Replay => "replay",
            Command::OverrideReady => "show without picture",
            Command::PracticeAgain => "practice again",
            Command::NextLesson => "next lesson",
            Command::Gallery => "gallery",
            Command::Quit => "quit",
        }
    }
}

/// Configured key for each command, normalized.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(String, Command)>,
}

impl KeyBindings {
    pub fn from_config(config: &PlayerConfig) -> Self {
        let bindings = [
            (&config.key_next, "f", Command::Next),
            (&config.key_previous, "s", Command::Previous),
            (&config.key_toggle_autoplay, "a", Command::ToggleAutoplay),
            (&config.key_replay, "r", Command::Replay),
            (&config.key_override_ready, "o", Command::OverrideReady),
            (&config.key_practice_again, "g", Command::PracticeAgain),
            (&config.key_next_lesson, "l", Command::NextLesson),
            (&config.key_gallery, "b", Command::Gallery),
            (&config.key_quit, "q", Command::Quit),
        ]
        .into_iter()
        .map(|(raw, fallback, command)| (normalize_key(raw, fallback), command))
        .collect();
        Self { bindings }
    }

    /// Command bound to one line of input, first binding wins.
    pub fn command_for(&self, input: &str) -> Option<Command> {
        let pressed = pressed_key(input)?;
        self.bindings
            .iter()
            .find(|(key, _)| *key == pressed)
            .map(|(_, command)| *command)
    }

    pub fn help(&self) -> String {
        self.bindings
            .iter()
            .map(|(key, command)| format!("[{key}] {}", command.label()))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

fn normalize_key(raw: &str, fallback: &str) -> String {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized.replace("spacebar", "space")
    }
}

fn pressed_key(input: &str) -> Option<String> {
    let line = input.trim_end_matches(['\r', '\n']);
    if !line.is_empty() && line.trim().is_empty() {
        return Some("space".to_string());
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(normalize_key(trimmed, ""))
}

/// Read commands from stdin until EOF or quit. EOF counts as quit.
pub fn spawn_input_reader(
    bindings: KeyBindings,
    events: Sender<Message>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-keys".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("Failed to read input: {err}");
                        break;
                    }
                };
                let Some(command) = bindings.command_for(&line) else {
                    debug!(input = %line, "Unbound key");
                    continue;
                };
                if events.send(command.message()).is_err() || command == Command::Quit {
                    return;
                }
            }
            info!("Input closed");
            let _ = events.send(Message::Quit);
        })
}

/// Prints the player state whenever something the learner can see changes.
pub struct TerminalPresenter<W: Write> {
    out: W,
    help: String,
    last: Option<PlayerSnapshot>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, bindings: &KeyBindings) -> Self {
        Self {
            out,
            help: bindings.help(),
            last: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_snapshot(&mut self, snapshot: &PlayerSnapshot) -> io::Result<()> {
        match snapshot.phase {
            Phase::Idle => match &snapshot.lesson_id {
                Some(id) => writeln!(self.out, "Loading lesson {id}...")?,
                None => writeln!(self.out, "No lesson open.")?,
            },
            Phase::Presenting => {
                let text = snapshot.current_text.as_deref().unwrap_or("");
                let status = match (snapshot.ready, snapshot.overridden) {
                    (false, _) => " (loading picture)",
                    (true, true) => " (no picture)",
                    (true, false) => "",
                };
                writeln!(
                    self.out,
                    "[{}/{}] {:>3.0}% autoplay:{} {}{}",
                    snapshot.index + 1,
                    snapshot.total,
                    snapshot.progress_pct,
                    if snapshot.autoplay { "on" } else { "off" },
                    text,
                    status
                )?;
            }
            Phase::Finished => {
                let heading = snapshot.heading.as_deref().unwrap_or("Lesson");
                writeln!(
                    self.out,
                    "{heading} complete. Practiced {} of {}.",
                    snapshot.visited_count, snapshot.total
                )?;
                if let CompletionStatus::Reporting = snapshot.completion {
                    writeln!(self.out, "Saving progress...")?;
                }
            }
        }
        if self.last.as_ref().map(|last| last.phase) != Some(snapshot.phase) {
            writeln!(self.out, "{}", self.help)?;
        }
        self.out.flush()
    }
}

fn visible_change(last: Option<&PlayerSnapshot>, next: &PlayerSnapshot) -> bool {
    let Some(last) = last else {
        return true;
    };
    last.phase != next.phase
        || last.index != next.index
        || last.ready != next.ready
        || last.autoplay != next.autoplay
        || last.lesson_id != next.lesson_id
        || last.total != next.total
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, snapshot: &PlayerSnapshot) {
        if !visible_change(self.last.as_ref(), snapshot) {
            return;
        }
        if let Err(err) = self.write_snapshot(snapshot) {
            warn!("Failed to write to terminal: {err}");
        }
        self.last = Some(snapshot.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        let result = match notice {
            Notice::LessonLoadFailed { lesson_id, error } => {
                writeln!(self.out, "Could not load lesson {lesson_id}: {error}")
            }
            Notice::ImageFailed { index, error } => writeln!(
                self.out,
                "Picture {} failed to load ({error}). Press the override key to continue without it.",
                index + 1
            ),
            Notice::CompletionRecorded(summary) => writeln!(
                self.out,
                "Progress saved. Streak: {} day(s), lessons completed: {}.",
                summary.updated_streak, summary.mastery.completed_lessons
            ),
            Notice::CompletionFailed(error) => {
                writeln!(self.out, "Could not save progress: {error}")
            }
        };
        if let Err(err) = result.and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LessonId;

    fn bindings() -> KeyBindings {
        KeyBindings::from_config(&PlayerConfig::default())
    }

    fn presenting(index: usize, autoplay: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            lesson_id: Some(LessonId::new("l1")),
            title: Some("At the park".into()),
            heading: Some("Outdoors • PART 1".into()),
            phase: Phase::Presenting,
            index,
            total: 4,
            autoplay,
            ready: true,
            overridden: false,
            visited: Vec::new(),
            visited_count: 0,
            current_text: Some("The dog runs.".into()),
            completion: CompletionStatus::NotStarted,
            progress_pct: (index + 1) as f32 * 25.0,
        }
    }

    #[test]
    fn maps_default_keys() {
        let keys = bindings();
        assert_eq!(keys.command_for("f\n"), Some(Command::Next));
        assert_eq!(keys.command_for(" S "), Some(Command::Previous));
        assert_eq!(keys.command_for("q"), Some(Command::Quit));
        assert_eq!(keys.command_for(""), None);
        assert_eq!(keys.command_for("z"), None);
    }

    #[test]
    fn blank_config_key_falls_back_and_space_is_bindable() {
        let config = PlayerConfig {
            key_next: "   ".into(),
            key_toggle_autoplay: "Spacebar".into(),
            ..PlayerConfig::default()
        };
        let keys = KeyBindings::from_config(&config);
        assert_eq!(keys.command_for("f"), Some(Command::Next));
        assert_eq!(keys.command_for(" "), Some(Command::ToggleAutoplay));
        assert_eq!(keys.command_for("a"), None);
    }

    #[test]
    fn renders_only_visible_changes() {
        let mut presenter = TerminalPresenter::new(Vec::new(), &bindings());
        presenter.render(&presenting(0, false));
        presenter.render(&presenting(0, false));
        presenter.render(&presenting(1, true));

        let output = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(output.matches("The dog runs.").count(), 2);
        assert!(output.contains("[2/4]  50% autoplay:on"));
        assert_eq!(output.matches("[f] next").count(), 1);
    }

    #[test]
    fn marks_items_shown_without_picture() {
        let mut presenter = TerminalPresenter::new(Vec::new(), &bindings());
        let mut waiting = presenting(0, false);
        waiting.ready = false;
        presenter.render(&waiting);
        presenter.render(&PlayerSnapshot {
            overridden: true,
            ..presenting(0, false)
        });

        let output = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(output.contains("The dog runs. (loading picture)"));
        assert!(output.contains("The dog runs. (no picture)"));
    }

    #[test]
    fn prints_completion_notices() {
        let mut presenter = TerminalPresenter::new(Vec::new(), &bindings());
        presenter.notify(&Notice::CompletionFailed("network error".into()));
        let output = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(output, "Could not save progress: network error\n");
    }
}
