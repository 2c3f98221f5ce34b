use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// High-level player configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "crate::config::defaults::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "crate::config::defaults::default_advance_delay_ms")]
    pub advance_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_finish_delay_ms")]
    pub finish_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_fallback_clip_secs")]
    pub fallback_clip_secs: f32,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_key_next")]
    pub key_next: String,
    #[serde(default = "crate::config::defaults::default_key_previous")]
    pub key_previous: String,
    #[serde(default = "crate::config::defaults::default_key_toggle_autoplay")]
    pub key_toggle_autoplay: String,
    #[serde(default = "crate::config::defaults::default_key_replay")]
    pub key_replay: String,
    #[serde(default = "crate::config::defaults::default_key_override_ready")]
    pub key_override_ready: String,
    #[serde(default = "crate::config::defaults::default_key_practice_again")]
    pub key_practice_again: String,
    #[serde(default = "crate::config::defaults::default_key_next_lesson")]
    pub key_next_lesson: String,
    #[serde(default = "crate::config::defaults::default_key_gallery")]
    pub key_gallery: String,
    #[serde(default = "crate::config::defaults::default_key_quit")]
    pub key_quit: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        use crate::config::defaults::*;
        PlayerConfig {
            api_base_url: default_api_base_url(),
            auth_token: None,
            advance_delay_ms: default_advance_delay_ms(),
            finish_delay_ms: default_finish_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            fallback_clip_secs: default_fallback_clip_secs(),
            cache_dir: default_cache_dir(),
            log_level: default_log_level(),
            key_next: default_key_next(),
            key_previous: default_key_previous(),
            key_toggle_autoplay: default_key_toggle_autoplay(),
            key_replay: default_key_replay(),
            key_override_ready: default_key_override_ready(),
            key_practice_again: default_key_practice_again(),
            key_next_lesson: default_key_next_lesson(),
            key_gallery: default_key_gallery(),
            key_quit: default_key_quit(),
        }
    }
}

impl PlayerConfig {
    pub fn timing(&self) -> SequencerTiming {
        SequencerTiming {
            advance_delay: Duration::from_millis(self.advance_delay_ms),
            finish_delay: Duration::from_millis(self.finish_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn fallback_clip(&self) -> Duration {
        let secs = if self.fallback_clip_secs.is_finite() {
            self.fallback_clip_secs
        } else {
            warn!(
                value = %self.fallback_clip_secs,
                "Invalid fallback_clip_secs; using default"
            );
            crate::config::defaults::default_fallback_clip_secs()
        };
        Duration::from_secs_f32(secs.clamp(0.0, 60.0))
    }
}

/// Delays the sequencer arms after an item's audio ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTiming {
    pub advance_delay: Duration,
    pub finish_delay: Duration,
}

impl Default for SequencerTiming {
    fn default() -> Self {
        PlayerConfig::default().timing()
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
