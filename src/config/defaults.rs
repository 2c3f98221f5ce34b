pub(crate) fn default_api_base_url() -> String {
    "https://pic2speak-backend.onrender.com/api/v1".to_string()
}

pub(crate) fn default_advance_delay_ms() -> u64 {
    3_000
}

pub(crate) fn default_finish_delay_ms() -> u64 {
    2_000
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    20
}

pub(crate) fn default_fallback_clip_secs() -> f32 {
    1.0
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_key_next() -> String {
    "f".to_string()
}

pub(crate) fn default_key_previous() -> String {
    "s".to_string()
}

pub(crate) fn default_key_toggle_autoplay() -> String {
    "a".to_string()
}

pub(crate) fn default_key_replay() -> String {
    "r".to_string()
}

pub(crate) fn default_key_override_ready() -> String {
    "o".to_string()
}

pub(crate) fn default_key_practice_again() -> String {
    "g".to_string()
}

pub(crate) fn default_key_next_lesson() -> String {
    "l".to_string()
}

pub(crate) fn default_key_gallery() -> String {
    "b".to_string()
}

pub(crate) fn default_key_quit() -> String {
    "q".to_string()
}
