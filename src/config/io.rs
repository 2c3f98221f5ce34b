use super::models::PlayerConfig;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub const TOKEN_ENV: &str = "LESSON_PLAYER_TOKEN";

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> PlayerConfig {
    let mut config = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            parse_config(&data).unwrap_or_else(|err| {
                warn!(path = %path.display(), "Invalid config TOML: {err}");
                PlayerConfig::default()
            })
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            PlayerConfig::default()
        }
    };

    if let Ok(token) = env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            debug!("Using auth token from environment");
            config.auth_token = Some(token.trim().to_string());
        }
    }
    config
}

pub fn parse_config(contents: &str) -> Result<PlayerConfig, toml::de::Error> {
    let config = toml::from_str::<PlayerConfig>(contents)?;
    debug!("Parsed configuration from disk");
    Ok(config)
}
