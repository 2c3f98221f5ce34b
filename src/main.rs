//! Entry point for the terminal lesson player.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml` (or `--config`).
//! - Wire the backend, asset cache and audio output into a runtime.
//! - Feed keyboard input and Ctrl-C into the runtime until quit.

use anyhow::{Context, Result, anyhow};
use lesson_player::api::ApiClient;
use lesson_player::audio;
use lesson_player::cache::AssetCache;
use lesson_player::config::{PlayerConfig, load_config};
use lesson_player::content::HttpContentProvider;
use lesson_player::images::DecodingImageLoader;
use lesson_player::model::LessonId;
use lesson_player::progress::HttpProgressReporter;
use lesson_player::runtime::{Runtime, Services};
use lesson_player::sequencer::{AudioOutput, Message};
use lesson_player::terminal::{KeyBindings, TerminalPresenter, spawn_input_reader};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG: &str = "conf/config.toml";
const USAGE: &str = "Usage: lesson-player <lesson-id> [--config PATH]";

#[derive(Debug, PartialEq, Eq)]
struct Args {
    lesson_id: LessonId,
    config_path: PathBuf,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        lesson = %args.lesson_id,
        api = %config.api_base_url,
        advance_delay_ms = config.advance_delay_ms,
        finish_delay_ms = config.finish_delay_ms,
        "Starting lesson player"
    );

    let api = ApiClient::new(&config).context("Building backend client")?;
    let cache = AssetCache::new(Path::new(&config.cache_dir), config.request_timeout())
        .context("Preparing asset cache")?;
    let services = Services {
        content: Arc::new(HttpContentProvider::new(api.clone())),
        reporter: Arc::new(HttpProgressReporter::new(api)),
        images: Arc::new(DecodingImageLoader::new(cache.clone())),
        audio: audio_output(&config, cache),
    };

    let bindings = KeyBindings::from_config(&config);
    let presenter = TerminalPresenter::new(io::stdout(), &bindings);
    let mut runtime = Runtime::new(config.timing(), services, Box::new(presenter));
    let events = runtime.sender();

    let on_interrupt = events.clone();
    ctrlc::set_handler(move || {
        let _ = on_interrupt.send(Message::Quit);
    })
    .context("Installing Ctrl-C handler")?;
    spawn_input_reader(bindings, events.clone()).context("Starting input reader")?;

    events
        .send(Message::LessonRequested(args.lesson_id))
        .map_err(|_| anyhow!("Player runtime is not accepting messages"))?;
    runtime.run();
    Ok(())
}

#[cfg(feature = "audio-output")]
fn audio_output(_config: &PlayerConfig, cache: AssetCache) -> Arc<dyn AudioOutput> {
    info!("Playing clips on the default audio device");
    Arc::new(audio::RodioOutput::new(cache))
}

#[cfg(not(feature = "audio-output"))]
fn audio_output(config: &PlayerConfig, cache: AssetCache) -> Arc<dyn AudioOutput> {
    info!("Built without audio-output; clips are timed silently");
    Arc::new(audio::SilentOutput::new(cache, config.fallback_clip()))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut lesson_id = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG);
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?;
                config_path = PathBuf::from(path);
            }
            "--help" | "-h" => return Err(anyhow!(USAGE)),
            flag if flag.starts_with('-') => {
                return Err(anyhow!("Unknown option {flag}\n{USAGE}"));
            }
            _ if lesson_id.is_some() => {
                return Err(anyhow!("Only one lesson id expected\n{USAGE}"));
            }
            other => lesson_id = Some(LessonId::new(other)),
        }
    }
    let lesson_id = lesson_id.ok_or_else(|| anyhow!(USAGE))?;
    Ok(Args {
        lesson_id,
        config_path,
    })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        info!("RUST_LOG is set; ignoring configured log level");
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
