//! Tracing subscriber setup.
//!
//! Console output is always on (text or JSON); a daily-rolling file sink is
//! added when file logging is enabled. `RUST_LOG` takes precedence over the
//! configured level.

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Map a level name (Python-style names included) onto a tracing level.
pub fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "trace" | "notset" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        _ => "info",
    }
}

pub fn default_directive(level: &str) -> String {
    let level = normalize_level(level);
    format!("ocrgate={level},tower_http={level}")
}

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stdout).boxed(),
        LogFormat::Text => fmt::layer().with_writer(std::io::stdout).boxed(),
    });

    if config.enable_file_logging {
        let path = Path::new(&config.file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("LOG_FILE has no file name: {}", config.file))?;

        std::fs::create_dir_all(dir)?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(file_name.to_string_lossy())
            .build(dir)?;

        layers.push(match config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .boxed(),
            LogFormat::Text => fmt::layer().with_writer(appender).with_ansi(false).boxed(),
        });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
