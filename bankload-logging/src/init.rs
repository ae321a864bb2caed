use anyhow::{Context, Result};
use bankload_config::domains::logging::{FileRotation, LogFormat, LogTarget, LoggingConfig};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Subscriber produced by [`build_subscriber`]
pub type ConfiguredSubscriber = Layered<Vec<BoxedLayer>, Registry>;

/// Keeps file appenders flushing. Drop it only when the process is done logging.
#[must_use = "dropping the guard stops file logging"]
#[derive(Default)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

impl std::fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingGuard")
            .field("file_writers", &self._guards.len())
            .finish()
    }
}

/// Initialize logging from configuration.
///
/// `level_override` (typically the `--log-level` flag) replaces the
/// configured global level; per-target levels still apply.
pub fn init_logging_from_config(
    config: &LoggingConfig,
    level_override: Option<&str>,
) -> Result<LoggingGuard> {
    let (subscriber, guard) = build_subscriber(config, level_override)?;

    // Use try_init to avoid panic if global subscriber already set
    if subscriber.try_init().is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(guard)
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(log_level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Build the configured subscriber without installing it
pub fn build_subscriber(
    config: &LoggingConfig,
    level_override: Option<&str>,
) -> Result<(ConfiguredSubscriber, LoggingGuard)> {
    let global_level = level_override
        .map(str::to_string)
        .unwrap_or_else(|| config.level.to_string());

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(config.targets.len());
    let mut guards = Vec::new();

    for target in &config.targets {
        match target {
            LogTarget::Console { level } => {
                let filter = target_filter(level.map(|l| l.to_string()), &global_level);
                let layer = format_layer(config.format, config.include_location, std::io::stderr, true);
                layers.push(layer.with_filter(filter).boxed());
            }
            LogTarget::File {
                path,
                level,
                rotation,
            } => {
                let (writer, guard) = file_writer(path, *rotation)?;
                guards.push(guard);

                let filter = target_filter(level.map(|l| l.to_string()), &global_level);
                let layer = format_layer(config.format, config.include_location, writer, false);
                layers.push(layer.with_filter(filter).boxed());
            }
        }
    }

    let subscriber = tracing_subscriber::registry().with(layers);
    Ok((subscriber, LoggingGuard { _guards: guards }))
}

fn target_filter(target_level: Option<String>, global_level: &str) -> EnvFilter {
    let level = target_level.as_deref().unwrap_or(global_level);
    EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn format_layer<W>(format: LogFormat, include_location: bool, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_file(include_location)
        .with_line_number(include_location);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Text => layer.boxed(),
    }
}

fn file_writer(
    path: &str,
    rotation: FileRotation,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path {:?} has no file name", path))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {:?}", directory))?;

    let appender = match rotation {
        FileRotation::Never => tracing_appender::rolling::never(directory, file_name),
        FileRotation::Hourly => tracing_appender::rolling::hourly(directory, file_name),
        FileRotation::Daily => tracing_appender::rolling::daily(directory, file_name),
    };

    Ok(tracing_appender::non_blocking(appender))
}
