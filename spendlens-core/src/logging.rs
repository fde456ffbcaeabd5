//! Structured logging setup
//!
//! Output goes to stderr (or an append-only file) so that command output on
//! stdout stays machine readable. Only the spendlens crates log at the
//! configured level; everything else is held at `warn` unless `RUST_LOG`
//! says otherwise.

use anyhow::Context;
use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Crates whose events follow the configured level
const OWN_TARGETS: [&str; 2] = ["spendlens_core", "spendlens"];

/// Log line encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => anyhow::bail!("Invalid log format: {other}"),
        }
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails on an unknown level or format, an unwritable log file, or when a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let format: LogFormat = config.format.parse()?;
    let filter = build_env_filter(config)?;
    let (writer, ansi) = match &config.file_path {
        Some(path) => (file_writer(path)?, false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(format, writer, ansi))
        .try_init()?;

    Ok(())
}

/// `RUST_LOG` when set, otherwise the configured level scoped to our crates.
pub fn build_env_filter(config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    let level = parse_log_level(&config.level)?;
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(default_directives(level))?)
}

fn default_directives(level: Level) -> String {
    let level = level.to_string().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(OWN_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

fn file_writer(path: &str) -> anyhow::Result<BoxMakeWriter> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {path}"))?;
    Ok(BoxMakeWriter::new(Arc::new(file)))
}

fn fmt_layer<S>(
    format: LogFormat,
    writer: BoxMakeWriter,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_line_number(true)
            .with_file(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
    }
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(anyhow::anyhow!("Invalid log level: {level}")),
    }
}
