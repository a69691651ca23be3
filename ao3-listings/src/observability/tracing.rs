//! Tracing subscriber setup and timing helpers.

use std::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::errors::{ArchiveError, Result};

/// Output format for [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Installs a global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `info`. Fails if a
/// global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| ArchiveError::Config(format!("failed to install subscriber: {e}")))
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}
