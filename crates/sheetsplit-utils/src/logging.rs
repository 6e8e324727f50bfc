//! Logging and observability infrastructure for sheetsplit
//!
//! Progress is reported through `tracing` events as each stage runs, so the
//! same information reaches the terminal (compact format) and any structured
//! collector a library consumer installs.

use std::io::IsTerminal;
use std::time::Instant;
use tracing::{Level, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Check if colored output should be used.
///
/// Returns true only if stderr is a terminal and `NO_COLOR` is not set.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects between
/// `sheetsplit=debug` and `sheetsplit=info`. Verbose mode also reports span
/// close events so each stage logs its duration.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("sheetsplit=debug,sheetsplit_engine=debug,info")
            } else {
                EnvFilter::try_new("sheetsplit=info,sheetsplit_engine=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let span_events = if verbose {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(use_color())
                .with_target(verbose)
                .with_thread_ids(false)
                .with_line_number(false)
                .with_file(false)
                .with_span_events(span_events)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Create a span for one pipeline stage (`discover`, `ingest`, `group`, ...)
pub fn stage_span(stage: &'static str) -> tracing::Span {
    span!(Level::INFO, "stage", stage = stage)
}

/// Wall-clock timer that logs a completion event for a stage
#[derive(Debug)]
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    #[must_use]
    pub fn start(stage: &'static str) -> Self {
        Self {
            stage,
            started: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the stage started
    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    /// Log completion with the number of items the stage produced
    pub fn finish(self, items: usize) -> u128 {
        let duration_ms = self.elapsed_ms();
        info!(
            stage = self.stage,
            items,
            duration_ms = %duration_ms,
            "stage complete"
        );
        duration_ms
    }
}
