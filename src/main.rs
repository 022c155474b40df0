//! # News Brief
//!
//! Periodically fetches Google News search results for a set of hot keywords
//! and prints a compact briefing to stdout.
//!
//! ## Usage
//!
//! ```sh
//! news_brief 芯片 新能源
//! HOT_KEYWORDS="芯片,新能源" news_brief --interval-secs 3600
//! ```
//!
//! ## Architecture
//!
//! 1. **Keywords**: resolved once at startup from arguments, `HOT_KEYWORDS`,
//!    the config file, or a built-in default
//! 2. **Fetching**: every cycle fetches all keywords concurrently, capturing
//!    each keyword's failure separately
//! 3. **Composing**: results are rendered in keyword order under a timestamped
//!    header
//! 4. **Scheduling**: one cycle at startup, then one per interval; a cycle
//!    that is still running causes the next tick to be skipped
//!
//! Logs go to stderr; stdout carries only briefings. SIGINT/SIGTERM stop the
//! scheduler and exit 0. A panic escaping the scheduler exits 1.

use clap::Parser;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::process::ExitCode;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod composer;
mod config;
mod error;
mod keywords;
mod models;
mod outputs;
mod scheduler;
mod sources;
mod utils;

use cli::Cli;
use config::Settings;
use error::ConfigError;
use outputs::Format;
use scheduler::{Clock, CycleOutcome, Scheduler};
use sources::FeedSource;
use sources::google_news::GoogleNewsSource;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "news_brief starting up");

    let args = Cli::parse();
    let settings = match Settings::load(&args).await {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            if matches!(e, ConfigError::NoKeywords) {
                eprintln!("usage: news_brief <keyword>... (or set HOT_KEYWORDS=\"a,b\")");
            }
            return ExitCode::FAILURE;
        }
    };
    info!(
        keywords = ?settings.keywords,
        interval_secs = settings.interval.as_secs(),
        timeout_secs = settings.timeout.as_secs(),
        feed_url = %settings.feed_url,
        "Resolved settings"
    );

    let source = match GoogleNewsSource::new(
        settings.feed_url.clone(),
        settings.timeout,
        &settings.user_agent,
    ) {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let format = if settings.json { Format::Json } else { Format::Text };
    let scheduler = Scheduler::new(source, settings.keywords, settings.interval, format);

    let mut stdout = std::io::stdout();
    if settings.once {
        supervise(run_once(&scheduler, &mut stdout), shutdown_signal()).await
    } else {
        supervise(
            run_scheduled(&scheduler, &mut stdout, shutdown_signal()),
            std::future::pending(),
        )
        .await
    }
}

/// Drive `task` to completion, mapping an escaped panic to exit code 1 and
/// an early `shutdown` to exit code 0.
async fn supervise<T, S>(task: T, shutdown: S) -> ExitCode
where
    T: Future<Output = ExitCode>,
    S: Future<Output = ()>,
{
    let guarded = AssertUnwindSafe(task).catch_unwind();
    tokio::pin!(guarded, shutdown);
    tokio::select! {
        result = &mut guarded => match result {
            Ok(code) => code,
            Err(panic) => {
                error!(panic = %panic_message(panic.as_ref()), "Unhandled fault escaped the briefing task");
                ExitCode::FAILURE
            }
        },
        _ = &mut shutdown => {
            info!("Shutdown requested before the briefing finished");
            ExitCode::SUCCESS
        }
    }
}

/// The scheduler loop; returns once `shutdown` resolves.
async fn run_scheduled<F, C, W, S>(scheduler: &Scheduler<F, C>, out: &mut W, shutdown: S) -> ExitCode
where
    F: FeedSource,
    C: Clock,
    W: Write,
    S: Future<Output = ()>,
{
    let summary = scheduler.run(out, shutdown).await;
    info!(
        completed = summary.completed,
        failed = summary.failed,
        skipped = summary.skipped,
        "Shut down cleanly"
    );
    ExitCode::SUCCESS
}

/// `--once`: a single cycle, printed, then exit.
#[instrument(level = "info", skip_all)]
async fn run_once<F, C, W>(scheduler: &Scheduler<F, C>, out: &mut W) -> ExitCode
where
    F: FeedSource,
    C: Clock,
    W: Write,
{
    let result = match scheduler.run_cycle().await {
        Ok(CycleOutcome::Completed(briefing)) => scheduler.emit(out, &briefing),
        Ok(CycleOutcome::Skipped) => Ok(()),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Briefing cycle failed");
            ExitCode::FAILURE
        }
    }
}

/// Resolves on the first SIGINT or SIGTERM (Ctrl-C elsewhere).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                let name = tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                };
                info!(signal = name, "Received shutdown signal");
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to install signal handlers; falling back to Ctrl-C");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
