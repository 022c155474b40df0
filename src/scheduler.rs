//! Repeating briefing task.
//!
//! [`Scheduler`] runs one cycle immediately and then one per period until the
//! shutdown future resolves. Only one cycle is ever in flight: the state is
//! flipped to [`CycleState::Running`] by a guard that resets it to
//! [`CycleState::Idle`] on every exit path, including cancellation. Ticks that
//! arrive while a cycle is running are dropped, not queued.
//!
//! Time comes from two places, both replaceable in tests: the tokio timer
//! drives the interval (paused time in tests) and a [`Clock`] stamps each
//! briefing.

use crate::composer::compose;
use crate::error::CycleError;
use crate::models::Briefing;
use crate::outputs::{self, Format};
use crate::sources::FeedSource;
use crate::utils::format_timestamp;
use chrono::{DateTime, Local};
use std::future::Future;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument, warn};

/// Source of wall-clock time for briefing headers.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed(Briefing),
    /// Another cycle held the guard; nothing was fetched.
    Skipped,
}

/// Counters returned when the run loop stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
}

struct CycleGuard<'a> {
    state: &'a Mutex<CycleState>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = CycleState::Idle;
    }
}

pub struct Scheduler<F, C = SystemClock> {
    source: F,
    keywords: Vec<String>,
    period: Duration,
    format: Format,
    clock: C,
    state: Mutex<CycleState>,
}

impl<F: FeedSource> Scheduler<F, SystemClock> {
    pub fn new(source: F, keywords: Vec<String>, period: Duration, format: Format) -> Self {
        Self::with_clock(source, keywords, period, format, SystemClock)
    }
}

impl<F: FeedSource, C: Clock> Scheduler<F, C> {
    pub fn with_clock(
        source: F,
        keywords: Vec<String>,
        period: Duration,
        format: Format,
        clock: C,
    ) -> Self {
        Self {
            source,
            keywords,
            period,
            format,
            clock,
            state: Mutex::new(CycleState::Idle),
        }
    }

    pub fn state(&self) -> CycleState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn try_begin(&self) -> Option<CycleGuard<'_>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match *state {
            CycleState::Running => None,
            CycleState::Idle => {
                *state = CycleState::Running;
                Some(CycleGuard { state: &self.state })
            }
        }
    }

    /// Run one cycle unless another one is already in flight.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        match self.try_begin() {
            Some(guard) => self.execute(guard).await.map(CycleOutcome::Completed),
            None => {
                debug!("Cycle already running; trigger ignored");
                Ok(CycleOutcome::Skipped)
            }
        }
    }

    #[instrument(level = "info", skip_all, fields(keywords = self.keywords.len()))]
    async fn execute(&self, _guard: CycleGuard<'_>) -> Result<Briefing, CycleError> {
        let generated_at = format_timestamp(&self.clock.now());
        compose(&self.source, &self.keywords, generated_at).await
    }

    /// Write a briefing to `out`. Text briefings are preceded by a blank line.
    pub fn emit<W: Write>(&self, out: &mut W, briefing: &Briefing) -> Result<(), CycleError> {
        let rendered = outputs::render(briefing, self.format)?;
        match self.format {
            Format::Text => writeln!(out, "\n{rendered}")?,
            Format::Json => writeln!(out, "{rendered}")?,
        }
        out.flush()?;
        Ok(())
    }

    fn report<W: Write>(
        &self,
        out: &mut W,
        outcome: Result<Briefing, CycleError>,
        summary: &mut RunSummary,
    ) {
        match outcome.and_then(|b| self.emit(out, &b)) {
            Ok(()) => summary.completed += 1,
            Err(e) => {
                summary.failed += 1;
                error!(error = %e, "Briefing cycle failed");
            }
        }
    }

    /// Run cycles on the configured period until `shutdown` resolves.
    ///
    /// The first cycle starts immediately. A shutdown drops any in-flight
    /// cycle without waiting for it.
    pub async fn run<W, S>(&self, out: &mut W, shutdown: S) -> RunSummary
    where
        W: Write,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut summary = RunSummary::default();

        info!(period_secs = self.period.as_secs(), keywords = ?self.keywords, "Scheduler started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let Some(guard) = self.try_begin() else {
                summary.skipped += 1;
                continue;
            };
            let cycle = self.execute(guard);
            tokio::pin!(cycle);

            let outcome = loop {
                tokio::select! {
                    _ = &mut shutdown => {
                        info!("Shutdown requested; abandoning in-flight cycle");
                        return summary;
                    }
                    outcome = &mut cycle => break outcome,
                    _ = ticker.tick() => {
                        debug_assert_eq!(self.state(), CycleState::Running);
                        summary.skipped += 1;
                        warn!("Previous cycle still running; tick skipped");
                    }
                }
            };
            self.report(out, outcome, &mut summary);
        }

        info!(?summary, "Scheduler stopped");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::tests::{FakeSource, item};
    use chrono::TimeZone;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            Local.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
        }
    }

    const HOUR: Duration = Duration::from_secs(60 * 60);

    fn scheduler(source: FakeSource, keywords: &[&str], format: Format) -> Scheduler<FakeSource, FixedClock> {
        Scheduler::with_clock(
            source,
            keywords.iter().map(|s| s.to_string()).collect(),
            2 * HOUR,
            format,
            FixedClock,
        )
    }

    fn headers(out: &[u8]) -> usize {
        String::from_utf8_lossy(out).matches("=== 热词新闻简报").count()
    }

    #[tokio::test]
    async fn test_run_cycle_uses_clock() {
        let source = FakeSource::default().with_items("测试", vec![item("A", "u1", "d1")]);
        let s = scheduler(source, &["测试"], Format::Text);

        let CycleOutcome::Completed(briefing) = s.run_cycle().await.unwrap() else {
            panic!("cycle was skipped");
        };
        assert_eq!(briefing.generated_at, "2026/10/16 09:30:00");
        assert_eq!(s.state(), CycleState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_trigger_is_noop() {
        let source = FakeSource::default().with_delay("k", Duration::from_secs(5));
        let s = scheduler(source, &["k"], Format::Text);

        let (first, second) = tokio::join!(s.run_cycle(), s.run_cycle());
        assert!(matches!(first.unwrap(), CycleOutcome::Completed(_)));
        assert!(matches!(second.unwrap(), CycleOutcome::Skipped));
        assert_eq!(s.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn test_guard_released_after_failed_cycle() {
        let s = scheduler(FakeSource::default(), &[], Format::Text);
        assert!(matches!(s.run_cycle().await, Err(CycleError::EmptyKeywords)));
        assert_eq!(s.state(), CycleState::Idle);
        assert!(matches!(s.run_cycle().await, Err(CycleError::EmptyKeywords)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_period() {
        let source = FakeSource::default().with_items("k", vec![item("A", "u", "")]);
        let s = scheduler(source, &["k"], Format::Text);
        let mut out = Vec::new();

        // cycles at 0h, 2h and 4h
        let summary = s.run(&mut out, tokio::time::sleep(5 * HOUR)).await;
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.skipped, 0);
        assert_eq!(headers(&out), 3);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\n=== 热词新闻简报 (2026/10/16 09:30:00) ===\n- k：\n  1. A\n     u\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycle_skips_ticks_instead_of_queueing() {
        // each cycle takes 5h against a 2h period
        let source = FakeSource::default().with_delay("k", 5 * HOUR);
        let s = scheduler(source, &["k"], Format::Text);
        let mut out = Vec::new();

        let summary = s.run(&mut out, tokio::time::sleep(7 * HOUR)).await;
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(headers(&out), 1);
        assert_eq!(s.state(), CycleState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_in_flight_cycle() {
        let source = FakeSource::default().with_delay("k", 3 * HOUR);
        let s = scheduler(source, &["k"], Format::Text);
        let mut out = Vec::new();

        let summary = s.run(&mut out, tokio::time::sleep(HOUR)).await;
        assert_eq!(summary.completed, 0);
        assert!(out.is_empty());
        assert_eq!(s.state(), CycleState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_does_not_stop_scheduler() {
        let s = scheduler(FakeSource::default(), &[], Format::Text);
        let mut out = Vec::new();

        let summary = s.run(&mut out, tokio::time::sleep(3 * HOUR)).await;
        assert_eq!(summary.failed, 2);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_emit_json_line() {
        let source = FakeSource::default().with_failure("k", 502);
        let s = scheduler(source, &["k"], Format::Json);
        let CycleOutcome::Completed(briefing) = s.run_cycle().await.unwrap() else {
            panic!("cycle was skipped");
        };

        let mut out = Vec::new();
        s.emit(&mut out, &briefing).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert_eq!(line.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["sections"][0]["status"], "error");
    }
}
