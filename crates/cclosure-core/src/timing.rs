//! Opt-in stage timing.
//!
//! Commands and engine stages wrap their work in [`timed`]. When collection
//! is enabled (`--timing` or `CCLOSURE_TIMING`), every call folds its
//! elapsed time into a per-stage tally on the calling thread. Densification
//! runs one `densify.round` per iteration, so a stage may be entered many
//! times; the report keeps call count, total, fastest and slowest.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde_json::json;

/// Accumulated time for one named stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTally {
    pub calls: u32,
    pub total: Duration,
    pub fastest: Duration,
    pub slowest: Duration,
}

impl StageTally {
    fn first(elapsed: Duration) -> Self {
        Self {
            calls: 1,
            total: elapsed,
            fastest: elapsed,
            slowest: elapsed,
        }
    }

    fn add(&mut self, elapsed: Duration) {
        self.calls = self.calls.saturating_add(1);
        self.total = self.total.saturating_add(elapsed);
        self.fastest = self.fastest.min(elapsed);
        self.slowest = self.slowest.max(elapsed);
    }

    /// Mean time per call.
    #[must_use]
    pub fn mean(&self) -> Duration {
        self.total / self.calls.max(1)
    }
}

/// Stage tallies drained by [`collect_report`], ordered by stage name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingReport {
    pub stages: BTreeMap<&'static str, StageTally>,
}

thread_local! {
    static TALLIES: RefCell<BTreeMap<&'static str, StageTally>> =
        const { RefCell::new(BTreeMap::new()) };
}

static TIMING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Whether `CCLOSURE_TIMING` is set to `1`, `true`, `yes` or `on`.
#[must_use]
pub fn timing_enabled_from_env() -> bool {
    std::env::var("CCLOSURE_TIMING")
        .ok()
        .is_some_and(|value| is_truthy(&value))
}

/// Turn collection on or off. Turning it off discards this thread's tallies.
pub fn set_timing_enabled(enabled: bool) {
    TIMING_ENABLED.store(enabled, Ordering::Relaxed);
    if !enabled {
        clear_timings();
    }
}

#[must_use]
pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::Relaxed)
}

pub fn clear_timings() {
    TALLIES.with(|tallies| tallies.borrow_mut().clear());
}

/// Run `f`, charging its wall time to `stage` when collection is enabled.
pub fn timed<R>(stage: &'static str, f: impl FnOnce() -> R) -> R {
    if !is_timing_enabled() {
        return f();
    }

    let started = Instant::now();
    let result = f();
    record(stage, started.elapsed());
    result
}

/// Drain this thread's tallies.
#[must_use]
pub fn collect_report() -> TimingReport {
    TimingReport {
        stages: TALLIES.with(|tallies| std::mem::take(&mut *tallies.borrow_mut())),
    }
}

impl TimingReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Per-stage figures in milliseconds, keyed by stage name.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let stages: serde_json::Map<String, serde_json::Value> = self
            .stages
            .iter()
            .map(|(stage, tally)| {
                let value = json!({
                    "calls": tally.calls,
                    "total_ms": millis(tally.total),
                    "mean_ms": millis(tally.mean()),
                    "fastest_ms": millis(tally.fastest),
                    "slowest_ms": millis(tally.slowest),
                });
                ((*stage).to_string(), value)
            })
            .collect();

        json!({ "stages": stages })
    }

    #[must_use]
    pub fn display_table(&self) -> String {
        let mut out = format!(
            "{:<24} {:>6} {:>11} {:>11} {:>11}\n",
            "stage", "calls", "total", "mean", "slowest"
        );
        for (stage, tally) in &self.stages {
            let _ = writeln!(
                out,
                "{:<24} {:>6} {:>11} {:>11} {:>11}",
                stage,
                tally.calls,
                format_duration(tally.total),
                format_duration(tally.mean()),
                format_duration(tally.slowest)
            );
        }
        out
    }
}

fn record(stage: &'static str, elapsed: Duration) {
    TALLIES.with(|tallies| {
        tallies
            .borrow_mut()
            .entry(stage)
            .and_modify(|tally| tally.add(elapsed))
            .or_insert_with(|| StageTally::first(elapsed));
    });
}

#[allow(clippy::cast_precision_loss)]
fn millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1e6
}

/// `412µs`, `3.250ms` or `2.100s`, whichever unit keeps the number short.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros < 1_000 {
        format!("{micros}µs")
    } else if micros < 1_000_000 {
        format!("{:.3}ms", millis(duration))
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}

fn is_truthy(value: &str) -> bool {
    ["1", "true", "yes", "on"]
        .iter()
        .any(|truthy| value.eq_ignore_ascii_case(truthy))
}
