//! # Timing Utilities
//!
//! A small, self-contained timing toolkit, independent of the inspection
//! core. [`Timer`] measures one labeled span and prints a grep-able
//! `__time__,{seconds},{label}` line; [`Clock`] accumulates elapsed time
//! across many named spans and renders a summary table.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};

/// A running, labeled timer. Call [`Timer::finish`] to obtain the result.
#[derive(Debug)]
pub struct Timer {
    label: String,
    starting: DateTime<Utc>,
    started: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            starting: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn finish(self) -> TimerResult {
        TimerResult {
            label: self.label,
            starting: self.starting,
            ending: Utc::now(),
            seconds: self.started.elapsed().as_secs_f64(),
        }
    }
}

/// The outcome of a finished [`Timer`].
///
/// Its `Display` form is `__time__,{seconds},{label}`: the leading token is a
/// string that is easily found with grep, like the tag on rendered
/// inspections.
#[derive(Debug, Clone)]
pub struct TimerResult {
    pub label: String,
    pub starting: DateTime<Utc>,
    pub ending: DateTime<Utc>,
    pub seconds: f64,
}

impl fmt::Display for TimerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__time__,{},{}", self.seconds, self.label)
    }
}

/// Time one closure and return its output alongside the timing result.
pub fn time<R>(label: impl Into<String>, f: impl FnOnce() -> R) -> (R, TimerResult) {
    let timer = Timer::start(label);
    let out = f();
    (out, timer.finish())
}

/// An accumulating stopwatch over named spans.
///
/// `start`/`stop` may be called repeatedly for the same name; elapsed time
/// accumulates. `pause` stops every active span and remembers it so `resume`
/// can restart the set.
#[derive(Debug, Default)]
pub struct Clock {
    delta: HashMap<String, f64>,
    active: HashMap<String, Instant>,
    paused: HashSet<String>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin timing `name`. Starting an already-active name is a no-op.
    pub fn start(&mut self, name: &str) {
        self.active
            .entry(name.to_string())
            .or_insert_with(Instant::now);
    }

    /// Stop timing `name` and fold the elapsed time into its total.
    /// Stopping an inactive name is a no-op.
    pub fn stop(&mut self, name: &str) {
        if let Some(started) = self.active.remove(name) {
            *self.delta.entry(name.to_string()).or_default() += started.elapsed().as_secs_f64();
        }
    }

    /// Time one closure under `name`.
    pub fn timed<R>(&mut self, name: &str, f: impl FnOnce() -> R) -> R {
        self.start(name);
        let out = f();
        self.stop(name);
        out
    }

    /// Stop every active span, remembering the set for [`Clock::resume`].
    pub fn pause(&mut self) {
        let names: Vec<String> = self.active.keys().cloned().collect();
        for name in names {
            self.stop(&name);
            self.paused.insert(name);
        }
    }

    /// Restart every span stopped by the last [`Clock::pause`].
    pub fn resume(&mut self) {
        let names: Vec<String> = self.paused.drain().collect();
        for name in names {
            self.start(&name);
        }
    }

    /// Accumulated seconds for `name`, if it was ever stopped.
    pub fn seconds(&self, name: &str) -> Option<f64> {
        self.delta.get(name).copied()
    }

    pub fn reset(&mut self) {
        self.delta.clear();
        self.active.clear();
        self.paused.clear();
    }
}

/// Summary table of accumulated spans, longest first.
impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut records: Vec<(&str, f64)> = self
            .delta
            .iter()
            .map(|(name, seconds)| (name.as_str(), *seconds))
            .collect();
        records.sort_by(|a, b| b.1.total_cmp(&a.1));

        writeln!(f, "{:<24}{}", "name", "seconds")?;
        for (name, seconds) in records {
            writeln!(f, "{name:<24}{seconds}")?;
        }
        Ok(())
    }
}
