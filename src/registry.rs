//! Process-wide timing registry
//!
//! Maps a routine name to an accumulated call count and elapsed wall time.
//! The table is owned explicitly (no ambient global): the driver creates it
//! before the first instrumented call, shares it behind an `Arc` with the
//! interception layer, and reads the final report exactly once at teardown.
//!
//! Entries are created lazily on first observation, or up front from a seed
//! list so that report ordering stays stable for routines that end up with
//! zero calls. Registration order is preserved; [`TimerRegistry::report`]
//! derives the descending-by-time view without disturbing the table.
//! `record` is safe under concurrent use from multiple threads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors detected when the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two rows of the binding table mapped to the same report name.
    #[error("duplicate routine name in seed list: {name}")]
    DuplicateName { name: String },
}

/// Per-routine aggregate: call count and cumulative elapsed seconds.
///
/// Both fields only ever grow while the process runs; `seconds` counts
/// genuine invocations only (workspace queries never reach the registry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerEntry {
    pub name: String,
    pub calls: u64,
    pub seconds: f64,
}

impl TimerEntry {
    /// Mean seconds per call; `None` for an entry that was never called, so
    /// presentation code cannot divide by zero by accident.
    pub fn avg_seconds(&self) -> Option<f64> {
        (self.calls > 0).then(|| self.seconds / self.calls as f64)
    }
}

#[derive(Debug, Default)]
struct Table {
    index: HashMap<String, usize>,
    entries: Vec<TimerEntry>,
}

impl Table {
    fn slot(&mut self, name: &str) -> &mut TimerEntry {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(name.to_string(), i);
                self.entries.push(TimerEntry {
                    name: name.to_string(),
                    calls: 0,
                    seconds: 0.0,
                });
                i
            }
        };
        &mut self.entries[i]
    }
}

/// Thread-safe name -> (calls, seconds) accumulator.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    table: Mutex<Table>,
    clock_faults: AtomicU64,
}

impl TimerRegistry {
    /// Empty registry; entries appear as routine names are first recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with a fixed name list.
    ///
    /// A duplicate in the list means two binding-table rows collide on one
    /// report name; that is a configuration error and is rejected here, at
    /// initialization, rather than surfacing as merged timings at call time.
    pub fn with_preseed<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, RegistryError> {
        let registry = Self::new();
        let mut count = 0usize;
        for name in names {
            registry.register_new(name)?;
            count += 1;
        }
        tracing::debug!(routines = count, "timing registry pre-seeded");
        Ok(registry)
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register_new(&self, name: &str) -> Result<(), RegistryError> {
        let mut table = self.lock();
        if table.index.contains_key(name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        table.slot(name);
        Ok(())
    }

    /// Ensure an entry exists for `name`, creating a zeroed one if absent.
    /// Equal name contents always resolve to the same entry.
    pub fn register(&self, name: &str) {
        self.lock().slot(name);
    }

    /// Accumulate one timed call of `name`.
    pub fn record(&self, name: &str, elapsed: Duration) {
        self.record_seconds(name, elapsed.as_secs_f64());
    }

    /// Accumulate one timed call from a raw seconds value.
    ///
    /// A negative value indicates a clock fault: the call is still counted,
    /// the seconds contribution is clamped to zero so the accumulator never
    /// decreases, and [`TimerRegistry::clock_faults`] is incremented.
    pub fn record_seconds(&self, name: &str, seconds: f64) {
        let seconds = if seconds < 0.0 {
            self.clock_faults.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(routine = name, seconds, "negative elapsed time clamped to zero");
            0.0
        } else {
            seconds
        };
        let mut table = self.lock();
        let entry = table.slot(name);
        entry.calls += 1;
        entry.seconds += seconds;
    }

    /// Number of distinct routine names observed so far.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Count of negative elapsed-time measurements that were clamped.
    pub fn clock_faults(&self) -> u64 {
        self.clock_faults.load(Ordering::Relaxed)
    }

    /// Snapshot ordered by descending cumulative seconds; entries with equal
    /// time keep their registration order. Zero-call entries are included
    /// and left to the presentation layer to filter.
    pub fn report(&self) -> Vec<TimerEntry> {
        let mut view = self.lock().entries.clone();
        // Stable sort, so insertion order breaks ties.
        view.sort_by(|a, b| b.seconds.total_cmp(&a.seconds));
        view
    }

    /// Print the teardown summary to stderr: one line per called routine,
    /// busiest first, then totals. Reads the registry without mutating it.
    pub fn print_summary(&self) {
        let view = self.report();
        let mut total_calls = 0u64;
        let mut total_seconds = 0.0f64;

        eprintln!("\n==== Eigensolver Pipeline Timing (wall time) ====");
        for entry in view.iter().filter(|e| e.calls > 0) {
            total_calls += entry.calls;
            total_seconds += entry.seconds;
            eprintln!(
                "{:<10}  calls={:>8}  time={:>11.6} s  avg={:>10.6} s",
                entry.name,
                entry.calls,
                entry.seconds,
                entry.avg_seconds().unwrap_or(0.0)
            );
        }
        eprintln!("---------------------------------------------");
        eprintln!(
            "TOTAL       calls={:>8}  time={:>11.6} s",
            total_calls, total_seconds
        );
        let faults = self.clock_faults();
        if faults > 0 {
            eprintln!("clock faults: {faults}");
        }
        eprintln!("=============================================");
    }
}
