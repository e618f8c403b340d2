//! JSON output format for the timing report
//!
//! Machine-readable snapshot of the registry at teardown, for drivers that
//! want to persist or post-process the numbers instead of scraping stderr.

use serde::{Deserialize, Serialize};

use crate::registry::TimerRegistry;

/// One routine line of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineTiming {
    pub name: String,
    pub calls: u64,
    pub seconds: f64,
    pub avg_seconds: f64,
}

/// Full timing report: called routines sorted by descending cumulative
/// seconds, plus aggregate totals and the clock-fault diagnostic counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    pub routines: Vec<RoutineTiming>,
    pub total_calls: u64,
    pub total_seconds: f64,
    pub clock_faults: u64,
}

impl TimingReport {
    /// Snapshot the registry. Zero-call entries are dropped here, matching
    /// the text summary; the registry itself is read, never mutated.
    pub fn from_registry(registry: &TimerRegistry) -> Self {
        let mut routines = Vec::new();
        let mut total_calls = 0u64;
        let mut total_seconds = 0.0f64;

        for entry in registry.report() {
            let Some(avg) = entry.avg_seconds() else {
                continue;
            };
            total_calls += entry.calls;
            total_seconds += entry.seconds;
            routines.push(RoutineTiming {
                name: entry.name,
                calls: entry.calls,
                seconds: entry.seconds,
                avg_seconds: avg,
            });
        }

        Self {
            routines,
            total_calls,
            total_seconds,
            clock_faults: registry.clock_faults(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
