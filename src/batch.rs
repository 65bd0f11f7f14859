use serde::Serialize;

use crate::error::Result;

/// A unit of a batch that failed, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitError {
    pub unit: String,
    pub message: String,
}

/// Outcome counts of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<UnitError>,
}

impl BatchSummary {
    /// Count one unit's result, returning its value on success
    pub fn record<T>(&mut self, unit: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.succeeded += 1;
                ::log::info!("✓ {}", unit);
                Some(value)
            }
            Err(e) => {
                self.failed += 1;
                ::log::error!("✗ {}: {}", unit, e);
                self.errors.push(UnitError {
                    unit: unit.to_string(),
                    message: e.to_string(),
                });
                None
            }
        }
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: BatchSummary) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Log the totals under a label
    pub fn log(&self, label: &str) {
        ::log::info!(
            "{}: {} succeeded, {} failed",
            label,
            self.succeeded,
            self.failed
        );
        for error in &self.errors {
            ::log::error!("  {}: {}", error.unit, error.message);
        }
    }
}

/// Run `work` on every unit, continuing past failures.
///
/// Successful values are returned in unit order next to the summary.
pub fn run<U, T, N, F>(units: &[U], name: N, mut work: F) -> (Vec<T>, BatchSummary)
where
    N: Fn(&U) -> String,
    F: FnMut(&U) -> Result<T>,
{
    let mut summary = BatchSummary::default();
    let values = units
        .iter()
        .filter_map(|unit| summary.record(&name(unit), work(unit)))
        .collect();
    (values, summary)
}
