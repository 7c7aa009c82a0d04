//! End-of-run summary.

use crate::checks::CheckCounts;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Outcome of a load-test run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Every check with its counts, in first-seen order.
    pub checks: Vec<(String, CheckCounts)>,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Virtual users that ran.
    pub vus: usize,
    /// Iterations per virtual user.
    pub iterations: usize,
}

impl Summary {
    /// Sum of passes.
    pub fn passes(&self) -> u64 {
        self.checks.iter().map(|(_, c)| c.passes).sum()
    }

    /// Sum of failures.
    pub fn fails(&self) -> u64 {
        self.checks.iter().map(|(_, c)| c.fails).sum()
    }

    /// Fraction of evaluations that passed; 1.0 with no checks.
    pub fn pass_rate(&self) -> f64 {
        let total = self.passes() + self.fails();
        if total == 0 {
            1.0
        } else {
            self.passes() as f64 / total as f64
        }
    }

    /// True when no check failed.
    pub fn is_success(&self) -> bool {
        self.fails() == 0
    }

    /// Checks that failed at least once.
    pub fn failed_checks(&self) -> impl Iterator<Item = &(String, CheckCounts)> {
        self.checks.iter().filter(|(_, c)| c.fails > 0)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, counts) in &self.checks {
            let mark = if counts.fails == 0 { '✓' } else { '✗' };
            write!(f, "  {} {}", mark, name)?;
            if counts.fails > 0 {
                write!(f, " ({} passed, {} failed)", counts.passes, counts.fails)?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "  checks.....: {:.2}% ✓ {} ✗ {}",
            self.pass_rate() * 100.0,
            self.passes(),
            self.fails()
        )?;
        writeln!(f, "  vus........: {}", self.vus)?;
        writeln!(f, "  iterations.: {}", self.vus * self.iterations)?;
        write!(f, "  duration...: {:.2?}", self.duration)
    }
}
