//! Named check recorder shared by every virtual user.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;

/// Pass and fail counts of one check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckCounts {
    /// Times the check held.
    pub passes: u64,
    /// Times the check failed.
    pub fails: u64,
}

impl CheckCounts {
    /// Total evaluations.
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }
}

/// Thread-safe recorder of named checks, in first-seen order.
#[derive(Debug, Default)]
pub struct Checks {
    counts: Mutex<IndexMap<String, CheckCounts>>,
}

impl Checks {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evaluation of `name` and return `ok`.
    pub fn check(&self, name: &str, ok: bool) -> bool {
        let mut counts = self.counts.lock();
        let entry = counts.entry(name.to_string()).or_default();
        if ok {
            entry.passes += 1;
        } else {
            entry.fails += 1;
            tracing::debug!(check = name, "Check failed");
        }
        ok
    }

    /// Counts of one check.
    pub fn get(&self, name: &str) -> Option<CheckCounts> {
        self.counts.lock().get(name).copied()
    }

    /// Every check with its counts.
    pub fn snapshot(&self) -> Vec<(String, CheckCounts)> {
        self.counts
            .lock()
            .iter()
            .map(|(name, counts)| (name.clone(), *counts))
            .collect()
    }

    /// Sum of passes across checks.
    pub fn passes(&self) -> u64 {
        self.counts.lock().values().map(|c| c.passes).sum()
    }

    /// Sum of failures across checks.
    pub fn fails(&self) -> u64 {
        self.counts.lock().values().map(|c| c.fails).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counts_per_name_in_order() {
        let checks = Checks::new();
        assert!(checks.check("b status 200", true));
        assert!(!checks.check("a status 404", false));
        checks.check("b status 200", true);

        assert_eq!(checks.get("b status 200"), Some(CheckCounts { passes: 2, fails: 0 }));
        assert_eq!(checks.get("a status 404").map(|c| c.fails), Some(1));
        assert_eq!(checks.passes(), 2);
        assert_eq!(checks.fails(), 1);

        let names: Vec<String> = checks.snapshot().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b status 200", "a status 404"]);
    }

    #[tokio::test]
    async fn concurrent_recording() {
        let checks = Arc::new(Checks::new());
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let checks = Arc::clone(&checks);
                tokio::spawn(async move {
                    for _ in 0..100 {
                        checks.check("shared", i % 2 == 0);
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(checks.get("shared").map(|c| c.total()), Some(800));
        assert_eq!(checks.passes(), 400);
    }
}
