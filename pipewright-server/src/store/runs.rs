//! Bounded history of pipeline runs.

use pipewright_core::model::{ComponentRun, PipelineRun};
use pipewright_core::types::Uid;
use std::collections::{HashMap, VecDeque};

/// A pipeline run with its component runs.
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// The pipeline run.
    pub run: PipelineRun,
    /// One entry per executed component, in execution order.
    pub components: Vec<ComponentRun>,
}

/// Ring of recent runs, indexed by run uid.
///
/// When full, the oldest run is evicted.
pub struct RunHistory {
    capacity: usize,
    order: VecDeque<Uid>,
    records: HashMap<Uid, RunRecord>,
}

impl RunHistory {
    /// Create a history holding at most `capacity` runs.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::with_capacity(capacity),
            records: HashMap::with_capacity(capacity),
        }
    }

    /// Insert a run, or replace the record with the same uid.
    pub fn upsert(&mut self, record: RunRecord) {
        let uid = record.run.uid;
        if self.records.insert(uid, record).is_some() {
            return;
        }
        self.order.push_back(uid);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.records.remove(&evicted);
            }
        }
    }

    /// Get a run by uid.
    pub fn get(&self, uid: &Uid) -> Option<&RunRecord> {
        self.records.get(uid)
    }

    /// Runs of a pipeline, newest first.
    pub fn by_pipeline(&self, pipeline_uid: &Uid) -> Vec<&RunRecord> {
        self.order
            .iter()
            .rev()
            .filter_map(|uid| self.records.get(uid))
            .filter(|record| &record.run.pipeline_uid == pipeline_uid)
            .collect()
    }

    /// Number of runs held.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipewright_core::model::Pipeline;
    use pipewright_core::types::{Namespace, RunStatus};
    use serde_json::json;

    fn pipeline(id: &str) -> Pipeline {
        Pipeline::from_create_body(Namespace::parse("users/admin").unwrap(), &json!({ "id": id }))
            .unwrap()
    }

    fn record(p: &Pipeline) -> RunRecord {
        RunRecord {
            run: PipelineRun::start(p, "admin", vec![]),
            components: vec![],
        }
    }

    #[test]
    fn evicts_oldest() {
        let p = pipeline("p");
        let mut history = RunHistory::new(3);
        let first = record(&p);
        let first_uid = first.run.uid;
        history.upsert(first);
        for _ in 0..3 {
            history.upsert(record(&p));
        }
        assert_eq!(history.len(), 3);
        assert!(history.get(&first_uid).is_none());
    }

    #[test]
    fn newest_first_per_pipeline() {
        let a = pipeline("a");
        let b = pipeline("b");
        let mut history = RunHistory::new(10);
        let r1 = record(&a);
        let r2 = record(&b);
        let r3 = record(&a);
        let (u1, u3) = (r1.run.uid, r3.run.uid);
        history.upsert(r1);
        history.upsert(r2);
        history.upsert(r3);

        let runs: Vec<Uid> = history.by_pipeline(&a.uid).iter().map(|r| r.run.uid).collect();
        assert_eq!(runs, vec![u3, u1]);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let p = pipeline("p");
        let mut history = RunHistory::new(10);
        let mut r = record(&p);
        history.upsert(r.clone());
        r.run.complete(vec![]);
        history.upsert(r.clone());
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(&r.run.uid).unwrap().run.status, RunStatus::Completed);
    }
}
