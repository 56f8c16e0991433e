use crate::{
    counts::CountsRecord,
    extract::RawQueueObservation,
    normalize::normalize_queue_name,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;

/// Counters of one queue in one tick. `pending` is always
/// `waiting + active + delayed + paused`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub name: String,
    pub pending: i64,
    pub waiting: i64,
    pub active: i64,
    pub delayed: i64,
    pub paused: i64,
    pub failed: i64,
}

impl QueueSnapshot {
    pub fn new(name: impl Into<String>, counts: &CountsRecord) -> Self {
        Self {
            name: name.into(),
            pending: counts.pending(),
            waiting: counts.waiting,
            active: counts.active,
            delayed: counts.delayed,
            paused: counts.paused,
            failed: counts.failed,
        }
    }
}

/// Sum over every observation of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSnapshot {
    pub pending: i64,
    pub waiting: i64,
    pub active: i64,
    pub delayed: i64,
    pub paused: i64,
    pub failed: i64,
}

impl GlobalSnapshot {
    fn add(&mut self, queue: &QueueSnapshot) {
        self.pending = self.pending.saturating_add(queue.pending);
        self.waiting = self.waiting.saturating_add(queue.waiting);
        self.active = self.active.saturating_add(queue.active);
        self.delayed = self.delayed.saturating_add(queue.delayed);
        self.paused = self.paused.saturating_add(queue.paused);
        self.failed = self.failed.saturating_add(queue.failed);
    }
}

/// Aggregated view of one polled document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub totals: GlobalSnapshot,
    /// One entry per distinct queue name, in first-seen order.
    pub queues: Vec<QueueSnapshot>,
}

impl TickSnapshot {
    pub fn queue(&self, name: &str) -> Option<&QueueSnapshot> {
        self.queues.iter().find(|queue| queue.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

/// Reduces the observations of one tick to per-queue and global counters.
///
/// Observations that normalise to the same queue name are deduplicated by
/// keeping the one with the highest `pending` (the first one wins a tie).
/// The totals, however, sum every observation before deduplication.
pub fn aggregate(observations: &[RawQueueObservation<'_>]) -> TickSnapshot {
    let mut snapshot = TickSnapshot::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for observation in observations {
        let name = normalize_queue_name(&observation.path);
        let queue = QueueSnapshot::new(name, &CountsRecord::from_object(observation.counts));
        snapshot.totals.add(&queue);

        match positions.get(&queue.name).copied() {
            Some(index) => {
                let kept = &mut snapshot.queues[index];
                trace!(
                    queue = %queue.name,
                    kept = kept.pending,
                    seen = queue.pending,
                    "duplicate queue observation"
                );
                if queue.pending > kept.pending {
                    *kept = queue;
                }
            }
            None => {
                positions.insert(queue.name.clone(), snapshot.queues.len());
                snapshot.queues.push(queue);
            }
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{
        extract_queues,
        ROOT_LABEL,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{
        json,
        Value,
    };

    fn aggregate_document(document: &Value) -> TickSnapshot {
        aggregate(&extract_queues(document, ROOT_LABEL))
    }

    #[test]
    fn single_queue_snapshot() {
        let snapshot = aggregate_document(&json!({
            "thumbnailGeneration": {
                "jobCounts": { "waiting": 5, "active": 2, "delayed": 0, "paused": 0, "failed": 1 }
            }
        }));
        assert_eq!(
            snapshot.queues,
            vec![QueueSnapshot {
                name: "thumbnailGeneration".to_string(),
                pending: 7,
                waiting: 5,
                active: 2,
                delayed: 0,
                paused: 0,
                failed: 1,
            }]
        );
        assert_eq!(snapshot.totals.pending, 7);
        assert_eq!(snapshot.totals.failed, 1);
    }

    #[test]
    fn duplicates_keep_the_maximum_pending() {
        let snapshot = aggregate_document(&json!({
            "a": { "queue": "search", "waiting": 3, "active": 1 },
            "b": { "queue": "search", "waiting": 9, "active": 0, "failed": 2 },
            "c": { "queue": "search", "waiting": 1, "active": 1 },
        }));
        assert_eq!(snapshot.queues.len(), 1);
        let search = snapshot.queue("search").unwrap();
        assert_eq!(search.pending, 9);
        assert_eq!(search.failed, 2);
    }

    #[test]
    fn totals_sum_raw_observations() {
        let snapshot = aggregate_document(&json!({
            "a": { "queue": "search", "waiting": 3, "active": 1 },
            "b": { "queue": "search", "waiting": 9, "active": 0 },
            "c": { "queue": "faces", "waiting": 2, "paused": 5 },
        }));
        assert_eq!(snapshot.queues.iter().map(|queue| queue.pending).sum::<i64>(), 16);
        assert_eq!(
            snapshot.totals,
            GlobalSnapshot {
                pending: 20,
                waiting: 14,
                active: 1,
                delayed: 0,
                paused: 5,
                failed: 0,
            }
        );
    }

    #[test]
    fn queues_keep_first_seen_order() {
        let snapshot = aggregate_document(&json!({
            "zeta": { "jobCounts": { "waiting": 1, "active": 0 } },
            "alpha": { "jobCounts": { "waiting": 2, "active": 0 } },
            "again": { "queue": "zeta", "waiting": 5, "active": 0 },
        }));
        let names: Vec<_> = snapshot.queues.iter().map(|queue| queue.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(snapshot.queue("zeta").unwrap().pending, 5);
    }

    #[test]
    fn documents_without_counts_aggregate_to_nothing() {
        let snapshot = aggregate_document(&json!({ "status": "ok", "items": [1, 2, 3] }));
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.totals, GlobalSnapshot::default());
    }
}
