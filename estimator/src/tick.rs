use crate::{
    aggregate::{
        aggregate,
        QueueSnapshot,
        TickSnapshot,
    },
    engine::{
        QueueEstimate,
        RateEtaEngine,
        TickEstimate,
    },
    extract::{
        extract_queues,
        ROOT_LABEL,
    },
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

/// Everything derived from one polled document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub timestamp: DateTime<Utc>,
    pub snapshot: TickSnapshot,
    pub estimate: TickEstimate,
}

impl TickReport {
    pub fn queue(&self, name: &str) -> Option<(&QueueSnapshot, &QueueEstimate)> {
        Some((self.snapshot.queue(name)?, self.estimate.queue(name)?))
    }

    /// Snapshot and estimate of every queue present in this tick, in
    /// document order.
    pub fn queues(&self) -> impl Iterator<Item = (&QueueSnapshot, &QueueEstimate)> {
        self.snapshot.queues.iter().zip(self.estimate.queues.iter())
    }
}

impl RateEtaEngine {
    /// Runs extraction, aggregation and estimation for one document.
    ///
    /// Never fails on document content. The engine is only touched after the
    /// snapshot is complete, so dropping the call before it returns leaves
    /// estimator state untouched.
    pub fn process_document(&mut self, timestamp: DateTime<Utc>, document: &Value) -> TickReport {
        let observations = extract_queues(document, ROOT_LABEL);
        let snapshot = aggregate(&observations);
        let estimate = self.observe(timestamp, &snapshot);
        TickReport {
            timestamp,
            snapshot,
            estimate,
        }
    }
}
