use crate::{
    aggregate::TickSnapshot,
    rate::{
        Estimator,
        EstimatorPhase,
        Eta,
        RateSample,
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
use std::collections::HashMap;

pub const DEFAULT_ALPHA: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// EMA smoothing factor, within (0, 1]. Higher reacts faster.
    pub alpha: f64,
    /// Replaces total pending as the numerator of the global ETA.
    pub remaining: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            remaining: None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EngineConfigError {
    #[error("smoothing factor must be within (0, 1], got {0}")]
    InvalidAlpha(f64),
}

/// What the global ETA was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum EtaNumerator {
    TotalPending,
    Override(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEstimate {
    pub name: String,
    pub pending: i64,
    /// `None` on the queue's baseline observation.
    pub rate: Option<RateSample>,
    pub eta: Eta,
}

impl QueueEstimate {
    pub fn ema_rate(&self) -> Option<f64> {
        self.rate.map(|rate| rate.ema_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalEstimate {
    pub pending: i64,
    pub rate: Option<RateSample>,
    pub eta: Eta,
    pub numerator: EtaNumerator,
}

/// The queue expected to finish last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    pub name: String,
    pub pending: i64,
    pub ema_rate: f64,
    pub eta_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEstimate {
    pub global: GlobalEstimate,
    /// Queues present in the tick, in snapshot order.
    pub queues: Vec<QueueEstimate>,
    pub critical_path: Option<CriticalPath>,
}

impl TickEstimate {
    pub fn queue(&self, name: &str) -> Option<&QueueEstimate> {
        self.queues.iter().find(|queue| queue.name == name)
    }
}

/// Turns successive tick snapshots into drain rates and ETAs.
///
/// Keeps one [`Estimator`] for the global total and one per queue name ever
/// seen. A queue missing from a later tick keeps its state frozen and picks
/// up again if it reappears; it is never reset.
#[derive(Debug)]
pub struct RateEtaEngine {
    config: EngineConfig,
    global: Option<Estimator>,
    queues: HashMap<String, Estimator>,
    order: Vec<String>,
}

impl RateEtaEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineConfigError> {
        if !config.alpha.is_finite() || config.alpha <= 0.0 || config.alpha > 1.0 {
            return Err(EngineConfigError::InvalidAlpha(config.alpha));
        }
        Ok(Self {
            config,
            global: None,
            queues: HashMap::new(),
            order: Vec::new(),
        })
    }

    /// Feeds one tick into the global and per-queue estimators.
    pub fn observe(&mut self, timestamp: DateTime<Utc>, snapshot: &TickSnapshot) -> TickEstimate {
        let alpha = self.config.alpha;

        let global_pending = snapshot.totals.pending;
        let global_rate = match &mut self.global {
            Some(estimator) => Some(estimator.observe(timestamp, global_pending, alpha)),
            None => {
                self.global = Some(Estimator::new(timestamp, global_pending));
                None
            }
        };
        let numerator = match self.config.remaining {
            Some(remaining) => EtaNumerator::Override(remaining),
            None => EtaNumerator::TotalPending,
        };
        let eta_numerator = match numerator {
            EtaNumerator::Override(remaining) => i64::try_from(remaining).unwrap_or(i64::MAX),
            EtaNumerator::TotalPending => global_pending,
        };
        let global = GlobalEstimate {
            pending: global_pending,
            rate: global_rate,
            eta: Eta::project(eta_numerator, global_rate.map(|rate| rate.ema_rate)),
            numerator,
        };

        let mut queues = Vec::with_capacity(snapshot.queues.len());
        for queue in &snapshot.queues {
            let rate = match self.queues.get_mut(&queue.name) {
                Some(estimator) => Some(estimator.observe(timestamp, queue.pending, alpha)),
                None => {
                    debug!(queue = %queue.name, pending = queue.pending, "tracking new queue");
                    self.queues
                        .insert(queue.name.clone(), Estimator::new(timestamp, queue.pending));
                    self.order.push(queue.name.clone());
                    None
                }
            };
            queues.push(QueueEstimate {
                name: queue.name.clone(),
                pending: queue.pending,
                rate,
                eta: Eta::project(queue.pending, rate.map(|rate| rate.ema_rate)),
            });
        }

        let critical_path = critical_path(&queues);

        TickEstimate {
            global,
            queues,
            critical_path,
        }
    }

    /// Last rate computed for `name`, including queues that have since
    /// vanished from the feed.
    pub fn rate(&self, name: &str) -> Option<&RateSample> {
        self.queues.get(name).and_then(Estimator::last_sample)
    }

    pub fn global_rate(&self) -> Option<&RateSample> {
        self.global.as_ref().and_then(Estimator::last_sample)
    }

    /// `None` while the queue has never been observed.
    pub fn phase(&self, name: &str) -> Option<EstimatorPhase> {
        self.queues.get(name).map(Estimator::phase)
    }

    pub fn global_phase(&self) -> Option<EstimatorPhase> {
        self.global.as_ref().map(Estimator::phase)
    }

    pub fn cumulative_drained(&self, name: &str) -> Option<i64> {
        self.queues.get(name).map(Estimator::cumulative_drained)
    }

    pub fn global_cumulative_drained(&self) -> Option<i64> {
        self.global.as_ref().map(Estimator::cumulative_drained)
    }

    /// Every queue name seen so far, in first-seen order.
    pub fn tracked_queues(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// Largest finite ETA among queues with pending work and a positive
/// smoothed rate. Ties keep the earlier queue.
pub fn critical_path(queues: &[QueueEstimate]) -> Option<CriticalPath> {
    let mut worst: Option<CriticalPath> = None;
    for queue in queues {
        if queue.pending <= 0 {
            continue;
        }
        let Some(ema_rate) = queue.ema_rate().filter(|rate| *rate > 0.0) else {
            continue;
        };
        let eta_secs = queue.pending as f64 / ema_rate;
        if !eta_secs.is_finite() {
            continue;
        }
        if worst.as_ref().map_or(true, |current| eta_secs > current.eta_secs) {
            worst = Some(CriticalPath {
                name: queue.name.clone(),
                pending: queue.pending,
                ema_rate,
                eta_secs,
            });
        }
    }
    worst
}
