use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Floor for elapsed time between observations, in seconds. Guards the rate
/// divisions against identical or backwards timestamps.
pub const MIN_ELAPSED_SECS: f64 = 1e-6;

/// Drain rates derived from one observation, in items per second. Positive
/// means the queue is shrinking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    /// Items drained since the previous observation (negative when growing).
    pub drained: i64,
    pub elapsed_secs: f64,
    pub inst_rate: f64,
    pub ema_rate: f64,
    pub avg_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorPhase {
    /// Exactly one observation seen, no rate yet.
    Baseline,
    Tracking,
}

/// Projected time until a count reaches zero at the smoothed rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Eta {
    Available(f64),
    Unavailable,
}

impl Eta {
    /// `numerator / ema_rate` when the rate is known and positive.
    ///
    /// A stalled queue decays its EMA towards zero without reaching it, so the
    /// quotient can overflow. Anything that is not finite is unavailable.
    pub fn project(numerator: i64, ema_rate: Option<f64>) -> Self {
        match ema_rate {
            Some(rate) if rate > 0.0 => {
                let secs = numerator as f64 / rate;
                if secs.is_finite() {
                    Eta::Available(secs)
                } else {
                    Eta::Unavailable
                }
            }
            _ => Eta::Unavailable,
        }
    }

    pub fn secs(&self) -> Option<f64> {
        match self {
            Eta::Available(secs) => Some(*secs),
            Eta::Unavailable => None,
        }
    }
}

/// Rate state for a single tracked queue (or the global total).
///
/// Created by the first observation, which becomes the baseline. Every later
/// observation yields a [`RateSample`].
#[derive(Debug, Clone)]
pub struct Estimator {
    start_timestamp: DateTime<Utc>,
    start_pending: i64,
    last_timestamp: DateTime<Utc>,
    last_pending: i64,
    ema_rate: Option<f64>,
    cumulative_drained: i64,
    last_sample: Option<RateSample>,
}

impl Estimator {
    pub fn new(timestamp: DateTime<Utc>, pending: i64) -> Self {
        Self {
            start_timestamp: timestamp,
            start_pending: pending,
            last_timestamp: timestamp,
            last_pending: pending,
            ema_rate: None,
            cumulative_drained: 0,
            last_sample: None,
        }
    }

    pub fn observe(&mut self, timestamp: DateTime<Utc>, pending: i64, alpha: f64) -> RateSample {
        let elapsed_secs = seconds_between(timestamp, self.last_timestamp).max(MIN_ELAPSED_SECS);
        let drained = self.last_pending.saturating_sub(pending);
        let inst_rate = drained as f64 / elapsed_secs;

        let ema_rate = match self.ema_rate {
            Some(previous) => alpha * inst_rate + (1.0 - alpha) * previous,
            None => inst_rate,
        };

        let since_start = seconds_between(timestamp, self.start_timestamp).max(MIN_ELAPSED_SECS);
        let avg_rate = self.start_pending.saturating_sub(pending) as f64 / since_start;

        let sample = RateSample {
            drained,
            elapsed_secs,
            inst_rate,
            ema_rate,
            avg_rate,
        };

        self.last_timestamp = timestamp;
        self.last_pending = pending;
        self.ema_rate = Some(ema_rate);
        self.cumulative_drained = self.cumulative_drained.saturating_add(drained);
        self.last_sample = Some(sample);

        sample
    }

    pub fn phase(&self) -> EstimatorPhase {
        match self.last_sample {
            Some(_) => EstimatorPhase::Tracking,
            None => EstimatorPhase::Baseline,
        }
    }

    pub fn last_sample(&self) -> Option<&RateSample> {
        self.last_sample.as_ref()
    }

    pub fn cumulative_drained(&self) -> i64 {
        self.cumulative_drained
    }
}

fn seconds_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1_000.0
}
