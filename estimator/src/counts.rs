use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use strum::{
    EnumIter,
    IntoEnumIterator,
    IntoStaticStr,
};

/// A job-count record needs at least this many recognised fields. A single
/// match is too often incidental (e.g. a lone `active: true` flag).
const MIN_MATCHING_FIELDS: usize = 2;

/// The BullMQ-style counters a queue status object may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CountField {
    Waiting,
    Active,
    Delayed,
    Paused,
    Failed,
    Completed,
}

impl CountField {
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Whether this counter is part of the work that still has to drain.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            CountField::Waiting | CountField::Active | CountField::Delayed | CountField::Paused
        )
    }
}

/// Decides whether a JSON object looks like a set of queue counters.
///
/// Every recognised key present on the object must hold a number, and at
/// least two of them must be present.
pub fn is_counts_object(object: &Map<String, Value>) -> bool {
    let mut hits = 0;
    for field in CountField::iter() {
        match object.get(field.key()) {
            Some(value) if value.is_number() => hits += 1,
            Some(_) => return false,
            None => {}
        }
    }
    hits >= MIN_MATCHING_FIELDS
}

/// Same as [`is_counts_object`] but accepts any JSON value. Non-objects are
/// never counts.
pub fn is_counts_value(value: &Value) -> bool {
    value.as_object().is_some_and(is_counts_object)
}

/// Integer view of the six counters of a counts object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountsRecord {
    pub waiting: i64,
    pub active: i64,
    pub delayed: i64,
    pub paused: i64,
    pub failed: i64,
    pub completed: i64,
}

impl CountsRecord {
    /// Coerces the counters of `object`. Missing and non-numeric values read
    /// as zero, fractional values are truncated.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let count = |field: CountField| coerce_count(object.get(field.key()));
        Self {
            waiting: count(CountField::Waiting),
            active: count(CountField::Active),
            delayed: count(CountField::Delayed),
            paused: count(CountField::Paused),
            failed: count(CountField::Failed),
            completed: count(CountField::Completed),
        }
    }

    pub fn get(&self, field: CountField) -> i64 {
        match field {
            CountField::Waiting => self.waiting,
            CountField::Active => self.active,
            CountField::Delayed => self.delayed,
            CountField::Paused => self.paused,
            CountField::Failed => self.failed,
            CountField::Completed => self.completed,
        }
    }

    /// waiting + active + delayed + paused
    pub fn pending(&self) -> i64 {
        CountField::iter()
            .filter(|field| field.is_pending())
            .fold(0i64, |sum, field| sum.saturating_add(self.get(field)))
    }
}

fn coerce_count(value: Option<&Value>) -> i64 {
    let Some(Value::Number(number)) = value else {
        return 0;
    };
    number
        .as_i64()
        .or_else(|| number.as_u64().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
        // `as` saturates and maps NaN to zero
        .or_else(|| number.as_f64().map(|n| n as i64))
        .unwrap_or(0)
}
