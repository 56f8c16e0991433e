//! # Queue ETA Estimator
//!
//! Turns point-in-time job-queue status documents into drain rates and
//! time-to-completion estimates.
//!
//! ## Pipeline
//!
//! One polled JSON document flows through:
//!
//! - **`extract`**: finds every object that looks like a set of queue
//!   counters (see `counts`), wherever it sits in the document
//! - **`normalize`**: maps JSON paths such as `root.thumbnailGeneration.jobCounts`
//!   to queue names
//! - **`aggregate`**: per-queue pending counts (deduplicated by maximum) and
//!   global totals
//! - **`engine`**: stateful instantaneous, smoothed and average rates plus
//!   ETAs, per queue and in total
//!
//! `RateEtaEngine::process_document` chains all of them for one tick.
//! Nothing here performs I/O or fails on malformed documents.

#[macro_use]
extern crate tracing;

pub mod aggregate;
pub mod counts;
pub mod engine;
pub mod extract;
pub mod normalize;
pub mod rate;
mod tick;

pub use aggregate::{
    aggregate,
    GlobalSnapshot,
    QueueSnapshot,
    TickSnapshot,
};
pub use counts::{
    is_counts_object,
    is_counts_value,
    CountField,
    CountsRecord,
};
pub use engine::{
    critical_path,
    CriticalPath,
    EngineConfig,
    EngineConfigError,
    EtaNumerator,
    GlobalEstimate,
    QueueEstimate,
    RateEtaEngine,
    TickEstimate,
    DEFAULT_ALPHA,
};
pub use extract::{
    extract_queues,
    RawQueueObservation,
    ROOT_LABEL,
};
pub use normalize::normalize_queue_name;
pub use rate::{
    EstimatorPhase,
    Eta,
    RateSample,
    MIN_ELAPSED_SECS,
};
pub use tick::TickReport;
