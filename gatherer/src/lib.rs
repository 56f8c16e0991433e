//! # Queue ETA Gatherer
//!
//! The I/O side of queue ETA estimation.
//!
//! ## Architecture
//!
//! - **`source`**: the `JobSource` trait and `HttpJobSource`, which reads the
//!   Immich `/jobs` endpoint
//! - **`poller`**: the sampling loop feeding each document into the
//!   estimator and handing the resulting `TickReport` on
//! - **`report`**: terminal rendering of a `TickReport`
//! - **`export`**: JSON-lines export of every sample
//!
//! Fetch failures (`FetchError`) end a run; nothing from a failed or
//! interrupted fetch reaches the estimator.

#[macro_use]
extern crate tracing;

pub mod error;
pub mod export;
pub mod poller;
pub mod report;
pub mod source;

pub use error::FetchError;
pub use export::JsonLinesExporter;
pub use poller::{
    Poller,
    PollerConfig,
    RunSummary,
};
pub use report::{
    render,
    ReportOptions,
};
pub use source::{
    HttpJobSource,
    JobSource,
};
