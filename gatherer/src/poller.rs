use crate::{
    error::FetchError,
    source::JobSource,
};
use chrono::Utc;
use queue_eta_estimator::{
    RateEtaEngine,
    TickReport,
};
use std::{
    future::Future,
    time::Duration,
};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    /// 0 polls until interrupted.
    pub samples: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub interrupted: bool,
}

/// Drives the fetch, estimate, report cycle one tick at a time.
///
/// A tick is committed to the engine only once its document has been fetched
/// in full. Cancelling during a fetch drops that document.
pub struct Poller<S> {
    source: S,
    engine: RateEtaEngine,
    config: PollerConfig,
}

impl<S: JobSource> Poller<S> {
    pub fn new(source: S, engine: RateEtaEngine, config: PollerConfig) -> Self {
        Self { source, engine, config }
    }

    pub fn engine(&self) -> &RateEtaEngine {
        &self.engine
    }

    /// Polls until the configured number of samples is taken or Ctrl-C is
    /// pressed.
    pub async fn run<F>(&mut self, on_tick: F) -> Result<RunSummary, FetchError>
    where
        F: FnMut(&TickReport),
    {
        self.run_until(on_tick, shutdown_signal()).await
    }

    /// Like [`Poller::run`] but stops early when `cancel` completes.
    pub async fn run_until<F, C>(&mut self, mut on_tick: F, cancel: C) -> Result<RunSummary, FetchError>
    where
        F: FnMut(&TickReport),
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        let mut ticks = 0u64;

        loop {
            let tick_start = Instant::now();

            let document = tokio::select! {
                _ = &mut cancel => {
                    info!(ticks, "interrupted while fetching, discarding tick");
                    return Ok(RunSummary { ticks, interrupted: true });
                }
                fetched = self.source.fetch() => match fetched {
                    Ok(document) => document,
                    Err(err) => {
                        error!(%err, source = %self.source.describe(), "fetching jobs document failed");
                        return Err(err);
                    }
                },
            };

            let report = self.engine.process_document(Utc::now(), &document);
            ticks += 1;

            if report.snapshot.is_empty() {
                warn!(tick = ticks, "no queue counts found in jobs document");
            }
            info!(
                tick = ticks,
                pending = report.snapshot.totals.pending,
                queues = report.snapshot.queues.len(),
                "processed sample"
            );
            on_tick(&report);

            if self.config.samples != 0 && ticks >= self.config.samples {
                return Ok(RunSummary {
                    ticks,
                    interrupted: false,
                });
            }

            let remaining = self.config.interval.saturating_sub(tick_start.elapsed());
            debug!(remaining_ms = remaining.as_millis() as u64, "sleeping until next sample");
            tokio::select! {
                _ = &mut cancel => {
                    info!(ticks, "interrupted between samples");
                    return Ok(RunSummary { ticks, interrupted: true });
                }
                _ = tokio::time::sleep(remaining) => {}
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "unable to listen for Ctrl-C, polling cannot be interrupted cleanly");
        std::future::pending::<()>().await;
    }
}
