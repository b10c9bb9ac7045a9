//! Periodic rate refresh
//!
//! One independent trigger per rate source. Each trigger fires once
//! immediately, then on its interval; a failed fetch is logged and the
//! cached value is kept. There is no retry or backoff: the next tick is
//! the retry.

mod task;

pub use task::run_once;

use crate::cache::PriceCache;
use crate::source::RateSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Smallest period a trigger runs at
const MIN_INTERVAL: Duration = Duration::from_millis(1);

struct Job {
    source: Arc<dyn RateSource>,
    interval: Duration,
}

/// Builder for the set of refresh triggers
pub struct Scheduler {
    cache: Arc<PriceCache>,
    jobs: Vec<Job>,
}

impl Scheduler {
    pub fn new(cache: Arc<PriceCache>) -> Self {
        Self {
            cache,
            jobs: Vec::new(),
        }
    }

    /// Refresh `source` every `interval`
    pub fn with_job(mut self, source: Arc<dyn RateSource>, interval: Duration) -> Self {
        self.jobs.push(Job { source, interval });
        self
    }

    /// Spawn one task per job
    pub fn start(self) -> SchedulerHandle {
        let Scheduler { cache, jobs } = self;

        let handles = jobs
            .into_iter()
            .map(|job| tokio::spawn(run_job(job, cache.clone())))
            .collect();

        SchedulerHandle { handles }
    }
}

/// Running triggers; dropping the handle leaves them running
pub struct SchedulerHandle {
    handles: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stop all triggers
    pub fn shutdown(self) {
        for handle in &self.handles {
            handle.abort();
        }
        tracing::info!(tasks = self.handles.len(), "Scheduler stopped");
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

async fn run_job(job: Job, cache: Arc<PriceCache>) {
    let kind = job.source.kind();
    let period = job.interval.max(MIN_INTERVAL);

    // The first tick completes immediately
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        source = %kind,
        interval_secs = period.as_secs(),
        "Starting rate refresh task"
    );

    loop {
        ticker.tick().await;
        tracing::debug!(source = %kind, "Rate refresh tick");

        if let Err(err) = run_once(job.source.as_ref(), &cache).await {
            tracing::error!(
                source = %kind,
                error = %err,
                "Rate fetch failed, keeping cached value"
            );
        }
    }
}
