use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use log::trace;

/// A named job that becomes due once per period
#[derive(Clone, Debug)]
pub struct PeriodicJob<K> {
    pub kind: K,
    period: Duration,
    max_delay: Duration,
    delay: Duration,
    next_run: Instant,
}

impl<K> PeriodicJob<K> {
    /// The delay currently applied between runs, including any backoff
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn next_run(&self) -> Instant {
        self.next_run
    }
}

/// Drives a set of named periodic jobs from an externally supplied clock.
///
/// Jobs are identified by their kind; scheduling a kind that is already
/// present replaces it. Dropping every job is a single [`Scheduler::clear`].
pub struct Scheduler<K> {
    jobs: Vec<PeriodicJob<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self { jobs: Vec::new() }
    }
}

impl<K: Copy + Eq + Debug> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a job that is first due at `now`, then every `period`
    pub fn schedule(&mut self, kind: K, period: Duration, now: Instant) {
        self.schedule_with_backoff(kind, period, period, now);
    }

    /// Adds a job whose delay may grow up to `max_delay` through
    /// [`Scheduler::backoff`]
    pub fn schedule_with_backoff(
        &mut self,
        kind: K,
        period: Duration,
        max_delay: Duration,
        now: Instant,
    ) {
        self.cancel(kind);
        self.jobs.push(PeriodicJob {
            kind,
            period,
            max_delay: max_delay.max(period),
            delay: period,
            next_run: now,
        });
    }

    /// Returns every job due at `now`, in scheduling order, and moves each
    /// one's next run a delay into the future
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        let mut due = Vec::new();
        for job in &mut self.jobs {
            if job.next_run <= now {
                job.next_run = now + job.delay;
                due.push(job.kind);
            }
        }
        due
    }

    /// Doubles the delay of `kind`, up to its cap, and pushes its next run
    /// out to match
    pub fn backoff(&mut self, kind: K, now: Instant) {
        if let Some(job) = self.job_mut(kind) {
            job.delay = job.delay.saturating_mul(2).min(job.max_delay);
            job.next_run = now + job.delay;
            trace!("{:?} backing off to {:?}", kind, job.delay);
        }
    }

    /// Restores the base period of `kind` after a successful run
    pub fn reset_backoff(&mut self, kind: K) {
        if let Some(job) = self.job_mut(kind) {
            job.delay = job.period;
        }
    }

    pub fn cancel(&mut self, kind: K) {
        self.jobs.retain(|job| job.kind != kind);
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn is_scheduled(&self, kind: K) -> bool {
        self.jobs.iter().any(|job| job.kind == kind)
    }

    pub fn job(&self, kind: K) -> Option<&PeriodicJob<K>> {
        self.jobs.iter().find(|job| job.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn job_mut(&mut self, kind: K) -> Option<&mut PeriodicJob<K>> {
        self.jobs.iter_mut().find(|job| job.kind == kind)
    }
}
