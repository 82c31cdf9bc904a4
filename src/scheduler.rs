//! Recurring trigger for the digest job.
//!
//! One job, one [`Cadence`]. On registration the next run time is computed
//! from the [`Clock`]; the loop in [`Scheduler::run`] then alternates
//! between running whatever is due and waiting on a [`Ticker`]
//! (60 seconds in production). A job is never interrupted, and a failing
//! job is logged and rescheduled like a successful one.
//!
//! Times are local wall-clock times without a zone, so "daily at 09:00"
//! follows the machine's local clock.

use crate::error::Result;
use chrono::{Days, Local, NaiveDateTime, NaiveTime, TimeDelta};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

/// When the job should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Every 60 seconds after the previous scheduled run.
    EveryMinute,
    /// Once a day at the given local time.
    DailyAt(NaiveTime),
}

impl Cadence {
    /// The first run time strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Cadence::EveryMinute => now + TimeDelta::minutes(1),
            Cadence::DailyAt(at) => {
                let today = now.date().and_time(*at);
                if today > now {
                    today
                } else {
                    today
                        .checked_add_days(Days::new(1))
                        .unwrap_or(today)
                }
            }
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::EveryMinute => write!(f, "every minute"),
            Cadence::DailyAt(at) => write!(f, "daily at {}", at.format("%H:%M")),
        }
    }
}

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Paces the polling loop.
pub trait Ticker {
    async fn tick(&mut self);
}

/// Waits a fixed period between polls. The first tick completes one full
/// period after construction.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Something the scheduler can fire.
pub trait Job {
    async fn run(&mut self) -> Result<()>;
}

#[derive(Debug)]
pub struct Scheduler<C, J> {
    clock: C,
    cadence: Cadence,
    job: J,
    next_run: NaiveDateTime,
    runs: u64,
}

impl<C, J> Scheduler<C, J>
where
    C: Clock,
    J: Job,
{
    /// Register `job` and compute its first run time.
    pub fn new(clock: C, cadence: Cadence, job: J) -> Self {
        let next_run = cadence.next_after(clock.now());
        info!(%cadence, %next_run, "Registered job");
        Self {
            clock,
            cadence,
            job,
            next_run,
            runs: 0,
        }
    }

    pub fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    /// How many times the job has fired, failures included.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Run the job if it is due. Returns whether it ran.
    ///
    /// The next run follows the previous *scheduled* time, not the moment
    /// the job finished, so a run that takes a few seconds still lands on
    /// the next poll. If polling fell so far behind that this is already
    /// in the past, the next run is counted from now instead. A job error
    /// is logged and does not stop future runs.
    #[instrument(level = "debug", skip_all)]
    pub async fn run_pending(&mut self) -> bool {
        let now = self.clock.now();
        if now < self.next_run {
            return false;
        }

        self.runs += 1;
        info!(run = self.runs, scheduled_for = %self.next_run, "Running scheduled job");
        if let Err(e) = self.job.run().await {
            error!(run = self.runs, error = %e, "Scheduled job failed; will retry at next trigger");
        }

        let mut next_run = self.cadence.next_after(self.next_run);
        if next_run <= now {
            next_run = self.cadence.next_after(now);
        }
        self.next_run = next_run;
        info!(
            next_run = %self.next_run,
            finished_at = %self.clock.now(),
            "Rescheduled job"
        );
        true
    }

    /// Poll forever: run what is due, then wait for the next tick.
    ///
    /// Only `shutdown` completing ends the loop, and only between ticks;
    /// a running job always finishes first.
    pub async fn run<T, S>(&mut self, ticker: &mut T, shutdown: S)
    where
        T: Ticker,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            self.run_pending().await;
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!(runs = self.runs, "Shutdown requested; leaving scheduler loop");
                    return;
                }
                _ = ticker.tick() => {}
            }
        }
    }
}
