//! Daily two-timer scheduler.
//!
//! Long-running deployments arm one timer for the morning clock-in and one
//! for the evening clock-out. Each timer loop recomputes its next local fire
//! time after every firing, so drift and restarts take care of themselves. A
//! single-permit slot keeps the two timers from ever running actions
//! concurrently: a firing that lands while the other action is still going
//! is skipped outright, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::attendance::ActionOutcome;
use crate::config::Mode;
use crate::result::FicharResult;

/// Pause after a firing before re-arming the next day's timer
const RESCHEDULE_GUARD: Duration = Duration::from_secs(2);

/// Floor on any computed arming delay
const MIN_ARM_DELAY: Duration = Duration::from_secs(1);

/// Times of day the two timers aim for
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    /// Local time of the morning clock-in firing
    pub clock_in: NaiveTime,
    /// Local time of the evening clock-out firing
    pub clock_out: NaiveTime,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            clock_in: NaiveTime::from_hms_opt(9, 0, 0).expect("9:00 is a valid time"),
            clock_out: NaiveTime::from_hms_opt(19, 0, 0).expect("19:00 is a valid time"),
        }
    }
}

impl Schedule {
    fn target_for(&self, mode: Mode) -> NaiveTime {
        match mode {
            Mode::ClockIn => self.clock_in,
            Mode::ClockOut => self.clock_out,
        }
    }
}

/// Delay from `now` until the next wall-clock occurrence of `target`.
///
/// Already at or past `target` today means tomorrow. Clamped to a small floor
/// so a firing computed right on the boundary cannot re-arm at zero.
#[must_use]
pub fn delay_until(now: NaiveDateTime, target: NaiveTime) -> Duration {
    let mut fire = now.date().and_time(target);
    if fire <= now {
        fire += chrono::Duration::days(1);
    }
    (fire - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
        .max(MIN_ARM_DELAY)
}

/// Owns the two daily timers and the mutual-exclusion slot between them
#[derive(Debug)]
pub struct DailyScheduler {
    schedule: Schedule,
    running: Arc<AtomicBool>,
    slot: Arc<Semaphore>,
    shutdown: Arc<Notify>,
    handles: Vec<JoinHandle<()>>,
}

impl DailyScheduler {
    #[must_use]
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            running: Arc::new(AtomicBool::new(false)),
            slot: Arc::new(Semaphore::new(1)),
            shutdown: Arc::new(Notify::new()),
            handles: Vec::new(),
        }
    }

    /// Arm both daily timers. `run_action` is invoked with the mode whose
    /// timer fired; firings that overlap a still-running action are skipped.
    pub fn start<F, Fut>(&mut self, run_action: F)
    where
        F: Fn(Mode) -> Fut + Clone + Send + Sync + 'static,
        Fut: std::future::Future<Output = FicharResult<Option<ActionOutcome>>> + Send + 'static,
    {
        info!(
            clock_in = %self.schedule.clock_in,
            clock_out = %self.schedule.clock_out,
            "scheduler started"
        );
        self.running.store(true, Ordering::SeqCst);
        for mode in [Mode::ClockIn, Mode::ClockOut] {
            let handle = tokio::spawn(Self::timer_loop(
                mode,
                self.schedule,
                Arc::clone(&self.running),
                Arc::clone(&self.slot),
                Arc::clone(&self.shutdown),
                run_action.clone(),
            ));
            self.handles.push(handle);
        }
    }

    async fn timer_loop<F, Fut>(
        mode: Mode,
        schedule: Schedule,
        running: Arc<AtomicBool>,
        slot: Arc<Semaphore>,
        shutdown: Arc<Notify>,
        run_action: F,
    ) where
        F: Fn(Mode) -> Fut,
        Fut: std::future::Future<Output = FicharResult<Option<ActionOutcome>>>,
    {
        let target = schedule.target_for(mode);
        while running.load(Ordering::SeqCst) {
            let delay = delay_until(chrono::Local::now().naive_local(), target);
            info!(?mode, delay_s = delay.as_secs(), "timer armed");
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = shutdown.notified() => break,
            }
            if !running.load(Ordering::SeqCst) {
                break;
            }
            info!(?mode, "timer fired");
            Self::run_guarded(mode, &slot, &run_action).await;
            tokio::time::sleep(RESCHEDULE_GUARD).await;
        }
        info!(?mode, "timer loop stopped");
    }

    /// Run the action if the slot is free. Reports whether it actually ran.
    async fn run_guarded<F, Fut>(mode: Mode, slot: &Semaphore, run_action: &F) -> bool
    where
        F: Fn(Mode) -> Fut,
        Fut: std::future::Future<Output = FicharResult<Option<ActionOutcome>>>,
    {
        let Ok(_permit) = slot.try_acquire() else {
            warn!(?mode, "another action is still running, skipping this firing");
            return false;
        };
        match run_action(mode).await {
            Ok(outcome) => info!(?mode, ?outcome, "scheduled action finished"),
            Err(err) => error!(?mode, %err, "scheduled action failed"),
        }
        true
    }

    /// Stop future firings; an in-flight action finishes on its own
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Stop, wake both timers so their tasks exit, and wait for any in-flight
    /// action to finish
    pub async fn shutdown(&mut self) {
        self.stop();
        self.shutdown.notify_waiters();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
        info!("scheduler shut down");
    }
}
