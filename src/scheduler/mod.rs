//! Cancellable periodic task
//!
//! One timer at a time: starting replaces any previous schedule, and once
//! `stop` or `cancel` returns the tick function is never invoked again.
//! A tick already in flight is allowed to finish.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

fn lock(flag: &Mutex<bool>) -> MutexGuard<'_, bool> {
    flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to a running schedule
#[derive(Debug, Clone)]
pub struct ScheduleHandle {
    active: Arc<Mutex<bool>>,
    task: AbortHandle,
}

impl ScheduleHandle {
    /// Stop future ticks; returns after the flag is cleared
    pub fn cancel(&self) {
        *lock(&self.active) = false;
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        *lock(&self.active) && !self.task.is_finished()
    }
}

/// Owner of at most one periodic task
#[derive(Debug, Default)]
pub struct Scheduler {
    current: Option<ScheduleHandle>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `tick` now and then every `interval`
    ///
    /// Any previous schedule is stopped first. Ticks never overlap: a slow
    /// tick delays the next one. Errors and panics inside a tick are logged
    /// and the schedule keeps going.
    pub fn start<F, Fut, E>(&mut self, mut tick: F, interval: Duration) -> ScheduleHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.stop();

        let interval = interval.max(MIN_INTERVAL);
        let active = Arc::new(Mutex::new(true));
        let flag = Arc::clone(&active);

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut count: u64 = 0;

            loop {
                timer.tick().await;

                // The future is created under the lock so stop() cannot
                // slip in between the check and the call.
                let fut = {
                    let guard = lock(&flag);
                    if !*guard {
                        break;
                    }
                    tick()
                };

                count += 1;
                debug!(tick = count, "scheduled tick");
                match tokio::spawn(fut).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(tick = count, error = %e, "tick failed"),
                    Err(e) if e.is_panic() => error!(tick = count, "tick panicked"),
                    Err(_) => break,
                }
            }
        });

        let handle = ScheduleHandle {
            active,
            task: task.abort_handle(),
        };
        self.current = Some(handle.clone());
        handle
    }

    /// Stop the current schedule, if any
    pub fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(ScheduleHandle::is_active)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
