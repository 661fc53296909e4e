use std::{future::Future, ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A scheduled callback running on its own task. Dropping or cancelling the
/// handle aborts the task, so a handle stored in session state is torn down
/// together with that state.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Calls `on_tick` every `period`, first call one period from now, until
    /// it returns `ControlFlow::Break`. Periods below one millisecond are
    /// raised to one.
    pub fn every<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let task = tokio::spawn(async move {
            loop {
                ticker.tick().await;
                if on_tick().await.is_break() {
                    break;
                }
            }
        });

        Self { task }
    }

    /// Runs `callback` once after `delay`.
    pub fn after<Fut>(delay: Duration, callback: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            callback.await;
        });

        Self { task }
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
