//! The once-per-second tick source for the redemption countdown.
//!
//! A tick task is a spawned tokio task that posts one message per period into
//! the event loop's input channel. It only holds a weak sender, so it ends on
//! its own once the loop is gone. At most one task is alive per [`Ticker`]:
//! restarting aborts the previous task before the next one is spawned.

use std::time::Duration;

use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::session::SessionId;

/// Default tick period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to one running tick task. Dropping it aborts the task.
#[derive(Debug)]
pub struct TickTask {
    session: SessionId,
    handle: JoinHandle<()>,
}

impl TickTask {
    /// Spawn a task that sends `make(session)` every `period`, first one
    /// `period` from now.
    pub fn spawn<M>(
        session: SessionId,
        period: Duration,
        tx: WeakUnboundedSender<M>,
        make: fn(SessionId) -> M,
    ) -> Self
    where
        M: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(tx) = tx.upgrade() else {
                    tracing::debug!(%session, "tick receiver gone, stopping");
                    break;
                };
                if tx.send(make(session)).is_err() {
                    break;
                }
            }
        });
        Self { session, handle }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Owner of the single outstanding tick task.
#[derive(Debug)]
pub struct Ticker<M> {
    period: Duration,
    tx: WeakUnboundedSender<M>,
    make: fn(SessionId) -> M,
    current: Option<TickTask>,
}

impl<M: Send + 'static> Ticker<M> {
    pub fn new(period: Duration, tx: WeakUnboundedSender<M>, make: fn(SessionId) -> M) -> Self {
        Self {
            period,
            tx,
            make,
            current: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Session the live task ticks for, if any.
    pub fn session(&self) -> Option<SessionId> {
        self.current.as_ref().map(TickTask::session)
    }

    /// Abort whatever is ticking, then start ticking for `session`.
    pub fn restart(&mut self, session: SessionId) {
        if let Some(previous) = self.current.take() {
            tracing::debug!(previous = %previous.session(), next = %session, "replacing tick task");
            drop(previous);
        }
        self.current = Some(TickTask::spawn(session, self.period, self.tx.clone(), self.make));
    }

    /// Stop ticking. Returns whether a task was running.
    pub fn cancel(&mut self) -> bool {
        self.current.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[derive(Debug, PartialEq)]
    struct Tick(SessionId);

    fn id(n: u64) -> SessionId {
        serde_json::from_str(&n.to_string()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(Duration::from_secs(1), tx.downgrade(), Tick);
        let started = Instant::now();
        ticker.restart(id(1));

        assert_eq!(rx.recv().await, Some(Tick(id(1))));
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(rx.recv().await, Some(Tick(id(1))));
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_leaves_a_single_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(Duration::from_secs(1), tx.downgrade(), Tick);
        ticker.restart(id(1));
        ticker.restart(id(2));
        assert_eq!(ticker.session(), Some(id(2)));

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(Tick(id(2))));
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(Duration::from_secs(1), tx.downgrade(), Tick);
        ticker.restart(id(1));
        assert!(ticker.cancel());
        assert!(!ticker.cancel());

        let waited = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn task_ends_when_receiver_side_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel::<Tick>();
        let task = TickTask::spawn(id(1), Duration::from_secs(1), tx.downgrade(), Tick);
        drop(tx);
        drop(rx);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(task.is_finished());
    }
}
