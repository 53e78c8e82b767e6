//! Periodic health polling.
//!
//! # Responsibilities
//! - Hold at most one poll session per scheduler
//! - Fan out one probe per connection on every tick
//! - Start, restart and stop the session on demand
//! - Swap the target set of a registry-following session in place
//!
//! # Design Decisions
//! - Ticks follow the wall clock; a slow fan-out never delays the next tick
//! - Probes are detached tasks, so stopping does not cancel them
//! - The first tick fires one period after start
//! - Retargeting never touches the ticker, so the tick phase survives it

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::health::dispatch::ProbeDispatcher;
use crate::observability::metrics;
use crate::registry::Connection;

/// Polling period used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Where a session's target set comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    /// The set captured at start. Never replaced.
    Fixed,
    /// The registry's set. Replaced through [`PollScheduler::retarget`].
    Registry,
}

struct PollSession {
    handle: JoinHandle<()>,
    period: Duration,
    target: PollTarget,
    connections: Arc<ArcSwap<Vec<Connection>>>,
}

/// Drives periodic fan-out probing of a connection set.
pub struct PollScheduler {
    dispatcher: ProbeDispatcher,
    session: Mutex<Option<PollSession>>,
}

impl PollScheduler {
    pub fn new(dispatcher: ProbeDispatcher) -> Self {
        Self {
            dispatcher,
            session: Mutex::new(None),
        }
    }

    /// Begin polling a fixed `connections` set every `period`, replacing any
    /// running session. Must be called from within a Tokio runtime.
    pub fn start(&self, connections: Vec<Connection>, period: Duration) {
        self.start_session(connections, period, PollTarget::Fixed);
    }

    /// Like [`start`](Self::start), but the set may later be replaced with
    /// [`retarget`](Self::retarget).
    pub fn follow(&self, connections: Vec<Connection>, period: Duration) {
        self.start_session(connections, period, PollTarget::Registry);
    }

    fn start_session(&self, connections: Vec<Connection>, period: Duration, target: PollTarget) {
        let period = if period.is_zero() {
            tracing::warn!(default = ?DEFAULT_POLL_INTERVAL, "Zero poll interval requested, using default");
            DEFAULT_POLL_INTERVAL
        } else {
            period
        };

        let mut session = self.session.lock().expect("poll session mutex poisoned");
        if let Some(previous) = session.take() {
            previous.handle.abort();
            tracing::debug!("Replaced running poll session");
        }

        let count = connections.len();
        let connections = Arc::new(ArcSwap::from_pointee(connections));
        let handle = tokio::spawn(poll_loop(self.dispatcher.clone(), connections.clone(), period));

        tracing::info!(
            interval_ms = period.as_millis() as u64,
            connections = count,
            target = ?target,
            "Health polling started"
        );

        *session = Some(PollSession {
            handle,
            period,
            target,
            connections,
        });
    }

    /// Replace the set of a registry-following session. The ticker keeps
    /// running; the next tick probes the new set. Returns whether a
    /// session took the new set.
    pub fn retarget(&self, connections: Vec<Connection>) -> bool {
        let session = self.session.lock().expect("poll session mutex poisoned");
        match session.as_ref() {
            Some(s) if s.target == PollTarget::Registry => {
                tracing::debug!(connections = connections.len(), "Poll targets replaced");
                s.connections.store(Arc::new(connections));
                true
            }
            _ => false,
        }
    }

    /// Cancel future ticks. Probes already in flight still complete.
    /// Returns whether a session was running.
    pub fn stop(&self) -> bool {
        let previous = self.session.lock().expect("poll session mutex poisoned").take();
        match previous {
            Some(session) => {
                session.handle.abort();
                tracing::info!("Health polling stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session
            .lock()
            .expect("poll session mutex poisoned")
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    /// Period of the running session.
    pub fn period(&self) -> Option<Duration> {
        self.session
            .lock()
            .expect("poll session mutex poisoned")
            .as_ref()
            .map(|s| s.period)
    }

    pub fn target(&self) -> Option<PollTarget> {
        self.session
            .lock()
            .expect("poll session mutex poisoned")
            .as_ref()
            .map(|s| s.target)
    }

    /// Connection set the next tick will probe.
    pub fn monitored(&self) -> Option<Arc<Vec<Connection>>> {
        self.session
            .lock()
            .expect("poll session mutex poisoned")
            .as_ref()
            .map(|s| s.connections.load_full())
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.lock() {
            if let Some(session) = session.take() {
                session.handle.abort();
            }
        }
    }
}

async fn poll_loop(dispatcher: ProbeDispatcher, targets: Arc<ArcSwap<Vec<Connection>>>, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let connections = targets.load_full();
        tracing::debug!(connections = connections.len(), "Poll tick");
        metrics::record_poll_tick(connections.len());

        for connection in connections.iter() {
            let dispatcher = dispatcher.clone();
            let connection = connection.clone();
            tokio::spawn(async move {
                dispatcher.check(&connection).await;
            });
        }
    }
}
