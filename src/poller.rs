//! Periodic fleet status polling.
//!
//! Every request takes a sequence number when it is issued. A completion is
//! published only if its number is newer than the one already published,
//! so a slow response can never replace a fresher snapshot.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::{DashboardError, Result};
use crate::fleet::FleetSnapshot;
use crate::services::fleet_api::FleetApi;

/// The latest applied snapshot together with the request that produced it.
#[derive(Debug, Clone, Default)]
pub struct PublishedSnapshot {
    /// Sequence number of the request; `0` means nothing applied yet.
    pub seq: u64,
    pub fleet: Arc<FleetSnapshot>,
    pub received_at: Option<DateTime<Utc>>,
}

/// What became of a single status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied { seq: u64 },
    /// A newer request had already been applied.
    Stale { seq: u64, latest: u64 },
    /// Fetch or validation failed; the previous snapshot was kept.
    Failed { seq: u64 },
}

struct PollerShared {
    api: Arc<dyn FleetApi>,
    next_seq: AtomicU64,
    tx: watch::Sender<PublishedSnapshot>,
}

impl PollerShared {
    async fn poll_once(&self) -> PollOutcome {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        let fetched = self.api.fetch_status().await.and_then(|fleet| {
            fleet.validate()?;
            Ok(fleet)
        });
        let fleet = match fetched {
            Ok(fleet) => fleet,
            Err(e) if e.is_transient() => {
                warn!(seq, error = %e, "Fleet status poll failed, keeping previous snapshot");
                return PollOutcome::Failed { seq };
            }
            Err(e) => {
                // not going to fix itself on the next tick
                error!(seq, error = %e, "Fleet status rejected, keeping previous snapshot");
                return PollOutcome::Failed { seq };
            }
        };

        let vehicles = fleet.len();
        let mut latest = 0;
        let applied = self.tx.send_if_modified(|current| {
            if seq <= current.seq {
                latest = current.seq;
                return false;
            }
            *current = PublishedSnapshot {
                seq,
                fleet: Arc::new(fleet),
                received_at: Some(Utc::now()),
            };
            true
        });

        if applied {
            debug!(seq, vehicles, "Fleet snapshot applied");
            PollOutcome::Applied { seq }
        } else {
            debug!(seq, latest, "Dropping late fleet status response");
            PollOutcome::Stale { seq, latest }
        }
    }
}

/// Cloneable handle for out-of-cadence fetches, independent of the timer.
#[derive(Clone)]
pub struct FleetRefresher {
    shared: Arc<PollerShared>,
}

impl FleetRefresher {
    /// Issues one status request now and waits for its outcome.
    pub async fn refresh(&self) -> PollOutcome {
        self.shared.poll_once().await
    }

    pub fn latest(&self) -> PublishedSnapshot {
        self.shared.tx.borrow().clone()
    }
}

/// Fetches the fleet status every `interval` and publishes the latest
/// snapshot on a watch channel.
///
/// Requests are not serialized: a slow response does not hold back the next
/// tick. Must be started from within a tokio runtime.
pub struct FleetStatusPoller {
    shared: Arc<PollerShared>,
    timer: Option<JoinHandle<()>>,
}

impl FleetStatusPoller {
    pub fn new(api: Arc<dyn FleetApi>) -> Self {
        let (tx, _) = watch::channel(PublishedSnapshot::default());
        Self {
            shared: Arc::new(PollerShared {
                api,
                next_seq: AtomicU64::new(1),
                tx,
            }),
            timer: None,
        }
    }

    /// Starts the timer. A no-op while already running.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidArgument`] for a zero interval.
    pub fn start(&mut self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(DashboardError::InvalidArgument(
                "poll interval must be greater than zero".into(),
            ));
        }
        if self.is_running() {
            debug!("Fleet poller already running");
            return Ok(());
        }

        info!(interval_ms = interval.as_millis() as u64, "Starting fleet poller");
        self.timer = Some(tokio::spawn(run_timer(self.shared.clone(), interval)));
        Ok(())
    }

    /// Stops the timer and aborts requests still in flight. A no-op when not
    /// running.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            info!("Fleet poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn subscribe(&self) -> watch::Receiver<PublishedSnapshot> {
        self.shared.tx.subscribe()
    }

    pub fn latest(&self) -> PublishedSnapshot {
        self.shared.tx.borrow().clone()
    }

    pub fn refresher(&self) -> FleetRefresher {
        FleetRefresher {
            shared: self.shared.clone(),
        }
    }

    /// Issues one out-of-cadence request and waits for its outcome.
    pub async fn refresh(&self) -> PollOutcome {
        self.shared.poll_once().await
    }
}

impl Drop for FleetStatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Owns the in-flight requests; aborting this task drops the `JoinSet`,
/// which aborts them too.
async fn run_timer(shared: Arc<PollerShared>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut inflight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let shared = shared.clone();
                inflight.spawn(async move { shared.poll_once().await });
            }
            Some(_) = inflight.join_next(), if !inflight.is_empty() => {}
        }
    }
}
