//! The dashboard controller: one owner for the view model and the
//! components that feed it.
//!
//! All view-model mutation happens on the caller's task, through
//! [`Dashboard::next_event`], [`Dashboard::reset`] and the selection
//! methods. Network work runs in spawned tasks whose results come back
//! through `next_event`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::fleet::TimeRange;
use crate::poller::{FleetStatusPoller, PollOutcome, PublishedSnapshot};
use crate::query::StatisticsQueryService;
use crate::reset::ResetController;
use crate::services::fleet_api::FleetApi;
use crate::stats::VehicleStatistics;
use crate::view::{DashboardViewModel, QueryTicket, StatisticsUpdate};

/// Something the view should re-render for.
#[derive(Debug)]
pub enum DashboardEvent {
    FleetUpdated { seq: u64, vehicles: usize },
    StatisticsUpdated,
    StatisticsFailed(DashboardError),
    StatisticsSuperseded,
}

type QueryCompletion = (QueryTicket, Result<VehicleStatistics>);

pub struct Dashboard {
    view: DashboardViewModel,
    poller: FleetStatusPoller,
    snapshots: watch::Receiver<PublishedSnapshot>,
    queries: StatisticsQueryService,
    resetter: ResetController,
    inflight: JoinSet<QueryCompletion>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn FleetApi>) -> Self {
        let poller = FleetStatusPoller::new(api.clone());
        let snapshots = poller.subscribe();
        let resetter = ResetController::new(api.clone(), poller.refresher());

        Self {
            view: DashboardViewModel::new(),
            poller,
            snapshots,
            queries: StatisticsQueryService::new(api),
            resetter,
            inflight: JoinSet::new(),
        }
    }

    pub fn view(&self) -> &DashboardViewModel {
        &self.view
    }

    pub fn start(&mut self, interval: Duration) -> Result<()> {
        self.poller.start(interval)
    }

    pub fn stop(&mut self) {
        self.poller.stop();
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn select_vehicle(&mut self, vehicle_id: u32) {
        self.view.select_vehicle(vehicle_id);
    }

    pub fn set_time_range(&mut self, time_range: TimeRange) {
        self.view.set_time_range(time_range);
    }

    pub fn select_time_range(&mut self, raw: &str) -> Result<()> {
        self.view.select_time_range(raw)
    }

    /// Issues a statistics query for the current selection. The result
    /// arrives through [`Dashboard::next_event`].
    pub fn request_statistics(&mut self) -> QueryTicket {
        let ticket = self.view.begin_query();
        let selection = ticket.selection();
        let queries = self.queries.clone();
        debug!(
            vehicle_id = selection.vehicle_id,
            time_range = %selection.time_range,
            generation = ticket.generation(),
            "Statistics query issued"
        );
        self.inflight.spawn(async move {
            let result = queries
                .query_range(selection.vehicle_id, selection.time_range)
                .await;
            (ticket, result)
        });
        ticket
    }

    /// Number of statistics queries not yet folded into the view.
    pub fn pending_queries(&self) -> usize {
        self.inflight.len()
    }

    /// Waits for the next snapshot or query completion and applies it.
    ///
    /// Returns `None` only once the snapshot channel is closed, which cannot
    /// happen while the dashboard owns its poller.
    pub async fn next_event(&mut self) -> Option<DashboardEvent> {
        loop {
            tokio::select! {
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                    let published = self.snapshots.borrow_and_update().clone();
                    if self.view.apply_snapshot(&published) {
                        return Some(DashboardEvent::FleetUpdated {
                            seq: published.seq,
                            vehicles: published.fleet.len(),
                        });
                    }
                }
                Some(joined) = self.inflight.join_next(), if !self.inflight.is_empty() => {
                    let (ticket, result) = match joined {
                        Ok(completion) => completion,
                        Err(e) => {
                            warn!(error = %e, "Statistics task ended without a result");
                            continue;
                        }
                    };
                    return Some(match self.view.complete_query(ticket, result) {
                        Ok(StatisticsUpdate::Applied) => DashboardEvent::StatisticsUpdated,
                        Ok(StatisticsUpdate::Superseded) => DashboardEvent::StatisticsSuperseded,
                        Err(e) => DashboardEvent::StatisticsFailed(e),
                    });
                }
            }
        }
    }

    /// Fetches the fleet status once, now, and applies it if it is newest.
    pub async fn refresh(&mut self) -> PollOutcome {
        let outcome = self.poller.refresh().await;
        self.view.apply_snapshot(&self.poller.latest());
        outcome
    }

    /// Resets the backend; see [`ResetController::reset`].
    pub async fn reset(&mut self) -> Result<PollOutcome> {
        self.resetter.reset(&mut self.view).await
    }

    /// Stops polling and aborts statistics queries in flight.
    pub fn shutdown(&mut self) {
        self.poller.stop();
        self.inflight.abort_all();
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.shutdown();
    }
}
