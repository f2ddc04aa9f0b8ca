use std::sync::Arc;
use tracing::{error, info};

use crate::error::{DashboardError, Result};
use crate::poller::{FleetRefresher, PollOutcome};
use crate::services::fleet_api::FleetApi;
use crate::view::DashboardViewModel;

/// Resets the backend store and brings the dashboard in line with it.
pub struct ResetController {
    api: Arc<dyn FleetApi>,
    refresher: FleetRefresher,
}

impl ResetController {
    pub fn new(api: Arc<dyn FleetApi>, refresher: FleetRefresher) -> Self {
        Self { api, refresher }
    }

    /// Sends the reset, then clears the displayed statistics and fetches the
    /// fleet status once, out of cadence.
    ///
    /// Returns the outcome of that status fetch. A failed fetch is left to the
    /// poller's failure policy: the reset itself has already happened.
    ///
    /// # Errors
    ///
    /// [`DashboardError::BackendResetFailure`] if the backend call fails, in
    /// which case `view` is untouched and no status fetch is issued.
    #[tracing::instrument(skip_all)]
    pub async fn reset(&self, view: &mut DashboardViewModel) -> Result<PollOutcome> {
        if let Err(e) = self.api.reset_store().await {
            error!(error = %e, "Backend reset failed, dashboard state left as it was");
            return Err(DashboardError::BackendResetFailure(e));
        }

        view.clear_statistics();
        let outcome = self.refresher.refresh().await;
        view.apply_snapshot(&self.refresher.latest());

        info!(?outcome, vehicles = view.fleet().len(), "Backend reset applied");
        Ok(outcome)
    }
}
