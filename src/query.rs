use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{DashboardError, FetchError, Result};
use crate::fleet::TimeRange;
use crate::services::fleet_api::FleetApi;
use crate::stats::VehicleStatistics;

/// Runs on-demand statistics requests for a single vehicle.
///
/// The service holds no state of its own: a failed query never touches what
/// the caller is currently displaying.
#[derive(Clone)]
pub struct StatisticsQueryService {
    api: Arc<dyn FleetApi>,
}

impl StatisticsQueryService {
    pub fn new(api: Arc<dyn FleetApi>) -> Self {
        Self { api }
    }

    /// Validates the raw `time_range` and queries the backend.
    ///
    /// # Errors
    ///
    /// - [`DashboardError::InvalidArgument`] if `time_range` is not one of
    ///   `10m`, `1h`, `1d`, `1w`; no request is sent.
    /// - [`DashboardError::QueryFailed`] on network, status or parse failure.
    pub async fn query(&self, vehicle_id: u32, time_range: &str) -> Result<VehicleStatistics> {
        let time_range = time_range.parse::<TimeRange>().inspect_err(|e| {
            debug!(vehicle_id, error = %e, "Rejecting statistics query");
        })?;
        self.query_range(vehicle_id, time_range).await
    }

    #[tracing::instrument(skip(self), fields(time_range = %time_range))]
    pub async fn query_range(
        &self,
        vehicle_id: u32,
        time_range: TimeRange,
    ) -> Result<VehicleStatistics> {
        let fetched = self
            .api
            .fetch_statistics(vehicle_id, time_range)
            .await
            .and_then(|stats| {
                if stats.vehicle_id != vehicle_id {
                    return Err(FetchError::Malformed(format!(
                        "asked for vehicle {vehicle_id}, got statistics for {}",
                        stats.vehicle_id
                    )));
                }
                stats.validate()?;
                Ok(stats)
            });

        fetched.map_err(|source| {
            warn!(error = %source, "Statistics query failed");
            DashboardError::QueryFailed {
                vehicle_id,
                time_range,
                source,
            }
        })
    }
}
