//! Trait for the backend that owns the fleet and its statistics.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fleet::{FleetSnapshot, TimeRange};
use crate::stats::VehicleStatistics;

/// One method per backend operation the dashboard consumes.
///
/// Implementations only transport and decode; invariant checks and ordering
/// are the caller's concern.
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// `GET /api/bus/status`
    async fn fetch_status(&self) -> Result<FleetSnapshot, FetchError>;

    /// `GET /api/bus/statistics/{vehicle_id}?time_range={range}`
    async fn fetch_statistics(
        &self,
        vehicle_id: u32,
        time_range: TimeRange,
    ) -> Result<VehicleStatistics, FetchError>;

    /// `POST /api/reset-database`
    async fn reset_store(&self) -> Result<(), FetchError>;
}
