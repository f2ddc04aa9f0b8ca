//! State container behind the dashboard screen.
//!
//! [`DashboardViewModel`] owns the fleet snapshot, the operator's pending
//! query parameters and the displayed statistics. It performs no I/O; the
//! [`crate::dashboard::Dashboard`] controller feeds it poll results and
//! query completions.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::fleet::{FleetSnapshot, TimeRange};
use crate::poller::PublishedSnapshot;
use crate::stats::VehicleStatistics;

pub const DEFAULT_VEHICLE_ID: u32 = 1;

/// Pending statistics query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub vehicle_id: u32,
    pub time_range: TimeRange,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            vehicle_id: DEFAULT_VEHICLE_ID,
            time_range: TimeRange::default(),
        }
    }
}

/// Captured when a query is issued; the completion only lands if the ticket
/// is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    selection: Selection,
}

impl QueryTicket {
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsUpdate {
    Applied,
    /// A newer query, a selection change or a reset made the result moot.
    Superseded,
}

#[derive(Debug, Default)]
pub struct DashboardViewModel {
    fleet: Arc<FleetSnapshot>,
    fleet_seq: u64,
    fleet_received_at: Option<DateTime<Utc>>,
    selection: Selection,
    statistics: Option<VehicleStatistics>,
    query_generation: u64,
    last_error: Option<String>,
}

impl DashboardViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fleet(&self) -> &FleetSnapshot {
        &self.fleet
    }

    pub fn fleet_seq(&self) -> u64 {
        self.fleet_seq
    }

    pub fn fleet_received_at(&self) -> Option<DateTime<Utc>> {
        self.fleet_received_at
    }

    /// Sum of revenue over the current snapshot, computed on every call.
    pub fn total_fleet_revenue(&self) -> f64 {
        self.fleet.total_revenue()
    }

    /// Replaces the snapshot if `published` is newer than the one held.
    /// Returns whether anything changed.
    pub fn apply_snapshot(&mut self, published: &PublishedSnapshot) -> bool {
        if published.seq <= self.fleet_seq {
            return false;
        }
        self.fleet = Arc::clone(&published.fleet);
        self.fleet_seq = published.seq;
        self.fleet_received_at = published.received_at;
        true
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn select_vehicle(&mut self, vehicle_id: u32) {
        self.selection.vehicle_id = vehicle_id;
    }

    pub fn set_time_range(&mut self, time_range: TimeRange) {
        self.selection.time_range = time_range;
    }

    /// Parses and selects an operator-supplied time range.
    ///
    /// # Errors
    ///
    /// [`crate::error::DashboardError::InvalidArgument`] for values outside the closed set;
    /// the current selection is kept.
    pub fn select_time_range(&mut self, raw: &str) -> Result<()> {
        let time_range = raw.parse::<TimeRange>()?;
        self.set_time_range(time_range);
        Ok(())
    }

    pub fn statistics(&self) -> Option<&VehicleStatistics> {
        self.statistics.as_ref()
    }

    /// Error indicator of the most recent failed query, if it is still the
    /// latest word on the displayed statistics.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Marks the start of a query for the current selection. Any query
    /// issued earlier is superseded from here on.
    pub fn begin_query(&mut self) -> QueryTicket {
        self.query_generation += 1;
        QueryTicket {
            generation: self.query_generation,
            selection: self.selection,
        }
    }

    /// Binds a query completion to the displayed statistics.
    ///
    /// Superseded completions are dropped whatever their result. A failure
    /// for a current ticket keeps the displayed statistics, records the error
    /// indicator, and is handed back to the caller.
    pub fn complete_query(
        &mut self,
        ticket: QueryTicket,
        result: Result<VehicleStatistics>,
    ) -> Result<StatisticsUpdate> {
        if ticket.generation != self.query_generation || ticket.selection != self.selection {
            debug!(
                generation = ticket.generation,
                current = self.query_generation,
                "Dropping superseded statistics result"
            );
            return Ok(StatisticsUpdate::Superseded);
        }

        match result {
            Ok(stats) => {
                self.statistics = Some(stats);
                self.last_error = None;
                Ok(StatisticsUpdate::Applied)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Drops the displayed statistics and supersedes queries in flight.
    pub fn clear_statistics(&mut self) {
        self.statistics = None;
        self.last_error = None;
        self.query_generation += 1;
    }
}
