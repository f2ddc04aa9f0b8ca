//! Fleet data model: per-vehicle status, the snapshot of the whole fleet,
//! and the closed set of statistics windows.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DashboardError, FetchError};

/// Operational state reported by the backend for a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleState {
    Free,
    InService,
    /// Anything the backend reports that we do not recognize
    #[default]
    #[serde(other)]
    Unknown,
}

impl VehicleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleState::Free => "free",
            VehicleState::InService => "in_service",
            VehicleState::Unknown => "unknown",
        }
    }
}

/// Live status of one vehicle as returned by `GET /api/bus/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatus {
    #[serde(rename = "bus_id")]
    pub vehicle_id: u32,
    pub status: VehicleState,
    #[serde(rename = "current_count_passengers")]
    pub current_passengers: u32,
    pub max_capacity: u32,
    pub revenue: f64,
}

impl VehicleStatus {
    /// Share of the capacity currently occupied, in percent.
    pub fn occupancy_pct(&self) -> f64 {
        if self.max_capacity == 0 {
            0.0
        } else {
            (self.current_passengers as f64 / self.max_capacity as f64) * 100.0
        }
    }

    fn validate(&self) -> Result<(), FetchError> {
        if self.max_capacity == 0 {
            return Err(FetchError::Malformed(format!(
                "vehicle {} has zero max_capacity",
                self.vehicle_id
            )));
        }
        if self.current_passengers > self.max_capacity {
            return Err(FetchError::Malformed(format!(
                "vehicle {} carries {} passengers over capacity {}",
                self.vehicle_id, self.current_passengers, self.max_capacity
            )));
        }
        if !self.revenue.is_finite() || self.revenue < 0.0 {
            return Err(FetchError::Malformed(format!(
                "vehicle {} has invalid revenue {}",
                self.vehicle_id, self.revenue
            )));
        }
        Ok(())
    }
}

/// Complete status of every known vehicle at one point in time.
///
/// Snapshots are only ever replaced as a whole, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FleetSnapshot {
    vehicles: Vec<VehicleStatus>,
}

impl FleetSnapshot {
    pub fn new(vehicles: Vec<VehicleStatus>) -> Self {
        Self { vehicles }
    }

    pub fn vehicles(&self) -> &[VehicleStatus] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get(&self, vehicle_id: u32) -> Option<&VehicleStatus> {
        self.vehicles.iter().find(|v| v.vehicle_id == vehicle_id)
    }

    /// Plain sum of every vehicle's revenue; `0.0` for an empty fleet.
    pub fn total_revenue(&self) -> f64 {
        // f64's Sum starts from -0.0, which would render as "-0.00"
        self.vehicles.iter().fold(0.0, |acc, v| acc + v.revenue)
    }

    pub fn total_passengers(&self) -> u64 {
        self.vehicles
            .iter()
            .map(|v| u64::from(v.current_passengers))
            .sum()
    }

    /// Checks every vehicle entry and the one-entry-per-id rule.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Malformed`] on the first violation; callers must
    /// then discard the whole snapshot.
    pub fn validate(&self) -> Result<(), FetchError> {
        let mut seen = HashSet::with_capacity(self.vehicles.len());
        for v in &self.vehicles {
            if !seen.insert(v.vehicle_id) {
                return Err(FetchError::Malformed(format!(
                    "duplicate vehicle id {}",
                    v.vehicle_id
                )));
            }
            v.validate()?;
        }
        Ok(())
    }
}

/// Aggregation window for vehicle statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::TenMinutes,
        TimeRange::OneHour,
        TimeRange::OneDay,
        TimeRange::OneWeek,
    ];

    /// Wire value of the `time_range` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::TenMinutes => "10m",
            TimeRange::OneHour => "1h",
            TimeRange::OneDay => "1d",
            TimeRange::OneWeek => "1w",
        }
    }

    /// Length of the aggregation window.
    pub fn window(&self) -> Duration {
        match self {
            TimeRange::TenMinutes => Duration::from_secs(10 * 60),
            TimeRange::OneHour => Duration::from_secs(60 * 60),
            TimeRange::OneDay => Duration::from_secs(24 * 60 * 60),
            TimeRange::OneWeek => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                DashboardError::InvalidArgument(format!(
                    "time range '{s}' is not one of 10m, 1h, 1d, 1w"
                ))
            })
    }
}
