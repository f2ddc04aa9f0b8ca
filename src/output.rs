//! Rendering and persistence for the dashboard.
//!
//! Supports a plain-text fleet board, JSON serialization, and CSV append of
//! statistics results.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::fleet::{FleetSnapshot, TimeRange};
use crate::stats::VehicleStatistics;
use crate::view::DashboardViewModel;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Writes one line per vehicle followed by the fleet-wide revenue total.
pub fn write_fleet<W: Write>(out: &mut W, fleet: &FleetSnapshot) -> std::io::Result<()> {
    if fleet.is_empty() {
        writeln!(out, "(no vehicles)")?;
    }
    for v in fleet.vehicles() {
        writeln!(
            out,
            "bus #{:<4} {:<11} {:>3}/{:<3} ({:>5.1}%)  revenue {:>10.2}",
            v.vehicle_id,
            v.status.as_str(),
            v.current_passengers,
            v.max_capacity,
            v.occupancy_pct(),
            v.revenue
        )?;
    }
    writeln!(
        out,
        "total revenue {:.2} | passengers on board {}",
        fleet.total_revenue(),
        fleet.total_passengers()
    )
}

/// Writes the statistics panel; dashes stand in for absent statistics.
pub fn write_statistics<W: Write>(
    out: &mut W,
    stats: Option<&VehicleStatistics>,
) -> std::io::Result<()> {
    match stats {
        Some(s) => writeln!(
            out,
            "bus #{} | passengers {} | revenue {:.2} ({:.2}/passenger) | capacity {} | updated {}",
            s.vehicle_id,
            s.total_passengers,
            s.total_revenue,
            s.revenue_per_passenger(),
            s.max_capacity,
            s.last_update.format("%Y-%m-%d %H:%M:%S")
        ),
        None => writeln!(out, "bus # - | passengers 0 | revenue 0.00 | updated -"),
    }
}

/// Writes the whole screen: fleet board, selection, statistics, error line.
pub fn write_view<W: Write>(out: &mut W, view: &DashboardViewModel) -> std::io::Result<()> {
    write_fleet(out, view.fleet())?;
    match view.fleet_received_at() {
        Some(at) => writeln!(out, "fleet as of {}", at.format("%H:%M:%S"))?,
        None => writeln!(out, "fleet not received yet")?,
    }
    let selection = view.selection();
    writeln!(
        out,
        "selected: bus {} over {}",
        selection.vehicle_id, selection.time_range
    )?;
    write_statistics(out, view.statistics())?;
    if let Some(err) = view.last_error() {
        writeln!(out, "error: {err}")?;
    }
    Ok(())
}

/// Serializes any model value as pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One CSV row per statistics result.
#[derive(Debug, Serialize)]
pub struct StatisticsRecord {
    pub recorded_at: DateTime<Utc>,
    pub vehicle_id: u32,
    pub time_range: TimeRange,
    pub window_secs: u64,
    pub total_passengers: u64,
    pub total_revenue: f64,
    pub max_capacity: u32,
    pub last_update: DateTime<Utc>,
}

impl StatisticsRecord {
    pub fn new(time_range: TimeRange, stats: &VehicleStatistics) -> Self {
        Self {
            recorded_at: Utc::now(),
            vehicle_id: stats.vehicle_id,
            time_range,
            window_secs: time_range.window().as_secs(),
            total_passengers: stats.total_passengers,
            total_revenue: stats.total_revenue,
            max_capacity: stats.max_capacity,
            last_update: stats.last_update,
        }
    }
}

/// Appends a [`StatisticsRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &StatisticsRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
