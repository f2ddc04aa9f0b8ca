//! Shared fixtures for the integration tests.
//!
//! [`ScriptedApi`] is an in-memory [`FleetApi`] whose answers and latencies
//! are queued up front, so tests can replay out-of-order completions under
//! tokio's paused clock.

#![allow(dead_code)]

use async_trait::async_trait;
use bus_dashboard::{
    FetchError, FleetApi, FleetSnapshot, TimeRange, VehicleState, VehicleStatistics,
    VehicleStatus,
};
use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct Scripted<T> {
    delay: Duration,
    result: Result<T, FetchError>,
}

#[derive(Default)]
pub struct ScriptedApi {
    status: Mutex<VecDeque<Scripted<FleetSnapshot>>>,
    statistics: Mutex<VecDeque<Scripted<VehicleStatistics>>>,
    resets: Mutex<VecDeque<Scripted<()>>>,
    statistics_requests: Mutex<Vec<(u32, TimeRange)>>,
    status_calls: AtomicUsize,
    statistics_calls: AtomicUsize,
    reset_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, delay_ms: u64, result: Result<FleetSnapshot, FetchError>) {
        self.status.lock().unwrap().push_back(Scripted {
            delay: Duration::from_millis(delay_ms),
            result,
        });
    }

    pub fn push_statistics(&self, delay_ms: u64, result: Result<VehicleStatistics, FetchError>) {
        self.statistics.lock().unwrap().push_back(Scripted {
            delay: Duration::from_millis(delay_ms),
            result,
        });
    }

    pub fn push_reset(&self, delay_ms: u64, result: Result<(), FetchError>) {
        self.resets.lock().unwrap().push_back(Scripted {
            delay: Duration::from_millis(delay_ms),
            result,
        });
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn statistics_calls(&self) -> usize {
        self.statistics_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub fn statistics_requests(&self) -> Vec<(u32, TimeRange)> {
        self.statistics_requests.lock().unwrap().clone()
    }
}

async fn play<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Result<T, FetchError> {
    let next = queue.lock().unwrap().pop_front();
    match next {
        Some(Scripted { delay, result }) => {
            tokio::time::sleep(delay).await;
            result
        }
        None => Err(FetchError::Transient("script exhausted".into())),
    }
}

#[async_trait]
impl FleetApi for ScriptedApi {
    async fn fetch_status(&self) -> Result<FleetSnapshot, FetchError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        play(&self.status).await
    }

    async fn fetch_statistics(
        &self,
        vehicle_id: u32,
        time_range: TimeRange,
    ) -> Result<VehicleStatistics, FetchError> {
        self.statistics_calls.fetch_add(1, Ordering::SeqCst);
        self.statistics_requests
            .lock()
            .unwrap()
            .push((vehicle_id, time_range));
        play(&self.statistics).await
    }

    async fn reset_store(&self) -> Result<(), FetchError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        play(&self.resets).await
    }
}

pub fn vehicle(vehicle_id: u32, passengers: u32, capacity: u32, revenue: f64) -> VehicleStatus {
    VehicleStatus {
        vehicle_id,
        status: if passengers > 0 {
            VehicleState::InService
        } else {
            VehicleState::Free
        },
        current_passengers: passengers,
        max_capacity: capacity,
        revenue,
    }
}

/// A fleet whose vehicles carry the given revenues, ids starting at 1.
pub fn fleet_with_revenues(revenues: &[f64]) -> FleetSnapshot {
    FleetSnapshot::new(
        revenues
            .iter()
            .enumerate()
            .map(|(i, &revenue)| vehicle(i as u32 + 1, 0, 20, revenue))
            .collect(),
    )
}

pub fn statistics(vehicle_id: u32, total_passengers: u64, total_revenue: f64) -> VehicleStatistics {
    VehicleStatistics {
        vehicle_id,
        total_passengers,
        total_revenue,
        max_capacity: 40,
        last_update: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

pub fn transient() -> FetchError {
    FetchError::Transient("connection reset".into())
}
