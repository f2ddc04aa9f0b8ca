use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FetchError;

/// Aggregated ridership and revenue of one vehicle over a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatistics {
    #[serde(rename = "bus_id")]
    pub vehicle_id: u32,
    pub total_passengers: u64,
    pub total_revenue: f64,
    pub max_capacity: u32,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_update: DateTime<Utc>,
}

impl VehicleStatistics {
    /// Average fare collected per passenger over the window.
    pub fn revenue_per_passenger(&self) -> f64 {
        if self.total_passengers == 0 {
            0.0
        } else {
            self.total_revenue / self.total_passengers as f64
        }
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        if self.max_capacity == 0 {
            return Err(FetchError::Malformed(format!(
                "statistics for vehicle {} have zero max_capacity",
                self.vehicle_id
            )));
        }
        if !self.total_revenue.is_finite() || self.total_revenue < 0.0 {
            return Err(FetchError::Malformed(format!(
                "statistics for vehicle {} have invalid total_revenue {}",
                self.vehicle_id, self.total_revenue
            )));
        }
        Ok(())
    }
}

/// Accepts RFC 3339 timestamps as well as the offset-less ISO datetimes the
/// backend emits; the latter are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_naive() {
        let ts = parse_timestamp("2024-05-01T12:30:00.123456").unwrap();
        assert_eq!(
            ts,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
                + chrono::Duration::microseconds(123_456)
        );
    }

    #[test]
    fn test_parse_timestamp_without_fraction() {
        let ts = parse_timestamp("2024-05-01T12:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let ts = parse_timestamp("2024-05-01T15:30:00+03:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_revenue_per_passenger() {
        let stats = VehicleStatistics {
            vehicle_id: 5,
            total_passengers: 120,
            total_revenue: 340.0,
            max_capacity: 40,
            last_update: Utc::now(),
        };
        assert!((stats.revenue_per_passenger() - 340.0 / 120.0).abs() < 1e-9);

        let empty = VehicleStatistics {
            total_passengers: 0,
            total_revenue: 0.0,
            ..stats
        };
        assert_eq!(empty.revenue_per_passenger(), 0.0);
    }
}
