//! JSON decoding of backend response bodies.

use crate::error::FetchError;
use crate::fleet::FleetSnapshot;
use crate::stats::VehicleStatistics;

/// Decodes the body of `GET /api/bus/status`.
///
/// # Errors
///
/// Returns [`FetchError::Malformed`] if the bytes are not a JSON array of
/// vehicle status objects. Invariants are checked separately by
/// [`FleetSnapshot::validate`].
pub fn parse_fleet(bytes: &[u8]) -> Result<FleetSnapshot, FetchError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes and validates the body of `GET /api/bus/statistics/{id}`.
pub fn parse_statistics(bytes: &[u8]) -> Result<VehicleStatistics, FetchError> {
    let stats: VehicleStatistics = serde_json::from_slice(bytes)?;
    stats.validate()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::VehicleState;

    #[test]
    fn test_parse_empty_fleet() {
        let fleet = parse_fleet(b"[]").unwrap();
        assert!(fleet.is_empty());
    }

    #[test]
    fn test_parse_fleet_backend_shape() {
        let body = br#"[
            {"bus_id": 1, "status": "free", "current_count_passengers": 0, "max_capacity": 20, "revenue": 0},
            {"bus_id": 9, "status": "in_service", "current_count_passengers": 12, "max_capacity": 50, "revenue": 540.0}
        ]"#;
        let fleet = parse_fleet(body).unwrap();

        assert_eq!(fleet.len(), 2);
        let bus = fleet.get(9).unwrap();
        assert_eq!(bus.status, VehicleState::InService);
        assert_eq!(bus.current_passengers, 12);
        assert_eq!(bus.max_capacity, 50);
        assert_eq!(fleet.total_revenue(), 540.0);
    }

    #[test]
    fn test_parse_fleet_rejects_object() {
        let result = parse_fleet(br#"{"detail": "oops"}"#);
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_parse_fleet_rejects_negative_passengers() {
        let body = br#"[{"bus_id": 1, "status": "free", "current_count_passengers": -1, "max_capacity": 20, "revenue": 0}]"#;
        assert!(parse_fleet(body).is_err());
    }

    #[test]
    fn test_parse_statistics() {
        let body = br#"{"bus_id": 5, "total_passengers": 120, "total_revenue": 340.0,
                        "max_capacity": 40, "last_update": "2024-05-01T12:30:00.5"}"#;
        let stats = parse_statistics(body).unwrap();

        assert_eq!(stats.vehicle_id, 5);
        assert_eq!(stats.total_passengers, 120);
        assert_eq!(stats.total_revenue, 340.0);
        assert_eq!(stats.max_capacity, 40);
    }

    #[test]
    fn test_parse_statistics_rejects_truncated_body() {
        let result = parse_statistics(br#"{"bus_id": 5, "total_passengers": 1"#);
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_parse_statistics_rejects_zero_capacity() {
        let body = br#"{"bus_id": 5, "total_passengers": 0, "total_revenue": 0,
                        "max_capacity": 0, "last_update": "2024-05-01T12:30:00"}"#;
        assert!(parse_statistics(body).is_err());
    }
}
