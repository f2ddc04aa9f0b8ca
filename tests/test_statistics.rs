mod common;

use bus_dashboard::{DashboardError, FetchError, StatisticsQueryService, TimeRange};
use common::{ScriptedApi, statistics, transient};
use std::sync::Arc;

fn service(api: &Arc<ScriptedApi>) -> StatisticsQueryService {
    StatisticsQueryService::new(api.clone())
}

#[tokio::test]
async fn test_query_returns_parsed_statistics() {
    let api = Arc::new(ScriptedApi::new());
    api.push_statistics(0, Ok(statistics(5, 120, 340.0)));

    let stats = service(&api).query(5, "1h").await.unwrap();

    assert_eq!(stats, statistics(5, 120, 340.0));
    assert_eq!(api.statistics_requests(), vec![(5, TimeRange::OneHour)]);
}

#[tokio::test]
async fn test_every_time_range_reaches_backend() {
    let api = Arc::new(ScriptedApi::new());
    for _ in TimeRange::ALL {
        api.push_statistics(0, Ok(statistics(2, 1, 45.0)));
    }
    let service = service(&api);

    for range in ["10m", "1h", "1d", "1w"] {
        service.query(2, range).await.unwrap();
    }

    let ranges: Vec<_> = api.statistics_requests().into_iter().map(|(_, r)| r).collect();
    assert_eq!(ranges, TimeRange::ALL.to_vec());
}

#[tokio::test]
async fn test_invalid_time_range_is_rejected_without_request() {
    let api = Arc::new(ScriptedApi::new());
    let service = service(&api);

    for bad in ["", "15m", "1y", "1D", "week"] {
        let err = service.query(1, bad).await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidArgument(_)), "{bad:?}");
    }

    assert_eq!(api.statistics_calls(), 0);
}

#[tokio::test]
async fn test_network_failure_is_query_failed() {
    let api = Arc::new(ScriptedApi::new());
    api.push_statistics(0, Err(transient()));

    let err = service(&api).query(5, "1d").await.unwrap_err();

    match err {
        DashboardError::QueryFailed {
            vehicle_id,
            time_range,
            source,
        } => {
            assert_eq!(vehicle_id, 5);
            assert_eq!(time_range, TimeRange::OneDay);
            assert!(source.is_transient());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_is_query_failed() {
    let api = Arc::new(ScriptedApi::new());
    api.push_statistics(
        0,
        Err(FetchError::Status {
            status: 404,
            body: "{\"detail\":\"not found\"}".into(),
        }),
    );

    let err = service(&api).query(99, "10m").await.unwrap_err();
    assert!(matches!(
        err,
        DashboardError::QueryFailed {
            source: FetchError::Status { status: 404, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_answer_for_other_vehicle_is_malformed() {
    let api = Arc::new(ScriptedApi::new());
    api.push_statistics(0, Ok(statistics(6, 10, 450.0)));

    let err = service(&api).query(5, "1h").await.unwrap_err();
    assert!(matches!(
        err,
        DashboardError::QueryFailed {
            source: FetchError::Malformed(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_invalid_statistics_are_malformed() {
    let api = Arc::new(ScriptedApi::new());
    let mut bad = statistics(5, 10, 450.0);
    bad.max_capacity = 0;
    api.push_statistics(0, Ok(bad));

    let err = service(&api).query(5, "1h").await.unwrap_err();
    assert!(matches!(
        err,
        DashboardError::QueryFailed {
            source: FetchError::Malformed(_),
            ..
        }
    ));
}
