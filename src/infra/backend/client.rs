use async_trait::async_trait;
use reqwest::{Method, Url};
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::fleet::{FleetSnapshot, TimeRange};
use crate::parser::{parse_fleet, parse_statistics};
use crate::services::fleet_api::FleetApi;
use crate::stats::VehicleStatistics;

const STATUS_PATH: &str = "/api/bus/status";
const STATISTICS_PATH: &str = "/api/bus/statistics";
const RESET_PATH: &str = "/api/reset-database";

/// [`FleetApi`] over the backend's HTTP/JSON contract.
pub struct HttpFleetApi<C> {
    client: C,
    base_url: Url,
}

impl<C: HttpClient> HttpFleetApi<C> {
    /// `base_url` must be an `http(s)` URL; its path is ignored.
    pub fn new(client: C, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    pub(crate) fn status_url(&self) -> Url {
        self.url(STATUS_PATH)
    }

    pub(crate) fn statistics_url(&self, vehicle_id: u32, time_range: TimeRange) -> Url {
        let mut url = self.url(&format!("{STATISTICS_PATH}/{vehicle_id}"));
        url.query_pairs_mut()
            .append_pair("time_range", time_range.as_str());
        url
    }

    pub(crate) fn reset_url(&self) -> Url {
        self.url(RESET_PATH)
    }
}

#[async_trait]
impl<C: HttpClient> FleetApi for HttpFleetApi<C> {
    #[tracing::instrument(skip(self))]
    async fn fetch_status(&self) -> Result<FleetSnapshot, FetchError> {
        let bytes = fetch_bytes(&self.client, Method::GET, self.status_url()).await?;
        debug!(bytes = bytes.len(), "Status body received");
        parse_fleet(&bytes)
    }

    #[tracing::instrument(skip(self), fields(time_range = %time_range))]
    async fn fetch_statistics(
        &self,
        vehicle_id: u32,
        time_range: TimeRange,
    ) -> Result<VehicleStatistics, FetchError> {
        let url = self.statistics_url(vehicle_id, time_range);
        let bytes = fetch_bytes(&self.client, Method::GET, url).await?;
        debug!(bytes = bytes.len(), "Statistics body received");
        parse_statistics(&bytes)
    }

    #[tracing::instrument(skip(self))]
    async fn reset_store(&self) -> Result<(), FetchError> {
        // Body is uninterpreted; a 2xx status is the whole answer.
        fetch_bytes(&self.client, Method::POST, self.reset_url()).await?;
        Ok(())
    }
}
