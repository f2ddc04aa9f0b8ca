pub mod command;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod fleet;
pub mod infra;
pub mod output;
pub mod parser;
pub mod poller;
pub mod query;
pub mod reset;
pub mod services;
pub mod stats;
pub mod view;

pub use dashboard::{Dashboard, DashboardEvent};
pub use error::{DashboardError, FetchError};
pub use fleet::{FleetSnapshot, TimeRange, VehicleState, VehicleStatus};
pub use poller::{FleetStatusPoller, PollOutcome, PublishedSnapshot};
pub use query::StatisticsQueryService;
pub use reset::ResetController;
pub use services::fleet_api::FleetApi;
pub use stats::VehicleStatistics;
pub use view::DashboardViewModel;
