//! Operator commands typed into the live dashboard.

use std::str::FromStr;

use crate::error::DashboardError;
use crate::fleet::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    SelectVehicle(u32),
    SelectRange(TimeRange),
    QueryStatistics,
    Reset,
    Help,
    Quit,
}

pub const HELP: &str = "commands: bus <id> | range <10m|1h|1d|1w> | stats | reset | help | quit";

impl FromStr for OperatorCommand {
    type Err = DashboardError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();
        if words.next().is_some() {
            return Err(DashboardError::InvalidArgument(format!(
                "too many arguments in '{}'",
                line.trim()
            )));
        }

        match (verb.as_str(), arg) {
            ("bus", Some(id)) => id.parse().map(OperatorCommand::SelectVehicle).map_err(|_| {
                DashboardError::InvalidArgument(format!("'{id}' is not a vehicle id"))
            }),
            ("range", Some(range)) => range.parse().map(OperatorCommand::SelectRange),
            ("stats", None) => Ok(OperatorCommand::QueryStatistics),
            ("reset", None) => Ok(OperatorCommand::Reset),
            ("help" | "?", None) => Ok(OperatorCommand::Help),
            ("quit" | "exit" | "q", None) => Ok(OperatorCommand::Quit),
            _ => Err(DashboardError::InvalidArgument(format!(
                "unrecognized command '{}'",
                line.trim()
            ))),
        }
    }
}
