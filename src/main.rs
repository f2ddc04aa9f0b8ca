//! CLI entry point for the bus fleet dashboard.
//!
//! `watch` runs the live dashboard; `status`, `stats` and `reset` are
//! one-shot calls against the same backend.

use anyhow::{Result, bail};
use bus_dashboard::command::{HELP, OperatorCommand};
use bus_dashboard::config::DashboardConfig;
use bus_dashboard::fetch::BasicClient;
use bus_dashboard::infra::backend::HttpFleetApi;
use bus_dashboard::output::{
    StatisticsRecord, append_record, to_json, write_fleet, write_statistics, write_view,
};
use bus_dashboard::{
    Dashboard, DashboardEvent, FleetApi, PollOutcome, StatisticsQueryService, TimeRange,
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bus_dashboard")]
#[command(about = "A live dashboard for a bus fleet backend", long_about = None)]
struct Cli {
    /// Backend base URL (overrides BUS_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the fleet continuously and take operator commands on stdin
    Watch {
        /// Poll interval in milliseconds (overrides BUS_POLL_INTERVAL_MS)
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// CSV file to append every displayed statistics result to
        #[arg(long, value_name = "FILE")]
        record: Option<String>,
    },
    /// Fetch the fleet status once
    Status {
        /// Print the snapshot as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Query statistics for one bus
    Stats {
        #[arg(value_name = "BUS_ID")]
        vehicle_id: u32,

        /// Aggregation window: 10m, 1h, 1d or 1w
        #[arg(short, long, default_value = "1d")]
        range: String,

        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// CSV file to append the result to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Reset the backend store and show the refreshed fleet
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bus_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bus_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    info!(base_url = %config.base_url, "Using backend");

    let api = build_api(&config)?;

    match cli.command {
        Commands::Watch {
            interval_ms,
            record,
        } => {
            if let Some(ms) = interval_ms {
                config = config.with_poll_interval_ms(ms)?;
            }
            watch(api, config.poll_interval, record).await?;
        }
        Commands::Status { json } => {
            let mut dashboard = Dashboard::new(api);
            if let PollOutcome::Failed { .. } = dashboard.refresh().await {
                bail!("Failed to fetch fleet status from {}", config.base_url);
            }
            let fleet = dashboard.view().fleet();
            if json {
                println!("{}", to_json(fleet)?);
            } else {
                write_fleet(&mut std::io::stdout().lock(), fleet)?;
            }
        }
        Commands::Stats {
            vehicle_id,
            range,
            json,
            output,
        } => {
            let service = StatisticsQueryService::new(api);
            let stats = service.query(vehicle_id, &range).await?;

            if json {
                println!("{}", to_json(&stats)?);
            } else {
                write_statistics(&mut std::io::stdout().lock(), Some(&stats))?;
            }

            if let Some(path) = output {
                let time_range: TimeRange = range.parse()?;
                append_record(&path, &StatisticsRecord::new(time_range, &stats))?;
                info!(path, "Statistics appended");
            }
        }
        Commands::Reset => {
            let mut dashboard = Dashboard::new(api);
            if let PollOutcome::Failed { .. } = dashboard.reset().await? {
                warn!("Reset succeeded but the fleet could not be refreshed");
            }
            write_fleet(&mut std::io::stdout().lock(), dashboard.view().fleet())?;
        }
    }

    Ok(())
}

fn build_api(config: &DashboardConfig) -> Result<Arc<dyn FleetApi>> {
    let client = BasicClient::new(config.request_timeout)?;
    Ok(Arc::new(HttpFleetApi::new(client, config.base_url.clone())))
}

/// Runs the live dashboard until `quit` or end of input.
#[tracing::instrument(skip(api, record), fields(interval_ms = interval.as_millis() as u64))]
async fn watch(api: Arc<dyn FleetApi>, interval: Duration, record: Option<String>) -> Result<()> {
    let mut dashboard = Dashboard::new(api);
    dashboard.start(interval)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<OperatorCommand>() {
                    Ok(OperatorCommand::Quit) => break,
                    Ok(command) => handle_command(&mut dashboard, command).await,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                }
            }
            event = dashboard.next_event() => {
                let Some(event) = event else { break };
                match event {
                    DashboardEvent::FleetUpdated { .. } => {}
                    DashboardEvent::StatisticsUpdated => {
                        if let (Some(path), Some(stats)) = (&record, dashboard.view().statistics()) {
                            let time_range = dashboard.view().selection().time_range;
                            if let Err(e) = append_record(path, &StatisticsRecord::new(time_range, stats)) {
                                warn!(path, error = %e, "Failed to record statistics");
                            }
                        }
                    }
                    DashboardEvent::StatisticsFailed(e) => warn!(error = %e, "Statistics unavailable"),
                    DashboardEvent::StatisticsSuperseded => continue,
                }
            }
        }

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout)?;
        write_view(&mut stdout, dashboard.view())?;
        stdout.flush()?;
    }

    dashboard.shutdown();
    info!("Dashboard closed");
    Ok(())
}

async fn handle_command(dashboard: &mut Dashboard, command: OperatorCommand) {
    match command {
        OperatorCommand::SelectVehicle(vehicle_id) => dashboard.select_vehicle(vehicle_id),
        OperatorCommand::SelectRange(time_range) => dashboard.set_time_range(time_range),
        OperatorCommand::QueryStatistics => {
            dashboard.request_statistics();
        }
        OperatorCommand::Reset => {
            if let Err(e) = dashboard.reset().await {
                println!("{e}");
            }
        }
        OperatorCommand::Help => println!("{HELP}"),
        OperatorCommand::Quit => {}
    }
}
