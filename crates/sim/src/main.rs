//! vigil-sim: drive a vigil server with synthetic component heartbeats.
//!
//! ```text
//! vigil-sim trade_engine --level 4 --interval 10
//! vigil-sim market_data_feeder --data-file ./data/market_data.csv --file-interval 60
//! vigil-sim trade_engine --crash-after 5 --max-iterations 20
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vigil_sim::client::HeartbeatClient;
use vigil_sim::scenario::{self, Scenario};

#[derive(Parser)]
#[command(name = "vigil-sim", about = "Simulate a monitored component", version)]
struct Cli {
    /// Component identifier to report as.
    component_id: String,

    /// Run level to declare in each heartbeat (1-4).
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=4))]
    level: Option<i64>,

    /// Seconds between heartbeats.
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Versioned API root of the server.
    #[arg(long, env = "VIGIL_API_BASE", default_value = "http://localhost:8000/api/v1")]
    api_base: String,

    /// Stop after this many heartbeats.
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Report the process as dead after this many heartbeats.
    #[arg(long)]
    crash_after: Option<u64>,

    /// Data file to append rows to.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Seconds between data file updates.
    #[arg(long, default_value_t = 300)]
    file_interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if !vigil_core::is_valid_component_id(&cli.component_id) {
        bail!(
            "invalid component id '{}': use letters, digits, '_' or '-'",
            cli.component_id
        );
    }
    if cli.interval == 0 || cli.file_interval == 0 {
        bail!("intervals must be at least one second");
    }

    let client = HeartbeatClient::new(&cli.api_base, &cli.component_id)?;
    let scenario = Scenario {
        component_id: cli.component_id,
        declared_level: cli.level,
        heartbeat_interval: Duration::from_secs(cli.interval),
        max_iterations: cli.max_iterations,
        crash_after: cli.crash_after,
        data_file: cli.data_file,
        file_interval: Duration::from_secs(cli.file_interval),
    };

    let summary = scenario::run(scenario, client).await?;
    tracing::info!(
        sent = summary.heartbeats_sent,
        failed = summary.heartbeats_failed,
        rows = summary.rows_written,
        "simulator stopped"
    );
    Ok(())
}
