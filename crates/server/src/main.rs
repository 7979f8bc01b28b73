//! vigil-server: heartbeat ingestion, status reads and the tick driver.

mod api;
mod driver;
mod router;
mod startup;
mod state;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

/// Compliance monitoring server.
#[derive(Parser, Debug)]
#[command(name = "vigil-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve {
        /// Do not run the in-process tick driver; ticks come from `vigil-server tick`.
        #[arg(long, env = "VIGIL_NO_DRIVER")]
        no_driver: bool,
    },
    /// Run exactly one evaluation tick and exit.
    Tick,
    /// Load and validate the plan files, then exit.
    Check,
}

fn load_config() -> vigil_core::Config {
    vigil_core::config::load_dotenv();
    vigil_core::Config::from_env()
}

async fn serve(config: vigil_core::Config, run_driver: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = startup::build_state(config).await?;

    if run_driver {
        tokio::spawn(driver::run_driver(state.clone()));
    } else {
        info!("In-process tick driver disabled");
    }

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn tick(config: vigil_core::Config) -> anyhow::Result<()> {
    let state = startup::build_state(config).await?;
    let report = driver::run_tick(&state).await;
    info!(
        file_components = report.file_components,
        level_components = report.level_components,
        "single tick complete"
    );
    if !report.write_failures.is_empty() {
        anyhow::bail!(
            "failed to write snapshots for: {}",
            report.write_failures.join(", ")
        );
    }
    Ok(())
}

fn check(config: &vigil_core::Config) -> anyhow::Result<()> {
    let plan = startup::load_plan(config)?;
    info!(
        file_components = plan.file_components.len(),
        monitored_files = plan.file_count(),
        level_components = plan.level_components.len(),
        "monitor plan is valid"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config();
    config.log_summary();

    match cli.command.unwrap_or(Command::Serve { no_driver: false }) {
        Command::Serve { no_driver } => serve(config, !no_driver).await,
        Command::Tick => tick(config).await,
        Command::Check => check(&config),
    }
}
