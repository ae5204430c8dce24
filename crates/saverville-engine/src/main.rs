//! Console front-end for the Saverville farm.
//!
//! Wires the farm controller to a simulated ledger and drives it from
//! stdin, one command per line. Growth happens in the background while the
//! prompt waits, so `show` between commands reveals plots maturing.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `saverville-config.yaml` (or the path given
//!    as the first argument)
//! 2. Initialize structured logging (tracing) on stderr
//! 3. Build the simulated ledger and the farm controller
//! 4. Start the farm event logger
//! 5. Read commands until `quit` or end of input

mod console;
mod error;

use std::path::Path;

use saverville_core::config::{FarmConfig, LogFormat, LoggingConfig};
use saverville_core::{FarmController, RemoteLedgerGateway, SimulatedLedger, notify};
use saverville_types::FarmEvent;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{Command, HELP};
use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "saverville-config.yaml";

/// Application entry point for the console.
///
/// # Errors
///
/// Returns an error if configuration, farm construction, or reading stdin
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args().nth(1);
    let config = load_config(Path::new(config_path.as_deref().unwrap_or(CONFIG_FILE)))?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        plot_count = config.grid.plot_count,
        sale_rate = %config.economy.sale_rate,
        seed_unit_price = %config.ledger.seed_unit_price,
        remote_timeout_ms = config.ledger.remote_timeout_ms,
        simulated_latency = ?config.ledger.simulated_latency(),
        "Configuration loaded"
    );

    // 3. Build the farm.
    let ledger = SimulatedLedger::new(&config.ledger);
    let farm = FarmController::new(&config, ledger).map_err(EngineError::from)?;
    info!(
        wallet_connected = farm.gateway().is_connected(),
        "Farm ready"
    );

    // 4. Log committed changes as they happen.
    let events = tokio::spawn(log_events(farm.subscribe()));

    // 5. Command loop.
    println!("{}", console::render_farm(&farm.snapshot().await));
    println!("type `help` for commands");
    run_console(&farm).await?;

    let aborted = farm.scheduler().disarm_all().await;
    events.abort();
    info!(pending_timelines = aborted, "saverville-engine shutdown complete");
    Ok(())
}

/// Load the farm configuration, falling back to defaults when the file is
/// missing.
fn load_config(path: &Path) -> Result<FarmConfig, EngineError> {
    if path.exists() {
        Ok(FarmConfig::from_file(path)?)
    } else {
        let mut config = FarmConfig::default();
        config.ledger.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so they do
/// not interleave with the rendered farm.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Read and execute commands until `quit` or end of input.
async fn run_console(farm: &FarmController<SimulatedLedger>) -> Result<(), EngineError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        debug!(?command, "command received");

        let result = match command {
            Command::Buy(quantity) => farm.request_purchase(quantity).await,
            Command::Plant(index) => farm.request_plant(index).await,
            Command::Water(index) => farm.request_water(index).await,
            Command::Harvest(index) => farm.request_harvest(index).await,
            Command::Click(index) => farm.request_click(index).await,
            Command::Sell => farm.request_sell().await,
            Command::Mode(mode) => {
                farm.set_mode(mode).await;
                println!("mode: {mode}");
                continue;
            }
            Command::Show => {
                println!("{}", console::render_farm(&farm.snapshot().await));
                continue;
            }
            Command::Json => {
                println!("{}", serde_json::to_string_pretty(&farm.snapshot().await)?);
                continue;
            }
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => break,
        };
        println!("{}", console::render_notification(&notify::outcome(&result)));
    }
    Ok(())
}

/// Log every committed farm change.
async fn log_events(mut events: broadcast::Receiver<FarmEvent>) {
    loop {
        match events.recv().await {
            Ok(FarmEvent::PlotChanged { plot, previous }) => {
                info!(index = plot.index, from = %previous, to = %plot.state, "plot changed");
            }
            Ok(FarmEvent::EconomyChanged { economy }) => {
                debug!(
                    seeds = economy.seed_inventory,
                    plants = economy.harvested_inventory,
                    balance = %economy.currency_balance,
                    "economy changed"
                );
            }
            Ok(FarmEvent::ModeChanged { mode }) => debug!(%mode, "mode changed"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "event logger fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
