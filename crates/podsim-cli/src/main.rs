//! podsim CLI
//!
//! Runs scheduling passes locally and talks to the podsim daemon.

mod commands;
mod render;

use clap::{Parser, Subcommand};
use podsim_core::Strategy;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// podsim - pod placement simulator
#[derive(Parser, Debug)]
#[command(name = "podsim")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Daemon API address
    #[arg(long, default_value = "http://localhost:8080", global = true)]
    api: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Schedule a workload onto a cluster locally
    Schedule {
        /// Path to the cluster definition (JSON or TOML)
        #[arg(long, default_value = "configs/cluster.example.json")]
        cluster: PathBuf,

        /// Path to the workload definition (JSON or TOML)
        #[arg(long, default_value = "configs/workload.example.json")]
        workload: PathBuf,

        /// Placement strategy (binpack, spread)
        #[arg(long, default_value = "binpack")]
        strategy: Strategy,

        /// Print final node utilization after scheduling
        #[arg(long)]
        state: bool,

        /// Print decisions and final cluster as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store a scenario on the daemon
    Submit {
        /// Scenario name
        name: String,

        /// Path to the cluster definition
        #[arg(long)]
        cluster: PathBuf,

        /// Path to the workload definition
        #[arg(long)]
        workload: PathBuf,

        /// Placement strategy for runs of this scenario
        #[arg(long)]
        strategy: Option<Strategy>,
    },

    /// List stored scenarios
    Scenarios,

    /// Run a stored scenario on the daemon
    Run {
        /// Scenario name or ID
        scenario: String,

        /// Override the scenario's strategy
        #[arg(long)]
        strategy: Option<Strategy>,

        /// Print final node utilization
        #[arg(long)]
        state: bool,
    },

    /// List runs
    Runs,

    /// Show a run
    Show {
        /// Run ID
        run: String,

        /// Print final node utilization
        #[arg(long)]
        state: bool,
    },

    /// Show daemon status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let client = commands::ApiClient::new(&cli.api);

    match cli.command {
        Commands::Schedule {
            cluster,
            workload,
            strategy,
            state,
            json,
        } => {
            commands::schedule(&cluster, &workload, strategy, state, json)?;
        }
        Commands::Submit {
            name,
            cluster,
            workload,
            strategy,
        } => {
            commands::submit(&client, name, &cluster, &workload, strategy).await?;
        }
        Commands::Scenarios => {
            commands::scenarios(&client).await?;
        }
        Commands::Run {
            scenario,
            strategy,
            state,
        } => {
            commands::run(&client, scenario, strategy, state).await?;
        }
        Commands::Runs => {
            commands::runs(&client).await?;
        }
        Commands::Show { run, state } => {
            commands::show(&client, run, state).await?;
        }
        Commands::Status => {
            commands::status(&client).await?;
        }
    }

    Ok(())
}
