//! TaskQueue Demo - Main Entry Point
//! Registers named queues, then runs one of the driver scenarios against them.

mod scenarios;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use taskqueue_core::TaskQueueManager;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_QUEUE: &str = "worker";
const DEFAULT_LOG_FILTER: &str = "taskqueue=info";

#[derive(Parser)]
#[command(name = "taskqueue-demo")]
#[command(about = "Exercise named task queues and the pool executor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Queues to register at startup (comma separated)
    #[arg(long, env = "TASKQUEUE_QUEUES", value_delimiter = ',', default_value = DEFAULT_QUEUE)]
    queues: Vec<String>,

    /// Log output format
    #[arg(long, env = "TASKQUEUE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Post many no-op tasks and report throughput
    Bench {
        /// Number of tasks to post
        #[arg(short = 'n', long, default_value = "1000000")]
        iterations: u64,

        /// Target queue (default: first registered queue)
        #[arg(short, long)]
        queue: Option<String>,
    },

    /// Run the ordering and identity scenarios and print what was observed
    Scenario,

    /// Exercise the pool executor (dispatch + sync)
    Pool {
        /// Number of dispatched tasks
        #[arg(short = 'n', long, default_value = "1000")]
        tasks: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()
                .context("Failed to install JSON subscriber")?;
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init()
                .context("Failed to install pretty subscriber")?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    init_logging(cli.log_format)?;
    info!("TaskQueue demo v{} starting...", VERSION);

    // 2. Registry owned by the composition root, handed to every scenario
    let manager = TaskQueueManager::new();
    let created = manager
        .create(&cli.queues)
        .context("Failed to create task queues")?;
    info!(created = created, queues = ?manager.names(), "Registry ready");

    // 3. Run the requested scenario against the first configured queue
    let first_queue = cli
        .queues
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_QUEUE.to_string());
    match cli.command {
        Commands::Bench { iterations, queue } => {
            let name = queue.unwrap_or(first_queue);
            scenarios::bench(&manager, &name, iterations)?;
        }
        Commands::Scenario => scenarios::ordering(&manager, &first_queue)?,
        Commands::Pool { tasks } => scenarios::pool(tasks)?,
    }

    // 4. Queues are torn down with the registry
    drop(manager);
    info!("Shutdown complete.");

    Ok(())
}
