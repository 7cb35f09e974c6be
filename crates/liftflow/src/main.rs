mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "liftflow")]
#[command(about = "Declarative GameLift fleets and aliases, written in KDL", long_about = None)]
struct Cli {
    /// Project file (liftflow.kdl); discovered from the current directory when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the project file without contacting AWS
    Validate,
    /// Show what apply would change
    Plan,
    /// Create, update and delete resources to match the project file
    Apply {
        /// Apply without asking for confirmation
        #[arg(short = 'y', long = "yes", env = "LIFTFLOW_AUTO_APPROVE")]
        yes: bool,
    },
    /// Delete managed resources
    Destroy {
        /// Single resource to destroy (e.g. fleet:game); everything when omitted
        target: Option<String>,
        /// Destroy without asking for confirmation
        #[arg(short = 'y', long = "yes", env = "LIFTFLOW_AUTO_APPROVE")]
        yes: bool,
    },
    /// Show resources recorded in state
    Show {
        /// Re-read every resource from GameLift first
        #[arg(short, long)]
        refresh: bool,
        /// Print the raw state as JSON
        #[arg(long)]
        json: bool,
    },
    /// List failure events recorded for a fleet
    Events {
        /// Fleet name from the project, or a GameLift fleet ID
        fleet: String,
    },
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,liftflow_cloud_aws=info")),
        )
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Validate => commands::validate::handle(config).await,
        Commands::Plan => commands::plan::handle(config).await,
        Commands::Apply { yes } => commands::apply::handle(config, yes).await,
        Commands::Destroy { target, yes } => {
            commands::destroy::handle(config, target.as_deref(), yes).await
        }
        Commands::Show { refresh, json } => commands::show::handle(config, refresh, json).await,
        Commands::Events { fleet } => commands::events::handle(config, &fleet).await,
        Commands::Version => {
            println!("liftflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
