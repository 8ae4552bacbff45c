mod commands;
mod context;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gateflow")]
#[command(about = "Deploy MCP protocol-translation gateways from a single JSON config", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the gateway stack (create or update every resource)
    Deploy {
        /// Path to the deployment config
        #[arg(short, long, env = "GATEFLOW_CONFIG")]
        config: Option<PathBuf>,
        /// AWS profile to use
        #[arg(long)]
        profile: Option<String>,
        /// Apply without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Tear down every deployed resource in reverse dependency order
    Destroy {
        /// Path to the deployment config
        #[arg(short, long, env = "GATEFLOW_CONFIG")]
        config: Option<PathBuf>,
        /// AWS profile to use
        #[arg(long)]
        profile: Option<String>,
        /// Destroy without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show what a deploy would change, without touching anything
    Plan {
        /// Path to the deployment config
        #[arg(short, long, env = "GATEFLOW_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Validate the config and render every schema template
    Validate {
        /// Path to the deployment config
        #[arg(short, long, env = "GATEFLOW_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the deployed stack's outputs as JSON
    Outputs {
        /// Path to the deployment config
        #[arg(short, long, env = "GATEFLOW_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("GATEFLOW_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Deploy {
            config,
            profile,
            yes,
        } => {
            commands::deploy::handle(config, profile, yes).await?;
        }
        Commands::Destroy {
            config,
            profile,
            yes,
        } => {
            commands::destroy::handle(config, profile, yes).await?;
        }
        Commands::Plan { config } => {
            commands::plan::handle(config).await?;
        }
        Commands::Validate { config } => {
            commands::validate::handle(config)?;
        }
        Commands::Outputs { config } => {
            commands::outputs::handle(config).await?;
        }
        Commands::Version => {
            println!("gateflow {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
