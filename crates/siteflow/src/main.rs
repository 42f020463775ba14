mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use siteflow_config::StackConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "site")]
#[command(about = "Declare and deploy the static blog hosting stack", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the CloudFormation template
    Synth {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Hosted zone id, skipping the Route 53 lookup
        #[arg(long)]
        zone_id: Option<String>,
    },
    /// Build the stack and report its resource graph
    Validate {
        /// Hosted zone id, skipping the Route 53 lookup
        #[arg(long)]
        zone_id: Option<String>,
    },
    /// Show what an apply would change
    Plan {
        /// Hosted zone id, skipping the Route 53 lookup
        #[arg(long)]
        zone_id: Option<String>,
    },
    /// Deploy the stack
    Up {
        /// Hosted zone id, skipping the Route 53 lookup
        #[arg(long)]
        zone_id: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Tear the stack down
    Down {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the deployed stack status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt::init();

    let config = match StackConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            eprintln!();
            eprintln!(
                "{}",
                "Required: AWS_ACCOUNT_NUMBER, AWS_REGION, DOMAIN_NAME, BASE_DOMAIN,".yellow()
            );
            eprintln!("{}", "          REPO_OWNER, REPO_NAME, REPO_BRANCH".yellow());
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Synth { output, zone_id } => {
            commands::synth::handle(&config, output, zone_id).await?;
        }
        Commands::Validate { zone_id } => {
            commands::validate::handle(&config, zone_id).await?;
        }
        Commands::Plan { zone_id } => {
            commands::plan::handle(&config, zone_id).await?;
        }
        Commands::Up { zone_id, yes } => {
            commands::up::handle(&config, zone_id, yes).await?;
        }
        Commands::Down { yes } => {
            commands::down::handle(&config, yes).await?;
        }
        Commands::Status => {
            commands::status::handle(&config).await?;
        }
    }

    Ok(())
}
