mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "podsd")]
#[command(about = "Generate systemd units for grouped podman containers")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a configuration and write its unit files
    Generate {
        /// Configuration file (TOML)
        #[arg(long)]
        configuration: PathBuf,

        /// Directory the unit files are written to
        #[arg(long)]
        output_directory: PathBuf,

        /// Container runtime used in Exec lines
        #[arg(long, default_value = "/usr/bin/podman")]
        podman: PathBuf,

        /// Print the units instead of writing them
        #[arg(long, short = 'n')]
        dry_run: bool,
    },

    /// Load and validate a configuration without generating anything
    Check {
        #[arg(long)]
        configuration: PathBuf,
    },

    /// Show every element with its unit and slice names
    List {
        #[arg(long)]
        configuration: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let args = Args::parse();

    let result = match args.command {
        Command::Generate {
            configuration,
            output_directory,
            podman,
            dry_run,
        } => commands::generate(&configuration, &output_directory, podman, dry_run).await,
        Command::Check { configuration } => commands::check(&configuration).await,
        Command::List { configuration } => commands::list(&configuration).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            for error in e.to_structured() {
                log::error!("{}", error);
            }
            ExitCode::FAILURE
        }
    }
}
