use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cmd::commands::{init_command, load_command};
use cmd::common::{
    DEFAULT_CONFIG_FILE, LoadOverrides, default_log_level, get_config_path_with_override,
};
use cmd::error_utils::exit_code_for;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "graphload")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log load progress (same as GRAPHLOAD_LOG=info)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example configuration file
    Init {
        /// Where to write it
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
    /// Load the configured CSV file into the graph
    Load(LoadArgs),
}

#[derive(Args)]
struct LoadArgs {
    /// Configuration file (default: $GRAPHLOAD_CONFIG, then config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Records per write transaction, overriding LOAD.BATCH_SIZE
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Node label, overriding LOAD.LABEL
    #[arg(short, long)]
    label: Option<String>,
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => init_command(&path),
        Commands::Load(args) => {
            let config_path = get_config_path_with_override(args.config);
            let overrides = LoadOverrides {
                batch_size: args.batch_size,
                label: args.label,
            };
            load_command(&config_path, &overrides).await.map(|_| ())
        }
    }
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    diagnostics::init_with_default(default_log_level(cli.verbose));

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Printed directly so it shows even with GRAPHLOAD_LOG=off
            eprintln!("graphload: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}
