//! stompbox - host simulator and preset tools for the stompbox engine.

mod codec;
mod commands;
mod stall;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stompbox")]
#[command(author, version, about = "Guitar multi-effects engine host simulator", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a WAV file through the engine on simulated codec timing
    Process(commands::process::ProcessArgs),

    /// List effects and their parameters
    Effects(commands::effects::EffectsArgs),

    /// List, show, validate and save presets
    Preset(commands::preset::PresetArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Effects(args) => commands::effects::run(args),
        Commands::Preset(args) => commands::preset::run(args),
    }
}
