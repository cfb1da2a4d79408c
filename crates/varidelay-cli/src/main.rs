//! varidelay CLI - run the delay engine, inspect MIDI, probe offline.

mod commands;
mod logging;

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Parser, Subcommand};
use varidelay_config::{LOG_LEVELS, Settings};

#[derive(Parser)]
#[command(name = "varidelay")]
#[command(author, version, about = "MIDI-controlled variable delay", long_about = None)]
struct Cli {
    /// Settings file (default: the user config directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Log level, overriding the settings file
    #[arg(long, global = true, value_parser = PossibleValuesParser::new(LOG_LEVELS))]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine until Ctrl+C
    Run(commands::run::RunArgs),

    /// Print incoming MIDI messages until Ctrl+C
    Monitor(commands::monitor::MonitorArgs),

    /// List audio devices and MIDI input ports
    Devices,

    /// Send an impulse through an offline session and report the echo
    Probe(commands::probe::ProbeArgs),

    /// Show or write the settings file
    Config(commands::config::ConfigArgs),
}

impl Commands {
    fn uses_settings(&self) -> bool {
        match self {
            Commands::Run(_) | Commands::Monitor(_) => true,
            Commands::Config(args) => args.shows_effective(),
            Commands::Devices | Commands::Probe(_) => false,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = if cli.command.uses_settings() {
        Some(Settings::load_or_default(cli.config.as_deref())?)
    } else {
        None
    };
    logging::init(
        cli.verbose,
        cli.log_level.as_deref(),
        settings.as_ref().map(|s| s.log.level.as_str()),
    );

    let settings = settings.unwrap_or_default();
    match cli.command {
        Commands::Run(args) => commands::run::run(args, settings),
        Commands::Monitor(args) => commands::monitor::run(args, &settings),
        Commands::Config(args) => commands::config::run(args, &settings, cli.config.as_deref()),
        Commands::Devices => commands::devices::run(),
        Commands::Probe(args) => commands::probe::run(args),
    }
}
