use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use wl_core::error::exit_code;
use wl_core::WaterLevelError;

use waterlevel::cli::{Cli, Command};
use waterlevel::commands;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;

    match &cli.command {
        Command::CloseValve { .. } => commands::close_valve(&config),
        Command::Distance { samples, .. } => {
            let mut stdout = std::io::stdout().lock();
            commands::distance(&config, *samples, &mut stdout).map(|_| ())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    // SAFETY: geteuid is always safe - it just returns the process's effective user ID.
    if unsafe { libc::geteuid() } != 0 {
        warn!("Not running as root - GPIO export may be refused");
    }

    if let Err(e) = run(&cli) {
        let code = e
            .downcast_ref::<WaterLevelError>()
            .map(WaterLevelError::exit_code)
            .unwrap_or(exit_code::PLATFORM_INIT);
        error!("{:#}", e);
        std::process::exit(code);
    }
}
