//! Waterlevel Daemon (waterleveld)
//!
//! Keeps a reservoir filled from a solenoid valve, watching the level with an
//! HC-SR04 ultrasonic sensor mounted above the water.
//!
//! # Tasks
//! - **Sampler**: one sensor reading every 100 ms into a 10-slot history
//! - **Controller**: once per second, filter the history and drive the valve
//! - **Signals**: SIGINT/SIGTERM close the valve before the process exits
//!
//! # Fail-safe
//! - Valve configured closed before anything else touches it
//! - Any doubt about the readings closes the valve
//! - The termination handler's close is the last valve write

mod cli;
mod logging;
mod loops;
mod signals;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use wl_core::constants::timing;
use wl_core::error::exit_code;
use wl_core::{
    init_platform, Config, Controller, GpioValve, HistoryBuffer, RangeSensor, Sampler,
    ShutdownGuard, WaterLevelError,
};

use crate::cli::Args;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the running daemon needs, built by [`startup`]
struct Daemon {
    config: Config,
    guard: Arc<ShutdownGuard>,
    sensor: RangeSensor,
}

/// Hardware control needs root for sysfs GPIO; warn, the gpio group may suffice
fn check_privileges() {
    // SAFETY: geteuid is always safe - it just returns the process's effective user ID.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        warn!(
            euid,
            "Not running as root - GPIO access may fail unless the user is in the gpio group"
        );
    } else {
        info!("Running as root");
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(args.config.as_deref())
        .context("loading configuration")?;
    args.apply_to(&mut config);
    config.validate().context("validating configuration")?;

    let t = &config.thresholds;
    info!(
        top_cm = t.top_cm,
        target_cm = t.target_cm,
        fill_cm = t.fill_cm,
        bottom_cm = t.bottom_cm,
        "STARTUP: thresholds"
    );
    info!(
        valve = %config.pins.valve,
        echo = %config.pins.echo,
        trigger = %config.pins.trigger,
        "STARTUP: pins"
    );
    Ok(config)
}

/// Bring the hardware up in fail-safe order
///
/// The valve comes first and is driven low as it is configured; the signal
/// handler is installed as soon as the valve exists, before the sensor.
fn startup(args: &Args) -> anyhow::Result<Daemon> {
    let config = load_config(args)?;

    init_platform().context("initialising GPIO")?;

    let valve = GpioValve::configure(&config.pins.valve).context("configuring valve")?;
    info!(pin = valve.pin_number(), "STARTUP: valve configured closed");

    let guard = Arc::new(ShutdownGuard::new(Arc::new(valve)));
    if let Err(e) = signals::install(guard.clone()) {
        // Without a handler a SIGTERM would leave the valve as it was
        guard.engage("signal handler unavailable");
        return Err(WaterLevelError::PlatformInit(format!("signal handler: {}", e)).into());
    }

    let sensor = RangeSensor::configure(&config.pins.echo, &config.pins.trigger)
        .context("configuring range sensor")?;
    info!("STARTUP: range sensor configured");

    Ok(Daemon {
        config,
        guard,
        sensor,
    })
}

/// Exit status for a startup failure; the typed error survives `context`
fn failure_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<WaterLevelError>()
        .map(WaterLevelError::exit_code)
        .unwrap_or(exit_code::PLATFORM_INIT)
}

#[tokio::main]
async fn main() {
    // PHASE 0: Panics are logged; a dead task is handled below
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        eprintln!("PANIC at {}: {}", location, panic_info);
    }));

    // PHASE 1: Arguments (clap handles --help/--version and exits)
    let args = Args::parse();

    // PHASE 2: Logging
    let (target, log_level) = logging::init();
    info!("STARTUP: waterleveld {} starting", VERSION);
    info!("STARTUP: Logging to {} (level {})", target.describe(), log_level);

    // PHASE 3: Privilege check
    check_privileges();

    // PHASE 4: Configuration, GPIO, valve, signal handler, sensor
    let daemon = match startup(&args) {
        Ok(daemon) => daemon,
        Err(e) => {
            let code = failure_code(&e);
            error!(exit_code = code, "STARTUP: {:#}", e);
            std::process::exit(code);
        }
    };

    // PHASE 5: Shared state
    let history = Arc::new(HistoryBuffer::new());
    let sampler = Arc::new(Sampler::new(Arc::new(daemon.sensor), history.clone()));
    let controller = Controller::new(daemon.config.thresholds, daemon.guard.clone());

    // PHASE 6: Background tasks
    let sampler_handle = tokio::spawn(loops::run_sampler(sampler, timing::SAMPLE_INTERVAL));
    let control_handle = tokio::spawn(loops::run_controller(
        controller,
        history,
        timing::CONTROL_INTERVAL,
    ));
    info!("STARTUP: sampler and controller running");

    // PHASE 7: Both loops run until a signal ends the process; either one
    // stopping means the valve is no longer supervised
    let which = tokio::select! {
        r = sampler_handle => ("sampler", r),
        r = control_handle => ("controller", r),
    };
    match which {
        (task, Err(e)) => error!(error = %e, "SHUTDOWN: {} task died", task),
        (task, Ok(())) => error!("SHUTDOWN: {} task stopped", task),
    }
    daemon.guard.engage("control task stopped");
    std::process::exit(exit_code::PLATFORM_INIT);
}
