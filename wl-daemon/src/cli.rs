//! Command line flags for the daemon
//!
//! Every flag is optional; anything not given falls back to the configuration
//! file and then to the built-in defaults.

use std::path::PathBuf;

use clap::Parser;
use wl_core::Config;

#[derive(Parser, Debug, Default)]
#[command(name = "waterleveld")]
#[command(version)]
#[command(about = "Waterlevel daemon - keeps a reservoir filled using an ultrasonic sensor and a solenoid valve")]
#[command(long_about = "Waterlevel daemon - keeps a reservoir filled using an ultrasonic sensor and a solenoid valve

Samples the range sensor every 100 ms, decides once per second, and closes
the valve on SIGINT/SIGTERM before exiting.

EXIT CODES:
    1  GPIO platform initialisation failed
    2  Unknown GPIO pin name
    3  Valve output pin could not be configured
    4  Range sensor pins could not be configured
    5  Invalid configuration

ENVIRONMENT VARIABLES:
    WATERLEVEL_LOG       Log level (trace, debug, info, warn, error)
    WATERLEVEL_CONFIG    Configuration file, if --config is not given

FILES:
    /etc/waterlevel/config.json   Default configuration file")]
pub struct Args {
    /// Configuration file (JSON)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GPIO pin connected to the water solenoid valve
    #[arg(long, value_name = "PIN")]
    pub valve_pin: Option<String>,

    /// GPIO pin connected to the HC-SR04 echo pin
    #[arg(long, value_name = "PIN")]
    pub echo_pin: Option<String>,

    /// GPIO pin connected to the HC-SR04 trigger pin
    #[arg(long, value_name = "PIN")]
    pub trigger_pin: Option<String>,

    /// Distance (cm) below which the water is at the rim
    #[arg(long, value_name = "CM")]
    pub top_cm: Option<f32>,

    /// Distance (cm) at which filling stops
    #[arg(long, value_name = "CM")]
    pub target_cm: Option<f32>,

    /// Distance (cm) at which filling starts
    #[arg(long, value_name = "CM")]
    pub fill_cm: Option<f32>,

    /// Distance (cm) beyond which a reading is below the reservoir bottom
    #[arg(long, value_name = "CM")]
    pub bottom_cm: Option<f32>,
}

impl Args {
    /// Overlay the flags that were given onto a loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(pin) = &self.valve_pin {
            config.pins.valve = pin.clone();
        }
        if let Some(pin) = &self.echo_pin {
            config.pins.echo = pin.clone();
        }
        if let Some(pin) = &self.trigger_pin {
            config.pins.trigger = pin.clone();
        }

        let t = &mut config.thresholds;
        for (flag, field) in [
            (self.top_cm, &mut t.top_cm),
            (self.target_cm, &mut t.target_cm),
            (self.fill_cm, &mut t.fill_cm),
            (self.bottom_cm, &mut t.bottom_cm),
        ] {
            if let Some(value) = flag {
                *field = value;
            }
        }
    }
}
