//! Operator command line

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;
use wl_core::{Config, Result};

#[derive(Parser, Debug)]
#[command(name = "waterlevel")]
#[command(version)]
#[command(about = "Waterlevel operator tools - valve override and sensor diagnostics")]
pub struct Cli {
    /// Configuration file (JSON); defaults to $WATERLEVEL_CONFIG or /etc/waterlevel/config.json
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Drive the valve pin low and exit
    CloseValve {
        /// GPIO pin connected to the water solenoid valve
        #[arg(long, value_name = "PIN")]
        valve_pin: Option<String>,
    },
    /// Take a burst of sensor readings and report their average
    Distance {
        /// GPIO pin connected to the HC-SR04 echo pin
        #[arg(long, value_name = "PIN")]
        echo_pin: Option<String>,

        /// GPIO pin connected to the HC-SR04 trigger pin
        #[arg(long, value_name = "PIN")]
        trigger_pin: Option<String>,

        /// Number of readings, 100 ms apart
        #[arg(short = 'n', long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=1000))]
        samples: u32,
    },
}

impl Cli {
    /// Configuration for the selected command, flags applied
    ///
    /// `close-valve` needs nothing but a pin, so an unreadable or invalid file
    /// never stops it: it falls back to the defaults and is not validated.
    pub fn load_config(&self) -> Result<Config> {
        let loaded = Config::load_or_default(self.config.as_deref());

        let mut config = match (&self.command, loaded) {
            (_, Ok(config)) => config,
            (Command::CloseValve { .. }, Err(e)) => {
                warn!(error = %e, "Ignoring configuration file, using default valve pin");
                Config::default()
            }
            (_, Err(e)) => return Err(e),
        };
        self.command.apply_to(&mut config);

        if let Command::Distance { .. } = self.command {
            config.validate()?;
        }
        Ok(config)
    }
}

impl Command {
    /// Overlay pin flags onto the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        match self {
            Self::CloseValve { valve_pin } => {
                if let Some(pin) = valve_pin {
                    config.pins.valve = pin.clone();
                }
            }
            Self::Distance {
                echo_pin,
                trigger_pin,
                ..
            } => {
                if let Some(pin) = echo_pin {
                    config.pins.echo = pin.clone();
                }
                if let Some(pin) = trigger_pin {
                    config.pins.trigger = pin.clone();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_valve_defaults_to_config_pin() {
        let cli = Cli::try_parse_from(["waterlevel", "close-valve"]).unwrap();
        let mut config = Config::default();
        cli.command.apply_to(&mut config);
        assert_eq!(config.pins.valve, "5");
    }

    #[test]
    fn test_distance_flags() {
        let cli = Cli::try_parse_from([
            "waterlevel",
            "distance",
            "--echo-pin",
            "BCM20",
            "-n",
            "25",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::Distance {
                echo_pin: Some("BCM20".into()),
                trigger_pin: None,
                samples: 25,
            }
        );

        let mut config = Config::default();
        cli.command.apply_to(&mut config);
        assert_eq!(config.pins.echo, "BCM20");
        assert_eq!(config.pins.trigger, "16");
    }

    #[test]
    fn test_distance_rejects_zero_samples() {
        assert!(Cli::try_parse_from(["waterlevel", "distance", "-n", "0"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["waterlevel", "close-valve", "--config", "/tmp/wl.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/wl.json")));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["waterlevel"]).is_err());
    }
}
