//! Constants and configuration values for Waterlevel
//!
//! Centralizes all magic numbers, paths, and configuration defaults.
//! Other modules reference these instead of repeating literals.

use std::time::Duration;

/// System paths
pub mod paths {
    /// Base path of the Linux sysfs GPIO interface
    pub const SYSFS_GPIO_BASE: &str = "/sys/class/gpio";

    /// Default location of the daemon configuration file
    pub const DEFAULT_CONFIG_FILE: &str = "/etc/waterlevel/config.json";

    /// Environment variable overriding the configuration file location
    pub const CONFIG_ENV_VAR: &str = "WATERLEVEL_CONFIG";

    /// systemd journal socket, used to decide where logs go
    pub const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";
}

/// Sampler and controller cadence
pub mod timing {
    use super::Duration;

    /// Interval between two sensor readings
    pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

    /// Interval between two controller decisions
    pub const CONTROL_INTERVAL: Duration = Duration::from_secs(1);

    /// Longest the shutdown path waits for an in-flight controller valve write
    pub const SHUTDOWN_GATE_WAIT: Duration = Duration::from_millis(200);

    /// Settle time after exporting a sysfs GPIO pin before its attributes are writable
    pub const GPIO_EXPORT_SETTLE: Duration = Duration::from_millis(10);
}

/// Rolling history window
pub mod history {
    /// Number of slots kept in the history window
    pub const CAPACITY: usize = 10;

    /// Consecutive failed readings between two repeated sampler warnings
    pub const FAILURE_LOG_EVERY: u32 = 50;
}

/// Plausibility filter parameters
pub mod filter {
    /// Readings above this distance are spurious in diagnostics averaging (cm)
    pub const SPURIOUS_DISTANCE_CM: f32 = 200.0;

    /// Minimum number of plausible readings for a diagnostic average
    pub const MIN_DIAGNOSTIC_SAMPLES: usize = 3;

    /// Minimum number of in-range readings before the controller may act
    pub const MIN_VALID_SAMPLES: usize = 7;

    /// Above this many out-of-range readings (either side) the window is unsafe
    pub const MAX_OUT_OF_RANGE_SAMPLES: usize = 3;

    pub const REASON_DISTANCE_UNKNOWN: &str = "distance unknown";
    pub const REASON_INSUFFICIENT_HISTORY: &str = "insufficient history";
    pub const REASON_TOO_MANY_UNCERTAIN: &str = "too many uncertain values";
    pub const REASON_TOO_MANY_HIGH: &str = "too many high values";
    pub const REASON_TOO_MANY_LOW: &str = "too many low values";
}

/// Default water level thresholds, all distances from the sensor in cm
///
/// Smaller distance means fuller reservoir.
pub mod thresholds {
    /// Closer than this the water is at the rim
    pub const DEFAULT_TOP_CM: f32 = 4.0;

    /// Filling stops once the level is closer than this
    pub const DEFAULT_TARGET_CM: f32 = 8.0;

    /// Filling starts once the level is further than this
    pub const DEFAULT_FILL_CM: f32 = 12.0;

    /// Further than this is below the reservoir bottom (implausible)
    pub const DEFAULT_BOTTOM_CM: f32 = 30.0;
}

/// Default GPIO pin identifiers
pub mod pins {
    /// Solenoid valve output
    pub const DEFAULT_VALVE_PIN: &str = "5";

    /// HC-SR04 echo input
    pub const DEFAULT_ECHO_PIN: &str = "13";

    /// HC-SR04 trigger output
    pub const DEFAULT_TRIGGER_PIN: &str = "16";

    /// Accepted prefixes in front of a numeric pin identifier
    pub const NAME_PREFIXES: &[&str] = &["GPIO", "BCM"];
}

/// HC-SR04 ultrasonic ranging
pub mod hcsr04 {
    use super::Duration;

    /// Width of the trigger pulse
    pub const TRIGGER_PULSE: Duration = Duration::from_micros(10);

    /// Maximum wait for the echo line to rise after triggering
    pub const ECHO_START_TIMEOUT: Duration = Duration::from_millis(50);

    /// Maximum echo pulse width before the line is considered stuck
    pub const ECHO_END_TIMEOUT: Duration = Duration::from_millis(40);

    /// Poll spacing while waiting for an echo edge
    pub const POLL_INTERVAL: Duration = Duration::from_micros(10);

    /// Speed of sound at room temperature (cm/s)
    pub const SPEED_OF_SOUND_CM_PER_S: f32 = 34_300.0;

    /// Rated measuring range; readings outside it are flagged untrustworthy
    pub const MIN_RANGE_CM: f32 = 2.0;
    pub const MAX_RANGE_CM: f32 = 400.0;
}
