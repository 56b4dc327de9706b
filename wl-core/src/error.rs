//! Error types re-exported from wl-error

pub use wl_error::{exit_code, Result, WaterLevelError};
