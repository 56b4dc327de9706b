//! Sampling and control engine modules
//!
//! Contains the history buffer, filter, sampler, controller and shutdown guard.

mod controller;
mod filter;
mod history;
mod sampler;
mod shutdown;

pub use controller::{Controller, Decision, Rule};
pub use filter::{average_distance, partition, safe_to_fill, Partition};
pub use history::HistoryBuffer;
pub use sampler::Sampler;
pub use shutdown::ShutdownGuard;
