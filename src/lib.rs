//! Waterlevel operator tools
//!
//! Command line utilities that sit beside the `waterleveld` daemon: a manual
//! valve override and a sensor diagnostic. The control logic itself lives in
//! `wl_core`.

pub mod cli;
pub mod commands;
