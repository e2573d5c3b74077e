//! Command layer of the `goluau` binary: project configuration and the
//! `translate` and `build` commands.

pub mod commands;
pub mod config;

pub use config::{CONFIG_FILE, GoluauConfig, TransformConfig};
