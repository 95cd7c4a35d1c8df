//! IO module - configuration and file handling.

mod config;

pub use config::{parse_config, read_config, ConfigError, SimulationConfig};
