//! YAML configuration for a VMC run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::{HarmonicKernel, KernelError};
use crate::sampling::VmcParams;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot open config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Simulation settings. Missing keys fall back to [`SimulationConfig::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub walkers: usize,
    pub dimensions: usize,
    pub steps: usize,
    pub time_step: f64,
    pub alpha: f64,
    pub omega: f64,
    pub init_sigma: f64,
    pub seed: Option<u64>,
    pub log_interval: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            walkers: 100,
            dimensions: 3,
            steps: 10_000,
            time_step: 0.05,
            alpha: 0.5,
            omega: 1.0,
            init_sigma: 1.0,
            seed: None,
            log_interval: 1000,
        }
    }
}

impl SimulationConfig {
    pub fn vmc_params(&self) -> VmcParams {
        VmcParams {
            n_walkers: self.walkers,
            n_dim: self.dimensions,
            n_steps: self.steps,
            init_sigma: self.init_sigma,
            log_interval: self.log_interval,
        }
    }

    /// Harmonic kernel for these settings. A configured seed makes proposals reproducible.
    pub fn build_kernel(&self) -> Result<HarmonicKernel, KernelError> {
        let kernel = HarmonicKernel::new(self.alpha, self.omega, self.time_step)?;
        Ok(match self.seed {
            Some(seed) => kernel.with_seed(seed.wrapping_add(1)),
            None => kernel,
        })
    }
}

/// Read a [`SimulationConfig`] from a YAML file.
pub fn read_config(filename: impl AsRef<Path>) -> Result<SimulationConfig, ConfigError> {
    let path = filename.as_ref();
    let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);
    Ok(serde_yaml::from_reader(reader)?)
}

pub fn parse_config(text: &str) -> Result<SimulationConfig, ConfigError> {
    Ok(serde_yaml::from_str(text)?)
}

// example of yaml file
// walkers: 200
// dimensions: 3
// steps: 20000
// time_step: 0.05
// alpha: 0.45
// omega: 1.0
// seed: 42
