//! Sampling module - Monte Carlo drivers built on the energy record.

pub mod stats;
mod vmc;

pub use vmc::{DriftDiffusionVmc, SamplingError, StepStats, VmcParams, VmcResults};
