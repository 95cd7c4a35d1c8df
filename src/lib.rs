//! QMC local energy - version-gated local-energy records for Quantum Monte Carlo.
//!
//! The crate keeps per-walker kinetic, potential and local energies,
//! acceptance probabilities, drift vectors and proposed moves, each stamped
//! with the epoch it was computed in, and recomputes them lazily through a
//! numerical kernel when the simulation state moves on.

pub mod cache;
pub mod kernel;
pub mod sampling;
pub mod io;


// Re-export commonly used types at crate root
pub use cache::{CacheError, EnergyField, EnergyRecord, FreshFields, SimulationContext, VersionClock};
pub use kernel::{HarmonicKernel, KernelError, LocalEnergyKernel, WalkerSet};
pub use sampling::{DriftDiffusionVmc, SamplingError, StepStats, VmcParams, VmcResults};
pub use io::{parse_config, read_config, ConfigError, SimulationConfig};
