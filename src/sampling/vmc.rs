//! Drift-diffusion Variational Monte Carlo driven through the energy record.
//!
//! Each step refreshes the record for the current walkers, accepts or rejects
//! every walker's proposed move, and starts a new epoch so the next step
//! recomputes against the updated positions and a fresh proposal.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::stats;
use crate::cache::{CacheError, SimulationContext};
use crate::kernel::{KernelError, LocalEnergyKernel, WalkerSet};

#[derive(Error, Debug)]
pub enum SamplingError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("invalid sampling parameters: {0}")]
    InvalidParams(String),
}

/// Parameters for a drift-diffusion VMC run.
#[derive(Copy, Clone, Debug)]
pub struct VmcParams {
    pub n_walkers: usize,
    pub n_dim: usize,
    pub n_steps: usize,
    /// Width of the Gaussian the walkers start from
    pub init_sigma: f64,
    /// Log progress every this many steps (0 disables)
    pub log_interval: usize,
}

/// Outcome of a single step.
#[derive(Copy, Clone, Debug)]
pub struct StepStats {
    pub mean_energy: f64,
    pub accepted: usize,
}

/// Results of a VMC run.
#[derive(Clone, Debug)]
pub struct VmcResults {
    pub energy: f64,
    pub error: f64,
    pub autocorrelation_time: f64,
    pub acceptance_ratio: f64,
    /// Mean local energy of each step
    pub energies: Vec<f64>,
}

pub struct DriftDiffusionVmc<K: LocalEnergyKernel> {
    kernel: K,
    context: SimulationContext,
    walkers: WalkerSet,
    params: VmcParams,
    rng: StdRng,
}

impl<K: LocalEnergyKernel> DriftDiffusionVmc<K> {
    /// Set up the context and draw the initial walkers.
    pub fn new(kernel: K, params: VmcParams, seed: Option<u64>) -> Result<Self, SamplingError> {
        if params.n_steps == 0 {
            return Err(SamplingError::InvalidParams("n_steps must be positive".into()));
        }
        let context = SimulationContext::with_walkers(params.n_walkers, params.n_dim)?;
        let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let walkers = WalkerSet::gaussian(params.n_walkers, params.n_dim, params.init_sigma, &mut rng)?;

        Ok(Self { kernel, context, walkers, params, rng })
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn walkers(&self) -> &WalkerSet {
        &self.walkers
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Perform one drift-diffusion step over all walkers.
    pub fn step(&mut self) -> Result<StepStats, SamplingError> {
        let fields = self.context.refresh_all(&mut self.kernel, &self.walkers)?;
        let mean_energy = fields.local.mean();

        let mut accepted = 0;
        for i in 0..self.walkers.walk_num() {
            if self.rng.gen::<f64>() < fields.acceptance[(i, 0)] {
                self.walkers.displace(i, fields.proposed_move);
                accepted += 1;
            }
        }

        if !self.context.is_ready() {
            self.context.mark_ready()?;
        }
        // positions moved and the proposal has been spent either way
        self.context.invalidate_all();

        Ok(StepStats { mean_energy, accepted })
    }

    /// Run the full simulation.
    pub fn run(&mut self) -> Result<VmcResults, SamplingError> {
        let mut energies = Vec::with_capacity(self.params.n_steps);
        let mut accepted_total = 0;

        for step in 0..self.params.n_steps {
            let stats = self.step()?;
            energies.push(stats.mean_energy);
            accepted_total += stats.accepted;

            let interval = self.params.log_interval;
            if interval > 0 && (step + 1) % interval == 0 {
                info!(
                    "step {}: energy {:.6} Ha, accepted {}/{}",
                    step + 1,
                    stats.mean_energy,
                    stats.accepted,
                    self.params.n_walkers
                );
            }
        }

        let total_moves = self.params.n_steps * self.params.n_walkers;
        let acceptance_ratio = accepted_total as f64 / total_moves as f64;
        debug!("run finished at record version {}", self.context.current_version());

        Ok(Self::compute_results(energies, acceptance_ratio))
    }

    /// Compute final statistics from energy samples.
    fn compute_results(energies: Vec<f64>, acceptance_ratio: f64) -> VmcResults {
        let energy = stats::mean(&energies);
        let autocorrelation_time = stats::autocorrelation_time(&energies);
        let error = stats::blocking_error(&energies, autocorrelation_time);

        VmcResults { energy, error, autocorrelation_time, acceptance_ratio, energies }
    }
}
