//! Isotropic harmonic oscillator with a Gaussian trial function.
//!
//! V(r) = ½ω²r², ψ(r) = exp(-α r²). For α = ω/2 the trial function is the
//! exact ground state and every walker has local energy dω/2.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use super::error::KernelError;
use super::traits::LocalEnergyKernel;
use super::walkers::WalkerSet;

/// Drift-diffusion kernel for the harmonic oscillator.
#[derive(Clone, Debug)]
pub struct HarmonicKernel {
    /// Trial-function exponent α
    pub alpha: f64,
    /// Oscillator frequency ω
    pub omega: f64,
    /// Imaginary time step τ
    pub time_step: f64,
    rng: StdRng,
}

impl HarmonicKernel {
    pub fn new(alpha: f64, omega: f64, time_step: f64) -> Result<Self, KernelError> {
        for (name, value) in [("alpha", alpha), ("omega", omega), ("time_step", time_step)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(KernelError::InvalidParameter { name, value });
            }
        }
        Ok(Self {
            alpha,
            omega,
            time_step,
            rng: StdRng::from_entropy(),
        })
    }

    /// Reseed the proposal generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn per_walker<F>(&self, walkers: &WalkerSet, f: F) -> Result<DMatrix<f64>, KernelError>
    where
        F: Fn(f64) -> f64,
    {
        walkers.check_finite()?;
        Ok(DMatrix::from_fn(walkers.walk_num(), 1, |i, _| f(walkers.radius_squared(i))))
    }
}

impl LocalEnergyKernel for HarmonicKernel {
    fn kinetic_energy(&self, walkers: &WalkerSet) -> Result<DMatrix<f64>, KernelError> {
        let d = walkers.dim() as f64;
        let a = self.alpha;
        self.per_walker(walkers, |r2| a * d - 2.0 * a * a * r2)
    }

    fn potential_energy(&self, walkers: &WalkerSet) -> Result<DMatrix<f64>, KernelError> {
        let w2 = self.omega * self.omega;
        self.per_walker(walkers, |r2| 0.5 * w2 * r2)
    }

    fn drift(&self, walkers: &WalkerSet) -> Result<DMatrix<f64>, KernelError> {
        walkers.check_finite()?;
        let a = self.alpha;
        Ok(walkers.positions().map(|x| -2.0 * a * x))
    }

    fn proposed_move(
        &mut self,
        walkers: &WalkerSet,
        drift: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError> {
        walkers.check_vector_shape("drift", drift)?;
        let tau = self.time_step;
        let normal = Normal::new(0.0, tau.sqrt())
            .map_err(|_| KernelError::InvalidParameter { name: "time_step", value: tau })?;
        let rng = &mut self.rng;
        Ok(DMatrix::from_fn(drift.nrows(), drift.ncols(), |i, j| {
            drift[(i, j)] * tau + normal.sample(&mut *rng)
        }))
    }

    /// Metropolis-Hastings ratio with the drift-diffusion Green's function
    /// G(b <- a) ∝ exp(-|b - a - D(a)τ|² / 2τ), capped at 1.
    fn acceptance_probability(
        &self,
        walkers: &WalkerSet,
        drift: &DMatrix<f64>,
        proposed_move: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError> {
        walkers.check_finite()?;
        walkers.check_vector_shape("drift", drift)?;
        walkers.check_vector_shape("proposed move", proposed_move)?;

        let a = self.alpha;
        let tau = self.time_step;
        let positions = walkers.positions();
        Ok(DMatrix::from_fn(walkers.walk_num(), 1, |i, _| {
            let mut r2_old = 0.0;
            let mut r2_new = 0.0;
            let mut forward = 0.0;
            let mut backward = 0.0;
            for j in 0..walkers.dim() {
                let x = positions[(i, j)];
                let y = proposed_move[(i, j)];
                let x_new = x + y;
                let drift_new = -2.0 * a * x_new;
                r2_old += x * x;
                r2_new += x_new * x_new;
                forward += (y - drift[(i, j)] * tau).powi(2);
                backward += (-y - drift_new * tau).powi(2);
            }
            // ln |ψ(r')/ψ(r)|² + ln G(r <- r') - ln G(r' <- r)
            let log_ratio = -2.0 * a * (r2_new - r2_old) + (forward - backward) / (2.0 * tau);
            log_ratio.exp().min(1.0)
        }))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn sample_walkers() -> WalkerSet {
        let mut rng = StdRng::seed_from_u64(3);
        WalkerSet::gaussian(50, 3, 1.0, &mut rng).unwrap()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            HarmonicKernel::new(0.0, 1.0, 0.1),
            Err(KernelError::InvalidParameter { name: "alpha", .. })
        ));
        assert!(matches!(
            HarmonicKernel::new(0.5, f64::NAN, 0.1),
            Err(KernelError::InvalidParameter { name: "omega", .. })
        ));
        assert!(matches!(
            HarmonicKernel::new(0.5, 1.0, -0.1),
            Err(KernelError::InvalidParameter { name: "time_step", .. })
        ));
    }

    #[test]
    fn test_exact_ground_state_energy() {
        let kernel = HarmonicKernel::new(0.5, 1.0, 0.1).unwrap();
        let walkers = sample_walkers();
        let kin = kernel.kinetic_energy(&walkers).unwrap();
        let pot = kernel.potential_energy(&walkers).unwrap();
        let local = kernel.local_energy(&kin, &pot).unwrap();
        for i in 0..walkers.walk_num() {
            assert_relative_eq!(local[(i, 0)], 1.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_kinetic_energy_matches_finite_difference() {
        let kernel = HarmonicKernel::new(0.3, 1.0, 0.1).unwrap();
        let walkers = WalkerSet::new(DMatrix::from_row_slice(1, 3, &[0.4, -0.2, 0.9]));
        let h = 1e-4;
        let psi = |r: &[f64; 3]| (-kernel.alpha * r.iter().map(|x| x * x).sum::<f64>()).exp();

        let r = [0.4, -0.2, 0.9];
        let mut laplacian = 0.0;
        for axis in 0..3 {
            let mut fwd = r;
            let mut bwd = r;
            fwd[axis] += h;
            bwd[axis] -= h;
            laplacian += (psi(&fwd) - 2.0 * psi(&r) + psi(&bwd)) / (h * h);
        }
        let numerical = -0.5 * laplacian / psi(&r);

        let analytical = kernel.kinetic_energy(&walkers).unwrap()[(0, 0)];
        assert_relative_eq!(analytical, numerical, epsilon = 1e-5);
    }

    #[test]
    fn test_drift_is_log_gradient() {
        let kernel = HarmonicKernel::new(0.25, 1.0, 0.1).unwrap();
        let walkers = WalkerSet::new(DMatrix::from_row_slice(2, 2, &[1.0, -2.0, 0.0, 4.0]));
        let drift = kernel.drift(&walkers).unwrap();
        assert_relative_eq!(drift[(0, 0)], -0.5);
        assert_relative_eq!(drift[(0, 1)], 1.0);
        assert_relative_eq!(drift[(1, 1)], -2.0);
    }

    #[test]
    fn test_zero_move_is_always_accepted() {
        let kernel = HarmonicKernel::new(0.4, 1.0, 0.05).unwrap();
        let walkers = sample_walkers();
        let drift = kernel.drift(&walkers).unwrap();
        let zero = DMatrix::zeros(walkers.walk_num(), walkers.dim());
        let accept = kernel.acceptance_probability(&walkers, &drift, &zero).unwrap();
        for i in 0..walkers.walk_num() {
            assert_relative_eq!(accept[(i, 0)], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_acceptance_is_a_probability() {
        let mut kernel = HarmonicKernel::new(0.4, 1.0, 0.5).unwrap().with_seed(21);
        let walkers = sample_walkers();
        let drift = kernel.drift(&walkers).unwrap();
        let moves = kernel.proposed_move(&walkers, &drift).unwrap();
        let accept = kernel.acceptance_probability(&walkers, &drift, &moves).unwrap();
        assert!(accept.iter().all(|&p| p > 0.0 && p <= 1.0));
    }

    #[test]
    fn test_seeded_moves_are_reproducible() {
        let walkers = sample_walkers();
        let mut k1 = HarmonicKernel::new(0.5, 1.0, 0.1).unwrap().with_seed(5);
        let mut k2 = HarmonicKernel::new(0.5, 1.0, 0.1).unwrap().with_seed(5);
        let drift = k1.drift(&walkers).unwrap();
        assert_eq!(
            k1.proposed_move(&walkers, &drift).unwrap(),
            k2.proposed_move(&walkers, &drift).unwrap()
        );
    }

    #[test]
    fn test_move_rejects_wrong_drift_shape() {
        let mut kernel = HarmonicKernel::new(0.5, 1.0, 0.1).unwrap();
        let walkers = sample_walkers();
        let drift = DMatrix::zeros(walkers.walk_num(), 1);
        assert!(matches!(
            kernel.proposed_move(&walkers, &drift),
            Err(KernelError::ShapeMismatch { what: "drift", .. })
        ));
    }
}
