//! Traits for the numerical routines behind each energy field.

use nalgebra::DMatrix;

use super::error::KernelError;
use super::walkers::WalkerSet;

/// One recompute routine per field of the energy record.
///
/// Scalar quantities are returned as `walk_num x 1` matrices, drift and
/// moves as `walk_num x dim`.
pub trait LocalEnergyKernel {
    /// Kinetic energy -½∇²ψ/ψ of each walker.
    fn kinetic_energy(&self, walkers: &WalkerSet) -> Result<DMatrix<f64>, KernelError>;

    /// Potential energy of each walker.
    fn potential_energy(&self, walkers: &WalkerSet) -> Result<DMatrix<f64>, KernelError>;

    /// Local energy from the kinetic and potential parts.
    fn local_energy(
        &self,
        kinetic: &DMatrix<f64>,
        potential: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError> {
        if kinetic.shape() != potential.shape() {
            return Err(KernelError::ShapeMismatch {
                what: "potential energy",
                expected: kinetic.shape(),
                found: potential.shape(),
            });
        }
        Ok(kinetic + potential)
    }

    /// Drift velocity ∇ψ/ψ of each walker.
    fn drift(&self, walkers: &WalkerSet) -> Result<DMatrix<f64>, KernelError>;

    /// Draw a trial displacement for each walker.
    fn proposed_move(
        &mut self,
        walkers: &WalkerSet,
        drift: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError>;

    /// Probability of accepting each walker's proposed move.
    fn acceptance_probability(
        &self,
        walkers: &WalkerSet,
        drift: &DMatrix<f64>,
        proposed_move: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError>;
}
