//! Upstream walker state consumed by the kernel routines.

use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::error::KernelError;

/// Positions of `walk_num` walkers in `dim` dimensions, one walker per row.
#[derive(Clone, Debug, PartialEq)]
pub struct WalkerSet {
    positions: DMatrix<f64>,
}

impl WalkerSet {
    pub fn new(positions: DMatrix<f64>) -> Self {
        Self { positions }
    }

    /// Walkers drawn from an isotropic Gaussian of width `sigma` around the origin.
    pub fn gaussian<R: Rng + ?Sized>(
        walk_num: usize,
        dim: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Self, KernelError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(KernelError::InvalidParameter { name: "sigma", value: sigma });
        }
        let normal = Normal::new(0.0, sigma)
            .map_err(|_| KernelError::InvalidParameter { name: "sigma", value: sigma })?;
        let positions = DMatrix::from_fn(walk_num, dim, |_, _| normal.sample(&mut *rng));
        Ok(Self { positions })
    }

    pub fn walk_num(&self) -> usize {
        self.positions.nrows()
    }

    pub fn dim(&self) -> usize {
        self.positions.ncols()
    }

    pub fn positions(&self) -> &DMatrix<f64> {
        &self.positions
    }

    /// Squared distance from the origin for walker `i`.
    pub fn radius_squared(&self, i: usize) -> f64 {
        self.positions.row(i).norm_squared()
    }

    /// Shift walker `i` by row `i` of `moves`.
    pub fn displace(&mut self, i: usize, moves: &DMatrix<f64>) {
        for j in 0..self.dim() {
            self.positions[(i, j)] += moves[(i, j)];
        }
    }

    /// First walker with a NaN or infinite coordinate, as an error.
    pub fn check_finite(&self) -> Result<(), KernelError> {
        match self.positions.row_iter().position(|row| row.iter().any(|x| !x.is_finite())) {
            Some(walker) => Err(KernelError::NonFinite { walker }),
            None => Ok(()),
        }
    }

    /// Check that `buffer` has one row per walker and one column per dimension.
    pub(crate) fn check_vector_shape(
        &self,
        what: &'static str,
        buffer: &DMatrix<f64>,
    ) -> Result<(), KernelError> {
        let expected = self.positions.shape();
        if buffer.shape() == expected {
            Ok(())
        } else {
            Err(KernelError::ShapeMismatch { what, expected, found: buffer.shape() })
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_gaussian_walkers_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        let walkers = WalkerSet::gaussian(100, 3, 1.0, &mut rng).unwrap();
        assert_eq!(walkers.walk_num(), 100);
        assert_eq!(walkers.dim(), 3);
        assert!(walkers.check_finite().is_ok());
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(matches!(
            WalkerSet::gaussian(4, 3, -1.0, &mut rng),
            Err(KernelError::InvalidParameter { name: "sigma", .. })
        ));
        assert!(matches!(
            WalkerSet::gaussian(4, 3, 0.0, &mut rng),
            Err(KernelError::InvalidParameter { name: "sigma", .. })
        ));
        assert!(matches!(
            WalkerSet::gaussian(4, 3, f64::INFINITY, &mut rng),
            Err(KernelError::InvalidParameter { name: "sigma", .. })
        ));
    }

    #[test]
    fn test_displace_and_radius() {
        let mut walkers = WalkerSet::new(DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 2.0]));
        let moves = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 5.0, 5.0]);
        walkers.displace(0, &moves);
        assert_relative_eq!(walkers.radius_squared(0), 2.0);
        assert_relative_eq!(walkers.radius_squared(1), 4.0);
    }

    #[test]
    fn test_check_finite_reports_walker() {
        let walkers = WalkerSet::new(DMatrix::from_row_slice(3, 1, &[0.0, 1.0, f64::INFINITY]));
        assert_eq!(walkers.check_finite(), Err(KernelError::NonFinite { walker: 2 }));
    }
}
