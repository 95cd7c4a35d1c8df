//! Kernel module - numerical routines that recompute the energy record.

mod error;
mod traits;
mod walkers;
mod harmonic;

pub use error::KernelError;
pub use traits::LocalEnergyKernel;
pub use walkers::WalkerSet;
pub use harmonic::HarmonicKernel;
