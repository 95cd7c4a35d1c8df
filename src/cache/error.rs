//! Error types for the local-energy cache.

use thiserror::Error;

use super::field::EnergyField;

/// Boxed error reported by a recompute routine.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum CacheError {
    /// Buffers were never allocated, or (for `mark_ready`) some field was never computed.
    #[error("energy record is not initialized")]
    NotInitialized,

    /// The recompute routine failed; the field keeps its old version and stays stale.
    #[error("recomputing {field} failed: {source}")]
    ComputationFailed {
        field: EnergyField,
        #[source]
        source: BoxError,
    },

    /// The field was stamped by a clock ahead of the one supplied; versions never go back.
    #[error("{field} is stamped at version {stored}, ahead of clock version {current}")]
    ClockBehind { field: EnergyField, stored: u64, current: u64 },

    #[error("cannot allocate energy record for {walk_num} walkers in {dim} dimensions")]
    InvalidDimensions { walk_num: usize, dim: usize },
}

impl CacheError {
    /// A failed recomputation can be retried once upstream state is fixed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, CacheError::ComputationFailed { .. })
    }
}

/// A recompute routine returned a buffer whose shape does not match the record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected a {}x{} buffer, got {}x{}", .expected.0, .expected.1, .found.0, .found.1)]
pub struct ShapeMismatch {
    pub expected: (usize, usize),
    pub found: (usize, usize),
}
