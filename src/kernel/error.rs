use thiserror::Error;

use crate::cache::EnergyField;

/// Failures reported by a numerical kernel routine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("walker {walker} has a non-finite coordinate")]
    NonFinite { walker: usize },

    #[error("invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("{what}: expected {}x{}, got {}x{}", .expected.0, .expected.1, .found.0, .found.1)]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// An input field was not fresh when a dependent field needed it.
    #[error("input {0} is stale")]
    StaleInput(EnergyField),
}
