//! Cache module - the version-gated local-energy record and its context.

mod error;
mod field;
mod record;
mod context;

pub use error::{BoxError, CacheError, ShapeMismatch};
pub use field::EnergyField;
pub use record::EnergyRecord;
pub use context::{FreshFields, SimulationContext, VersionClock};
