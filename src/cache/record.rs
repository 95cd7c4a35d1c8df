//! Per-walker local-energy record with version-gated buffers.
//!
//! Every buffer is stamped with the clock version at which it was last
//! recomputed. A buffer is fresh iff its stamp equals the clock's current
//! version; bumping the clock therefore invalidates all six buffers at once
//! without touching them.

use log::{debug, trace, warn};
use nalgebra::DMatrix;

use super::context::VersionClock;
use super::error::{BoxError, CacheError, ShapeMismatch};
use super::field::EnergyField;

#[derive(Clone, Debug)]
struct Slot {
    buffer: DMatrix<f64>,
    /// `None` until the first successful recompute.
    version: Option<u64>,
}

impl Slot {
    fn empty() -> Self {
        Self { buffer: DMatrix::zeros(0, 0), version: None }
    }
}

/// Kinetic, potential and local energies, acceptance probabilities, drift
/// vectors and proposed moves for a set of walkers.
#[derive(Clone, Debug)]
pub struct EnergyRecord {
    slots: [Slot; EnergyField::COUNT],
    walk_num: usize,
    dim: usize,
    initialized: bool,
    ready: bool,
}

impl Default for EnergyRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl EnergyRecord {
    /// Create an unallocated record. Every field starts as never computed.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::empty()),
            walk_num: 0,
            dim: 0,
            initialized: false,
            ready: false,
        }
    }

    /// Size all six buffers for `walk_num` walkers in `dim` dimensions.
    ///
    /// Allocating with the current shape is a no-op. A different shape drops
    /// all cached values: versions go back to never computed and the record
    /// is no longer ready.
    pub fn allocate(&mut self, walk_num: usize, dim: usize) -> Result<(), CacheError> {
        if walk_num == 0 || dim == 0 {
            return Err(CacheError::InvalidDimensions { walk_num, dim });
        }
        if self.initialized && self.walk_num == walk_num && self.dim == dim {
            return Ok(());
        }

        for field in EnergyField::ALL {
            let (rows, cols) = field.shape(walk_num, dim);
            self.slots[field.index()] = Slot {
                buffer: DMatrix::zeros(rows, cols),
                version: None,
            };
        }
        self.walk_num = walk_num;
        self.dim = dim;
        self.initialized = true;
        self.ready = false;
        debug!("allocated energy record: {} walkers x {} dimensions", walk_num, dim);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn walk_num(&self) -> usize {
        self.walk_num
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Version at which `field` was last recomputed, `None` if never.
    pub fn version(&self, field: EnergyField) -> Option<u64> {
        self.slots[field.index()].version
    }

    pub fn is_fresh(&self, clock: &VersionClock, field: EnergyField) -> bool {
        self.initialized && self.version(field) == Some(clock.current())
    }

    /// All fields whose stamp lags the clock.
    pub fn stale_fields(&self, clock: &VersionClock) -> Vec<EnergyField> {
        EnergyField::ALL
            .into_iter()
            .filter(|&field| !self.is_fresh(clock, field))
            .collect()
    }

    /// The buffer for `field`, only if it is fresh.
    pub fn get(&self, clock: &VersionClock, field: EnergyField) -> Option<&DMatrix<f64>> {
        if self.is_fresh(clock, field) {
            Some(&self.slots[field.index()].buffer)
        } else {
            None
        }
    }

    /// Bring `field` up to date with the clock.
    ///
    /// `recompute` is called only when the field is stale. It gets read access
    /// to the record so it can consume other fields that are already fresh.
    /// The returned buffer replaces the old one and the field is stamped in the
    /// same step. On failure, or if the buffer has the wrong shape, buffer and
    /// stamp are left as they were. A stamp ahead of `clock` is refused with
    /// [`CacheError::ClockBehind`] without calling `recompute`.
    pub fn ensure_fresh<F, E>(
        &mut self,
        clock: &VersionClock,
        field: EnergyField,
        recompute: F,
    ) -> Result<(), CacheError>
    where
        F: FnOnce(&EnergyRecord) -> Result<DMatrix<f64>, E>,
        E: Into<BoxError>,
    {
        if !self.initialized {
            return Err(CacheError::NotInitialized);
        }
        let current = clock.current();
        match self.version(field) {
            Some(stored) if stored == current => {
                trace!("{} is fresh at version {}", field, current);
                return Ok(());
            }
            Some(stored) if stored > current => {
                warn!("{} stamped at {} but clock is at {}", field, stored, current);
                return Err(CacheError::ClockBehind { field, stored, current });
            }
            _ => {}
        }

        let buffer = recompute(&*self).map_err(|e| {
            let source: BoxError = e.into();
            warn!("recomputing {} at version {} failed: {}", field, current, source);
            CacheError::ComputationFailed { field, source }
        })?;

        let expected = field.shape(self.walk_num, self.dim);
        if buffer.shape() != expected {
            let mismatch = ShapeMismatch { expected, found: buffer.shape() };
            warn!("rejecting {} at version {}: {}", field, current, mismatch);
            return Err(CacheError::ComputationFailed { field, source: Box::new(mismatch) });
        }

        let slot = &mut self.slots[field.index()];
        slot.buffer = buffer;
        slot.version = Some(current);
        debug!("recomputed {} at version {}", field, current);
        Ok(())
    }

    /// [`ensure_fresh`](Self::ensure_fresh), then borrow the fresh buffer.
    pub fn get_fresh<F, E>(
        &mut self,
        clock: &VersionClock,
        field: EnergyField,
        recompute: F,
    ) -> Result<&DMatrix<f64>, CacheError>
    where
        F: FnOnce(&EnergyRecord) -> Result<DMatrix<f64>, E>,
        E: Into<BoxError>,
    {
        self.ensure_fresh(clock, field, recompute)?;
        Ok(&self.slots[field.index()].buffer)
    }

    /// Declare the record usable by downstream consumers.
    ///
    /// Requires allocated buffers and at least one successful computation of
    /// every field. Freshness is not required.
    pub fn mark_ready(&mut self) -> Result<(), CacheError> {
        if !self.initialized {
            return Err(CacheError::NotInitialized);
        }
        if let Some(field) = EnergyField::ALL.into_iter().find(|&f| self.version(f).is_none()) {
            debug!("cannot mark record ready: {} was never computed", field);
            return Err(CacheError::NotInitialized);
        }
        self.ready = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Unchecked access for callers that have just refreshed the field.
    pub(crate) fn buffer(&self, field: EnergyField) -> &DMatrix<f64> {
        &self.slots[field.index()].buffer
    }
}
