//! Simulation context: the version clock and the energy record it owns.

use log::debug;
use nalgebra::DMatrix;

use super::error::{BoxError, CacheError};
use super::field::EnergyField;
use super::record::EnergyRecord;
use crate::kernel::{KernelError, LocalEnergyKernel, WalkerSet};

/// Monotonic epoch counter. Bumped whenever upstream state (walker
/// positions, trial-function parameters, random proposals) changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionClock {
    current: u64,
}

impl VersionClock {
    pub fn new() -> Self {
        Self { current: 0 }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    /// Move to the next epoch and return it.
    pub fn advance(&mut self) -> u64 {
        self.current += 1;
        self.current
    }
}

/// Borrowed view of all six fields, valid right after a full refresh.
#[derive(Clone, Copy, Debug)]
pub struct FreshFields<'a> {
    pub kinetic: &'a DMatrix<f64>,
    pub potential: &'a DMatrix<f64>,
    pub local: &'a DMatrix<f64>,
    pub acceptance: &'a DMatrix<f64>,
    pub drift: &'a DMatrix<f64>,
    pub proposed_move: &'a DMatrix<f64>,
}

impl<'a> FreshFields<'a> {
    fn new(record: &'a EnergyRecord) -> Self {
        Self {
            kinetic: record.buffer(EnergyField::Kinetic),
            potential: record.buffer(EnergyField::Potential),
            local: record.buffer(EnergyField::Local),
            acceptance: record.buffer(EnergyField::Acceptance),
            drift: record.buffer(EnergyField::Drift),
            proposed_move: record.buffer(EnergyField::Move),
        }
    }
}

/// Owns the clock and the record. Every cache operation goes through here
/// so the record is always compared against its own clock.
#[derive(Clone, Debug, Default)]
pub struct SimulationContext {
    clock: VersionClock,
    record: EnergyRecord,
}

impl SimulationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with the record already allocated.
    pub fn with_walkers(walk_num: usize, dim: usize) -> Result<Self, CacheError> {
        let mut context = Self::new();
        context.allocate(walk_num, dim)?;
        Ok(context)
    }

    pub fn allocate(&mut self, walk_num: usize, dim: usize) -> Result<(), CacheError> {
        self.record.allocate(walk_num, dim)
    }

    pub fn current_version(&self) -> u64 {
        self.clock.current()
    }

    pub fn clock(&self) -> &VersionClock {
        &self.clock
    }

    pub fn record(&self) -> &EnergyRecord {
        &self.record
    }

    pub fn is_fresh(&self, field: EnergyField) -> bool {
        self.record.is_fresh(&self.clock, field)
    }

    pub fn stale_fields(&self) -> Vec<EnergyField> {
        self.record.stale_fields(&self.clock)
    }

    pub fn get(&self, field: EnergyField) -> Option<&DMatrix<f64>> {
        self.record.get(&self.clock, field)
    }

    pub fn ensure_fresh<F, E>(&mut self, field: EnergyField, recompute: F) -> Result<(), CacheError>
    where
        F: FnOnce(&EnergyRecord) -> Result<DMatrix<f64>, E>,
        E: Into<BoxError>,
    {
        self.record.ensure_fresh(&self.clock, field, recompute)
    }

    pub fn get_fresh<F, E>(
        &mut self,
        field: EnergyField,
        recompute: F,
    ) -> Result<&DMatrix<f64>, CacheError>
    where
        F: FnOnce(&EnergyRecord) -> Result<DMatrix<f64>, E>,
        E: Into<BoxError>,
    {
        self.record.get_fresh(&self.clock, field, recompute)
    }

    /// Mark every field stale by starting a new epoch. Buffers are untouched.
    pub fn invalidate_all(&mut self) {
        let version = self.clock.advance();
        debug!("invalidated energy record, now at version {}", version);
    }

    pub fn mark_ready(&mut self) -> Result<(), CacheError> {
        self.record.mark_ready()
    }

    pub fn is_ready(&self) -> bool {
        self.record.is_ready()
    }

    /// Bring all six fields up to date for `walkers`.
    ///
    /// Allocates (or reallocates) the record to match the walker set, then
    /// refreshes in dependency order: kinetic, potential, local, drift, move,
    /// acceptance. Fields that are already fresh are not recomputed.
    pub fn refresh_all<K>(
        &mut self,
        kernel: &mut K,
        walkers: &WalkerSet,
    ) -> Result<FreshFields<'_>, CacheError>
    where
        K: LocalEnergyKernel + ?Sized,
    {
        self.record.allocate(walkers.walk_num(), walkers.dim())?;
        let clock = &self.clock;
        let record = &mut self.record;

        record.ensure_fresh(clock, EnergyField::Kinetic, |_| kernel.kinetic_energy(walkers))?;
        record.ensure_fresh(clock, EnergyField::Potential, |_| kernel.potential_energy(walkers))?;
        record.ensure_fresh(clock, EnergyField::Local, |r| {
            kernel.local_energy(
                input(r, clock, EnergyField::Kinetic)?,
                input(r, clock, EnergyField::Potential)?,
            )
        })?;
        record.ensure_fresh(clock, EnergyField::Drift, |_| kernel.drift(walkers))?;
        record.ensure_fresh(clock, EnergyField::Move, |r| {
            kernel.proposed_move(walkers, input(r, clock, EnergyField::Drift)?)
        })?;
        record.ensure_fresh(clock, EnergyField::Acceptance, |r| {
            kernel.acceptance_probability(
                walkers,
                input(r, clock, EnergyField::Drift)?,
                input(r, clock, EnergyField::Move)?,
            )
        })?;

        Ok(FreshFields::new(&self.record))
    }
}

fn input<'a>(
    record: &'a EnergyRecord,
    clock: &VersionClock,
    field: EnergyField,
) -> Result<&'a DMatrix<f64>, KernelError> {
    record.get(clock, field).ok_or(KernelError::StaleInput(field))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    use super::*;
    use crate::kernel::HarmonicKernel;

    #[test]
    fn test_clock_advances() {
        let mut clock = VersionClock::new();
        assert_eq!(clock.current(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.current(), 2);
    }

    #[test]
    fn test_invalidate_all_leaves_buffers_alone() {
        let mut context = SimulationContext::with_walkers(3, 2).unwrap();
        context
            .ensure_fresh(EnergyField::Kinetic, |_| Ok::<_, BoxError>(DMatrix::from_element(3, 1, 4.0)))
            .unwrap();
        context.invalidate_all();

        assert!(!context.is_fresh(EnergyField::Kinetic));
        assert!(context.get(EnergyField::Kinetic).is_none());
        assert_relative_eq!(context.record().buffer(EnergyField::Kinetic)[(0, 0)], 4.0);
        assert_eq!(context.record().version(EnergyField::Kinetic), Some(0));
    }

    #[test]
    fn test_get_fresh_recomputes_once_per_epoch() {
        let mut context = SimulationContext::with_walkers(2, 1).unwrap();
        let calls = Cell::new(0);
        let mut recompute = |_: &EnergyRecord| {
            calls.set(calls.get() + 1);
            Ok::<_, BoxError>(DMatrix::from_element(2, 1, calls.get() as f64))
        };

        assert_relative_eq!(context.get_fresh(EnergyField::Local, &mut recompute).unwrap()[(0, 0)], 1.0);
        assert_relative_eq!(context.get_fresh(EnergyField::Local, &mut recompute).unwrap()[(0, 0)], 1.0);
        context.invalidate_all();
        assert_relative_eq!(context.get_fresh(EnergyField::Local, &mut recompute).unwrap()[(0, 0)], 2.0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_refresh_all_allocates_and_freshens_everything() {
        let mut kernel = HarmonicKernel::new(0.5, 1.0, 0.05).unwrap().with_seed(7);
        let walkers = WalkerSet::new(DMatrix::from_row_slice(2, 3, &[0.1, 0.2, 0.3, -1.0, 0.5, 0.0]));
        let mut context = SimulationContext::new();

        let fields = context.refresh_all(&mut kernel, &walkers).unwrap();
        assert_eq!(fields.proposed_move.shape(), (2, 3));
        for i in 0..2 {
            assert_relative_eq!(fields.local[(i, 0)], 1.5, epsilon = 1e-12);
            assert!(fields.acceptance[(i, 0)] > 0.0 && fields.acceptance[(i, 0)] <= 1.0);
        }

        assert!(context.record().is_initialized());
        assert!(context.stale_fields().is_empty());
        context.mark_ready().unwrap();
        assert!(context.is_ready());
    }

    #[test]
    fn test_refresh_all_propagates_kernel_failure() {
        let mut kernel = HarmonicKernel::new(0.5, 1.0, 0.05).unwrap();
        let walkers = WalkerSet::new(DMatrix::from_row_slice(1, 2, &[f64::NAN, 0.0]));
        let mut context = SimulationContext::new();

        let err = context.refresh_all(&mut kernel, &walkers).unwrap_err();
        assert!(matches!(err, CacheError::ComputationFailed { field: EnergyField::Kinetic, .. }));
        assert_eq!(context.stale_fields().len(), EnergyField::COUNT);
        assert!(matches!(context.mark_ready(), Err(CacheError::NotInitialized)));
    }
}
