//! Field selectors for the local-energy record.

use std::fmt;

/// One of the six per-walker quantities held by an [`EnergyRecord`](super::EnergyRecord).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnergyField {
    Kinetic,
    Potential,
    Local,
    Acceptance,
    Drift,
    Move,
}

impl EnergyField {
    pub const COUNT: usize = 6;

    /// All fields, in the order a full refresh computes them.
    pub const ALL: [EnergyField; Self::COUNT] = [
        EnergyField::Kinetic,
        EnergyField::Potential,
        EnergyField::Local,
        EnergyField::Drift,
        EnergyField::Move,
        EnergyField::Acceptance,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Drift and move carry one value per walker and dimension; the rest one per walker.
    pub fn is_vector(self) -> bool {
        matches!(self, EnergyField::Drift | EnergyField::Move)
    }

    /// Buffer shape (rows, columns) for `walk_num` walkers in `dim` dimensions.
    pub fn shape(self, walk_num: usize, dim: usize) -> (usize, usize) {
        if self.is_vector() {
            (walk_num, dim)
        } else {
            (walk_num, 1)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnergyField::Kinetic => "kinetic energy",
            EnergyField::Potential => "potential energy",
            EnergyField::Local => "local energy",
            EnergyField::Acceptance => "acceptance probability",
            EnergyField::Drift => "drift vector",
            EnergyField::Move => "proposed move",
        }
    }
}

impl fmt::Display for EnergyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
