//! The quarry's internal energy store and its withdrawal policy.

/// Quantity of energy, in millionths of the nominal unit.
///
/// Integer energy accounting means task progress is exactly reproducible across
/// save/reload and replication.
pub type Power = u64;

/// One nominal unit of energy.
pub const UNIT: Power = 1_000_000;

/// The hard per-step ceiling on energy a task may receive.
pub const MAX_POWER_PER_STEP: Power = 64 * UNIT;

/// Default storage capacity of a quarry's reservoir.
pub const DEFAULT_CAPACITY: Power = 16_000 * UNIT;

/// Fixed cost of placing one frame block.
pub const FRAME_PLACE_COST: Power = 24 * UNIT;

/// Energy cost of moving the drill, per unit of distance.
pub const DRILL_MOVE_COST_PER_UNIT: Power = 20 * UNIT;

/// A bounded energy store: capacity, current amount, and a withdrawal operation.
///
/// The reservoir is exclusively owned by the quarry controller. External energy
/// input reaches it through [`PowerReservoir::deposit()`] only; the core never
/// initiates a pull from outside.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PowerReservoir {
    capacity: Power,
    stored: Power,
}

impl PowerReservoir {
    /// Creates an empty reservoir with the given capacity.
    #[inline]
    pub fn new(capacity: Power) -> Self {
        Self {
            capacity,
            stored: 0,
        }
    }

    /// Reconstructs a reservoir from saved state. `stored` is clamped to
    /// `capacity` so that a corrupt save cannot violate the invariant.
    #[inline]
    pub fn with_stored(capacity: Power, stored: Power) -> Self {
        Self {
            capacity,
            stored: stored.min(capacity),
        }
    }

    /// Maximum amount this reservoir can hold.
    #[inline]
    pub fn capacity(&self) -> Power {
        self.capacity
    }

    /// Amount currently held. Always `≤ capacity()`.
    #[inline]
    pub fn stored(&self) -> Power {
        self.stored
    }

    /// Adds energy, saturating at capacity. Returns the amount actually
    /// accepted; the excess is simply not stored.
    #[inline]
    pub fn deposit(&mut self, amount: Power) -> Power {
        let accepted = amount.min(self.capacity - self.stored);
        self.stored += accepted;
        accepted
    }

    /// Removes and returns up to `requested_cap` energy (exactly
    /// `min(requested_cap, stored)`).
    #[inline]
    pub fn withdraw(&mut self, requested_cap: Power) -> Power {
        let taken = requested_cap.min(self.stored);
        self.stored -= taken;
        taken
    }

    /// The per-step power ceiling after the charge-dependent throttle.
    ///
    /// The scaling is the historical two-step computation, preserved exactly:
    /// `ceiling * (stored + ceiling) / (capacity / 2)`, then re-capped at the
    /// hard ceiling. The intermediate value can exceed the ceiling; the final
    /// `min` is what enforces the cap. Delivery thus ramps up smoothly as the
    /// reservoir fills and never exceeds [`MAX_POWER_PER_STEP`].
    pub fn throttled_ceiling(&self) -> Power {
        let mut ceiling = u128::from(MAX_POWER_PER_STEP);
        ceiling *= u128::from(self.stored) + u128::from(MAX_POWER_PER_STEP);
        ceiling /= u128::from(self.capacity / 2).max(1);
        Power::try_from(ceiling)
            .unwrap_or(Power::MAX)
            .min(MAX_POWER_PER_STEP)
    }
}
