//! The quarry's unit of work: [`Task`] and its three variants.
//!
//! A task is a power-gated piece of work with a progress accumulator. At most
//! one task exists at a time, owned by the controller; it is created when the
//! controller decides the next unit of work and destroyed on completion or
//! cancellation. Cancellation is not an error: a task whose target has become
//! moot reports itself complete and the controller simply picks new work.

use crate::math::{Cube, FreeCoordinate, FreePoint};
use crate::power::{DRILL_MOVE_COST_PER_UNIT, FRAME_PLACE_COST, Power, PowerReservoir};
use crate::world::World;

/// One power-gated unit of work. See the [module documentation](self).
#[derive(Clone, Debug)]
pub enum Task {
    /// Break the block at a cell, either to clear the frame volume or to excavate.
    BreakBlock(BreakBlock),
    /// Place a frame block into an empty edge cell.
    PlaceFrame(PlaceFrame),
    /// Move the excavation head between two points.
    MoveDrill(MoveDrill),
}

/// Payload of [`Task::BreakBlock`].
#[derive(Clone, Debug)]
pub struct BreakBlock {
    /// The cell whose block is to be removed.
    pub target: Cube,
    /// `true` when this break is excavation (drops are swept into an inventory
    /// acceptor); `false` when it is a structural clear of the frame volume
    /// (the block is destroyed without drops).
    ///
    /// This is an explicit property of the work, not derived from whether the
    /// drill happens to be deployed.
    pub excavation: bool,
    pub(crate) power: Power,
}

/// Payload of [`Task::PlaceFrame`].
#[derive(Clone, Debug)]
pub struct PlaceFrame {
    /// The empty edge cell to fill with a frame block.
    pub target: Cube,
    pub(crate) power: Power,
}

/// Payload of [`Task::MoveDrill`].
#[derive(Clone, Debug)]
pub struct MoveDrill {
    /// Where the drill starts.
    pub from: FreePoint,
    /// Where the drill is headed.
    pub to: FreePoint,
    pub(crate) power: Power,
}

/// Result of feeding power to a task.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TaskStatus {
    /// More power is needed.
    InProgress,
    /// The task is over (finished, cancelled, or moot) and must be discarded.
    Complete,
}

/// The collaborators a task needs while making progress.
///
/// The controller assembles this afresh for each `add_power` call; tasks hold
/// no references of their own.
pub struct TaskContext<'a> {
    /// World access for live cost computation and final application.
    pub world: &'a mut dyn World,
    /// The reservoir, for refunding overshoot when a finish is vetoed.
    pub reservoir: &'a mut PowerReservoir,
    /// The externally visible drill position, updated by move tasks.
    pub drill_pos: &'a mut Option<FreePoint>,
}

/// Energy cost of a drill move: distance times the per-unit rate, truncated.
fn move_cost(from: FreePoint, to: FreePoint) -> Power {
    let d = to - from;
    let distance = (d.x * d.x + d.y * d.y + d.z * d.z).sqrt();
    (distance * DRILL_MOVE_COST_PER_UNIT as FreeCoordinate) as Power
}

impl Task {
    /// Constructs a break task with zero progress.
    #[inline]
    pub fn break_block(target: Cube, excavation: bool) -> Self {
        Task::BreakBlock(BreakBlock {
            target,
            excavation,
            power: 0,
        })
    }

    /// Constructs a frame-placement task with zero progress.
    #[inline]
    pub fn place_frame(target: Cube) -> Self {
        Task::PlaceFrame(PlaceFrame { target, power: 0 })
    }

    /// Constructs a drill-move task with zero progress.
    #[inline]
    pub fn move_drill(from: FreePoint, to: FreePoint) -> Self {
        Task::MoveDrill(MoveDrill { from, to, power: 0 })
    }

    /// Accumulated progress. Only increases until the task completes or is
    /// cancelled, at which point the whole task is discarded.
    #[inline]
    pub fn power(&self) -> Power {
        match self {
            Task::BreakBlock(t) => t.power,
            Task::PlaceFrame(t) => t.power,
            Task::MoveDrill(t) => t.power,
        }
    }

    pub(crate) fn set_power(&mut self, power: Power) {
        match self {
            Task::BreakBlock(t) => t.power = power,
            Task::PlaceFrame(t) => t.power = power,
            Task::MoveDrill(t) => t.power = power,
        }
    }

    /// The total power this task needs, computed live.
    ///
    /// [`None`] means the target is at present unreachable by accumulation (an
    /// unbreakable block); `add_power` treats that as “reached” so that
    /// [`finish`](Self::add_power) re-validates and the task cancels cleanly.
    pub fn target_cost(&self, world: &dyn World) -> Option<Power> {
        match self {
            Task::BreakBlock(t) => world.break_cost(t.target),
            Task::PlaceFrame(_) => Some(FRAME_PLACE_COST),
            Task::MoveDrill(t) => Some(move_cost(t.from, t.to)),
        }
    }

    /// Whether `other` is the same work as `self`: same variant and same target
    /// cell or from/to pair. Progress is not compared.
    ///
    /// Replication uses this to decide whether an incoming task broadcast is a
    /// semantically new task (reset interpolation) or a re-broadcast of the one
    /// already held (keep interpolating).
    pub fn same_work(&self, other: &Task) -> bool {
        match (self, other) {
            (Task::BreakBlock(a), Task::BreakBlock(b)) => {
                a.target == b.target && a.excavation == b.excavation
            }
            (Task::PlaceFrame(a), Task::PlaceFrame(b)) => a.target == b.target,
            (Task::MoveDrill(a), Task::MoveDrill(b)) => a.from == b.from && a.to == b.to,
            _ => false,
        }
    }

    /// Feeds `amount` power into this task and advances its state machine.
    ///
    /// Returns [`TaskStatus::Complete`] when the task must be discarded, whether
    /// it finished its work, was vetoed (progress refunded to the reservoir), or
    /// became moot. Progress never decreases.
    pub fn add_power(&mut self, amount: Power, ctx: &mut TaskContext<'_>) -> TaskStatus {
        self.set_power(self.power().saturating_add(amount));
        let reached = match self.target_cost(ctx.world) {
            Some(cost) => self.power() >= cost,
            // Unbreakable target: go straight to finish, which re-validates
            // and cancels.
            None => true,
        };
        if reached {
            if !self.finish(ctx) {
                // Vetoed. Refund what we can hold; the rest is lost.
                ctx.reservoir.deposit(self.power());
            }
            TaskStatus::Complete
        } else {
            self.on_progress(ctx)
        }
    }

    /// Periodic work while accumulating. May report the task moot.
    fn on_progress(&mut self, ctx: &mut TaskContext<'_>) -> TaskStatus {
        match self {
            Task::BreakBlock(t) => {
                if ctx.world.is_air(t.target) {
                    // The block vanished on its own; nothing left to do.
                    TaskStatus::Complete
                } else {
                    if let Some(cost) = ctx.world.break_cost(t.target) {
                        let stage = (t.power.saturating_mul(9) / cost.max(1)).min(9) as u8;
                        ctx.world.set_break_progress(t.target, Some(stage));
                    }
                    TaskStatus::InProgress
                }
            }
            Task::PlaceFrame(t) => {
                if ctx.world.is_air(t.target) {
                    TaskStatus::InProgress
                } else {
                    // Someone else filled the cell.
                    TaskStatus::Complete
                }
            }
            Task::MoveDrill(t) => {
                // A zero-cost move has already completed above, so the division
                // is sound.
                let cost = move_cost(t.from, t.to);
                let p = t.power as FreeCoordinate / cost as FreeCoordinate;
                *ctx.drill_pos = Some(t.from.lerp(t.to, p));
                TaskStatus::InProgress
            }
        }
    }

    /// Applies the task's effect. Returns `false` only if the effect was vetoed
    /// and the accumulated power should be refunded.
    fn finish(&mut self, ctx: &mut TaskContext<'_>) -> bool {
        match self {
            Task::BreakBlock(t) => {
                if !ctx.world.minable(t.target) {
                    // Became ineligible since scheduling; cancel without effect
                    // and without refund, exactly as if it had finished.
                    log::debug!("break at {:?} cancelled: no longer minable", t.target);
                    return true;
                }
                if ctx.world.break_permitted(t.target) {
                    ctx.world.set_break_progress(t.target, None);
                    ctx.world.destroy_block(t.target, t.excavation);
                    if t.excavation {
                        ctx.world.sweep_drops(t.target.aab().expanded(1.0));
                    }
                    true
                } else {
                    log::debug!("break at {:?} vetoed", t.target);
                    false
                }
            }
            Task::PlaceFrame(t) => {
                if ctx.world.is_air(t.target) {
                    ctx.world.place_frame(t.target);
                }
                true
            }
            Task::MoveDrill(t) => {
                *ctx.drill_pos = Some(t.to);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::{DEFAULT_CAPACITY, UNIT};
    use crate::world::testing::{TestBlock, TestWorld};
    use pretty_assertions::assert_eq;

    fn ctx<'a>(
        world: &'a mut TestWorld,
        reservoir: &'a mut PowerReservoir,
        drill_pos: &'a mut Option<FreePoint>,
    ) -> TaskContext<'a> {
        TaskContext {
            world,
            reservoir,
            drill_pos,
        }
    }

    #[test]
    fn add_power_is_monotonic_and_completes_on_reaching_cost() {
        let mut world = TestWorld::new();
        let target = Cube::new(1, 2, 3);
        world.set(target, TestBlock::Stone { cost: 10 * UNIT });
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = None;

        let mut task = Task::break_block(target, false);
        let mut last = 0;
        for _ in 0..9 {
            assert_eq!(
                task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
                TaskStatus::InProgress
            );
            assert!(task.power() >= last);
            last = task.power();
        }
        // The call on which power reaches the cost reports completion.
        assert_eq!(
            task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::Complete
        );
        assert_eq!(world.destroyed, vec![(target, false)]);
        assert!(world.is_air(target));
    }

    #[test]
    fn break_progress_stages_are_published_and_cleared() {
        let mut world = TestWorld::new();
        let target = Cube::new(0, 0, 0);
        world.set(target, TestBlock::Stone { cost: 10 * UNIT });
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = None;

        let mut task = Task::break_block(target, false);
        task.add_power(5 * UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos));
        assert_eq!(world.progress.get(&target), Some(&4)); // 5 * 9 / 10
        task.add_power(5 * UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos));
        assert_eq!(world.progress.get(&target), None);
    }

    #[test]
    fn vetoed_break_refunds_and_completes() {
        let mut world = TestWorld::new();
        let target = Cube::new(0, 0, 0);
        world.set(target, TestBlock::Stone { cost: 10 * UNIT });
        world.veto.insert(target);
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = None;

        let mut task = Task::break_block(target, true);
        assert_eq!(
            task.add_power(12 * UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::Complete
        );
        // Nothing happened to the world, and the accumulated power came back.
        assert!(!world.is_air(target));
        assert_eq!(world.destroyed, vec![]);
        assert_eq!(reservoir.stored(), 12 * UNIT);
    }

    #[test]
    fn refund_is_capped_by_reservoir_free_space() {
        let mut world = TestWorld::new();
        let target = Cube::new(0, 0, 0);
        world.set(target, TestBlock::Stone { cost: 10 * UNIT });
        world.veto.insert(target);
        let mut reservoir = PowerReservoir::with_stored(20 * UNIT, 15 * UNIT);
        let mut drill_pos = None;

        let mut task = Task::break_block(target, false);
        task.add_power(10 * UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos));
        assert_eq!(reservoir.stored(), 20 * UNIT);
    }

    #[test]
    fn break_of_vanished_block_is_moot() {
        let mut world = TestWorld::new();
        let target = Cube::new(0, 0, 0);
        world.set(target, TestBlock::Stone { cost: 10 * UNIT });
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = None;

        let mut task = Task::break_block(target, true);
        task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos));
        world.clear(target); // another actor removed it
        assert_eq!(
            task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::Complete
        );
        assert_eq!(world.destroyed, vec![]);
    }

    #[test]
    fn excavation_break_sweeps_drops() {
        let mut world = TestWorld::new();
        let target = Cube::new(4, 5, 6);
        world.set(target, TestBlock::Stone { cost: UNIT });
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = Some(target.free_point());

        let mut task = Task::break_block(target, true);
        task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos));
        assert_eq!(world.destroyed, vec![(target, true)]);
        assert_eq!(world.swept, vec![target.aab().expanded(1.0)]);
    }

    #[test]
    fn structural_clear_destroys_without_drops() {
        let mut world = TestWorld::new();
        let target = Cube::new(4, 5, 6);
        world.set(target, TestBlock::Stone { cost: UNIT });
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = None;

        let mut task = Task::break_block(target, false);
        task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos));
        assert_eq!(world.destroyed, vec![(target, false)]);
        assert_eq!(world.swept, vec![]);
    }

    #[test]
    fn unbreakable_target_cancels_without_refund_or_effect() {
        let mut world = TestWorld::new();
        let target = Cube::new(0, 0, 0);
        world.set(target, TestBlock::Stone { cost: 10 * UNIT });
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = None;

        let mut task = Task::break_block(target, false);
        task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos));
        world.set(target, TestBlock::Unbreakable);
        assert_eq!(
            task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::Complete
        );
        assert!(!world.is_air(target));
        assert_eq!(reservoir.stored(), 0);
    }

    #[test]
    fn place_frame_applies_and_is_idempotent() {
        let mut world = TestWorld::new();
        let target = Cube::new(0, 1, 0);
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = None;

        let mut task = Task::place_frame(target);
        assert_eq!(
            task.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::InProgress
        );
        assert_eq!(
            task.add_power(FRAME_PLACE_COST, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::Complete
        );
        assert!(world.is_frame(target));

        // A second, redundant task over the now-filled cell completes on its
        // first progress check without touching the world.
        let mut redundant = Task::place_frame(target);
        assert_eq!(
            redundant.add_power(UNIT, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::Complete
        );
        assert!(world.is_frame(target));
    }

    #[test]
    fn move_drill_interpolates_then_snaps() {
        let mut world = TestWorld::new();
        let from = FreePoint::new(0.0, 8.0, 0.0);
        let to = FreePoint::new(4.0, 8.0, 0.0);
        let mut reservoir = PowerReservoir::new(DEFAULT_CAPACITY);
        let mut drill_pos = Some(from);

        let mut task = Task::move_drill(from, to);
        let cost = task.target_cost(&world).unwrap();
        assert_eq!(cost, 4 * DRILL_MOVE_COST_PER_UNIT);

        assert_eq!(
            task.add_power(cost / 4, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::InProgress
        );
        assert_eq!(drill_pos, Some(FreePoint::new(1.0, 8.0, 0.0)));

        assert_eq!(
            task.add_power(cost, &mut ctx(&mut world, &mut reservoir, &mut drill_pos)),
            TaskStatus::Complete
        );
        assert_eq!(drill_pos, Some(to));
    }

    #[test]
    fn same_work_ignores_progress() {
        let mut a = Task::break_block(Cube::new(1, 1, 1), true);
        let b = Task::break_block(Cube::new(1, 1, 1), true);
        a.set_power(5);
        assert!(a.same_work(&b));
        assert!(!a.same_work(&Task::break_block(Cube::new(1, 1, 2), true)));
        assert!(!a.same_work(&Task::place_frame(Cube::new(1, 1, 1))));

        let m1 = Task::move_drill(FreePoint::new(0., 0., 0.), FreePoint::new(1., 0., 0.));
        let m2 = Task::move_drill(FreePoint::new(0., 0., 0.), FreePoint::new(1., 0., 0.));
        let m3 = Task::move_drill(FreePoint::new(0., 0., 0.), FreePoint::new(2., 0., 0.));
        assert!(m1.same_work(&m2));
        assert!(!m1.same_work(&m3));
    }
}
