//! Homeland AI: assigns every idle unit of a faction to a home-front task.
//!
//! Each turn the scheduler
//! 1. recruits the units it may command,
//! 2. ranks task categories by base priority plus leader flavor,
//! 3. scans the visible map for targets,
//! 4. runs the handler of every category in priority order, and
//! 5. parks whatever is left with a skip order.
//!
//! A unit that receives an order is retired from every pool immediately, so
//! no unit is ordered twice in one turn.

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

use crate::ai::world::{CommandSink, HomelandWorld, Pathfinder};
use crate::config::HomelandConfig;
use crate::faction::Faction;
use crate::units::UnitOrder;

pub mod matcher;
mod moves;
pub mod pool;
pub mod priorities;
pub mod targets;

pub use matcher::{ClaimedPlots, Match, MatchLimits, choose_match, closest_unit_by_turns, estimate_distances};
pub use pool::{Candidate, CandidatePool, Tier};
pub use priorities::{TaskCategory, TaskPriority, compute_priorities};
pub use targets::{HomelandTarget, TargetKind, TargetSets, dedupe_adjacent, scan_targets};

/// What one `do_turn` did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSummary {
    pub turn: u32,
    pub priorities: Vec<TaskPriority>,
    pub targets_found: usize,
    pub committed: Vec<Entity>,
    pub unassigned: Vec<Entity>,
    pub disbanded: Vec<Entity>,
}

/// Everything a handler needs for the current turn.
pub(crate) struct TurnCtx<'a> {
    pub faction: &'a Faction,
    pub world: &'a dyn HomelandWorld,
    pub paths: &'a dyn Pathfinder,
    pub sink: &'a mut dyn CommandSink,
    pub targets: TargetSets,
    /// Cities that received a garrison this turn
    pub garrisoned: HashSet<Entity>,
    pub claimed: ClaimedPlots,
    pub committed: Vec<Entity>,
    pub disbanded: Vec<Entity>,
}

impl<'a> TurnCtx<'a> {
    pub fn new(
        faction: &'a Faction,
        world: &'a dyn HomelandWorld,
        paths: &'a dyn Pathfinder,
        sink: &'a mut dyn CommandSink,
    ) -> Self {
        Self {
            faction,
            world,
            paths,
            sink,
            targets: TargetSets::default(),
            garrisoned: HashSet::new(),
            claimed: ClaimedPlots::default(),
            committed: Vec::new(),
            disbanded: Vec::new(),
        }
    }
}

/// Long-lived homeland scheduler of one faction.
#[derive(Debug, Clone)]
pub struct HomelandAi {
    faction: Entity,
    config: HomelandConfig,
    idle_units: Vec<Entity>,
    pool: CandidatePool,
    priorities: Vec<TaskPriority>,
    best_normal: Option<Match>,
    best_high: Option<Match>,
    explorers_disbanded: u32,
    rng: StdRng,
}

impl HomelandAi {
    pub fn new(faction: Entity, config: HomelandConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.rng_seed ^ faction.to_bits());
        Self {
            faction,
            config,
            idle_units: Vec::new(),
            pool: CandidatePool::default(),
            priorities: Vec::new(),
            best_normal: None,
            best_high: None,
            explorers_disbanded: 0,
            rng,
        }
    }

    pub fn faction(&self) -> Entity {
        self.faction
    }

    pub fn config(&self) -> &HomelandConfig {
        &self.config
    }

    /// Units still waiting for a task; empty between turns
    pub fn idle_units(&self) -> &[Entity] {
        &self.idle_units
    }

    pub fn priorities(&self) -> &[TaskPriority] {
        &self.priorities
    }

    pub fn explorers_disbanded(&self) -> u32 {
        self.explorers_disbanded
    }

    fn reset_turn(&mut self) {
        self.idle_units = Vec::new();
        self.pool = CandidatePool::default();
        self.priorities = Vec::new();
        self.best_normal = None;
        self.best_high = None;
    }

    /// Plan and issue this turn's homeland orders for `faction`.
    pub fn do_turn(
        &mut self,
        faction: &Faction,
        world: &dyn HomelandWorld,
        paths: &dyn Pathfinder,
        sink: &mut dyn CommandSink,
    ) -> TurnSummary {
        debug_assert_eq!(faction.entity, self.faction, "scheduler driven for another faction");
        self.reset_turn();
        let mut summary = TurnSummary {
            turn: world.turn(),
            ..default()
        };

        // Raiders have no homeland
        if faction.is_raider {
            for unit in world.units_of(faction.entity) {
                if !unit.processed {
                    sink.mark_processed(unit.entity);
                }
            }
            return summary;
        }

        self.recruit_units(faction, world);
        if self.idle_units.is_empty() {
            return summary;
        }

        sink.refresh_economic_plots(faction.entity);
        self.priorities = compute_priorities(faction, &self.config);
        let mut ctx = TurnCtx::new(faction, world, paths, sink);
        ctx.targets = scan_targets(world, faction.entity, &self.config);
        debug!(
            "Homeland: {} turn {} with {} idle units and {} targets",
            faction.name,
            summary.turn,
            self.idle_units.len(),
            ctx.targets.len()
        );

        for priority in self.priorities.clone() {
            if self.idle_units.is_empty() {
                break;
            }
            self.assign(priority.category, &mut ctx);
        }

        summary.unassigned = self.review_unassigned_units(&mut ctx);
        summary.priorities = self.priorities.clone();
        summary.targets_found = ctx.targets.len();
        summary.committed = ctx.committed;
        summary.disbanded = ctx.disbanded;
        summary
    }

    /// Units under homeland control this turn; human factions only hand
    /// over automated units
    fn recruit_units(&mut self, faction: &Faction, world: &dyn HomelandWorld) {
        self.idle_units = world
            .units_of(faction.entity)
            .into_iter()
            .filter(|unit| {
                !unit.processed
                    && !unit.delayed_death
                    && unit.task() != crate::units::UnitTask::Unknown
                    && unit.can_move()
                    && (!faction.is_human || unit.is_automated())
            })
            .map(|unit| unit.entity)
            .collect();
    }

    fn assign(&mut self, category: TaskCategory, ctx: &mut TurnCtx) {
        match category {
            TaskCategory::Explore => self.plot_explorer_moves(ctx, false),
            TaskCategory::ExploreSea => self.plot_explorer_moves(ctx, true),
            TaskCategory::Settle => self.plot_first_turn_settler_moves(ctx),
            TaskCategory::Garrison => self.plot_garrison_moves(ctx),
            TaskCategory::Heal => self.plot_heal_moves(ctx),
            TaskCategory::ToSafety => self.plot_moves_to_safety(ctx),
            TaskCategory::MobileReserve => self.plot_mobile_reserve_moves(ctx),
            TaskCategory::Sentry => self.plot_sentry_moves(ctx),
            TaskCategory::ImproveLand => self.plot_worker_moves(ctx),
            TaskCategory::ImproveSea => self.plot_worker_sea_moves(ctx),
            TaskCategory::Patrol => self.plot_patrol_moves(ctx),
            TaskCategory::Upgrade => self.plot_upgrade_moves(ctx),
            TaskCategory::LootRuins => self.plot_ancient_ruin_moves(ctx),
            TaskCategory::RepositionAir => self.plot_aircraft_moves(ctx),
            TaskCategory::TradeDispatch => self.plot_trade_unit_moves(ctx),
            TaskCategory::Unassigned | TaskCategory::None => {
                debug!("Homeland: no handler for {:?}, skipping", category);
            }
        }
    }

    /// Issue `order` (if any), end the unit's turn and retire it
    fn commit(&mut self, ctx: &mut TurnCtx, unit: Entity, order: Option<UnitOrder>) {
        if let Some(order) = order {
            if let (UnitOrder::MoveTo(plot), Some(info)) = (order, ctx.world.unit(unit)) {
                ctx.claimed.claim(plot, info.layer);
            }
            ctx.sink.push_order(unit, order);
        }
        ctx.sink.finish_turn_for(unit);
        self.retire(ctx, unit);
    }

    /// Drop a unit from every pool without touching its moves
    fn retire(&mut self, ctx: &mut TurnCtx, unit: Entity) {
        ctx.sink.mark_processed(unit);
        self.idle_units.retain(|&idle| idle != unit);
        self.pool.remove(unit);
        ctx.committed.push(unit);
    }

    fn is_idle(&self, unit: Entity) -> bool {
        self.idle_units.contains(&unit)
    }

    /// Idle units matching `filter`, in recruitment order
    fn idle_matching(
        &self,
        world: &dyn HomelandWorld,
        filter: impl Fn(&crate::units::UnitInfo) -> bool,
    ) -> Vec<Entity> {
        self.idle_units
            .iter()
            .copied()
            .filter(|&entity| world.unit(entity).is_some_and(&filter))
            .collect()
    }

    /// Compute the best normal and high priority match for `target`.
    ///
    /// Calling this with an empty pool is a bug in the handler.
    fn best_unit_to_reach_target(&mut self, ctx: &TurnCtx, target: TilePos, max_turns: u32) -> bool {
        assert!(
            !self.pool.is_empty(),
            "best_unit_to_reach_target called without candidates"
        );
        let limits = MatchLimits::new(&self.config, max_turns);
        estimate_distances(&mut self.pool.normal, ctx.world, &ctx.claimed, target);
        estimate_distances(&mut self.pool.high, ctx.world, &ctx.claimed, target);
        self.best_normal =
            closest_unit_by_turns(&mut self.pool.normal, target, &limits, ctx.world, ctx.paths);
        self.best_high =
            closest_unit_by_turns(&mut self.pool.high, target, &limits, ctx.world, ctx.paths);
        self.best_normal.is_some() || self.best_high.is_some()
    }

    /// Send the chosen unit to `target`: fortify or garrison when it is
    /// already there, move otherwise. Returns the unit that went.
    fn execute_move_to_target(
        &mut self,
        ctx: &mut TurnCtx,
        target: TilePos,
        garrison_if_possible: bool,
    ) -> Option<Entity> {
        let best = choose_match(self.best_normal, self.best_high)?;
        let world = ctx.world;
        let unit = world.unit(best.unit)?;

        let order = if unit.position == target && world.can_fortify(unit, target) {
            UnitOrder::Fortify
        } else if garrison_if_possible
            && unit.position == target
            && world.can_garrison(unit, target)
        {
            UnitOrder::Garrison
        } else {
            UnitOrder::MoveTo(target)
        };
        self.commit(ctx, best.unit, Some(order));
        Some(best.unit)
    }

    /// Park every unit nobody wanted
    fn review_unassigned_units(&mut self, ctx: &mut TurnCtx) -> Vec<Entity> {
        let leftovers = std::mem::take(&mut self.idle_units);
        for &entity in &leftovers {
            ctx.sink.push_order(entity, UnitOrder::Skip);
            ctx.sink.mark_processed(entity);
            match ctx.world.unit(entity) {
                Some(unit) => warn!(
                    "Homeland: unassigned {} at ({}, {})",
                    unit.name, unit.position.x, unit.position.y
                ),
                None => warn!("Homeland: unassigned unit {}", entity),
            }
        }
        self.pool.clear();
        leftovers
    }
}
