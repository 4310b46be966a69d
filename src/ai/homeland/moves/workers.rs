use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::ai::homeland::{HomelandAi, TaskCategory, TurnCtx};
use crate::map::tiles::BuildKind;
use crate::units::{Automation, UnitDomain, UnitInfo, UnitOrder, UnitTask};

fn is_builder(unit: &UnitInfo, domain: UnitDomain) -> bool {
    let task = match domain {
        UnitDomain::Sea => UnitTask::WorkSea,
        _ => UnitTask::Work,
    };
    unit.task() == task || (unit.automation == Automation::Build && unit.domain == domain)
}

impl HomelandAi {
    pub(crate) fn plot_worker_moves(&mut self, ctx: &mut TurnCtx) {
        let world = ctx.world;
        let workers = self.idle_matching(world, |unit| is_builder(unit, UnitDomain::Land));
        if workers.is_empty() {
            return;
        }
        self.pool.start(TaskCategory::ImproveLand, workers.iter().copied());

        for entity in workers {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            let order = self.worker_order(ctx, unit);
            self.commit(ctx, entity, order);
        }
    }

    /// Flee, follow the builder directive, flee ignoring units, or skip.
    ///
    /// `None` means the unit keeps the build it is already working on.
    fn worker_order(&self, ctx: &mut TurnCtx, unit: &UnitInfo) -> Option<UnitOrder> {
        let world = ctx.world;
        if world.danger(ctx.faction.entity, unit.position) > 0 {
            if let Some(order) = self.civilian_safety_order(ctx, unit, false) {
                debug!("Builder {} runs from danger", unit.name);
                return Some(order);
            }
        }

        match world.builder_directive(unit) {
            Some(directive) if directive.target == unit.position => {
                let busy = matches!(
                    unit.head_order,
                    Some(UnitOrder::Build { build, .. }) if build == directive.build
                );
                if busy {
                    return None;
                }
                debug!("Builder {} starts {:?}", unit.name, directive.build);
                return Some(UnitOrder::Build {
                    build: directive.build,
                    target: directive.target,
                });
            }
            Some(directive) => {
                debug!(
                    "Builder {} heads to ({}, {})",
                    unit.name, directive.target.x, directive.target.y
                );
                return Some(UnitOrder::MoveTo(directive.target));
            }
            None => warn!("Builder {} has no directive", unit.name),
        }

        if let Some(order) = self.civilian_safety_order(ctx, unit, true) {
            return Some(order);
        }
        Some(UnitOrder::Skip)
    }

    pub(crate) fn plot_worker_sea_moves(&mut self, ctx: &mut TurnCtx) {
        let world = ctx.world;
        let boats = self.idle_matching(world, |unit| is_builder(unit, UnitDomain::Sea));
        if boats.is_empty() {
            return;
        }
        self.pool.start(TaskCategory::ImproveSea, boats.iter().copied());

        for entity in boats {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            let Some((target, build)) = self.closest_naval_resource(ctx, unit) else {
                continue;
            };
            if unit.position == target {
                debug!("Work boat {} harvests ({}, {})", unit.name, target.x, target.y);
                self.commit(ctx, entity, Some(UnitOrder::Build { build, target }));
            } else if ctx
                .paths
                .shortest_path(unit, unit.position, target)
                .is_some()
            {
                debug!("Work boat {} sails to ({}, {})", unit.name, target.x, target.y);
                self.commit(ctx, entity, Some(UnitOrder::MoveTo(target)));
            }
        }
    }

    /// Buildable naval resource with the fewest turns away
    fn closest_naval_resource(&self, ctx: &TurnCtx, unit: &UnitInfo) -> Option<(TilePos, BuildKind)> {
        let world = ctx.world;
        ctx.targets
            .naval_resources
            .iter()
            .filter_map(|target| {
                let build = target.improvement.and_then(|improvement| improvement.build_kind())?;
                if !world.can_build(unit, target.location, build) {
                    return None;
                }
                let turns = ctx.paths.turns_to_reach(unit, target.location)?;
                Some((turns, target.location, build))
            })
            .min_by_key(|(turns, _, _)| *turns)
            .map(|(_, location, build)| (location, build))
    }
}
