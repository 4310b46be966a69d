use bevy::prelude::*;

use crate::ai::homeland::{HomelandAi, HomelandTarget, TaskCategory, TurnCtx};

impl HomelandAi {
    /// Walk `targets` in order, sending the best matching unit to each.
    fn plot_targeted_moves(
        &mut self,
        ctx: &mut TurnCtx,
        category: TaskCategory,
        targets: &[HomelandTarget],
        max_turns: u32,
        garrison_if_possible: bool,
    ) -> Vec<(HomelandTarget, Entity)> {
        let mut sent = Vec::new();
        for target in targets {
            if garrison_if_possible && self.city_already_garrisoned(ctx, target) {
                continue;
            }
            if !self.pool.find_units_for_move(
                category,
                &self.idle_units,
                ctx.world,
                ctx.faction,
                &self.config,
            ) {
                break;
            }
            if !self.best_unit_to_reach_target(ctx, target.location, max_turns) {
                continue;
            }
            if let Some(unit) = self.execute_move_to_target(ctx, target.location, garrison_if_possible)
            {
                debug!(
                    "Homeland {:?}: unit {} heads for ({}, {})",
                    category, unit, target.location.x, target.location.y
                );
                sent.push((target.clone(), unit));
            }
        }
        sent
    }

    fn city_already_garrisoned(&self, ctx: &TurnCtx, target: &HomelandTarget) -> bool {
        let Some(city) = target.city else {
            return false;
        };
        ctx.garrisoned.contains(&city)
            || ctx
                .world
                .city_at(target.location)
                .is_some_and(|info| info.garrisoned_in(ctx.world.turn()))
    }

    pub(crate) fn plot_garrison_moves(&mut self, ctx: &mut TurnCtx) {
        let cities = ctx.targets.cities.clone();
        let turn = ctx.world.turn();
        let sent = self.plot_targeted_moves(
            ctx,
            TaskCategory::Garrison,
            &cities,
            self.config.defensive_move_turns,
            true,
        );
        for (target, _) in sent {
            if let Some(city) = target.city {
                ctx.garrisoned.insert(city);
                ctx.sink.garrison_assigned(city, turn);
            }
        }
    }

    /// Forts first, then the open sentry points
    pub(crate) fn plot_sentry_moves(&mut self, ctx: &mut TurnCtx) {
        let targets: Vec<HomelandTarget> = ctx
            .targets
            .forts
            .iter()
            .chain(&ctx.targets.sentry_points)
            .cloned()
            .collect();
        self.plot_targeted_moves(ctx, TaskCategory::Sentry, &targets, u32::MAX, false);
    }

    pub(crate) fn plot_mobile_reserve_moves(&mut self, ctx: &mut TurnCtx) {
        let roads = ctx.targets.home_roads.clone();
        self.plot_targeted_moves(ctx, TaskCategory::MobileReserve, &roads, u32::MAX, false);
    }

    pub(crate) fn plot_ancient_ruin_moves(&mut self, ctx: &mut TurnCtx) {
        let ruins = ctx.targets.ancient_ruins.clone();
        self.plot_targeted_moves(
            ctx,
            TaskCategory::LootRuins,
            &ruins,
            self.config.defensive_move_turns,
            false,
        );
    }
}
