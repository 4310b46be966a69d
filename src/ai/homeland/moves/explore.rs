use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;
use rand::Rng;

use crate::ai::homeland::{HomelandAi, TaskCategory, TurnCtx};
use crate::ai::world::HomelandWorld;
use crate::constants::{EXPLORE_COAST_BONUS, EXPLORE_HILLS_BONUS, EXPLORE_PATH_NOISE};
use crate::map::tile_pos::TilePosExt;
use crate::map::tiles::Improvement;
use crate::units::{Automation, UnitDomain, UnitInfo, UnitOrder, UnitTask};

fn is_explorer(unit: &UnitInfo, sea: bool) -> bool {
    let (task, domain) = if sea {
        (UnitTask::ExploreSea, UnitDomain::Sea)
    } else {
        (UnitTask::Explore, UnitDomain::Land)
    };
    unit.task() == task || (unit.automation == Automation::Explore && unit.domain == domain)
}

/// A tile an explorer may end its turn on
fn valid_end_turn_plot(world: &dyn HomelandWorld, unit: &UnitInfo, pos: TilePos) -> bool {
    if pos == unit.position || !world.is_revealed(unit.owner, pos) {
        return false;
    }
    let Some(tile) = world.tile(pos) else {
        return false;
    };
    let domain_fits = match unit.domain {
        UnitDomain::Land => tile.terrain.is_land(),
        UnitDomain::Sea => tile.terrain.is_water(),
        UnitDomain::Air => true,
    };
    domain_fits && world.can_move_into(unit, pos)
}

impl HomelandAi {
    pub(crate) fn plot_explorer_moves(&mut self, ctx: &mut TurnCtx, sea: bool) {
        let explorers = self.idle_matching(ctx.world, |unit| is_explorer(unit, sea));
        if explorers.is_empty() {
            return;
        }
        let category = if sea {
            TaskCategory::ExploreSea
        } else {
            TaskCategory::Explore
        };
        self.pool.start(category, explorers);

        // The second pass picks up explorers the first one left standing
        self.execute_explorer_moves(ctx, sea);
        self.execute_explorer_moves(ctx, sea);
    }

    fn execute_explorer_moves(&mut self, ctx: &mut TurnCtx, sea: bool) {
        ctx.sink.refresh_economic_plots(ctx.faction.entity);
        let world = ctx.world;
        let candidates: Vec<Entity> = self
            .pool
            .normal
            .iter()
            .map(|candidate| candidate.unit)
            .filter(|&unit| self.is_idle(unit))
            .collect();

        for entity in candidates {
            let Some(unit) = world.unit(entity) else {
                continue;
            };

            if let Some(step) = self.goody_hut_step(ctx, unit) {
                debug!(
                    "Explorer {} heads for goody hut via ({}, {})",
                    unit.name, step.x, step.y
                );
                self.commit(ctx, entity, Some(UnitOrder::MoveTo(step)));
                continue;
            }

            let mut best_plot = self.best_local_plot(ctx, unit);
            if best_plot.is_some() && unit.moves_left > 0 {
                if let Some(refined) = self.best_exploration_plot(ctx, unit) {
                    best_plot = refined;
                }
            }

            match best_plot {
                Some(plot) => {
                    debug!("Explorer {} moves to ({}, {})", unit.name, plot.x, plot.y);
                    self.commit(ctx, entity, Some(UnitOrder::MoveTo(plot)));
                }
                None if !sea => self.strand_explorer(ctx, unit),
                None => trace!("Sea explorer {} has nothing to explore", unit.name),
            }
        }
    }

    /// End-of-turn step toward an unguarded goody hut or camp
    fn goody_hut_step(&self, ctx: &TurnCtx, unit: &UnitInfo) -> Option<TilePos> {
        let world = ctx.world;
        let goody = world.goody_target(unit)?;
        let hut = world.tile(goody).is_some_and(|tile| {
            matches!(
                tile.improvement,
                Some(Improvement::GoodyHut | Improvement::BarbarianCamp)
            )
        });
        if !hut || world.visible_enemy_at(ctx.faction.entity, goody) {
            return None;
        }
        let Some(path) = ctx.paths.shortest_path(unit, unit.position, goody) else {
            warn!("Explorer {} cannot find a path to goody hut", unit.name);
            return None;
        };
        path.end_of_turn(unit.moves_left)
            .filter(|&step| step != unit.position)
    }

    /// Best tile reachable this turn by how much it would reveal
    fn best_local_plot(&self, ctx: &TurnCtx, unit: &UnitInfo) -> Option<TilePos> {
        let world = ctx.world;
        let faction = ctx.faction.entity;
        let mut best = None;
        let mut best_score = 0;

        for plot in unit.position.area(unit.moves_left) {
            if !valid_end_turn_plot(world, unit, plot) {
                continue;
            }
            if !ctx
                .paths
                .turns_to_reach(unit, plot)
                .is_some_and(|turns| turns <= 1)
            {
                continue;
            }
            let mut score = world.explore_score(faction, plot, unit.sight, unit.domain);
            if score > 0 {
                match unit.domain {
                    UnitDomain::Land if world.tile(plot).is_some_and(|t| t.hills) => {
                        score += EXPLORE_HILLS_BONUS
                    }
                    UnitDomain::Sea if world.adjacent_to_land(plot) => score += EXPLORE_COAST_BONUS,
                    _ => {}
                }
            }
            trace!("Explorer {} scores ({}, {}) at {}", unit.name, plot.x, plot.y, score);
            if score > best_score {
                best = Some(plot);
                best_score = score;
            }
        }
        best
    }

    /// Refine the local choice against the economic layer's wish list.
    ///
    /// `Some(None)` means the best plot is already underfoot.
    fn best_exploration_plot(&mut self, ctx: &TurnCtx, unit: &UnitInfo) -> Option<Option<TilePos>> {
        let world = ctx.world;
        let plots = world.exploration_plots(ctx.faction.entity, unit.domain);
        let mut refined = None;
        let mut best_score = 0;

        for plot in plots {
            if !valid_end_turn_plot(world, unit, plot.location) {
                continue;
            }
            let Some(path) = ctx.paths.shortest_path(unit, unit.position, plot.location) else {
                continue;
            };
            let distance = (path.cost() as f32 + self.rng.random_range(0.0..EXPLORE_PATH_NOISE)) as i32;
            let score = if distance == 0 {
                1000 * plot.rating
            } else {
                1000 * plot.rating / distance
            };
            if score <= best_score {
                continue;
            }
            let Some(end) = path.end_of_turn(unit.moves_left) else {
                continue;
            };
            if end == unit.position {
                refined = Some(None);
                best_score = score;
            } else if valid_end_turn_plot(world, unit, end) {
                refined = Some(Some(end));
                best_score = score;
            }
        }
        refined
    }

    /// Nothing left to explore: humans get their unit back, AI scouts cut
    /// off from every city are disbanded
    fn strand_explorer(&mut self, ctx: &mut TurnCtx, unit: &UnitInfo) {
        if ctx.faction.is_human {
            debug!("Explorer {} has nowhere to go, automation cancelled", unit.name);
            ctx.sink.cancel_automation(unit.entity);
            self.retire(ctx, unit.entity);
            return;
        }
        if unit.task() != UnitTask::Explore {
            return;
        }
        let world = ctx.world;
        let cities = world.cities_of(ctx.faction.entity);
        let reachable = cities.iter().any(|city| {
            std::iter::once(city.position)
                .chain(city.position.neighbors())
                .any(|plot| ctx.paths.shortest_path(unit, unit.position, plot).is_some())
        });
        if !cities.is_empty() && !reachable {
            info!("Disbanding explorer {}: no path home", unit.name);
            ctx.sink.disband(unit.entity);
            ctx.disbanded.push(unit.entity);
            self.explorers_disbanded += 1;
            self.retire(ctx, unit.entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::homeland::moves::fixtures::*;
    use crate::map::tiles::{TerrainType, Tile};
    use crate::test_utils::*;
    use crate::units::CityInfo;

    #[test]
    fn explorer_heads_for_unrevealed_land() {
        let [owner, looker] = entities();
        let mut map = owned_map(12, 12, owner, pos(2, 2), 1);
        map.hide_all(owner);
        map.reveal(owner, pos(2, 2), 3);
        map.add_unit(scout(looker, owner, pos(2, 2))).unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (log, committed) =
            run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_explorer_moves(ctx, false));

        assert_eq!(committed, vec![looker]);
        let orders = log.orders_for(looker);
        assert_eq!(orders.len(), 1);
        let UnitOrder::MoveTo(to) = orders[0] else {
            panic!("expected a move, got {:?}", orders[0]);
        };
        assert!(to.distance_to(pos(2, 2)) <= 2);
    }

    #[test]
    fn explorer_prefers_goody_huts() {
        let [owner, looker] = entities();
        let mut map = owned_map(12, 12, owner, pos(2, 2), 1);
        map.set_tile(
            pos(6, 2),
            Tile::new(TerrainType::Grassland).with_improvement(Improvement::GoodyHut),
        )
        .unwrap();
        map.add_unit(scout(looker, owner, pos(2, 2))).unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (log, _) =
            run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_explorer_moves(ctx, false));

        assert_eq!(log.orders_for(looker), vec![UnitOrder::MoveTo(pos(4, 2))]);
    }

    #[test]
    fn human_explorer_with_nothing_left_loses_automation() {
        let [owner, looker] = entities();
        // No fog: nothing left to reveal
        let mut map = owned_map(8, 8, owner, pos(2, 2), 1);
        map.add_unit(automated(scout(looker, owner, pos(2, 2)), Automation::Explore))
            .unwrap();
        let faction = human_faction(owner);
        let mut ai = ready_ai(&faction, &map);
        assert_eq!(ai.idle_units(), &[looker]);

        let (log, committed) =
            run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_explorer_moves(ctx, false));

        assert_eq!(committed, vec![looker]);
        assert_eq!(log.automation_cancelled, vec![looker]);
        assert!(log.orders_for(looker).is_empty());
        assert!(log.disbanded.is_empty());
    }

    #[test]
    fn cut_off_ai_explorer_is_disbanded() {
        let [owner, city, looker] = entities();
        let mut map = owned_map(10, 10, owner, pos(2, 2), 1);
        map.add_city(CityInfo::new(city, owner, "Roma", pos(2, 2))).unwrap();
        // Island at (7, 7)
        for plot in pos(7, 7).area(2) {
            if plot != pos(7, 7) {
                map.set_tile(plot, Tile::new(TerrainType::Ocean)).unwrap();
            }
        }
        map.add_unit(scout(looker, owner, pos(7, 7))).unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (log, committed) =
            run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_explorer_moves(ctx, false));

        assert_eq!(committed, vec![looker]);
        assert_eq!(log.disbanded, vec![looker]);
        assert_eq!(ai.explorers_disbanded(), 1);
    }

    #[test]
    fn ai_explorer_with_a_way_home_waits() {
        let [owner, city, looker] = entities();
        let mut map = owned_map(10, 10, owner, pos(2, 2), 1);
        map.add_city(CityInfo::new(city, owner, "Roma", pos(2, 2))).unwrap();
        map.add_unit(scout(looker, owner, pos(6, 6))).unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (log, committed) =
            run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_explorer_moves(ctx, false));

        assert!(committed.is_empty());
        assert!(log.disbanded.is_empty());
        assert_eq!(ai.idle_units(), &[looker]);
        // Both passes refresh the economic plots
        assert_eq!(log.plot_refreshes, 2);
    }
}
