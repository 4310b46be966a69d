use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::ai::homeland::{HomelandAi, TaskCategory, TurnCtx};
use crate::map::tile_pos::TilePosExt;
use crate::units::{UnitDomain, UnitInfo, UnitLayer, UnitOrder};

/// How safe a retreat tile is, worst first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Shelter {
    Exposed,
    Territory,
    Cover,
    ZeroDanger,
    City,
}

/// Whether a unit standing in `danger` should run
fn should_flee(unit: &UnitInfo, danger: i32) -> bool {
    if !unit.can_defend() {
        // Automated fighters are left to their automation
        !(unit.is_automated() && unit.base_strength > 0)
    } else if unit.is_damaged() {
        unit.under_ranged_attack || unit.attack_strength * 2 <= unit.base_strength
    } else {
        danger > unit.attack_strength * 100
    }
}

impl HomelandAi {
    pub(crate) fn plot_heal_moves(&mut self, ctx: &mut TurnCtx) {
        if ctx.faction.is_human {
            return;
        }
        let world = ctx.world;
        let faction = ctx.faction.entity;
        let patients = self.idle_matching(world, |unit| {
            unit.is_damaged()
                && !unit.embarked
                && !unit.under_ranged_attack
                && world.city_at(unit.position).is_none()
                && (unit.domain != UnitDomain::Sea
                    || world
                        .tile(unit.position)
                        .is_some_and(|tile| tile.is_owned_by(faction)))
        });
        self.pool.start(TaskCategory::Heal, patients.iter().copied());

        for entity in patients {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            let order = if world.can_fortify(unit, unit.position) {
                UnitOrder::Fortify
            } else {
                UnitOrder::Skip
            };
            debug!("Healing {} at ({}, {})", unit.name, unit.position.x, unit.position.y);
            self.commit(ctx, entity, Some(order));
        }
    }

    pub(crate) fn plot_moves_to_safety(&mut self, ctx: &mut TurnCtx) {
        let world = ctx.world;
        let faction = ctx.faction.entity;
        let endangered = self.idle_matching(world, |unit| {
            let danger = world.danger(faction, unit.position);
            danger > 0 && should_flee(unit, danger)
        });
        if endangered.is_empty() {
            return;
        }
        self.pool.start(TaskCategory::ToSafety, endangered);
        self.execute_moves_to_safest_plot(ctx);
    }

    /// Move every pooled unit to the safest tile it can reach this turn.
    fn execute_moves_to_safest_plot(&mut self, ctx: &mut TurnCtx) {
        let world = ctx.world;
        let candidates: Vec<Entity> = self.pool.normal.iter().map(|c| c.unit).collect();

        for entity in candidates {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            let Some(plot) = self.safest_plot(ctx, unit) else {
                continue;
            };
            let order = if plot == unit.position {
                UnitOrder::Skip
            } else {
                UnitOrder::MoveTo(plot)
            };
            debug!("{} retreats to ({}, {})", unit.name, plot.x, plot.y);
            self.commit(ctx, entity, Some(order));
        }
    }

    /// Shelter rank first, lower danger second
    fn safest_plot(&self, ctx: &TurnCtx, unit: &UnitInfo) -> Option<TilePos> {
        let world = ctx.world;
        let faction = ctx.faction.entity;
        let mut best: Option<(Shelter, i32, TilePos)> = None;

        for plot in unit.position.area(unit.moves_left) {
            let Some(tile) = world.tile(plot) else {
                continue;
            };
            if ctx.claimed.blocks(unit, plot) {
                continue;
            }
            let occupant = world
                .unit_at(plot, UnitLayer::Combat)
                .filter(|other| other.entity != unit.entity);
            if let Some(other) = occupant {
                if other.owner != unit.owner || unit.is_combat() {
                    continue;
                }
            }
            let reachable = plot == unit.position
                || (world.can_move_into(unit, plot)
                    && ctx
                        .paths
                        .turns_to_reach(unit, plot)
                        .is_some_and(|turns| turns <= 1));
            if !reachable {
                continue;
            }

            let danger = world.danger(faction, plot);
            let shelter = if world.city_at(plot).is_some_and(|city| city.owner == faction) {
                Shelter::City
            } else if danger <= 0 {
                Shelter::ZeroDanger
            } else if occupant.is_some() {
                Shelter::Cover
            } else if tile.is_owned_by(faction) {
                Shelter::Territory
            } else {
                Shelter::Exposed
            };

            let better = best.is_none_or(|(best_shelter, best_danger, _)| {
                shelter > best_shelter || (shelter == best_shelter && danger < best_danger)
            });
            if better {
                best = Some((shelter, danger, plot));
            }
        }
        best.map(|(_, _, plot)| plot)
    }

    /// Where a civilian should go to get out of harm's way.
    ///
    /// Scores every tile reachable within a turn as: +1 inside own territory,
    /// plus the defense of a friendly city or (unless `ignore_units`) of a
    /// friendly defender there, minus the tile's danger. Staying put becomes
    /// a skip when the unit may hold the tile; otherwise automation is
    /// dropped and no order is returned.
    pub(crate) fn civilian_safety_order(
        &self,
        ctx: &mut TurnCtx,
        unit: &UnitInfo,
        ignore_units: bool,
    ) -> Option<UnitOrder> {
        let world = ctx.world;
        let faction = ctx.faction.entity;
        let mut best: Option<(i32, TilePos)> = None;

        // Staying put is scored first so ties never move the unit
        let plots = std::iter::once(unit.position).chain(
            unit.position
                .area(unit.search_range(1))
                .into_iter()
                .filter(|&plot| plot != unit.position),
        );
        for plot in plots {
            let Some(tile) = world.tile(plot) else {
                continue;
            };
            if plot != unit.position
                && (ctx.claimed.blocks(unit, plot) || !world.can_move_into(unit, plot))
            {
                continue;
            }
            if world.visible_enemy_at(faction, plot) {
                continue;
            }
            if !ctx
                .paths
                .turns_to_reach(unit, plot)
                .is_some_and(|turns| turns <= 1)
            {
                continue;
            }

            let mut value = 0;
            if tile.is_owned_by(faction) {
                value += 1;
            }
            if let Some(city) = world.city_at(plot).filter(|city| city.owner == faction) {
                value += city.defense_strength;
            } else if !ignore_units {
                if let Some(defender) = world.unit_at(plot, UnitLayer::Combat) {
                    if defender.owner == unit.owner && defender.can_defend() {
                        value += defender.defense_strength;
                    }
                }
            }
            value -= world.danger(faction, plot);
            trace!("{} safety at ({}, {}) is {}", unit.name, plot.x, plot.y, value);

            if best.is_none_or(|(best_value, _)| value > best_value) {
                best = Some((value, plot));
            }
        }

        let (_, plot) = best?;
        if plot != unit.position {
            return Some(UnitOrder::MoveTo(plot));
        }
        if world.can_hold(unit, plot) {
            Some(UnitOrder::Skip)
        } else {
            ctx.sink.cancel_automation(unit.entity);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::homeland::ClaimedPlots;
    use crate::ai::homeland::moves::fixtures::*;
    use crate::ai::world::{HomelandWorld, OrderLog};
    use crate::map::HexMap;
    use crate::test_utils::*;
    use crate::units::CityInfo;

    /// Danger everywhere near `center` except the listed tiles
    fn dangerous_surroundings(map: &mut HexMap, faction: Entity, center: TilePos, safe: &[TilePos]) {
        for plot in center.area(4) {
            if !safe.contains(&plot) {
                map.set_danger(faction, plot, 50);
            }
        }
    }

    #[test]
    fn civilian_takes_the_defended_tile_when_it_scores_higher() {
        let [owner, worker, guard] = entities();
        let home = pos(5, 5);
        let territory = pos(6, 5);
        let defended = pos(4, 5);
        let mut map = HexMap::new(12, 12);
        map.tile_mut(territory).unwrap().owner = Some(owner);
        dangerous_surroundings(&mut map, owner, home, &[territory, defended]);
        map.set_danger(owner, home, 10);
        map.set_danger(owner, defended, 2);
        map.add_unit(builder(worker, owner, home)).unwrap();
        map.add_unit(UnitInfo {
            defense_strength: 5,
            waiting: true,
            ..warrior(guard, owner, defended)
        })
        .unwrap();
        let faction = ai_faction(owner);
        let ai = ready_ai(&faction, &map);

        let mut log = OrderLog::default();
        let mut ctx = TurnCtx::new(&faction, &map, &map, &mut log);
        let unit = map.unit(worker).unwrap();

        // territory: 1 - 0 = 1, defended: 5 - 2 = 3
        assert_eq!(
            ai.civilian_safety_order(&mut ctx, unit, false),
            Some(UnitOrder::MoveTo(defended))
        );
        // Without counting units the territory tile wins
        assert_eq!(
            ai.civilian_safety_order(&mut ctx, unit, true),
            Some(UnitOrder::MoveTo(territory))
        );
    }

    #[test]
    fn civilian_with_nowhere_better_holds_or_drops_automation() {
        let [owner, enemy, worker] = entities();
        let home = pos(5, 5);
        let mut map = HexMap::new(12, 12);
        dangerous_surroundings(&mut map, owner, home, &[home]);
        map.add_unit(builder(worker, owner, home)).unwrap();
        let faction = ai_faction(owner);
        let ai = ready_ai(&faction, &map);

        {
            let mut log = OrderLog::default();
            let mut ctx = TurnCtx::new(&faction, &map, &map, &mut log);
            let unit = map.unit(worker).unwrap();
            assert_eq!(ai.civilian_safety_order(&mut ctx, unit, true), Some(UnitOrder::Skip));
        }

        // Enemy ground at war cannot be held
        map.tile_mut(home).unwrap().owner = Some(enemy);
        map.declare_war(owner, enemy);
        let mut log = OrderLog::default();
        {
            let mut ctx = TurnCtx::new(&faction, &map, &map, &mut log);
            let unit = map.unit(worker).unwrap();
            assert_eq!(ai.civilian_safety_order(&mut ctx, unit, true), None);
        }
        assert_eq!(log.automation_cancelled, vec![worker]);
    }

    #[test]
    fn retreat_prefers_city_over_zero_danger() {
        let [owner, city, worker] = entities();
        let mut map = HexMap::new(12, 12);
        dangerous_surroundings(&mut map, owner, pos(5, 5), &[pos(6, 5)]);
        map.set_danger(owner, pos(5, 5), 20);
        map.set_danger(owner, pos(4, 5), 5);
        map.add_city(CityInfo::new(city, owner, "Roma", pos(4, 5))).unwrap();
        map.add_unit(settler(worker, owner, pos(5, 5))).unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (log, committed) =
            run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_moves_to_safety(ctx));

        assert_eq!(committed, vec![worker]);
        assert_eq!(log.orders_for(worker), vec![UnitOrder::MoveTo(pos(4, 5))]);
    }

    #[test]
    fn two_refugees_do_not_crowd_into_one_city() {
        let [owner, city, first, second] = entities();
        let mut map = HexMap::new(12, 12);
        dangerous_surroundings(&mut map, owner, pos(5, 5), &[]);
        map.add_city(CityInfo::new(city, owner, "Roma", pos(5, 5))).unwrap();
        map.add_unit(settler(first, owner, pos(4, 5))).unwrap();
        map.add_unit(settler(second, owner, pos(6, 5))).unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (log, committed) =
            run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_moves_to_safety(ctx));

        assert_eq!(committed, vec![first, second]);
        assert_eq!(log.orders_for(first), vec![UnitOrder::MoveTo(pos(5, 5))]);
        assert_ne!(log.orders_for(second), vec![UnitOrder::MoveTo(pos(5, 5))]);
    }

    #[test]
    fn civilian_retreat_skips_a_tile_already_claimed() {
        let [owner, worker] = entities();
        let home = pos(5, 5);
        let haven = pos(6, 5);
        let mut map = HexMap::new(12, 12);
        map.tile_mut(haven).unwrap().owner = Some(owner);
        dangerous_surroundings(&mut map, owner, home, &[haven]);
        map.add_unit(builder(worker, owner, home)).unwrap();
        let faction = ai_faction(owner);
        let ai = ready_ai(&faction, &map);

        let mut log = OrderLog::default();
        let mut ctx = TurnCtx::new(&faction, &map, &map, &mut log);
        let unit = map.unit(worker).unwrap();
        assert_eq!(
            ai.civilian_safety_order(&mut ctx, unit, true),
            Some(UnitOrder::MoveTo(haven))
        );

        ctx.claimed.claim(haven, UnitLayer::Civilian);
        assert_ne!(
            ai.civilian_safety_order(&mut ctx, unit, true),
            Some(UnitOrder::MoveTo(haven))
        );
        // A combat unit may still share the tile
        ctx.claimed = ClaimedPlots::default();
        ctx.claimed.claim(haven, UnitLayer::Combat);
        assert_eq!(
            ai.civilian_safety_order(&mut ctx, unit, true),
            Some(UnitOrder::MoveTo(haven))
        );
    }

    #[test]
    fn retreat_takes_lower_danger_within_a_shelter_rank() {
        let [owner, worker] = entities();
        let mut map = HexMap::new(12, 12);
        dangerous_surroundings(&mut map, owner, pos(5, 5), &[]);
        map.set_danger(owner, pos(6, 5), 7);
        map.set_danger(owner, pos(4, 5), 3);
        map.add_unit(settler(worker, owner, pos(5, 5))).unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (log, _) = run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_moves_to_safety(ctx));

        assert_eq!(log.orders_for(worker), vec![UnitOrder::MoveTo(pos(4, 5))]);
    }

    #[test]
    fn healthy_soldiers_stand_their_ground() {
        let [owner, sword] = entities();
        let mut map = HexMap::new(12, 12);
        map.set_danger(owner, pos(5, 5), 300);
        map.add_unit(warrior(sword, owner, pos(5, 5))).unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (_, committed) =
            run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_moves_to_safety(ctx));
        assert!(committed.is_empty());

        let unit = warrior(sword, owner, pos(5, 5));
        assert!(!should_flee(&unit, 300));
        assert!(should_flee(&unit, 1001));
        let battered = UnitInfo {
            health: 40,
            attack_strength: 4,
            ..unit
        };
        assert!(should_flee(&battered, 1));
    }

    #[test]
    fn damaged_units_heal_outside_cities() {
        let [owner, city, hurt, hurt_in_city] = entities();
        let mut map = owned_map(12, 12, owner, pos(5, 5), 3);
        map.add_city(CityInfo::new(city, owner, "Roma", pos(5, 5))).unwrap();
        map.add_unit(UnitInfo {
            health: 60,
            ..warrior(hurt, owner, pos(3, 3))
        })
        .unwrap();
        map.add_unit(UnitInfo {
            health: 60,
            ..warrior(hurt_in_city, owner, pos(5, 5))
        })
        .unwrap();
        let faction = ai_faction(owner);
        let mut ai = ready_ai(&faction, &map);

        let (log, committed) = run_handler(&mut ai, &faction, &map, |ai, ctx| ai.plot_heal_moves(ctx));

        assert_eq!(committed, vec![hurt]);
        assert_eq!(log.orders_for(hurt), vec![UnitOrder::Fortify]);
    }
}
