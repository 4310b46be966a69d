use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;
use rand::Rng;

use crate::ai::homeland::{HomelandAi, TaskCategory, TurnCtx};
use crate::constants::{PATROL_RANDOM_SCORE, PATROL_TERRITORY_BONUS};
use crate::faction::Flavor;
use crate::map::tile_pos::TilePosExt;
use crate::units::{UnitDomain, UnitInfo, UnitOrder, UnitTask};

impl HomelandAi {
    /// A faction without cities founds its first one on the spot
    pub(crate) fn plot_first_turn_settler_moves(&mut self, ctx: &mut TurnCtx) {
        let world = ctx.world;
        let faction = ctx.faction;
        let homeless = world.cities_of(faction.entity).is_empty();
        let mut founder = None;

        for entity in self.idle_units.clone() {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            if !faction.is_human
                && homeless
                && founder.is_none()
                && world.can_found(unit, unit.position)
            {
                founder = Some(entity);
                continue;
            }
            if unit.has_task(UnitTask::Settle) && !unit.in_army {
                self.commit(ctx, entity, Some(UnitOrder::Skip));
            }
        }

        if let Some(entity) = founder {
            if let Some(unit) = world.unit(entity) {
                info!(
                    "{} founds a city at ({}, {})",
                    faction.name, unit.position.x, unit.position.y
                );
            }
            self.commit(ctx, entity, Some(UnitOrder::Found));
        }
    }

    pub(crate) fn plot_patrol_moves(&mut self, ctx: &mut TurnCtx) {
        if ctx.faction.is_human {
            return;
        }
        let world = ctx.world;
        let patrollers =
            self.idle_matching(world, |unit| unit.domain != UnitDomain::Air && !unit.trading);
        self.pool.start(TaskCategory::Patrol, patrollers.iter().copied());

        for entity in patrollers {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            if let Some(target) = self.patrol_target(ctx, unit) {
                debug!("{} patrols to ({}, {})", unit.name, target.x, target.y);
                self.commit(ctx, entity, Some(UnitOrder::MoveTo(target)));
            }
        }
    }

    /// Random adjacent tile, biased toward own territory
    fn patrol_target(&mut self, ctx: &TurnCtx, unit: &UnitInfo) -> Option<TilePos> {
        let world = ctx.world;
        let faction = ctx.faction.entity;
        let mut best = None;
        let mut best_value = 0;

        for plot in unit.position.neighbors() {
            let Some(tile) = world.tile(plot) else {
                continue;
            };
            if ctx.claimed.blocks(unit, plot)
                || !world.can_move_into(unit, plot)
                || world.visible_enemy_at(faction, plot)
            {
                continue;
            }
            if ctx.paths.shortest_path(unit, unit.position, plot).is_none() {
                continue;
            }
            let mut value = 1 + self.rng.random_range(0..=PATROL_RANDOM_SCORE);
            if tile.is_owned_by(faction) {
                value += PATROL_TERRITORY_BONUS;
            }
            trace!("Patrol value of ({}, {}) for {} is {}", plot.x, plot.y, unit.name, value);
            if value > best_value {
                best = Some(plot);
                best_value = value;
            }
        }
        best
    }

    pub(crate) fn plot_upgrade_moves(&mut self, ctx: &mut TurnCtx) {
        if ctx.faction.is_human {
            return;
        }
        let world = ctx.world;
        let upgradable = self.idle_matching(world, |unit| world.can_upgrade(unit));
        self.pool.start(TaskCategory::Upgrade, upgradable.iter().copied());
        for entity in upgradable {
            debug!("Upgrading unit {}", entity);
            self.commit(ctx, entity, Some(UnitOrder::Upgrade));
        }
    }

    /// Healthy aircraft rebase to the most threatened city
    pub(crate) fn plot_aircraft_moves(&mut self, ctx: &mut TurnCtx) {
        if ctx.faction.is_human {
            return;
        }
        let world = ctx.world;
        let max_damage = self.config.max_air_damage;
        let aircraft = self.idle_matching(world, |unit| {
            unit.domain == UnitDomain::Air && unit.damage() < max_damage
        });
        if aircraft.is_empty() {
            return;
        }
        self.pool.start(TaskCategory::RepositionAir, aircraft.iter().copied());

        // Ties go to the first city
        let Some(city) = world
            .cities_of(ctx.faction.entity)
            .into_iter()
            .reduce(|best, city| if city.threat_value > best.threat_value { city } else { best })
        else {
            return;
        };

        for entity in aircraft {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            let order = if unit.position == city.position {
                UnitOrder::Skip
            } else {
                debug!("Aircraft {} rebases to {}", unit.name, city.name);
                UnitOrder::Rebase(city.position)
            };
            self.commit(ctx, entity, Some(order));
        }
    }

    pub(crate) fn plot_trade_unit_moves(&mut self, ctx: &mut TurnCtx) {
        let world = ctx.world;
        let faction = ctx.faction;
        let traders = self.idle_matching(world, |unit| unit.task() == UnitTask::Trade);
        if traders.is_empty() {
            return;
        }
        self.pool.start(TaskCategory::TradeDispatch, traders.iter().copied());

        let gold = faction.flavor(Flavor::Gold) as f32;
        let food = faction.flavor(Flavor::Growth) as f32;
        let science = faction.flavor(Flavor::Science) as f32;

        for entity in traders {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            let Some(origin) = unit.origin.and_then(|at| world.city_at(at)) else {
                let cities = world.cities_of(faction.entity);
                if cities.is_empty() {
                    warn!("Trade unit {} has no city to return to", unit.name);
                    self.commit(ctx, entity, Some(UnitOrder::Skip));
                } else {
                    let home = cities[self.rng.random_range(0..cities.len())];
                    debug!("Trade unit {} rebases to {}", unit.name, home.name);
                    self.commit(ctx, entity, Some(UnitOrder::Rebase(home.position)));
                }
                continue;
            };

            let mut best = None;
            let mut best_value = f32::MIN;
            for route in world.trade_routes(faction.entity, origin.position) {
                if world.has_trade_route(origin.position, route.destination) {
                    continue;
                }
                let value =
                    route.yields.gold * gold + route.yields.food * food + route.yields.science * science;
                if value > best_value {
                    best = Some(route.destination);
                    best_value = value;
                }
            }

            match best {
                Some(destination) => {
                    let name = world
                        .city_at(destination)
                        .map_or("unknown city", |city| city.name.as_str());
                    info!("Trade route established between {} and {}", origin.name, name);
                    self.commit(ctx, entity, Some(UnitOrder::EstablishTradeRoute { destination }));
                }
                None => {
                    warn!("Trade unit {} idling in {}", unit.name, origin.name);
                    self.commit(ctx, entity, Some(UnitOrder::Skip));
                }
            }
        }
    }
}
