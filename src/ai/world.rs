//! Seams between the homeland scheduler and the rest of the game.
//!
//! The scheduler only ever reads the world through [`HomelandWorld`], asks
//! for routes through [`Pathfinder`] and issues orders through
//! [`CommandSink`]. [`crate::map::HexMap`] implements the first two and
//! [`OrderLog`] records what the scheduler decided.

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::*;

use crate::map::tile_pos::TilePosExt;
use crate::map::tiles::{BuildKind, Tile};
use crate::pathfinding::Path;
use crate::units::{CityInfo, UnitDomain, UnitInfo, UnitLayer, UnitOrder};

/// Tile the economic layer wants explored, with its desirability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplorationPlot {
    pub location: TilePos,
    pub rating: i32,
}

/// What the builder tasking layer wants a worker to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderDirective {
    pub build: BuildKind,
    pub target: TilePos,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Yields {
    pub gold: f32,
    pub food: f32,
    pub science: f32,
}

/// A trade route a trade unit could open from its home city.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeRouteOption {
    pub origin: TilePos,
    pub destination: TilePos,
    pub yields: Yields,
}

/// Read-only view of the game state the scheduler plans against.
pub trait HomelandWorld {
    fn turn(&self) -> u32;
    fn size(&self) -> TilemapSize;
    fn tile(&self, pos: TilePos) -> Option<&Tile>;

    fn is_visible(&self, faction: Entity, pos: TilePos) -> bool;
    fn is_revealed(&self, faction: Entity, pos: TilePos) -> bool;

    fn unit(&self, unit: Entity) -> Option<&UnitInfo>;
    fn units_of(&self, faction: Entity) -> Vec<&UnitInfo>;
    fn unit_at(&self, pos: TilePos, layer: UnitLayer) -> Option<&UnitInfo>;

    fn city_at(&self, pos: TilePos) -> Option<&CityInfo>;
    fn cities_of(&self, faction: Entity) -> Vec<&CityInfo>;

    fn at_war(&self, a: Entity, b: Entity) -> bool;
    /// Threat the faction's danger map assigns to a tile
    fn danger(&self, faction: Entity, pos: TilePos) -> i32;

    fn can_move_into(&self, unit: &UnitInfo, pos: TilePos) -> bool;
    fn can_fortify(&self, unit: &UnitInfo, pos: TilePos) -> bool;
    fn can_garrison(&self, unit: &UnitInfo, pos: TilePos) -> bool;
    fn can_hold(&self, unit: &UnitInfo, pos: TilePos) -> bool;
    fn can_found(&self, unit: &UnitInfo, pos: TilePos) -> bool;
    fn can_build(&self, unit: &UnitInfo, pos: TilePos, build: BuildKind) -> bool;

    // Economic, builder and trade advisors
    fn goody_target(&self, unit: &UnitInfo) -> Option<TilePos>;
    fn exploration_plots(&self, faction: Entity, domain: UnitDomain) -> Vec<ExplorationPlot>;
    fn explore_score(&self, faction: Entity, pos: TilePos, sight: u32, domain: UnitDomain) -> i32;
    fn builder_directive(&self, unit: &UnitInfo) -> Option<BuilderDirective>;
    fn trade_routes(&self, faction: Entity, origin: TilePos) -> Vec<TradeRouteOption>;
    fn has_trade_route(&self, origin: TilePos, destination: TilePos) -> bool;
    fn can_upgrade(&self, unit: &UnitInfo) -> bool;

    /// A unit of a faction at war with `faction` stands on a tile it can see
    fn visible_enemy_at(&self, faction: Entity, pos: TilePos) -> bool {
        if !self.is_visible(faction, pos) {
            return false;
        }
        [UnitLayer::Combat, UnitLayer::Civilian].into_iter().any(|layer| {
            self.unit_at(pos, layer)
                .is_some_and(|unit| self.at_war(faction, unit.owner))
        })
    }

    fn is_water(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(|tile| tile.terrain.is_water())
    }

    /// Land tile touching water
    fn is_coastal(&self, pos: TilePos) -> bool {
        !self.is_water(pos) && pos.neighbors().into_iter().any(|n| self.is_water(n))
    }

    fn adjacent_to_land(&self, pos: TilePos) -> bool {
        pos.neighbors()
            .into_iter()
            .any(|n| self.tile(n).is_some_and(|tile| tile.terrain.is_land()))
    }

    /// Neighbours not owned by `faction`
    fn adjacent_foreign_tiles(&self, faction: Entity, pos: TilePos, ignore_water: bool) -> u32 {
        pos.neighbors()
            .into_iter()
            .filter_map(|n| self.tile(n))
            .filter(|tile| !(ignore_water && tile.terrain.is_water()))
            .filter(|tile| !tile.is_owned_by(faction))
            .count() as u32
    }

    /// Nearest city of `faction` within `radius`, ties go to the first city
    fn closest_friendly_city(&self, faction: Entity, pos: TilePos, radius: u32) -> Option<&CityInfo> {
        self.cities_of(faction)
            .into_iter()
            .filter(|city| city.position.distance_to(pos) <= radius)
            .min_by_key(|city| city.position.distance_to(pos))
    }
}

/// Route queries for a specific unit.
pub trait Pathfinder {
    fn shortest_path(&self, unit: &UnitInfo, from: TilePos, to: TilePos) -> Option<Path>;

    /// Turns until the unit stands on `to`; `None` when it never can
    fn turns_to_reach(&self, unit: &UnitInfo, to: TilePos) -> Option<u32>;
}

/// The unit mission system the scheduler hands its decisions to.
pub trait CommandSink {
    fn push_order(&mut self, unit: Entity, order: UnitOrder);
    fn finish_turn_for(&mut self, unit: Entity);
    fn mark_processed(&mut self, unit: Entity);
    fn cancel_automation(&mut self, unit: Entity);
    fn disband(&mut self, unit: Entity);
    fn garrison_assigned(&mut self, city: Entity, turn: u32);
    fn refresh_economic_plots(&mut self, _faction: Entity) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedOrder {
    pub unit: Entity,
    pub order: UnitOrder,
}

/// [`CommandSink`] that records everything, to be applied later.
#[derive(Debug, Clone, Default)]
pub struct OrderLog {
    pub orders: Vec<IssuedOrder>,
    pub finished: Vec<Entity>,
    pub processed: Vec<Entity>,
    pub automation_cancelled: Vec<Entity>,
    pub disbanded: Vec<Entity>,
    pub garrisons: Vec<(Entity, u32)>,
    pub plot_refreshes: u32,
}

impl OrderLog {
    pub fn orders_for(&self, unit: Entity) -> Vec<UnitOrder> {
        self.orders
            .iter()
            .filter(|issued| issued.unit == unit)
            .map(|issued| issued.order)
            .collect()
    }

    pub fn is_processed(&self, unit: Entity) -> bool {
        self.processed.contains(&unit)
    }
}

impl CommandSink for OrderLog {
    fn push_order(&mut self, unit: Entity, order: UnitOrder) {
        self.orders.push(IssuedOrder { unit, order });
    }

    fn finish_turn_for(&mut self, unit: Entity) {
        self.finished.push(unit);
    }

    fn mark_processed(&mut self, unit: Entity) {
        if !self.processed.contains(&unit) {
            self.processed.push(unit);
        }
    }

    fn cancel_automation(&mut self, unit: Entity) {
        self.automation_cancelled.push(unit);
    }

    fn disband(&mut self, unit: Entity) {
        self.disbanded.push(unit);
    }

    fn garrison_assigned(&mut self, city: Entity, turn: u32) {
        self.garrisons.push((city, turn));
    }

    fn refresh_economic_plots(&mut self, _faction: Entity) {
        self.plot_refreshes += 1;
    }
}
