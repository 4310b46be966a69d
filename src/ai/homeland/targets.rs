//! Per-turn scan of the known map for places worth sending units to.

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::ai::world::HomelandWorld;
use crate::config::HomelandConfig;
use crate::constants::{SENTRY_CITY_THREAT_DIVISOR, SENTRY_OUTSIDE_TILE_WEIGHT};
use crate::map::tile_pos::TilePosExt;
use crate::map::tiles::{Improvement, Tile};
use crate::units::UnitLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    City,
    SentryPoint,
    Fort,
    NavalResource,
    HomeRoad,
    AncientRuin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomelandTarget {
    pub kind: TargetKind,
    pub location: TilePos,
    pub city: Option<Entity>,
    /// City threat for city targets, computed weight for sentry points
    pub weight: i32,
    pub improvement: Option<Improvement>,
}

impl HomelandTarget {
    fn new(kind: TargetKind, location: TilePos) -> Self {
        Self {
            kind,
            location,
            city: None,
            weight: 0,
            improvement: None,
        }
    }
}

/// The six target lists found by one scan.
#[derive(Debug, Clone, Default)]
pub struct TargetSets {
    pub cities: Vec<HomelandTarget>,
    pub sentry_points: Vec<HomelandTarget>,
    pub forts: Vec<HomelandTarget>,
    pub naval_resources: Vec<HomelandTarget>,
    pub home_roads: Vec<HomelandTarget>,
    pub ancient_ruins: Vec<HomelandTarget>,
}

impl TargetSets {
    pub fn len(&self) -> usize {
        self.cities.len()
            + self.sentry_points.len()
            + self.forts.len()
            + self.naval_resources.len()
            + self.home_roads.len()
            + self.ancient_ruins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Weight of a sentry point: how much foreign ground it watches and how
/// much it matters to the nearest city.
pub fn sentry_weight<W: HomelandWorld + ?Sized>(
    world: &W,
    faction: Entity,
    pos: TilePos,
    tile: &Tile,
    outside_tiles: u32,
    config: &HomelandConfig,
) -> i32 {
    let mut weight = outside_tiles as i32 * SENTRY_OUTSIDE_TILE_WEIGHT;
    weight += tile.defense_modifier();
    weight += world.danger(faction, pos);

    if let Some(city) = world.closest_friendly_city(faction, pos, config.sentry_city_radius) {
        weight += city.threat_value * city.population / SENTRY_CITY_THREAT_DIVISOR;
        if city.is_capital {
            weight = weight * config.capital_threat_weight_percent / 100;
        }
    }

    if tile.hills {
        weight *= 2;
    }
    if world.is_coastal(pos) {
        weight /= 2;
    }
    weight
}

/// Sort ascending by weight, then keep each target only when no kept
/// target is adjacent to it. The lowest weight of a cluster survives.
pub fn dedupe_adjacent(targets: &mut Vec<HomelandTarget>) {
    targets.sort_by_key(|target| target.weight);
    let mut kept: Vec<HomelandTarget> = Vec::with_capacity(targets.len());
    for target in targets.drain(..) {
        if !kept
            .iter()
            .any(|other| other.location.distance_to(target.location) == 1)
        {
            kept.push(target);
        }
    }
    *targets = kept;
}

/// One pass over every tile the faction can see.
///
/// A tile lands in at most one list, by precedence: own city, naval
/// resource, ancient ruin or helpless enemy civilian, fort, sentry point,
/// home road. A tile holding any other civilian, our own included, lands
/// in none.
pub fn scan_targets<W: HomelandWorld + ?Sized>(
    world: &W,
    faction: Entity,
    config: &HomelandConfig,
) -> TargetSets {
    let mut sets = TargetSets::default();
    let size = world.size();

    for y in 0..size.y {
        for x in 0..size.x {
            let pos = TilePos { x, y };
            if !world.is_visible(faction, pos) {
                continue;
            }
            let Some(tile) = world.tile(pos) else {
                continue;
            };
            let combat_unit = world.unit_at(pos, UnitLayer::Combat);
            let civilian_unit = world.unit_at(pos, UnitLayer::Civilian);

            if let Some(city) = world.city_at(pos).filter(|city| city.owner == faction) {
                // The tactical layer already put someone here
                let tactical = combat_unit
                    .is_some_and(|unit| unit.owner == faction && unit.under_tactical_control);
                if !tactical {
                    sets.cities.push(HomelandTarget {
                        city: Some(city.entity),
                        weight: city.threat_value,
                        ..HomelandTarget::new(TargetKind::City, pos)
                    });
                }
            } else if tile.terrain.is_water() && tile.improvement.is_none() && tile.resource.is_some() {
                let worked_by_us = tile
                    .working_city
                    .and_then(|city| world.cities_of(faction).into_iter().find(|c| c.entity == city))
                    .is_some();
                let improvement = tile
                    .resource
                    .and_then(|resource| resource.possible_improvements().first().copied());
                if worked_by_us && improvement.is_some() {
                    sets.naval_resources.push(HomelandTarget {
                        city: tile.working_city,
                        improvement,
                        ..HomelandTarget::new(TargetKind::NavalResource, pos)
                    });
                }
            } else if tile.improvement == Some(Improvement::GoodyHut) {
                sets.ancient_ruins
                    .push(HomelandTarget::new(TargetKind::AncientRuin, pos));
            } else if let Some(civilian) = civilian_unit {
                // Any civilian ends the scan here, only an undefended enemy one is a target
                let defended = combat_unit.is_some_and(|unit| unit.owner == civilian.owner);
                let enemy = civilian.owner != faction && world.at_war(faction, civilian.owner);
                if enemy && !civilian.can_defend() && !defended {
                    sets.ancient_ruins
                        .push(HomelandTarget::new(TargetKind::AncientRuin, pos));
                }
            } else if tile.is_owned_by(faction)
                && tile.terrain.is_land()
                && tile.improvement == Some(Improvement::Fort)
            {
                sets.forts.push(HomelandTarget::new(TargetKind::Fort, pos));
            } else if !scan_sentry_point(world, faction, pos, tile, combat_unit.is_some(), config, &mut sets)
                && tile.is_owned_by(faction)
                && tile.road
            {
                sets.home_roads
                    .push(HomelandTarget::new(TargetKind::HomeRoad, pos));
            }
        }
    }

    dedupe_adjacent(&mut sets.sentry_points);
    dedupe_adjacent(&mut sets.home_roads);
    sets.cities.sort_by_key(|target| target.weight);
    sets
}

/// Adds a sentry point when the tile qualifies, returning whether it did
fn scan_sentry_point<W: HomelandWorld + ?Sized>(
    world: &W,
    faction: Entity,
    pos: TilePos,
    tile: &Tile,
    occupied: bool,
    config: &HomelandConfig,
    sets: &mut TargetSets,
) -> bool {
    let open_land = tile.land_movement_cost().is_some() && !occupied;
    let ours_or_unclaimed = tile.owner.is_none_or(|owner| owner == faction);
    if !open_land || !ours_or_unclaimed {
        return false;
    }
    let outside = world.adjacent_foreign_tiles(faction, pos, true);
    if outside == 0 {
        return false;
    }
    sets.sentry_points.push(HomelandTarget {
        weight: sentry_weight(world, faction, pos, tile, outside, config),
        ..HomelandTarget::new(TargetKind::SentryPoint, pos)
    });
    true
}
