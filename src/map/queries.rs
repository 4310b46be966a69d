use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::*;

use super::HexMap;
use super::tile_pos::TilePosExt;
use super::tiles::{BuildKind, Improvement, TerrainType, Tile};
use crate::ai::world::{BuilderDirective, ExplorationPlot, HomelandWorld, TradeRouteOption};
use crate::constants::MIN_CITY_DISTANCE;
use crate::units::{CityInfo, UnitDomain, UnitInfo, UnitLayer, UnitTask};

/// Movement range (in turns) searched for huts worth a detour
const GOODY_SEARCH_TURNS: u32 = 3;

impl HexMap {
    fn terrain_fits(&self, unit: &UnitInfo, tile: &Tile, pos: TilePos) -> bool {
        match unit.domain {
            UnitDomain::Land => tile.land_movement_cost().is_some(),
            UnitDomain::Sea => {
                tile.terrain.is_water()
                    || self
                        .city_at(pos)
                        .is_some_and(|city| city.owner == unit.owner)
            }
            UnitDomain::Air => true,
        }
    }

    fn unrevealed_within(&self, faction: Entity, pos: TilePos, radius: u32) -> i32 {
        pos.area(radius)
            .into_iter()
            .filter(|p| self.index(*p).is_some() && !self.is_revealed(faction, *p))
            .count() as i32
    }
}

impl HomelandWorld for HexMap {
    fn turn(&self) -> u32 {
        self.turn
    }

    fn size(&self) -> TilemapSize {
        self.size
    }

    fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index(pos).and_then(|index| self.tiles.get(index))
    }

    fn is_visible(&self, faction: Entity, pos: TilePos) -> bool {
        self.index(pos).is_some()
            && self
                .fog
                .get(&faction)
                .is_none_or(|fog| fog.visible.contains(&pos))
    }

    fn is_revealed(&self, faction: Entity, pos: TilePos) -> bool {
        self.index(pos).is_some()
            && self
                .fog
                .get(&faction)
                .is_none_or(|fog| fog.revealed.contains(&pos))
    }

    fn unit(&self, unit: Entity) -> Option<&UnitInfo> {
        self.units.iter().find(|u| u.entity == unit)
    }

    fn units_of(&self, faction: Entity) -> Vec<&UnitInfo> {
        self.units.iter().filter(|u| u.owner == faction).collect()
    }

    fn unit_at(&self, pos: TilePos, layer: UnitLayer) -> Option<&UnitInfo> {
        self.units
            .iter()
            .find(|u| u.position == pos && u.layer == layer)
    }

    fn city_at(&self, pos: TilePos) -> Option<&CityInfo> {
        self.cities.iter().find(|c| c.position == pos)
    }

    fn cities_of(&self, faction: Entity) -> Vec<&CityInfo> {
        self.cities.iter().filter(|c| c.owner == faction).collect()
    }

    fn at_war(&self, a: Entity, b: Entity) -> bool {
        self.wars.contains(&Self::war_key(a, b))
    }

    fn danger(&self, faction: Entity, pos: TilePos) -> i32 {
        self.danger.get(&(faction, pos)).copied().unwrap_or(0)
    }

    fn can_move_into(&self, unit: &UnitInfo, pos: TilePos) -> bool {
        let Some(tile) = self.tile(pos) else {
            return false;
        };
        if !self.terrain_fits(unit, tile, pos) {
            return false;
        }
        if self.city_at(pos).is_some_and(|city| city.owner != unit.owner) {
            return false;
        }
        // One unit per layer, and never a tile held by another faction
        !self.units.iter().any(|other| {
            other.entity != unit.entity
                && other.position == pos
                && (other.owner != unit.owner || other.layer == unit.layer)
        })
    }

    fn can_fortify(&self, unit: &UnitInfo, pos: TilePos) -> bool {
        unit.is_combat()
            && unit.domain == UnitDomain::Land
            && !unit.embarked
            && self.tile(pos).is_some_and(|tile| tile.terrain.is_land())
            // City defenders garrison instead
            && self.city_at(pos).is_none()
    }

    fn can_garrison(&self, unit: &UnitInfo, pos: TilePos) -> bool {
        unit.is_combat()
            && unit.domain != UnitDomain::Air
            && self
                .city_at(pos)
                .is_some_and(|city| city.owner == unit.owner)
    }

    fn can_hold(&self, unit: &UnitInfo, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(|tile| match tile.owner {
            Some(owner) => owner == unit.owner || !self.at_war(unit.owner, owner),
            None => true,
        })
    }

    fn can_found(&self, unit: &UnitInfo, pos: TilePos) -> bool {
        if !unit.has_task(UnitTask::Settle) {
            return false;
        }
        let Some(tile) = self.tile(pos) else {
            return false;
        };
        let open_land = tile.terrain.is_land() && tile.terrain != TerrainType::Mountains;
        let claimable = tile.owner.is_none_or(|owner| owner == unit.owner);
        open_land
            && claimable
            && self
                .cities
                .iter()
                .all(|city| city.position.distance_to(pos) >= MIN_CITY_DISTANCE)
    }

    fn can_build(&self, unit: &UnitInfo, pos: TilePos, build: BuildKind) -> bool {
        if !unit.has_task(UnitTask::Work) && !unit.has_task(UnitTask::WorkSea) {
            return false;
        }
        let Some(tile) = self.tile(pos) else {
            return false;
        };
        if tile.owner.is_some_and(|owner| owner != unit.owner) {
            return false;
        }
        let land = tile.terrain.is_land();
        match build {
            BuildKind::FishingBoats => {
                unit.domain == UnitDomain::Sea
                    && tile.terrain.is_water()
                    && tile.improvement.is_none()
                    && tile.resource.is_some_and(|resource| {
                        resource
                            .possible_improvements()
                            .contains(&Improvement::FishingBoats)
                    })
            }
            BuildKind::Road => land && !tile.road,
            BuildKind::RemoveRoad => tile.road,
            BuildKind::Repair => tile.improvement.is_some(),
            BuildKind::Chop => tile.terrain == TerrainType::Forest,
            BuildKind::Farm
            | BuildKind::Mine
            | BuildKind::Pasture
            | BuildKind::Plantation
            | BuildKind::Fort => land && tile.improvement.is_none(),
        }
    }

    fn goody_target(&self, unit: &UnitInfo) -> Option<TilePos> {
        unit.position
            .area(unit.search_range(GOODY_SEARCH_TURNS))
            .into_iter()
            .filter(|pos| self.is_revealed(unit.owner, *pos))
            .filter(|pos| {
                self.tile(*pos)
                    .is_some_and(|tile| tile.improvement == Some(Improvement::GoodyHut))
            })
            .min_by_key(|pos| unit.position.distance_to(*pos))
    }

    fn exploration_plots(&self, faction: Entity, domain: UnitDomain) -> Vec<ExplorationPlot> {
        if !self.fog.contains_key(&faction) || domain == UnitDomain::Air {
            return Vec::new();
        }
        self.positions()
            .filter(|pos| self.is_revealed(faction, *pos) && self.city_at(*pos).is_none())
            .filter(|pos| {
                self.tile(*pos).is_some_and(|tile| match domain {
                    UnitDomain::Sea => tile.terrain.is_water(),
                    _ => tile.land_movement_cost().is_some(),
                })
            })
            .filter_map(|location| {
                let rating = self.unrevealed_within(faction, location, 1);
                (rating > 0).then_some(ExplorationPlot { location, rating })
            })
            .collect()
    }

    fn explore_score(&self, faction: Entity, pos: TilePos, sight: u32, domain: UnitDomain) -> i32 {
        if domain == UnitDomain::Air {
            return 0;
        }
        self.unrevealed_within(faction, pos, sight)
    }

    fn builder_directive(&self, unit: &UnitInfo) -> Option<BuilderDirective> {
        self.directives.get(&unit.entity).copied()
    }

    fn trade_routes(&self, _faction: Entity, origin: TilePos) -> Vec<TradeRouteOption> {
        self.trade_options
            .iter()
            .filter(|option| option.origin == origin)
            .copied()
            .collect()
    }

    fn has_trade_route(&self, origin: TilePos, destination: TilePos) -> bool {
        self.trade_routes.contains(&(origin, destination))
    }

    fn can_upgrade(&self, unit: &UnitInfo) -> bool {
        self.upgradable.contains(&unit.entity)
    }
}
