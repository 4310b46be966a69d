use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::*;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::ai::world::{BuilderDirective, OrderLog, TradeRouteOption};
use crate::faction::Faction;
use crate::units::{Automation, CityInfo, UnitInfo};

mod queries;
pub mod tile_pos;
pub mod tiles;

pub use tile_pos::*;
pub use tiles::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("tile ({x}, {y}) lies outside the {width}x{height} map")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("unit {0} is already on the map")]
    DuplicateUnit(Entity),
    #[error("city {0} is already on the map")]
    DuplicateCity(Entity),
    #[error("a city already stands at ({x}, {y})")]
    CityOccupied { x: u32, y: u32 },
}

/// Tiles one faction has seen at some point, and the ones it sees now.
#[derive(Debug, Clone, Default)]
struct FogOfWar {
    revealed: HashSet<TilePos>,
    visible: HashSet<TilePos>,
}

/// Gameplay state of the whole map as the AI sees it.
///
/// Holds the tile grid, every unit and city, diplomatic war state, the
/// per-faction danger maps and fog, plus the tables filled in by the
/// economic, builder and trade layers. A faction without fog sees every tile.
#[derive(Resource, Debug, Clone)]
pub struct HexMap {
    size: TilemapSize,
    tiles: Vec<Tile>,
    turn: u32,
    factions: Vec<Faction>,
    units: Vec<UnitInfo>,
    cities: Vec<CityInfo>,
    wars: HashSet<(Entity, Entity)>,
    danger: HashMap<(Entity, TilePos), i32>,
    fog: HashMap<Entity, FogOfWar>,
    directives: HashMap<Entity, BuilderDirective>,
    trade_options: Vec<TradeRouteOption>,
    trade_routes: HashSet<(TilePos, TilePos)>,
    upgradable: HashSet<Entity>,
}

impl HexMap {
    /// Grassland map with no owners, units or cities
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: TilemapSize {
                x: width,
                y: height,
            },
            tiles: vec![Tile::default(); (width * height) as usize],
            turn: 1,
            factions: Vec::new(),
            units: Vec::new(),
            cities: Vec::new(),
            wars: HashSet::new(),
            danger: HashMap::new(),
            fog: HashMap::new(),
            directives: HashMap::new(),
            trade_options: Vec::new(),
            trade_routes: HashSet::new(),
            upgradable: HashSet::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        (pos.x < self.size.x && pos.y < self.size.y)
            .then(|| (pos.y * self.size.x + pos.x) as usize)
    }

    fn check_bounds(&self, pos: TilePos) -> Result<usize, MapError> {
        self.index(pos).ok_or(MapError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.size.x,
            height: self.size.y,
        })
    }

    /// Every tile position, row by row
    pub fn positions(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.size.y).flat_map(move |y| (0..self.size.x).map(move |x| TilePos { x, y }))
    }

    pub fn set_tile(&mut self, pos: TilePos, tile: Tile) -> Result<(), MapError> {
        let index = self.check_bounds(pos)?;
        self.tiles[index] = tile;
        Ok(())
    }

    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        let index = self.index(pos)?;
        self.tiles.get_mut(index)
    }

    /// Hand every in-bounds tile within `radius` of `center` to `owner`
    pub fn claim(&mut self, owner: Entity, center: TilePos, radius: u32) {
        for pos in center.area(radius) {
            if let Some(tile) = self.tile_mut(pos) {
                tile.owner = Some(owner);
            }
        }
    }

    pub fn current_turn(&self) -> u32 {
        self.turn
    }

    /// Start a new turn: every unit is unprocessed with full moves again
    pub fn begin_turn(&mut self, turn: u32) {
        self.turn = turn;
        for unit in &mut self.units {
            unit.processed = false;
            unit.moves_left = unit.max_moves;
        }
    }

    pub fn add_faction(&mut self, faction: Faction) {
        self.factions.retain(|f| f.entity != faction.entity);
        self.factions.push(faction);
    }

    pub fn faction(&self, entity: Entity) -> Option<&Faction> {
        self.factions.iter().find(|f| f.entity == entity)
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn add_unit(&mut self, unit: UnitInfo) -> Result<(), MapError> {
        self.check_bounds(unit.position)?;
        if self.units.iter().any(|u| u.entity == unit.entity) {
            return Err(MapError::DuplicateUnit(unit.entity));
        }
        self.units.push(unit);
        Ok(())
    }

    pub fn unit_mut(&mut self, entity: Entity) -> Option<&mut UnitInfo> {
        self.units.iter_mut().find(|u| u.entity == entity)
    }

    pub fn units(&self) -> &[UnitInfo] {
        &self.units
    }

    pub fn remove_unit(&mut self, entity: Entity) -> Option<UnitInfo> {
        let index = self.units.iter().position(|u| u.entity == entity)?;
        Some(self.units.remove(index))
    }

    /// Place a city; its tile becomes owned by the city's faction
    pub fn add_city(&mut self, city: CityInfo) -> Result<(), MapError> {
        let index = self.check_bounds(city.position)?;
        if self.cities.iter().any(|c| c.entity == city.entity) {
            return Err(MapError::DuplicateCity(city.entity));
        }
        if self.cities.iter().any(|c| c.position == city.position) {
            return Err(MapError::CityOccupied {
                x: city.position.x,
                y: city.position.y,
            });
        }
        self.tiles[index].owner = Some(city.owner);
        self.cities.push(city);
        Ok(())
    }

    pub fn city_mut(&mut self, entity: Entity) -> Option<&mut CityInfo> {
        self.cities.iter_mut().find(|c| c.entity == entity)
    }

    fn war_key(a: Entity, b: Entity) -> (Entity, Entity) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn declare_war(&mut self, a: Entity, b: Entity) {
        self.wars.insert(Self::war_key(a, b));
    }

    pub fn make_peace(&mut self, a: Entity, b: Entity) {
        self.wars.remove(&Self::war_key(a, b));
    }

    pub fn set_danger(&mut self, faction: Entity, pos: TilePos, value: i32) {
        self.danger.insert((faction, pos), value);
    }

    /// Put the faction under fog: it no longer sees tiles it has not been shown
    pub fn hide_all(&mut self, faction: Entity) {
        self.fog.entry(faction).or_default();
    }

    /// Reveal and make visible every tile within `radius` of `center`
    pub fn reveal(&mut self, faction: Entity, center: TilePos, radius: u32) {
        let area: Vec<TilePos> = center
            .area(radius)
            .into_iter()
            .filter(|pos| self.index(*pos).is_some())
            .collect();
        let fog = self.fog.entry(faction).or_default();
        for pos in area {
            fog.revealed.insert(pos);
            fog.visible.insert(pos);
        }
    }

    /// Drop current visibility but keep what was revealed
    pub fn clear_visibility(&mut self, faction: Entity) {
        if let Some(fog) = self.fog.get_mut(&faction) {
            fog.visible.clear();
        }
    }

    pub fn set_builder_directive(&mut self, unit: Entity, directive: BuilderDirective) {
        self.directives.insert(unit, directive);
    }

    pub fn add_trade_option(&mut self, option: TradeRouteOption) {
        self.trade_options.push(option);
    }

    pub fn add_trade_route(&mut self, origin: TilePos, destination: TilePos) {
        self.trade_routes.insert((origin, destination));
    }

    pub fn mark_upgradable(&mut self, unit: Entity) {
        self.upgradable.insert(unit);
    }

    /// Write the bookkeeping of a scheduled turn back onto the map.
    ///
    /// Orders themselves are carried out by the mission system; this only
    /// records processed flags, spent moves, head missions, cancelled
    /// automation, disbanded units and garrison stamps.
    pub fn apply(&mut self, log: &OrderLog) {
        for issued in &log.orders {
            if let Some(unit) = self.unit_mut(issued.unit) {
                unit.head_order = Some(issued.order);
            }
        }
        for &entity in &log.finished {
            if let Some(unit) = self.unit_mut(entity) {
                unit.moves_left = 0;
            }
        }
        for &entity in &log.processed {
            if let Some(unit) = self.unit_mut(entity) {
                unit.processed = true;
            }
        }
        for &entity in &log.automation_cancelled {
            if let Some(unit) = self.unit_mut(entity) {
                unit.automation = Automation::None;
            }
        }
        for &entity in &log.disbanded {
            self.remove_unit(entity);
        }
        for &(city, turn) in &log.garrisons {
            if let Some(city) = self.city_mut(city) {
                city.last_garrison_turn = Some(turn);
            }
        }
    }
}
