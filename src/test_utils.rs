//! Testing utilities for the homeland scheduler
//!
//! Fixtures for maps, factions and the usual unit archetypes. Entities are
//! allocated from a scratch ECS world so they are real, distinct ids.

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::config::HomelandConfig;
use crate::faction::Faction;
use crate::map::HexMap;
use crate::turn_system::TurnSystem;
use crate::units::{Automation, UnitDomain, UnitInfo, UnitTask};

/// Creates a minimal ECS world for testing with commonly needed resources
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(TurnSystem::default());
    world.insert_resource(HomelandConfig::default());
    world
}

/// `N` distinct entity ids
pub fn entities<const N: usize>() -> [Entity; N] {
    let mut world = World::new();
    std::array::from_fn(|_| world.spawn_empty().id())
}

pub fn pos(x: u32, y: u32) -> TilePos {
    TilePos { x, y }
}

pub fn ai_faction(entity: Entity) -> Faction {
    Faction::new(entity, "Rome")
}

pub fn human_faction(entity: Entity) -> Faction {
    Faction {
        is_human: true,
        ..Faction::new(entity, "Player")
    }
}

/// Grassland map where `owner` holds every tile within `radius` of `center`
pub fn owned_map(width: u32, height: u32, owner: Entity, center: TilePos, radius: u32) -> HexMap {
    let mut map = HexMap::new(width, height);
    map.claim(owner, center, radius);
    map
}

pub fn warrior(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo::new(entity, owner, "Warrior", at, UnitTask::Attack)
}

pub fn archer(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo {
        ranged: true,
        ..UnitInfo::new(entity, owner, "Archer", at, UnitTask::Ranged)
    }
}

pub fn horseman(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo {
        max_moves: 4,
        moves_left: 4,
        ..UnitInfo::new(entity, owner, "Horseman", at, UnitTask::FastAttack)
    }
}

pub fn scout(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo {
        base_strength: 5,
        attack_strength: 5,
        defense_strength: 5,
        ..UnitInfo::new(entity, owner, "Scout", at, UnitTask::Explore)
    }
}

pub fn settler(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo::civilian(entity, owner, "Settler", at, UnitTask::Settle)
}

pub fn builder(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo::civilian(entity, owner, "Builder", at, UnitTask::Work)
}

pub fn work_boat(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo {
        domain: UnitDomain::Sea,
        ..UnitInfo::civilian(entity, owner, "Work Boat", at, UnitTask::WorkSea)
    }
}

pub fn caravan(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo {
        origin: Some(at),
        ..UnitInfo::civilian(entity, owner, "Caravan", at, UnitTask::Trade)
    }
}

pub fn fighter(entity: Entity, owner: Entity, at: TilePos) -> UnitInfo {
    UnitInfo {
        domain: UnitDomain::Air,
        max_moves: 8,
        moves_left: 8,
        ..UnitInfo::new(entity, owner, "Biplane", at, UnitTask::Attack)
    }
}

pub fn automated(mut unit: UnitInfo, automation: Automation) -> UnitInfo {
    unit.automation = automation;
    unit
}
