#![allow(dead_code)]

use bevy::ecs::message::MessageReader;
use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;
use rust_homeland::HomelandPlugins;
use rust_homeland::ai::AiFaction;
use rust_homeland::faction::Faction;
use rust_homeland::map::HexMap;
use rust_homeland::messages::{UnitCommand, UnitDisbanded};
use rust_homeland::turn_system::{TurnPhase, TurnSystem};

/// Headless app with the homeland plugins and nothing else
pub fn homeland_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, HomelandPlugins));
    app
}

/// Spawns an AI faction entity and registers its record on `map`
pub fn spawn_ai_faction(app: &mut App, map: &mut HexMap, name: &str) -> Entity {
    let entity = app.world_mut().spawn(AiFaction).id();
    map.add_faction(Faction::new(entity, name));
    entity
}

/// Plain entity id for a unit or city record
pub fn spawn_id(app: &mut App) -> Entity {
    app.world_mut().spawn_empty().id()
}

pub fn pos(x: u32, y: u32) -> TilePos {
    TilePos { x, y }
}

/// Ends the player turn and runs the frame in which the enemy phase starts
pub fn play_enemy_turn(app: &mut App) {
    app.world_mut().resource_mut::<TurnSystem>().end_player_turn();
    app.update();
    assert_eq!(
        app.world().resource::<TurnSystem>().phase,
        TurnPhase::EnemyTurn
    );
}

/// Reads messages written since the last call with the same state
pub fn drain_commands(
    app: &mut App,
    state: &mut SystemState<MessageReader<'static, 'static, UnitCommand>>,
) -> Vec<UnitCommand> {
    state.get_mut(app.world_mut()).read().copied().collect()
}

pub fn drain_disbanded(
    app: &mut App,
    state: &mut SystemState<MessageReader<'static, 'static, UnitDisbanded>>,
) -> Vec<UnitDisbanded> {
    state.get_mut(app.world_mut()).read().copied().collect()
}
