//! Homeland turn execution.
//!
//! Runs the scheduler of every AI faction against the shared map and turns
//! the recorded orders into messages for the mission systems.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::ai::homeland::HomelandAi;
use crate::ai::markers::{AiFaction, HomelandAgent};
use crate::ai::world::OrderLog;
use crate::config::HomelandConfig;
use crate::map::HexMap;
use crate::messages::{UnitCommand, UnitDisbanded};
use crate::turn_system::TurnSystem;

/// Gives every newly spawned AI faction its own scheduler.
pub fn attach_homeland_agents(
    mut commands: Commands,
    config: Res<HomelandConfig>,
    factions: Query<Entity, (With<AiFaction>, Without<HomelandAgent>)>,
) {
    for entity in &factions {
        debug!("Attaching homeland scheduler to faction {entity}");
        commands
            .entity(entity)
            .insert(HomelandAgent(HomelandAi::new(entity, config.clone())));
    }
}

/// Main homeland system - runs once per EnemyTurn.
///
/// Factions are scheduled in entity order so a replay issues the same
/// orders. Each faction sees the map as left by the factions before it.
pub fn execute_homeland_turns(
    turn: Res<TurnSystem>,
    mut map: ResMut<HexMap>,
    mut agents: Query<(Entity, &mut HomelandAgent), With<AiFaction>>,
    mut unit_commands: MessageWriter<UnitCommand>,
    mut disbanded: MessageWriter<UnitDisbanded>,
) {
    map.begin_turn(turn.current_turn);

    let mut agents: Vec<_> = agents.iter_mut().collect();
    agents.sort_by_key(|(entity, _)| *entity);

    for (entity, mut agent) in agents {
        let Some(faction) = map.faction(entity).cloned() else {
            warn!("AI faction {entity} has no record on the map");
            continue;
        };

        let mut log = OrderLog::default();
        let summary = agent.0.do_turn(&faction, &*map, &*map, &mut log);
        info!(
            "{} homeland turn {}: {} orders, {} unassigned, {} disbanded",
            faction.name,
            summary.turn,
            log.orders.len(),
            summary.unassigned.len(),
            log.disbanded.len()
        );

        map.apply(&log);
        for issued in &log.orders {
            unit_commands.write(UnitCommand {
                unit: issued.unit,
                order: issued.order,
            });
        }
        for &unit in &log.disbanded {
            disbanded.write(UnitDisbanded {
                unit,
                faction: entity,
            });
        }
    }
}

/// Reports an invalid config once at startup; the scheduler still runs with it.
pub fn validate_homeland_config(config: Res<HomelandConfig>) {
    if let Err(error) = config.validate() {
        error!("Invalid homeland config: {error}");
    }
}
