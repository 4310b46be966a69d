use bevy::prelude::*;

use crate::config::HomelandConfig;
use crate::map::HexMap;
use crate::messages::{UnitCommand, UnitDisbanded};
use crate::turn_system::{advance_turn_phases, enemy_turn_entered};

pub mod execute;
pub mod homeland;
pub mod markers;
pub mod world;

pub use execute::{attach_homeland_agents, execute_homeland_turns, validate_homeland_config};
pub use homeland::{HomelandAi, TurnSummary};
pub use markers::{AiFaction, HomelandAgent};
pub use world::{CommandSink, HomelandWorld, IssuedOrder, OrderLog, Pathfinder};

/// Runs the homeland scheduler of every AI faction at the start of the enemy phase.
pub struct HomelandAiPlugin;

impl Plugin for HomelandAiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HomelandConfig>()
            .add_message::<UnitCommand>()
            .add_message::<UnitDisbanded>()
            .add_systems(Startup, validate_homeland_config)
            .add_systems(
                Update,
                (
                    attach_homeland_agents,
                    execute_homeland_turns
                        .run_if(resource_exists::<HexMap>)
                        .run_if(enemy_turn_entered),
                )
                    .chain()
                    .after(advance_turn_phases),
            );
    }
}
