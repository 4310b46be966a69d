use bevy::prelude::*;

/// Turn counter and the phase the game is in.
///
/// A turn runs `PlayerTurn -> Processing -> EnemyTurn`; leaving the enemy
/// phase starts the next turn.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct TurnSystem {
    pub current_turn: u32,
    pub phase: TurnPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    PlayerTurn,
    Processing,
    /// AI factions act, the homeland scheduler included
    EnemyTurn,
}

impl TurnPhase {
    fn next(self) -> Self {
        match self {
            TurnPhase::PlayerTurn => TurnPhase::Processing,
            TurnPhase::Processing => TurnPhase::EnemyTurn,
            TurnPhase::EnemyTurn => TurnPhase::PlayerTurn,
        }
    }
}

impl Default for TurnSystem {
    fn default() -> Self {
        Self {
            current_turn: 1,
            phase: TurnPhase::PlayerTurn,
        }
    }
}

impl TurnSystem {
    /// Step to the next phase and return it.
    pub fn advance_turn(&mut self) -> TurnPhase {
        self.phase = self.phase.next();
        if self.phase == TurnPhase::PlayerTurn {
            self.current_turn += 1;
        }
        self.phase
    }

    /// Hand control to the AI; ignored outside the player phase.
    pub fn end_player_turn(&mut self) {
        if self.is_player_turn() {
            self.advance_turn();
        }
    }

    pub fn is_player_turn(&self) -> bool {
        self.phase == TurnPhase::PlayerTurn
    }

    pub fn is_enemy_turn(&self) -> bool {
        self.phase == TurnPhase::EnemyTurn
    }
}

pub struct TurnSystemPlugin;

impl Plugin for TurnSystemPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TurnSystem>()
            .add_systems(Update, (advance_turn_phases, log_turn_changes).chain());
    }
}

/// Steps one phase per frame until control is back with the player.
///
/// Systems that act on [`TurnPhase::EnemyTurn`] run after this one, so the
/// enemy phase lasts exactly one frame.
pub fn advance_turn_phases(mut turn_system: ResMut<TurnSystem>) {
    if !turn_system.is_player_turn() {
        let phase = turn_system.advance_turn();
        debug!("Turn {} advanced to {:?}", turn_system.current_turn, phase);
    }
}

fn log_turn_changes(turn_system: Res<TurnSystem>) {
    if turn_system.is_changed() {
        info!("Turn {}: {:?}", turn_system.current_turn, turn_system.phase);
    }
}

/// Run condition: true on the first frame of each enemy phase
pub fn enemy_turn_entered(mut last_phase: Local<Option<TurnPhase>>, turn: Res<TurnSystem>) -> bool {
    let entered = turn.is_enemy_turn() && *last_phase != Some(TurnPhase::EnemyTurn);
    *last_phase = Some(turn.phase);
    entered
}
