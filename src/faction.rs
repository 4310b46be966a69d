use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Personality axes a leader can lean towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum Flavor {
    Defense,
    Offense,
    Expansion,
    Recon,
    Gold,
    Growth,
    Science,
    MilitaryTraining,
    TileImprovement,
    NavalTileImprovement,
}

/// Leader personality: one opaque integer weight per flavor axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    weights: HashMap<Flavor, i32>,
}

impl Personality {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, flavor: Flavor, value: i32) -> Self {
        self.weights.insert(flavor, value);
        self
    }

    pub fn set(&mut self, flavor: Flavor, value: i32) {
        self.weights.insert(flavor, value);
    }

    /// Weight of a flavor; axes the leader never mentions count as 0.
    pub fn value(&self, flavor: Flavor) -> i32 {
        self.weights.get(&flavor).copied().unwrap_or(0)
    }
}

/// How satisfied the faction's economic layer is with its scouting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum ReconState {
    #[default]
    NeedRecon,
    Enough,
}

/// Everything the homeland scheduler needs to know about the faction it plays.
#[derive(Debug, Clone)]
pub struct Faction {
    pub entity: Entity,
    pub name: String,
    pub is_human: bool,
    /// Raider factions have no homeland; their units are only marked processed.
    pub is_raider: bool,
    pub personality: Personality,
    /// Government policy that makes garrisons outrank sentries.
    pub encourages_garrisons: bool,
    pub recon_state: ReconState,
}

impl Faction {
    pub fn new(entity: Entity, name: impl Into<String>) -> Self {
        Self {
            entity,
            name: name.into(),
            is_human: false,
            is_raider: false,
            personality: Personality::default(),
            encourages_garrisons: false,
            recon_state: ReconState::default(),
        }
    }

    pub fn flavor(&self, flavor: Flavor) -> i32 {
        self.personality.value(flavor)
    }
}
