use bevy::prelude::*;

use crate::ai::homeland::HomelandAi;

/// Marks a faction entity whose homeland is run by the scheduler.
///
/// The entity must have a matching [`crate::faction::Faction`] record on the
/// [`crate::map::HexMap`].
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AiFaction;

/// Scheduler state that lives across turns for one faction.
#[derive(Component, Debug, Clone)]
pub struct HomelandAgent(pub HomelandAi);
