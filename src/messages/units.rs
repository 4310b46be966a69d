use bevy::prelude::*;

use crate::units::UnitOrder;

/// An order the homeland scheduler pushed onto a unit's mission queue.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitCommand {
    pub unit: Entity,
    pub order: UnitOrder,
}

/// A unit the scheduler removed from play, e.g. an explorer cut off from home.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitDisbanded {
    pub unit: Entity,
    pub faction: Entity,
}
