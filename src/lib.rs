//! Rust Homeland - the home-front task scheduler of a turn-based hex strategy AI
//!
//! Every enemy turn the scheduler hands each idle unit of an AI faction one
//! task: garrison, explore, build, retreat, patrol, and so on. The library
//! exposes the scheduler itself ([`ai::homeland::HomelandAi`]) and the Bevy
//! plugins that run it headless against a [`map::HexMap`].

use crate::ai::HomelandAiPlugin;
use crate::turn_system::TurnSystemPlugin;
use bevy::app::PluginGroup;
use bevy::log::LogPlugin;
use bevy::prelude::*;

pub mod ai;
pub mod config;
pub mod constants;
pub mod faction;
pub mod map;
pub mod messages;
pub mod pathfinding;
pub mod turn_system;
pub mod units;

/// Plugin group for turn flow and the homeland scheduler (headless-compatible)
pub struct HomelandPlugins;

impl PluginGroup for HomelandPlugins {
    fn build(self) -> bevy::app::PluginGroupBuilder {
        bevy::app::PluginGroupBuilder::start::<Self>()
            .add(TurnSystemPlugin)
            .add(HomelandAiPlugin)
    }
}

/// Headless app with logging. Insert a [`map::HexMap`] and spawn
/// [`ai::AiFaction`] entities to get going.
pub fn app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .add_plugins(HomelandPlugins);
    app
}

#[cfg(test)]
pub mod test_utils;
