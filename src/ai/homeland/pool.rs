use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use super::priorities::TaskCategory;
use crate::ai::world::HomelandWorld;
use crate::config::HomelandConfig;
use crate::faction::{Faction, ReconState};
use crate::units::{UnitDomain, UnitInfo, UnitTask};

/// A unit staged for one task category.
///
/// `coarse_distance` is the raw hex distance to the current target and
/// `exact_turns` the pathfinder's answer; `None` means unreachable or not
/// computed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub unit: Entity,
    pub coarse_distance: Option<u32>,
    pub exact_turns: Option<u32>,
}

impl Candidate {
    pub fn new(unit: Entity) -> Self {
        Self {
            unit,
            coarse_distance: None,
            exact_turns: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Normal,
    High,
}

/// Whether (and how eagerly) a unit takes part in a target-list category.
pub fn eligibility(
    category: TaskCategory,
    unit: &UnitInfo,
    faction: &Faction,
    config: &HomelandConfig,
) -> Option<Tier> {
    if faction.is_human || !unit.is_combat() || unit.domain != UnitDomain::Land {
        return None;
    }
    // Scouts stay scouts until recon is switched off
    if unit.task() == UnitTask::Explore && faction.recon_state != ReconState::Enough {
        return None;
    }

    let far_sighted = unit.sight > config.high_priority_sight;
    match category {
        TaskCategory::Garrison => {
            if unit.ranged && !unit.has_task(UnitTask::CityBombard) {
                Some(Tier::High)
            } else if unit.can_attack() && unit.defense_modifier == 0 && unit.attack_modifier == 0 {
                // Promotion boosts are wasted inside walls
                Some(Tier::Normal)
            } else {
                None
            }
        }
        TaskCategory::Sentry => match (unit.ranged, far_sighted) {
            (false, false) => Some(Tier::Normal),
            (false, true) | (true, true) => Some(Tier::High),
            (true, false) => None,
        },
        TaskCategory::MobileReserve => {
            if unit.ranged || unit.has_task(UnitTask::FastAttack) {
                Some(Tier::High)
            } else if unit.can_attack() {
                Some(Tier::Normal)
            } else {
                None
            }
        }
        TaskCategory::LootRuins => {
            if unit.has_task(UnitTask::FastAttack) {
                Some(Tier::High)
            } else if unit.can_attack() {
                Some(Tier::Normal)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Normal and high priority candidates for the category being evaluated.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    category: Option<TaskCategory>,
    pub normal: Vec<Candidate>,
    pub high: Vec<Candidate>,
}

impl CandidatePool {
    pub fn clear(&mut self) {
        self.category = None;
        self.normal.clear();
        self.high.clear();
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&mut self, unit: Entity) {
        self.normal.retain(|c| c.unit != unit);
        self.high.retain(|c| c.unit != unit);
    }

    /// Normal-tier pool for self-contained categories
    pub fn start(&mut self, category: TaskCategory, units: impl IntoIterator<Item = Entity>) {
        self.clear();
        self.category = Some(category);
        self.normal.extend(units.into_iter().map(Candidate::new));
    }

    /// Stage every eligible idle unit for `category`.
    ///
    /// A pool already built for the same category is only filtered down to
    /// units still idle, keeping their computed distances. Returns whether
    /// any candidate remains.
    pub fn find_units_for_move<W: HomelandWorld + ?Sized>(
        &mut self,
        category: TaskCategory,
        idle: &[Entity],
        world: &W,
        faction: &Faction,
        config: &HomelandConfig,
    ) -> bool {
        if self.category == Some(category) {
            self.normal.retain(|c| idle.contains(&c.unit));
            self.high.retain(|c| idle.contains(&c.unit));
            return !self.is_empty();
        }

        self.clear();
        self.category = Some(category);
        for &entity in idle {
            let Some(unit) = world.unit(entity) else {
                continue;
            };
            match eligibility(category, unit, faction, config) {
                Some(Tier::High) => self.high.push(Candidate::new(entity)),
                Some(Tier::Normal) => self.normal.push(Candidate::new(entity)),
                None => {}
            }
        }
        !self.is_empty()
    }
}
