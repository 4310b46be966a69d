//! Nearest-unit search: raw distance first, the pathfinder only when needed.

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use std::collections::HashSet;

use super::pool::Candidate;
use crate::ai::world::{HomelandWorld, Pathfinder};
use crate::config::HomelandConfig;
use crate::map::tile_pos::TilePosExt;
use crate::units::{UnitDomain, UnitInfo, UnitLayer};

/// Tiles that units were ordered into earlier in the turn, per stacking layer.
///
/// The world only sees the moves once the turn is applied, so later
/// decisions in the same turn check here before picking a destination.
#[derive(Debug, Clone, Default)]
pub struct ClaimedPlots(HashSet<(TilePos, UnitLayer)>);

impl ClaimedPlots {
    pub fn claim(&mut self, plot: TilePos, layer: UnitLayer) {
        self.0.insert((plot, layer));
    }

    /// Another unit of the same layer is already headed for `plot`
    pub fn blocks(&self, unit: &UnitInfo, plot: TilePos) -> bool {
        plot != unit.position && self.0.contains(&(plot, unit.layer))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub unit: Entity,
    pub turns: u32,
}

/// Bounds on how far and how hard the exact search looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLimits {
    pub max_turns: u32,
    pub estimate_turns_distance: u32,
    pub max_failed_paths: u32,
    pub early_out_failed_path_distance: u32,
}

impl MatchLimits {
    pub fn new(config: &HomelandConfig, max_turns: u32) -> Self {
        Self {
            max_turns,
            estimate_turns_distance: config.estimate_turns_distance,
            max_failed_paths: config.max_failed_paths,
            early_out_failed_path_distance: config.early_out_failed_path_distance,
        }
    }

    pub fn unlimited(config: &HomelandConfig) -> Self {
        Self::new(config, u32::MAX)
    }
}

/// Fill in raw hex distances to `target` and sort closest first.
///
/// Units that cannot stand on the target (wrong domain, occupied or claimed,
/// foreign city) get no distance and sort last.
pub fn estimate_distances<W: HomelandWorld + ?Sized>(
    candidates: &mut [Candidate],
    world: &W,
    claimed: &ClaimedPlots,
    target: TilePos,
) {
    let water = world.is_water(target);
    for candidate in candidates.iter_mut() {
        candidate.exact_turns = None;
        candidate.coarse_distance = world.unit(candidate.unit).and_then(|unit| {
            let wrong_domain = match unit.domain {
                UnitDomain::Sea => !water,
                UnitDomain::Land => water,
                UnitDomain::Air => false,
            };
            if wrong_domain || claimed.blocks(unit, target) || !world.can_move_into(unit, target) {
                None
            } else {
                Some(unit.position.distance_to(target))
            }
        });
    }
    candidates.sort_by_key(|c| c.coarse_distance.unwrap_or(u32::MAX));
}

/// Walk the sorted candidates and ask the pathfinder for true turn counts.
///
/// Stops on the first candidate that is already there or gets there no
/// slower than its raw distance suggests, once a match exists and the next
/// candidate is far away, or after too many failed searches.
pub fn closest_unit_by_turns<W, P>(
    candidates: &mut [Candidate],
    target: TilePos,
    limits: &MatchLimits,
    world: &W,
    paths: &P,
) -> Option<Match>
where
    W: HomelandWorld + ?Sized,
    P: Pathfinder + ?Sized,
{
    let mut best: Option<Match> = None;
    let mut failed_paths = 0;

    for candidate in candidates.iter_mut() {
        let Some(distance) = candidate.coarse_distance else {
            continue;
        };
        if best.is_some() && distance >= limits.estimate_turns_distance {
            break;
        }
        let Some(unit) = world.unit(candidate.unit) else {
            continue;
        };

        let turns = paths.turns_to_reach(unit, target);
        candidate.exact_turns = turns;
        trace!(
            "Matcher: {} at distance {} reaches {:?} in {:?} turns",
            unit.name, distance, target, turns
        );

        match turns {
            Some(turns) => {
                let min_turns = best.map_or(u32::MAX, |m| m.turns);
                let found = Match {
                    unit: candidate.unit,
                    turns,
                };
                if distance == 0
                    || (turns <= distance && turns <= limits.max_turns && turns < min_turns)
                {
                    return Some(found);
                }
                if turns < min_turns {
                    best = Some(found);
                }
                if distance >= limits.estimate_turns_distance {
                    break;
                }
            }
            None => {
                failed_paths += 1;
                if failed_paths >= limits.max_failed_paths
                    || distance >= limits.early_out_failed_path_distance
                {
                    break;
                }
            }
        }
    }

    best
}

/// The high priority match wins unless the normal one is strictly faster.
pub fn choose_match(normal: Option<Match>, high: Option<Match>) -> Option<Match> {
    match (normal, high) {
        (Some(normal), Some(high)) if normal.turns < high.turns => Some(normal),
        (_, Some(high)) => Some(high),
        (normal, None) => normal,
    }
}
