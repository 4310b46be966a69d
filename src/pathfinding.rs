use bevy_ecs_tilemap::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::ai::world::{HomelandWorld, Pathfinder};
use crate::map::HexMap;
use crate::map::tile_pos::TilePosExt;
use crate::units::{UnitDomain, UnitInfo, UnitLayer};

/// A route with the cumulative movement cost at every step.
///
/// The first step is the start tile at cost 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    steps: Vec<(TilePos, u32)>,
}

impl Path {
    pub fn new(steps: Vec<(TilePos, u32)>) -> Self {
        Self { steps }
    }

    pub fn points(&self) -> Vec<TilePos> {
        self.steps.iter().map(|(pos, _)| *pos).collect()
    }

    pub fn cost(&self) -> u32 {
        self.steps.last().map(|(_, cost)| *cost).unwrap_or(0)
    }

    pub fn end(&self) -> Option<TilePos> {
        self.steps.last().map(|(pos, _)| *pos)
    }

    /// Furthest step reachable with `moves` movement points.
    ///
    /// Falls back to the first step after the start when even that costs
    /// more than `moves`, so a unit always makes progress.
    pub fn end_of_turn(&self, moves: u32) -> Option<TilePos> {
        let reachable = self
            .steps
            .iter()
            .skip(1)
            .take_while(|(_, cost)| *cost <= moves)
            .last()
            .or_else(|| self.steps.get(1))
            .or_else(|| self.steps.first());
        reachable.map(|(pos, _)| *pos)
    }
}

#[derive(Debug, Clone)]
pub struct PathfindingNode {
    pub position: TilePos,
    pub cost: u32,
    pub heuristic: u32,
}

impl PathfindingNode {
    pub fn total_cost(&self) -> u32 {
        self.cost + self.heuristic
    }
}

impl PartialEq for PathfindingNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathfindingNode {}

impl PartialOrd for PathfindingNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathfindingNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cost()
            .cmp(&other.total_cost())
            .then_with(|| self.heuristic.cmp(&other.heuristic))
            .then_with(|| (self.position.x, self.position.y).cmp(&(other.position.x, other.position.y)))
    }
}

pub struct PathfindingSystem;

impl PathfindingSystem {
    /// A* from `start` to `goal` for one unit, honouring its domain.
    pub fn find_path<W: HomelandWorld + ?Sized>(
        world: &W,
        unit: &UnitInfo,
        start: TilePos,
        goal: TilePos,
    ) -> Option<Path> {
        let size = world.size();
        if !Self::in_bounds(start, &size) || !Self::in_bounds(goal, &size) {
            return None;
        }
        if start == goal {
            return Some(Path::new(vec![(start, 0)]));
        }
        if !world.can_move_into(unit, goal) {
            return None;
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set = HashSet::new();
        let mut came_from = HashMap::new();
        let mut cost_so_far = HashMap::new();

        open_set.push(Reverse(PathfindingNode {
            position: start,
            cost: 0,
            heuristic: start.distance_to(goal),
        }));
        cost_so_far.insert(start, 0);

        while let Some(Reverse(current)) = open_set.pop() {
            if current.position == goal {
                return Some(Self::reconstruct_path(&came_from, &cost_so_far, goal));
            }

            if !closed_set.insert(current.position) {
                continue;
            }

            for neighbor in Self::get_neighbors(current.position, &size) {
                if closed_set.contains(&neighbor) {
                    continue;
                }

                let Some(movement_cost) = Self::movement_cost(world, unit, neighbor) else {
                    continue;
                };

                let tentative_cost = current.cost + movement_cost;
                if cost_so_far
                    .get(&neighbor)
                    .is_some_and(|&existing| tentative_cost >= existing)
                {
                    continue;
                }

                cost_so_far.insert(neighbor, tentative_cost);
                came_from.insert(neighbor, current.position);
                open_set.push(Reverse(PathfindingNode {
                    position: neighbor,
                    cost: tentative_cost,
                    heuristic: neighbor.distance_to(goal),
                }));
            }
        }

        None
    }

    fn in_bounds(pos: TilePos, size: &TilemapSize) -> bool {
        pos.x < size.x && pos.y < size.y
    }

    fn get_neighbors(pos: TilePos, size: &TilemapSize) -> Vec<TilePos> {
        pos.neighbors()
            .into_iter()
            .filter(|n| Self::in_bounds(*n, size))
            .collect()
    }

    /// Movement points spent entering `pos`, `None` when the unit cannot pass
    pub fn movement_cost<W: HomelandWorld + ?Sized>(
        world: &W,
        unit: &UnitInfo,
        pos: TilePos,
    ) -> Option<u32> {
        let tile = world.tile(pos)?;

        let blocked = [UnitLayer::Combat, UnitLayer::Civilian]
            .into_iter()
            .filter_map(|layer| world.unit_at(pos, layer))
            .any(|other| other.owner != unit.owner && world.at_war(unit.owner, other.owner));
        if blocked {
            return None;
        }

        match unit.domain {
            UnitDomain::Land => {
                if tile.road && tile.terrain.is_land() {
                    Some(1)
                } else {
                    tile.land_movement_cost()
                }
            }
            UnitDomain::Sea => {
                let friendly_port = world
                    .city_at(pos)
                    .is_some_and(|city| city.owner == unit.owner);
                (tile.terrain.is_water() || friendly_port).then_some(1)
            }
            UnitDomain::Air => Some(1),
        }
    }

    fn reconstruct_path(
        came_from: &HashMap<TilePos, TilePos>,
        cost_so_far: &HashMap<TilePos, u32>,
        mut current: TilePos,
    ) -> Path {
        let cost_at = |pos: &TilePos| cost_so_far.get(pos).copied().unwrap_or(0);
        let mut steps = vec![(current, cost_at(&current))];

        while let Some(&parent) = came_from.get(&current) {
            current = parent;
            steps.push((current, cost_at(&current)));
        }

        steps.reverse();
        Path::new(steps)
    }

    /// Turns needed to cover `cost` movement points, counting the current turn
    pub fn turns_for_cost(cost: u32, moves_left: u32, max_moves: u32) -> u32 {
        if cost == 0 {
            return 0;
        }
        if cost <= moves_left {
            return 1;
        }
        let remaining = cost - moves_left;
        1 + remaining.div_ceil(max_moves.max(1))
    }
}

impl Pathfinder for HexMap {
    fn shortest_path(&self, unit: &UnitInfo, from: TilePos, to: TilePos) -> Option<Path> {
        PathfindingSystem::find_path(self, unit, from, to)
    }

    fn turns_to_reach(&self, unit: &UnitInfo, to: TilePos) -> Option<u32> {
        if unit.position == to {
            return Some(0);
        }
        let path = self.shortest_path(unit, unit.position, to)?;
        Some(PathfindingSystem::turns_for_cost(
            path.cost(),
            unit.moves_left,
            unit.max_moves,
        ))
    }
}

#[cfg(test)]
mod tests;
