use bevy::prelude::*;

use crate::constants::ROUGH_TERRAIN_DEFENSE;

/// Base terrain of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum TerrainType {
    #[default]
    Grassland,
    Plains,
    Desert,
    Tundra,
    Snow,
    Forest,
    Mountains, // Impassable for land units
    Shore,     // Shallow water
    Ocean,
}

impl TerrainType {
    pub fn is_water(&self) -> bool {
        matches!(self, TerrainType::Shore | TerrainType::Ocean)
    }

    pub fn is_land(&self) -> bool {
        !self.is_water()
    }

    /// Movement points a land unit spends to enter the tile, `None` if impassable
    pub fn land_movement_cost(&self) -> Option<u32> {
        match self {
            TerrainType::Mountains => None,
            TerrainType::Shore | TerrainType::Ocean => None,
            TerrainType::Forest => Some(2),
            _ => Some(1),
        }
    }
}

/// Man-made (or ancient) structure on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Improvement {
    Farm,
    Mine,
    Pasture,
    Plantation,
    FishingBoats,
    Fort,
    GoodyHut,
    BarbarianCamp,
}

impl Improvement {
    pub fn build_kind(&self) -> Option<BuildKind> {
        match self {
            Improvement::Farm => Some(BuildKind::Farm),
            Improvement::Mine => Some(BuildKind::Mine),
            Improvement::Pasture => Some(BuildKind::Pasture),
            Improvement::Plantation => Some(BuildKind::Plantation),
            Improvement::FishingBoats => Some(BuildKind::FishingBoats),
            Improvement::Fort => Some(BuildKind::Fort),
            Improvement::GoodyHut | Improvement::BarbarianCamp => None,
        }
    }
}

/// Special resource sitting on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum TileResource {
    Wheat,
    Iron,
    Horses,
    Cotton,
    Fish,
    Whales,
    Pearls,
}

impl TileResource {
    /// Improvements that unlock the resource, best first
    pub fn possible_improvements(&self) -> &'static [Improvement] {
        match self {
            TileResource::Wheat => &[Improvement::Farm],
            TileResource::Iron => &[Improvement::Mine],
            TileResource::Horses => &[Improvement::Pasture],
            TileResource::Cotton => &[Improvement::Plantation],
            TileResource::Fish | TileResource::Whales | TileResource::Pearls => &[Improvement::FishingBoats],
        }
    }
}

/// Work a builder unit can perform on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum BuildKind {
    Farm,
    Mine,
    Pasture,
    Plantation,
    FishingBoats,
    Fort,
    Road,
    Repair,
    Chop,
    RemoveRoad,
}

/// Gameplay state of one map tile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tile {
    pub terrain: TerrainType,
    pub hills: bool,
    pub owner: Option<Entity>,
    pub improvement: Option<Improvement>,
    pub road: bool,
    pub resource: Option<TileResource>,
    /// City working this tile, if any
    pub working_city: Option<Entity>,
}

impl Tile {
    pub fn new(terrain: TerrainType) -> Self {
        Self {
            terrain,
            ..default()
        }
    }

    pub fn owned_by(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_hills(mut self) -> Self {
        self.hills = true;
        self
    }

    pub fn with_road(mut self) -> Self {
        self.road = true;
        self
    }

    pub fn with_improvement(mut self, improvement: Improvement) -> Self {
        self.improvement = Some(improvement);
        self
    }

    pub fn with_resource(mut self, resource: TileResource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn is_owned_by(&self, faction: Entity) -> bool {
        self.owner == Some(faction)
    }

    /// Movement cost for a land unit, hills add one point
    pub fn land_movement_cost(&self) -> Option<u32> {
        self.terrain
            .land_movement_cost()
            .map(|cost| if self.hills { cost + 1 } else { cost })
    }

    /// Percent defense bonus granted to a unit standing here
    pub fn defense_modifier(&self) -> i32 {
        let mut modifier = 0;
        if self.hills {
            modifier += ROUGH_TERRAIN_DEFENSE;
        }
        if self.terrain == TerrainType::Forest {
            modifier += ROUGH_TERRAIN_DEFENSE;
        }
        if self.improvement == Some(Improvement::Fort) {
            modifier += ROUGH_TERRAIN_DEFENSE * 2;
        }
        modifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_is_not_land() {
        assert!(TerrainType::Ocean.is_water());
        assert!(TerrainType::Shore.is_water());
        assert!(TerrainType::Desert.is_land());
    }

    #[test]
    fn hills_cost_an_extra_move_and_defend_better() {
        let tile = Tile::new(TerrainType::Forest).with_hills();
        assert_eq!(tile.land_movement_cost(), Some(3));
        assert_eq!(tile.defense_modifier(), 2 * ROUGH_TERRAIN_DEFENSE);
        assert_eq!(Tile::new(TerrainType::Mountains).land_movement_cost(), None);
    }
}
