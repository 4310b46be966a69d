use bevy_ecs_tilemap::prelude::*;
use hexx::Hex;

pub trait TilePosExt {
    fn to_hex(&self) -> Hex;

    /// Hex-grid distance between two tiles
    fn distance_to(&self, other: TilePos) -> u32;

    /// The six neighbours that have non-negative coordinates
    fn neighbors(&self) -> Vec<TilePos>;

    /// Every tile within `radius` steps, the tile itself included
    fn area(&self, radius: u32) -> Vec<TilePos>;
}

impl TilePosExt for TilePos {
    fn to_hex(&self) -> Hex {
        Hex::new(self.x as i32, self.y as i32)
    }

    fn distance_to(&self, other: TilePos) -> u32 {
        self.to_hex().distance_to(other.to_hex()) as u32
    }

    fn neighbors(&self) -> Vec<TilePos> {
        self.to_hex()
            .all_neighbors()
            .into_iter()
            .filter_map(|h| h.to_tile_pos())
            .collect()
    }

    fn area(&self, radius: u32) -> Vec<TilePos> {
        self.to_hex()
            .range(radius)
            .filter_map(|h| h.to_tile_pos())
            .collect()
    }
}

pub trait HexExt {
    fn to_tile_pos(&self) -> Option<TilePos>;
}

impl HexExt for Hex {
    fn to_tile_pos(&self) -> Option<TilePos> {
        if self.x >= 0 && self.y >= 0 {
            Some(TilePos {
                x: self.x as u32,
                y: self.y as u32,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_are_one_step_away() {
        let center = TilePos { x: 5, y: 5 };
        let neighbors = center.neighbors();
        assert_eq!(neighbors.len(), 6);
        assert!(neighbors.iter().all(|n| center.distance_to(*n) == 1));
    }

    #[test]
    fn corner_tiles_drop_negative_neighbours() {
        let corner = TilePos { x: 0, y: 0 };
        assert!(corner.neighbors().len() < 6);
    }

    #[test]
    fn area_contains_center_and_ring() {
        let center = TilePos { x: 5, y: 5 };
        let area = center.area(1);
        assert_eq!(area.len(), 7);
        assert!(area.contains(&center));
    }
}
