use super::*;
use crate::map::tiles::{TerrainType, Tile};
use crate::test_utils::*;

fn assert_valid_path(path: &[TilePos]) {
    for pair in path.windows(2) {
        assert_eq!(pair[0].distance_to(pair[1]), 1, "steps must be adjacent");
    }
}

#[test]
fn test_pathfinding_straight_line() {
    let map = HexMap::new(6, 6);
    let [owner, unit] = entities();
    let warrior = warrior(unit, owner, pos(0, 0));

    let path = PathfindingSystem::find_path(&map, &warrior, pos(0, 0), pos(3, 0)).unwrap();
    let points = path.points();

    assert_eq!(points.first(), Some(&pos(0, 0)));
    assert_eq!(points.last(), Some(&pos(3, 0)));
    assert_valid_path(&points);
    assert_eq!(path.cost(), 3);
}

#[test]
fn test_pathfinding_same_position() {
    let map = HexMap::new(3, 3);
    let [owner, unit] = entities();
    let warrior = warrior(unit, owner, pos(1, 1));

    let path = PathfindingSystem::find_path(&map, &warrior, pos(1, 1), pos(1, 1)).unwrap();
    assert_eq!(path.points(), vec![pos(1, 1)]);
    assert_eq!(path.cost(), 0);
}

#[test]
fn test_pathfinding_out_of_bounds() {
    let map = HexMap::new(5, 5);
    let [owner, unit] = entities();
    let warrior = warrior(unit, owner, pos(0, 0));

    assert!(PathfindingSystem::find_path(&map, &warrior, pos(0, 0), pos(10, 10)).is_none());
}

#[test]
fn test_land_units_walk_around_water() {
    let mut map = HexMap::new(7, 7);
    for y in 0..6 {
        map.set_tile(pos(3, y), Tile::new(TerrainType::Ocean)).unwrap();
    }
    let [owner, unit] = entities();
    let warrior = warrior(unit, owner, pos(1, 1));

    let path = PathfindingSystem::find_path(&map, &warrior, pos(1, 1), pos(5, 1)).unwrap();
    assert!(path.points().iter().all(|p| p.x != 3 || p.y == 6));
    assert!(path.cost() > 4);
}

#[test]
fn test_ships_stay_at_sea() {
    let mut map = HexMap::new(5, 5);
    let [owner, unit] = entities();
    let mut boat = work_boat(unit, owner, pos(0, 0));
    map.set_tile(pos(0, 0), Tile::new(TerrainType::Ocean)).unwrap();
    map.set_tile(pos(1, 0), Tile::new(TerrainType::Ocean)).unwrap();
    boat.position = pos(0, 0);

    assert!(PathfindingSystem::find_path(&map, &boat, pos(0, 0), pos(1, 0)).is_some());
    assert!(PathfindingSystem::find_path(&map, &boat, pos(0, 0), pos(3, 3)).is_none());
}

#[test]
fn test_enemy_units_block_the_way() {
    let mut map = HexMap::new(3, 1);
    let [owner, enemy, unit, blocker] = entities();
    map.add_unit(warrior(blocker, enemy, pos(1, 0))).unwrap();
    let mover = warrior(unit, owner, pos(0, 0));

    assert!(PathfindingSystem::find_path(&map, &mover, pos(0, 0), pos(2, 0)).is_some());
    map.declare_war(owner, enemy);
    assert!(PathfindingSystem::find_path(&map, &mover, pos(0, 0), pos(2, 0)).is_none());
}

#[test]
fn test_turns_to_reach() {
    let map = HexMap::new(8, 8);
    let [owner, unit] = entities();
    let warrior = warrior(unit, owner, pos(0, 0));

    assert_eq!(map.turns_to_reach(&warrior, pos(0, 0)), Some(0));
    assert_eq!(map.turns_to_reach(&warrior, pos(2, 0)), Some(1));
    assert_eq!(map.turns_to_reach(&warrior, pos(3, 0)), Some(2));
    assert_eq!(map.turns_to_reach(&warrior, pos(9, 9)), None);
}

#[test]
fn test_turns_for_cost() {
    assert_eq!(PathfindingSystem::turns_for_cost(0, 2, 2), 0);
    assert_eq!(PathfindingSystem::turns_for_cost(2, 2, 2), 1);
    assert_eq!(PathfindingSystem::turns_for_cost(5, 2, 2), 3);
    assert_eq!(PathfindingSystem::turns_for_cost(1, 0, 2), 2);
}

#[test]
fn test_end_of_turn_step() {
    let path = Path::new(vec![(pos(0, 0), 0), (pos(1, 0), 1), (pos(2, 0), 3), (pos(3, 0), 4)]);
    assert_eq!(path.end_of_turn(2), Some(pos(1, 0)));
    assert_eq!(path.end_of_turn(4), Some(pos(3, 0)));
    assert_eq!(path.end_of_turn(0), Some(pos(1, 0)));
    assert_eq!(path.end(), Some(pos(3, 0)));
}
