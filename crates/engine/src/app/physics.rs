use super::{Vec2, WorldMap};

/// Player speed in tiles per millisecond.
pub const BASE_SPEED_TILES_PER_MS: f32 = 0.008;

/// Advances `position` along `input` for `dt_ms` milliseconds.
///
/// Collision is resolved one axis at a time: the X-only candidate is tested
/// first, then the Y-only candidate from the (possibly updated) X. A move is
/// rejected when the destination tile is solid or outside the map, which
/// keeps the player in bounds and lets diagonal input slide along walls.
/// Entities do not block movement.
pub fn step_player(position: Vec2, input: Vec2, dt_ms: f32, world: &WorldMap) -> Vec2 {
    if input.is_zero() || dt_ms.is_nan() || dt_ms <= 0.0 {
        return position;
    }

    let speed = BASE_SPEED_TILES_PER_MS * dt_ms;
    let next_x = position.x + input.x * speed;
    let next_y = position.y + input.y * speed;

    let mut resolved = position;
    if !world.blocks_point(next_x, resolved.y) {
        resolved.x = next_x;
    }
    if !world.blocks_point(resolved.x, next_y) {
        resolved.y = next_y;
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Tile;

    const EPSILON: f32 = 1e-4;

    /// Open grass with a solid ring around the edge.
    fn walled_map(width: u32, height: u32) -> WorldMap {
        let mut tiles = vec![Tile::Grass; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    tiles[(y * width + x) as usize] = Tile::Wall;
                }
            }
        }
        WorldMap::new(width, height, tiles, Vec::new()).expect("valid map")
    }

    fn map_with(width: u32, height: u32, solid: &[(u32, u32, Tile)]) -> WorldMap {
        let mut tiles = vec![Tile::Grass; (width * height) as usize];
        for (x, y, tile) in solid {
            tiles[(y * width + x) as usize] = *tile;
        }
        WorldMap::new(width, height, tiles, Vec::new()).expect("valid map")
    }

    #[test]
    fn zero_input_is_noop() {
        let map = walled_map(5, 5);
        let start = Vec2::new(2.5, 2.5);
        assert_eq!(step_player(start, Vec2::ZERO, 16.0, &map), start);
    }

    #[test]
    fn zero_or_negative_dt_is_noop() {
        let map = walled_map(5, 5);
        let start = Vec2::new(2.5, 2.5);
        assert_eq!(step_player(start, Vec2::new(1.0, 0.0), 0.0, &map), start);
        assert_eq!(step_player(start, Vec2::new(1.0, 0.0), -5.0, &map), start);
        assert_eq!(step_player(start, Vec2::new(1.0, 0.0), f32::NAN, &map), start);
    }

    #[test]
    fn open_move_scales_with_dt_and_speed() {
        let map = walled_map(10, 10);
        let next = step_player(Vec2::new(3.0, 3.0), Vec2::new(1.0, 0.0), 50.0, &map);
        assert!((next.x - 3.4).abs() < EPSILON);
        assert_eq!(next.y, 3.0);
    }

    #[test]
    fn move_into_solid_tile_is_rejected() {
        let map = map_with(5, 5, &[(3, 2, Tile::Water)]);
        let start = Vec2::new(2.9, 2.5);
        let next = step_player(start, Vec2::new(1.0, 0.0), 50.0, &map);
        assert_eq!(next, start);
    }

    #[test]
    fn move_out_of_bounds_is_rejected() {
        let map = map_with(3, 3, &[]);
        let start = Vec2::new(0.1, 0.1);
        let next = step_player(start, Vec2::new(-0.6, -0.8), 100.0, &map);
        assert_eq!(next, start);
    }

    #[test]
    fn diagonal_into_wall_slides_along_open_axis() {
        // Wall column at x = 3; moving down-right keeps sliding down.
        let map = map_with(6, 6, &[(3, 1, Tile::Wall), (3, 2, Tile::Wall), (3, 3, Tile::Wall)]);
        let start = Vec2::new(2.95, 1.5);
        let input = Vec2::new(
            std::f32::consts::FRAC_1_SQRT_2,
            std::f32::consts::FRAC_1_SQRT_2,
        );
        let next = step_player(start, input, 50.0, &map);
        assert_eq!(next.x, start.x);
        assert!(next.y > start.y);
    }

    #[test]
    fn diagonal_into_floor_edge_slides_horizontally() {
        let map = map_with(6, 6, &[(1, 3, Tile::Tree), (2, 3, Tile::Tree), (3, 3, Tile::Tree)]);
        let start = Vec2::new(2.0, 2.95);
        let input = Vec2::new(
            std::f32::consts::FRAC_1_SQRT_2,
            std::f32::consts::FRAC_1_SQRT_2,
        );
        let next = step_player(start, input, 50.0, &map);
        assert!(next.x > start.x);
        assert_eq!(next.y, start.y);
    }

    #[test]
    fn entities_do_not_block_movement() {
        use crate::app::{Entity, EntityId, EntityKind};
        let entity = Entity {
            id: EntityId(1),
            kind: EntityKind::Npc,
            position: Vec2::new(3.5, 2.5),
            glyph: 'N',
            color: [255, 255, 255, 255],
            name: "Blocker".to_string(),
            interactable: true,
            dialogue_context: None,
        };
        let map = WorldMap::new(6, 6, vec![Tile::Grass; 36], vec![entity]).expect("valid map");
        let next = step_player(Vec2::new(3.0, 2.5), Vec2::new(1.0, 0.0), 62.5, &map);
        assert!((next.x - 3.5).abs() < EPSILON);
    }

    #[test]
    fn never_enters_solid_or_leaves_map_under_sweep() {
        let map = map_with(
            8,
            8,
            &[
                (0, 0, Tile::Tree),
                (4, 4, Tile::Wall),
                (4, 5, Tile::Water),
                (5, 4, Tile::Tree),
                (2, 6, Tile::Wall),
            ],
        );
        let directions = [
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.6, 0.8),
            Vec2::new(-0.8, 0.6),
            Vec2::new(0.8, -0.6),
            Vec2::new(-0.6, -0.8),
        ];
        for start_x in 1..8 {
            for start_y in 1..8 {
                let mut position = Vec2::new(start_x as f32 + 0.5, start_y as f32 + 0.5);
                if map.blocks_point(position.x, position.y) {
                    continue;
                }
                for (step, input) in directions.iter().cycle().take(400).enumerate() {
                    let dt = 10.0 + (step % 7) as f32 * 9.0;
                    position = step_player(position, *input, dt, &map);
                    assert!(!map.blocks_point(position.x, position.y));
                    assert!(position.x >= 0.0 && position.x < 8.0);
                    assert!(position.y >= 0.0 && position.y < 8.0);
                }
            }
        }
    }
}
