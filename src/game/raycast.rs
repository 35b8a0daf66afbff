//! Grid DDA ray march used for line-of-sight and flash exposure

use glam::Vec2;

use super::map::MapData;

/// Result of a ray march
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Where the ray stopped (wall boundary, grid edge or max distance)
    pub point: Vec2,
    /// Distance travelled from the origin
    pub distance: f32,
    /// True if the ray hit a solid tile or left the grid
    pub hit: bool,
}

/// March from `origin` along `angle` cell by cell until a solid tile, the
/// grid edge, or `max_dist`.
///
/// Leaving the grid counts as a hit. A hit beyond `max_dist` is reported as a
/// miss ending exactly `max_dist` from the origin.
pub fn cast_ray(map: &MapData, origin: Vec2, angle: f32, max_dist: f32) -> RayHit {
    let dir = Vec2::from_angle(angle);
    let tile = map.tile_size;
    let (mut cell_x, mut cell_y) = map.tile_at(origin);

    // Distance along the ray between successive vertical / horizontal grid lines
    let delta_x = if dir.x.abs() < 1e-10 { f32::INFINITY } else { (tile / dir.x).abs() };
    let delta_y = if dir.y.abs() < 1e-10 { f32::INFINITY } else { (tile / dir.y).abs() };

    let (step_x, mut side_x) = if dir.x < 0.0 {
        (-1, (origin.x - cell_x as f32 * tile) / tile * delta_x)
    } else {
        (1, ((cell_x + 1) as f32 * tile - origin.x) / tile * delta_x)
    };
    let (step_y, mut side_y) = if dir.y < 0.0 {
        (-1, (origin.y - cell_y as f32 * tile) / tile * delta_y)
    } else {
        (1, ((cell_y + 1) as f32 * tile - origin.y) / tile * delta_y)
    };

    loop {
        let distance = if side_x < side_y {
            let d = side_x;
            side_x += delta_x;
            cell_x += step_x;
            d
        } else {
            let d = side_y;
            side_y += delta_y;
            cell_y += step_y;
            d
        };

        if distance > max_dist {
            return RayHit {
                point: origin + dir * max_dist,
                distance: max_dist,
                hit: false,
            };
        }

        // Outside the grid (None) or a wall both stop the ray
        if map.tile_solid(cell_x, cell_y) != Some(false) {
            return RayHit {
                point: origin + dir * distance,
                distance,
                hit: true,
            };
        }
    }
}

/// True if the straight segment between `from` and `to` crosses no solid tile.
pub fn line_of_sight(map: &MapData, from: Vec2, to: Vec2) -> bool {
    let distance = from.distance(to);
    if distance < f32::EPSILON {
        return true;
    }
    !cast_ray(map, from, (to - from).to_angle(), distance).hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::tests::open_room;
    use std::f32::consts::PI;

    fn all_floor(width: usize, height: usize) -> MapData {
        MapData::from_grid(vec![vec![0; width]; height]).unwrap()
    }

    #[test]
    fn test_hit_stops_at_tile_boundary() {
        let map = open_room(10, 10);
        // Tile 1 is open, tile 0 is the west wall ending at x = 40
        let hit = cast_ray(&map, Vec2::new(60.0, 100.0), PI, 1000.0);
        assert!(hit.hit);
        assert!((hit.point.x - 40.0).abs() < 1e-3);
        assert!((hit.point.y - 100.0).abs() < 1e-3);
        assert!((hit.distance - 20.0).abs() < 1e-3);

        // East wall (tile 9) begins at x = 360
        let hit = cast_ray(&map, Vec2::new(100.0, 100.0), 0.0, 1000.0);
        assert!(hit.hit);
        assert!((hit.point.x - 360.0).abs() < 1e-3);
    }

    #[test]
    fn test_open_map_reaches_max_distance() {
        let map = all_floor(50, 50);
        let origin = Vec2::new(1000.0, 1000.0);
        let hit = cast_ray(&map, origin, 0.3, 300.0);
        assert!(!hit.hit);
        assert_eq!(hit.distance, 300.0);
        assert!((origin.distance(hit.point) - 300.0).abs() < 1e-2);
    }

    #[test]
    fn test_leaving_grid_counts_as_hit() {
        let map = all_floor(3, 3);
        let hit = cast_ray(&map, Vec2::new(60.0, 60.0), 0.0, 1000.0);
        assert!(hit.hit);
        assert!((hit.point.x - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let mut grid = vec![vec![0u8; 10]; 5];
        grid[2][5] = 1;
        let map = MapData::from_grid(grid).unwrap();

        // Same row as the wall: blocked
        assert!(!line_of_sight(&map, Vec2::new(60.0, 100.0), Vec2::new(340.0, 100.0)));
        // A row above: clear
        assert!(line_of_sight(&map, Vec2::new(60.0, 60.0), Vec2::new(340.0, 60.0)));
        // Zero-length segment is always visible
        assert!(line_of_sight(&map, Vec2::new(60.0, 60.0), Vec2::new(60.0, 60.0)));
    }

    #[test]
    fn test_vertical_ray() {
        let map = open_room(6, 6);
        let hit = cast_ray(&map, Vec2::new(100.0, 100.0), PI / 2.0, 1000.0);
        assert!(hit.hit);
        assert!((hit.point.y - 200.0).abs() < 1e-3);
    }
}
