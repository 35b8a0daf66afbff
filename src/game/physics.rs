//! Movement and flight physics against the tile map

use glam::Vec2;

use super::map::MapData;

/// Velocity multiplier per frame for free-flying grenades
pub const GRENADE_DRAG: f32 = 0.95;
/// Velocity multiplier applied to an axis that hits a wall
pub const GRENADE_BOUNCE: f32 = -0.6;

/// Result of an axis-separated move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub pos: Vec2,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

impl MoveResult {
    /// Neither axis could move
    pub fn fully_blocked(&self) -> bool {
        self.blocked_x && self.blocked_y
    }
}

/// Result of one step of a targeted flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekResult {
    Moving(Vec2),
    Arrived(Vec2),
    HitWall(Vec2),
}

/// Physics system for players and grenades
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Move a circle by `vel * dt`, applying the X then the Y component only
    /// where the candidate position is walkable, so bodies slide along walls.
    pub fn move_with_collision(map: &MapData, pos: Vec2, vel: Vec2, radius: f32, dt: f32) -> MoveResult {
        let mut result = MoveResult {
            pos,
            blocked_x: false,
            blocked_y: false,
        };

        if vel.x != 0.0 {
            let candidate = Vec2::new(pos.x + vel.x * dt, result.pos.y);
            if map.is_walkable(candidate, radius) {
                result.pos = candidate;
            } else {
                result.blocked_x = true;
            }
        }

        if vel.y != 0.0 {
            let candidate = Vec2::new(result.pos.x, pos.y + vel.y * dt);
            if map.is_walkable(candidate, radius) {
                result.pos = candidate;
            } else {
                result.blocked_y = true;
            }
        }

        result
    }

    /// One step of free flight with drag; a wall on an axis reflects that
    /// axis and damps it. Returns (new_pos, new_vel).
    pub fn drag_flight(map: &MapData, pos: Vec2, vel: Vec2, radius: f32, dt: f32) -> (Vec2, Vec2) {
        let mut pos = pos;
        let mut vel = vel;

        let next_x = Vec2::new(pos.x + vel.x * dt, pos.y);
        if map.collides(next_x, radius) {
            vel.x *= GRENADE_BOUNCE;
        } else {
            pos = next_x;
        }

        let next_y = Vec2::new(pos.x, pos.y + vel.y * dt);
        if map.collides(next_y, radius) {
            vel.y *= GRENADE_BOUNCE;
        } else {
            pos = next_y;
        }

        (pos, vel * GRENADE_DRAG.powf(dt))
    }

    /// Move straight toward `target` at `speed` units per frame.
    pub fn seek(map: &MapData, pos: Vec2, target: Vec2, speed: f32, radius: f32, dt: f32) -> SeekResult {
        let remaining = pos.distance(target);
        let step = speed * dt;
        if remaining <= step {
            return SeekResult::Arrived(target);
        }

        let next = pos + (target - pos).normalize_or_zero() * step;
        if map.collides(next, radius) {
            SeekResult::HitWall(pos)
        } else {
            SeekResult::Moving(next)
        }
    }

    /// Check if a point is inside a circular area
    pub fn is_in_radius(point: Vec2, center: Vec2, radius: f32) -> bool {
        point.distance(center) < radius
    }

    /// Keep a point inside the map rectangle with a margin
    pub fn clamp_to_map(map: &MapData, point: Vec2, margin: f32) -> Vec2 {
        let size = map.world_size();
        Vec2::new(
            point.x.clamp(margin, (size.x - margin).max(margin)),
            point.y.clamp(margin, (size.y - margin).max(margin)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::tests::open_room;

    #[test]
    fn test_slides_along_wall() {
        let map = open_room(10, 10);
        // Hugging the top wall (interior starts at y = 40) and pushing up-right
        let start = Vec2::new(100.0, 56.0);
        let result = PhysicsSystem::move_with_collision(&map, start, Vec2::new(4.0, -4.0), 15.0, 1.0);
        assert!(result.blocked_y);
        assert!(!result.blocked_x);
        assert_eq!(result.pos, Vec2::new(104.0, 56.0));
    }

    #[test]
    fn test_corner_blocks_both_axes() {
        let map = open_room(10, 10);
        let corner = Vec2::new(56.0, 56.0);
        let result = PhysicsSystem::move_with_collision(&map, corner, Vec2::new(-4.0, -4.0), 15.0, 1.0);
        assert!(result.fully_blocked());
        assert_eq!(result.pos, corner);
    }

    #[test]
    fn test_drag_flight_bounces_and_slows() {
        let map = open_room(10, 10);
        let (pos, vel) = PhysicsSystem::drag_flight(&map, Vec2::new(200.0, 200.0), Vec2::new(10.0, 0.0), 4.0, 1.0);
        assert_eq!(pos, Vec2::new(210.0, 200.0));
        assert!((vel.x - 9.5).abs() < 1e-5);

        // East wall begins at x = 360
        let (pos, vel) = PhysicsSystem::drag_flight(&map, Vec2::new(350.0, 200.0), Vec2::new(10.0, 0.0), 4.0, 1.0);
        assert_eq!(pos.x, 350.0);
        assert!(vel.x < 0.0);
        assert!((vel.x + 5.7).abs() < 1e-4);
    }

    #[test]
    fn test_seek_arrives_and_hits_walls() {
        let map = open_room(10, 10);
        let target = Vec2::new(110.0, 100.0);
        assert_eq!(
            PhysicsSystem::seek(&map, Vec2::new(100.0, 100.0), target, 10.0, 4.0, 1.0),
            SeekResult::Arrived(target)
        );
        assert_eq!(
            PhysicsSystem::seek(&map, Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), 10.0, 4.0, 1.0),
            SeekResult::Moving(Vec2::new(110.0, 100.0))
        );
        // Target beyond the west wall
        assert!(matches!(
            PhysicsSystem::seek(&map, Vec2::new(48.0, 100.0), Vec2::new(-100.0, 100.0), 10.0, 4.0, 1.0),
            SeekResult::HitWall(_)
        ));
    }
}
