//! Per-tick input snapshot sent by human participants
//!
//! Keys are the browser `KeyboardEvent.code` strings plus the two pseudo keys
//! `mouse_left` and `mouse_right`. The mouse position is in screen space; the
//! camera offset converts it to world space.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::WeaponType;
use super::grenade::GrenadeKind;

pub const KEY_UP: &str = "KeyW";
pub const KEY_LEFT: &str = "KeyA";
pub const KEY_DOWN: &str = "KeyS";
pub const KEY_RIGHT: &str = "KeyD";
pub const KEY_WAND: &str = "Digit1";
pub const KEY_AWP: &str = "Digit2";
pub const KEY_HE: &str = "Digit3";
pub const KEY_FLASH: &str = "Digit4";
pub const KEY_MOLOTOV: &str = "Digit5";
pub const KEY_RELOAD: &str = "KeyR";
pub const KEY_THROW: &str = "KeyG";
pub const MOUSE_LEFT: &str = "mouse_left";
pub const MOUSE_RIGHT: &str = "mouse_right";

/// Latest input state of one human participant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub keys: HashSet<String>,
    /// Screen-space mouse position, `[x, y]` on the wire
    pub mouse: Vec2,
    pub cam_x: f32,
    pub cam_y: f32,
    pub width: f32,
    pub height: f32,
}

/// What a human wants to do this tick, decoded from an [`InputSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerIntent {
    pub weapon: Option<WeaponType>,
    pub grenade: Option<GrenadeKind>,
    pub reload: bool,
    /// Unit direction or zero
    pub move_dir: Vec2,
    pub aim: f32,
    pub fire: bool,
    /// World-space throw target
    pub throw_at: Option<Vec2>,
}

impl InputSnapshot {
    pub fn pressed(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Mouse position converted to world space
    pub fn world_mouse(&self) -> Vec2 {
        Vec2::new(self.mouse.x + self.cam_x, self.mouse.y + self.cam_y)
    }

    /// Normalised WASD direction
    pub fn movement(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.pressed(KEY_UP) {
            dir.y -= 1.0;
        }
        if self.pressed(KEY_DOWN) {
            dir.y += 1.0;
        }
        if self.pressed(KEY_LEFT) {
            dir.x -= 1.0;
        }
        if self.pressed(KEY_RIGHT) {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }

    /// Decode the snapshot for a player standing at `pos`.
    pub fn intent(&self, pos: Vec2) -> PlayerIntent {
        let weapon = if self.pressed(KEY_WAND) {
            Some(WeaponType::MagicWand)
        } else if self.pressed(KEY_AWP) {
            Some(WeaponType::Awp)
        } else {
            None
        };

        let grenade = if self.pressed(KEY_HE) {
            Some(GrenadeKind::He)
        } else if self.pressed(KEY_FLASH) {
            Some(GrenadeKind::Flash)
        } else if self.pressed(KEY_MOLOTOV) {
            Some(GrenadeKind::Molotov)
        } else {
            None
        };

        // Aim from the player's on-screen position toward the cursor
        let screen_pos = Vec2::new(pos.x - self.cam_x, pos.y - self.cam_y);
        let aim = (self.mouse - screen_pos).to_angle();

        let throwing = self.pressed(MOUSE_RIGHT) || self.pressed(KEY_THROW);

        PlayerIntent {
            weapon,
            grenade,
            reload: self.pressed(KEY_RELOAD),
            move_dir: self.movement(),
            aim,
            fire: self.pressed(MOUSE_LEFT),
            throw_at: throwing.then(|| self.world_mouse()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(keys: &[&str]) -> InputSnapshot {
        InputSnapshot {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_diagonal_movement_is_normalised() {
        let dir = snapshot(&[KEY_UP, KEY_RIGHT]).movement();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x > 0.0 && dir.y < 0.0);

        // Opposing keys cancel out
        assert_eq!(snapshot(&[KEY_LEFT, KEY_RIGHT]).movement(), Vec2::ZERO);
    }

    #[test]
    fn test_intent_uses_camera_offset() {
        let mut input = snapshot(&[MOUSE_RIGHT, KEY_FLASH, KEY_AWP]);
        input.mouse = Vec2::new(300.0, 200.0);
        input.cam_x = 100.0;
        input.cam_y = 50.0;

        // Player at world (200, 250) sits at screen (100, 200): cursor is due east
        let intent = input.intent(Vec2::new(200.0, 250.0));
        assert!(intent.aim.abs() < 1e-6);
        assert_eq!(intent.throw_at, Some(Vec2::new(400.0, 250.0)));
        assert_eq!(intent.grenade, Some(GrenadeKind::Flash));
        assert_eq!(intent.weapon, Some(WeaponType::Awp));
        assert!(!intent.fire);
    }

    #[test]
    fn test_wire_format_tolerates_missing_fields() {
        let input: InputSnapshot =
            serde_json::from_str(r#"{"keys":["KeyW","mouse_left"],"mouse":[1.0,2.0]}"#)
                .unwrap();
        assert!(input.pressed(KEY_UP));
        assert!(input.intent(Vec2::ZERO).fire);
        assert_eq!(input.cam_x, 0.0);
    }
}
