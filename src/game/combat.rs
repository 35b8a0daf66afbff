//! Combat system - weapons, damage, kill and assist attribution

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{PlayerId, Team};
use super::grenade::GrenadeKind;

/// Damage history entries older than this are dropped (ms)
pub const DAMAGE_HISTORY_WINDOW_MS: f64 = 10_000.0;
/// Minimum accumulated damage for an assist
pub const ASSIST_THRESHOLD: f32 = 25.0;
/// Kill feed length
pub const KILL_FEED_LEN: usize = 5;

/// Projectile lifetime (frames)
pub const PROJECTILE_LIFETIME: f32 = 100.0;
pub const PROJECTILE_RADIUS: f32 = 3.0;
/// Radius used when testing a projectile against walls
pub const PROJECTILE_WALL_RADIUS: f32 = 2.0;
/// Spawn distance ahead of the shooter
pub const MUZZLE_OFFSET: f32 = 20.0;

/// Equippable firearms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    MagicWand,
    Awp,
}

/// Weapon stats per weapon type
#[derive(Debug, Clone, Copy)]
pub struct WeaponStats {
    /// Damage per hit
    pub damage: f32,
    /// Projectile speed (units per frame)
    pub projectile_speed: f32,
    /// Minimum time between shots (ms)
    pub fire_interval_ms: f64,
    /// Maximum random angular deviation either side (radians)
    pub spread: f32,
    pub clip_size: u32,
    pub reload_ms: f32,
    /// Screen shake applied when fired
    pub screenshake: f32,
    pub color: &'static str,
}

impl WeaponType {
    pub fn stats(self) -> WeaponStats {
        match self {
            WeaponType::MagicWand => WeaponStats {
                damage: 12.0,
                projectile_speed: 14.0,
                fire_interval_ms: 150.0,
                spread: 0.1,
                clip_size: 15,
                reload_ms: 1500.0,
                screenshake: 0.0,
                color: "#c084fc",
            },
            WeaponType::Awp => WeaponStats {
                damage: 101.0,
                projectile_speed: 45.0,
                fire_interval_ms: 1500.0,
                spread: 0.0,
                clip_size: 3,
                reload_ms: 3000.0,
                screenshake: 10.0,
                color: "#fbbf24",
            },
        }
    }
}

/// What dealt a point of damage; serialised as a bare tag such as
/// `"magic_wand"` or `"molotov"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DamageSource {
    Weapon(WeaponType),
    Grenade(GrenadeKind),
}

/// Active projectile in the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: Uuid,
    pub owner_id: PlayerId,
    pub weapon: WeaponType,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub radius: f32,
    /// Frames remaining
    pub lifetime: f32,
    pub color: String,
}

impl Projectile {
    /// Spawn a projectile `MUZZLE_OFFSET` ahead of `origin` travelling along
    /// `direction`.
    pub fn fire(id: Uuid, owner_id: PlayerId, origin: Vec2, direction: f32, weapon: WeaponType) -> Self {
        let stats = weapon.stats();
        let heading = Vec2::from_angle(direction);
        Self {
            id,
            owner_id,
            weapon,
            pos: origin + heading * MUZZLE_OFFSET,
            vel: heading * stats.projectile_speed,
            damage: stats.damage,
            radius: PROJECTILE_RADIUS,
            lifetime: PROJECTILE_LIFETIME,
            color: stats.color.to_string(),
        }
    }

    /// Update projectile position, returns false if expired
    pub fn update(&mut self, dt: f32) -> bool {
        self.pos += self.vel * dt;
        self.lifetime -= dt;
        self.lifetime > 0.0
    }

    /// Check collision with a target
    pub fn check_hit(&self, target: Vec2, target_radius: f32) -> bool {
        self.pos.distance(target) < self.radius + target_radius
    }
}

/// One entry in a player's damage history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    pub attacker_id: PlayerId,
    pub amount: f32,
    /// Simulation time (ms)
    pub time: f64,
}

/// Kill feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    pub killer: String,
    pub victim: String,
    pub weapon: DamageSource,
    pub assister: Option<String>,
    /// Simulation time (ms)
    pub time: f64,
}

/// Combat rules shared by projectiles, grenades and fire
pub struct CombatSystem;

impl CombatSystem {
    /// Has the fire interval elapsed since the last shot?
    pub fn can_fire(last_shot: Option<f64>, now: f64, interval_ms: f64) -> bool {
        last_shot.map_or(true, |t| now - t >= interval_ms)
    }

    /// Apply damage to health, returns (new_health, is_dead)
    pub fn apply_damage(current_health: f32, damage: f32) -> (f32, bool) {
        let new_health = (current_health - damage).max(0.0);
        (new_health, new_health <= 0.0)
    }

    /// Would this hit be friendly fire? Self-hits are not; FFA has no allies.
    pub fn is_friendly_fire(
        attacker_id: PlayerId,
        attacker_team: Team,
        target_id: PlayerId,
        target_team: Team,
    ) -> bool {
        attacker_id != target_id && attacker_team.allied_with(target_team)
    }

    /// Drop history entries older than the attribution window
    pub fn prune_history(history: &mut Vec<DamageRecord>, now: f64) {
        history.retain(|r| now - r.time <= DAMAGE_HISTORY_WINDOW_MS);
    }

    /// Pick the assister for a kill: the eligible contributor, other than the
    /// killer and the victim, with the largest summed damage of at least
    /// [`ASSIST_THRESHOLD`].
    pub fn select_assist(
        history: &[DamageRecord],
        killer_id: Option<PlayerId>,
        victim_id: PlayerId,
        eligible: impl Fn(PlayerId) -> bool,
    ) -> Option<PlayerId> {
        let mut totals: BTreeMap<PlayerId, f32> = BTreeMap::new();
        for record in history {
            if Some(record.attacker_id) == killer_id || record.attacker_id == victim_id {
                continue;
            }
            *totals.entry(record.attacker_id).or_insert(0.0) += record.amount;
        }

        totals
            .into_iter()
            .filter(|&(id, total)| total >= ASSIST_THRESHOLD && eligible(id))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}
