//! Grenades, explosions and fire zones
//!
//! Every grenade kind shares the throw gate, stock and regeneration rules;
//! the kinds differ in flight model and detonation effect.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::PlayerId;
use super::map::MapData;
use super::physics::{PhysicsSystem, SeekResult};

/// Stock cap per grenade kind
pub const MAX_GRENADE_STOCK: u8 = 1;
/// Time to regenerate one grenade once the stock hits zero (ms)
pub const GRENADE_REGEN_MS: f32 = 15_000.0;
pub const GRENADE_RADIUS: f32 = 4.0;
/// Free-flying grenades cannot detonate at rest until this long after the throw (ms)
pub const ARMING_MS: f32 = 200.0;
/// Explosion visual lifetime (frames)
pub const EXPLOSION_LIFE: f32 = 20.0;
/// Frames between fire zone damage pulses
pub const FIRE_PULSE_FRAMES: f32 = 3.0;
/// Screen shake applied by any detonation
pub const DETONATION_SHAKE: f32 = 15.0;

/// Throwable grenade kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrenadeKind {
    He,
    Flash,
    Molotov,
}

/// Per-kind tuning
#[derive(Debug, Clone, Copy)]
pub struct GrenadeStats {
    /// Minimum time between throws of any grenade (ms)
    pub throw_delay_ms: f64,
    pub damage: f32,
    pub radius: f32,
    /// Fuse (ms)
    pub fuse_ms: f32,
    /// Throw speed (units per frame)
    pub speed: f32,
    /// Speed under which a free-flying grenade counts as at rest
    pub rest_speed: f32,
    pub color: &'static str,
}

/// What happens when a grenade goes off
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detonation {
    /// Linear falloff damage within `radius`
    Blast { damage: f32, radius: f32 },
    /// Full blind within `radius` for players with line of sight
    Blind { radius: f32 },
    /// Leaves a burning area
    Ignite { radius: f32, duration_ms: f32, pulse_damage: f32 },
}

impl GrenadeKind {
    pub const ALL: [GrenadeKind; 3] = [GrenadeKind::He, GrenadeKind::Flash, GrenadeKind::Molotov];

    pub fn stats(self) -> GrenadeStats {
        match self {
            GrenadeKind::He => GrenadeStats {
                throw_delay_ms: 1000.0,
                damage: 90.0,
                radius: 150.0,
                fuse_ms: 2000.0,
                speed: 10.0,
                rest_speed: 0.1,
                color: "#22c55e",
            },
            GrenadeKind::Flash => GrenadeStats {
                throw_delay_ms: 1000.0,
                damage: 0.0,
                radius: 200.0,
                fuse_ms: 1500.0,
                speed: 12.0,
                rest_speed: 0.1,
                color: "#e5e7eb",
            },
            GrenadeKind::Molotov => GrenadeStats {
                throw_delay_ms: 1000.0,
                damage: 2.0,
                radius: 80.0,
                fuse_ms: 3000.0,
                speed: 10.0,
                rest_speed: 1.0,
                color: "#f97316",
            },
        }
    }

    pub fn detonation(self) -> Detonation {
        let stats = self.stats();
        match self {
            GrenadeKind::He => Detonation::Blast {
                damage: stats.damage,
                radius: stats.radius,
            },
            GrenadeKind::Flash => Detonation::Blind { radius: stats.radius },
            GrenadeKind::Molotov => Detonation::Ignite {
                radius: stats.radius,
                duration_ms: MOLOTOV_DURATION_MS,
                pulse_damage: stats.damage,
            },
        }
    }
}

pub const MOLOTOV_DURATION_MS: f32 = 5000.0;
/// Furthest a molotov can be lobbed at a target
pub const MOLOTOV_MAX_RANGE: f32 = 350.0;

/// One value per grenade kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerGrenade<T> {
    pub he: T,
    pub flash: T,
    pub molotov: T,
}

impl<T: Copy> PerGrenade<T> {
    pub fn splat(value: T) -> Self {
        Self {
            he: value,
            flash: value,
            molotov: value,
        }
    }
}

impl<T> PerGrenade<T> {
    pub fn get(&self, kind: GrenadeKind) -> &T {
        match kind {
            GrenadeKind::He => &self.he,
            GrenadeKind::Flash => &self.flash,
            GrenadeKind::Molotov => &self.molotov,
        }
    }

    pub fn get_mut(&mut self, kind: GrenadeKind) -> &mut T {
        match kind {
            GrenadeKind::He => &mut self.he,
            GrenadeKind::Flash => &mut self.flash,
            GrenadeKind::Molotov => &mut self.molotov,
        }
    }
}

/// Can a grenade of `kind` be thrown now?
pub fn can_throw(stock: &PerGrenade<u8>, kind: GrenadeKind, last_throw: Option<f64>, now: f64) -> bool {
    *stock.get(kind) > 0 && last_throw.map_or(true, |t| now - t > kind.stats().throw_delay_ms)
}

/// Consume one grenade; an emptied stock starts its regeneration timer.
pub fn consume(stock: &mut PerGrenade<u8>, cooldowns: &mut PerGrenade<f32>, kind: GrenadeKind) {
    let count = stock.get_mut(kind);
    *count = count.saturating_sub(1);
    if *count == 0 {
        *cooldowns.get_mut(kind) = GRENADE_REGEN_MS;
    }
}

/// Tick regeneration timers; each expiry restores exactly one grenade.
pub fn regenerate(stock: &mut PerGrenade<u8>, cooldowns: &mut PerGrenade<f32>, elapsed_ms: f32) {
    for kind in GrenadeKind::ALL {
        let cooldown = cooldowns.get_mut(kind);
        if *cooldown <= 0.0 {
            continue;
        }
        *cooldown -= elapsed_ms;
        if *cooldown <= 0.0 {
            *cooldown = 0.0;
            let count = stock.get_mut(kind);
            *count = (*count + 1).min(MAX_GRENADE_STOCK);
        }
    }
}

/// A grenade in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrenadeProjectile {
    pub id: Uuid,
    pub kind: GrenadeKind,
    pub owner_id: PlayerId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Remaining fuse (ms)
    pub fuse: f32,
    /// Pinned landing point for targeted throws
    pub target: Option<Vec2>,
    pub color: String,
}

impl GrenadeProjectile {
    /// Throw from `origin` facing `rotation`. Molotovs aimed at a point fly
    /// straight to it, clamped to [`MOLOTOV_MAX_RANGE`].
    pub fn throw(
        id: Uuid,
        owner_id: PlayerId,
        kind: GrenadeKind,
        origin: Vec2,
        rotation: f32,
        aim_point: Option<Vec2>,
    ) -> Self {
        let stats = kind.stats();

        let target = match (kind, aim_point) {
            (GrenadeKind::Molotov, Some(point)) => {
                if origin.distance(point) > MOLOTOV_MAX_RANGE {
                    Some(origin + Vec2::from_angle((point - origin).to_angle()) * MOLOTOV_MAX_RANGE)
                } else {
                    Some(point)
                }
            }
            _ => None,
        };

        let heading = match target {
            Some(point) if point != origin => (point - origin).to_angle(),
            _ => rotation,
        };

        Self {
            id,
            kind,
            owner_id,
            pos: origin,
            vel: Vec2::from_angle(heading) * stats.speed,
            radius: GRENADE_RADIUS,
            fuse: stats.fuse_ms,
            target,
            color: stats.color.to_string(),
        }
    }

    /// Advance flight by `dt` frames (`elapsed_ms` of fuse). Returns true when
    /// the grenade detonates this step.
    pub fn update(&mut self, map: &MapData, dt: f32, elapsed_ms: f32) -> bool {
        self.fuse -= elapsed_ms;

        if let Some(target) = self.target {
            let speed = self.vel.length();
            return match PhysicsSystem::seek(map, self.pos, target, speed, self.radius, dt) {
                SeekResult::Moving(pos) => {
                    self.pos = pos;
                    self.fuse <= 0.0
                }
                SeekResult::Arrived(pos) | SeekResult::HitWall(pos) => {
                    self.pos = pos;
                    true
                }
            };
        }

        let (pos, vel) = PhysicsSystem::drag_flight(map, self.pos, self.vel, self.radius, dt);
        self.pos = pos;
        self.vel = vel;

        let stats = self.kind.stats();
        let armed = stats.fuse_ms - self.fuse > ARMING_MS;
        self.fuse <= 0.0 || (armed && self.vel.length() < stats.rest_speed)
    }
}

/// Expanding blast ring left behind by a detonation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    /// Frames remaining
    pub life: f32,
    pub owner_id: PlayerId,
    pub kind: GrenadeKind,
}

impl Explosion {
    pub fn new(pos: Vec2, kind: GrenadeKind, owner_id: PlayerId) -> Self {
        Self {
            pos,
            radius: 1.0,
            max_radius: kind.stats().radius,
            life: EXPLOSION_LIFE,
            owner_id,
            kind,
        }
    }

    /// Returns false once faded
    pub fn update(&mut self, dt: f32) -> bool {
        self.life -= dt;
        let progress = 1.0 - (self.life / EXPLOSION_LIFE).max(0.0);
        self.radius = (self.max_radius * progress).max(1.0);
        self.life > 0.0
    }
}

/// Burning ground left by a molotov
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireZone {
    pub id: Uuid,
    pub pos: Vec2,
    pub radius: f32,
    /// Remaining burn time (ms)
    pub life: f32,
    pub owner_id: PlayerId,
    pub pulse_damage: f32,
    /// Frames until the next damage pulse
    pub pulse_timer: f32,
}

impl FireZone {
    pub fn new(id: Uuid, pos: Vec2, owner_id: PlayerId, radius: f32, duration_ms: f32, pulse_damage: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            life: duration_ms,
            owner_id,
            pulse_damage,
            pulse_timer: 0.0,
        }
    }

    /// Advance timers; returns (still burning, pulses this step)
    pub fn update(&mut self, dt: f32, elapsed_ms: f32) -> (bool, bool) {
        self.life -= elapsed_ms;
        self.pulse_timer -= dt;
        let pulse = self.pulse_timer <= 0.0;
        if pulse {
            self.pulse_timer = FIRE_PULSE_FRAMES;
        }
        (self.life > 0.0, pulse)
    }
}

/// HE damage at `distance` from the blast centre
pub fn blast_damage(damage: f32, radius: f32, distance: f32) -> Option<f32> {
    (distance < radius).then(|| damage * (1.0 - distance / radius))
}
