//! Player, team and particle records owned by the world

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bot::BotBrain;
use super::combat::{DamageRecord, WeaponType};
use super::grenade::{GrenadeKind, PerGrenade, MAX_GRENADE_STOCK};
use super::input::InputSnapshot;

/// Stable player identity (connection id for remote players)
pub type PlayerId = Uuid;

pub const PLAYER_RADIUS: f32 = 15.0;
/// Units per frame
pub const PLAYER_SPEED: f32 = 4.0;
pub const MAX_HP: f32 = 100.0;

/// Team affiliation; `None` is the free-for-all sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Blue,
    Red,
    None,
}

impl Team {
    /// Are two teams allied? FFA players are never allies of anyone.
    pub fn allied_with(self, other: Team) -> bool {
        self == other && self != Team::None
    }

    /// Label used in game-over announcements
    pub fn winner_label(self) -> &'static str {
        match self {
            Team::Blue => "BLUE TEAM",
            Team::Red => "RED TEAM",
            Team::None => "NOBODY",
        }
    }
}

/// Round or kill count per team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScores {
    pub blue: u32,
    pub red: u32,
    pub none: u32,
}

impl TeamScores {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::Blue => self.blue,
            Team::Red => self.red,
            Team::None => self.none,
        }
    }

    pub fn increment(&mut self, team: Team) {
        match team {
            Team::Blue => self.blue += 1,
            Team::Red => self.red += 1,
            Team::None => self.none += 1,
        }
    }
}

/// Magazine state for one weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    pub current_ammo: u32,
    pub is_reloading: bool,
    /// Milliseconds until the reload completes
    pub reload_timer: f32,
}

impl WeaponState {
    pub fn full(weapon: WeaponType) -> Self {
        Self {
            current_ammo: weapon.stats().clip_size,
            is_reloading: false,
            reload_timer: 0.0,
        }
    }
}

/// Per-weapon magazine state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponStates {
    pub magic_wand: WeaponState,
    pub awp: WeaponState,
}

impl WeaponStates {
    pub fn full() -> Self {
        Self {
            magic_wand: WeaponState::full(WeaponType::MagicWand),
            awp: WeaponState::full(WeaponType::Awp),
        }
    }

    pub fn get(&self, weapon: WeaponType) -> &WeaponState {
        match weapon {
            WeaponType::MagicWand => &self.magic_wand,
            WeaponType::Awp => &self.awp,
        }
    }

    pub fn get_mut(&mut self, weapon: WeaponType) -> &mut WeaponState {
        match weapon {
            WeaponType::MagicWand => &mut self.magic_wand,
            WeaponType::Awp => &mut self.awp,
        }
    }
}

/// A participant in the match, human or bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub team: Team,
    pub color: String,

    // Position and movement
    pub pos: Vec2,
    /// Units per frame
    pub vel: Vec2,
    pub radius: f32,
    pub rotation: f32,

    // Combat
    pub hp: f32,
    pub max_hp: f32,
    pub is_dead: bool,
    pub weapon: WeaponType,
    pub selected_grenade: GrenadeKind,
    pub weapon_states: WeaponStates,
    pub grenades: PerGrenade<u8>,
    /// Milliseconds until one grenade of each kind regenerates
    pub grenade_cooldowns: PerGrenade<f32>,
    /// Simulation time of the last shot / throw (ms)
    pub last_shot_time: Option<f64>,
    pub last_grenade_time: Option<f64>,
    /// Blind intensity 0..=1
    pub flash_intensity: f32,
    /// Milliseconds until a Deathmatch respawn
    pub respawn_timer: f32,

    // Scoring
    pub score: u32,
    pub damage_history: Vec<DamageRecord>,

    /// Perception/behaviour state, bots only
    pub brain: Option<BotBrain>,

    /// Latest input snapshot for human players; never replicated
    #[serde(skip)]
    pub input: InputSnapshot,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_bot: bool, team: Team, spawn: Vec2) -> Self {
        Self {
            id,
            name,
            is_bot,
            team,
            color: team_color(team, is_bot).to_string(),
            pos: spawn,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            rotation: 0.0,
            hp: MAX_HP,
            max_hp: MAX_HP,
            is_dead: false,
            weapon: WeaponType::MagicWand,
            selected_grenade: GrenadeKind::He,
            weapon_states: WeaponStates::full(),
            grenades: PerGrenade::splat(MAX_GRENADE_STOCK),
            grenade_cooldowns: PerGrenade::splat(0.0),
            last_shot_time: None,
            last_grenade_time: None,
            flash_intensity: 0.0,
            respawn_timer: 0.0,
            score: 0,
            damage_history: Vec::new(),
            brain: is_bot.then(BotBrain::default),
            input: InputSnapshot::default(),
        }
    }

    /// Bring a player back to life at `spawn` with a full loadout.
    pub fn respawn(&mut self, spawn: Vec2) {
        self.is_dead = false;
        self.hp = self.max_hp;
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.flash_intensity = 0.0;
        self.respawn_timer = 0.0;
        self.weapon_states = WeaponStates::full();
        self.grenades = PerGrenade::splat(MAX_GRENADE_STOCK);
        self.grenade_cooldowns = PerGrenade::splat(0.0);
        self.damage_history.clear();
        if let Some(brain) = self.brain.as_mut() {
            brain.reset();
        }
    }

    pub fn alive(&self) -> bool {
        !self.is_dead
    }

    /// Magazine of the equipped weapon
    pub fn weapon_state(&self) -> &WeaponState {
        self.weapon_states.get(self.weapon)
    }

    pub fn weapon_state_mut(&mut self) -> &mut WeaponState {
        self.weapon_states.get_mut(self.weapon)
    }
}

fn team_color(team: Team, is_bot: bool) -> &'static str {
    match team {
        Team::Blue => "#3b82f6",
        Team::Red => "#ef4444",
        Team::None if is_bot => "#f472b6",
        Team::None => "#a855f7",
    }
}

/// Cosmetic particle, replicated only for render parity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frames remaining
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: String,
    pub alpha: f32,
    pub decay: f32,
}

impl Particle {
    /// Advance one step; returns false once expired
    pub fn advance(&mut self, dt: f32) -> bool {
        self.pos += self.vel * dt;
        self.life -= dt;
        self.alpha = (self.life / self.max_life).max(0.0);
        self.life > 0.0
    }
}

/// Radial burst of `count` particles
pub fn particle_burst(
    rng: &mut impl Rng,
    pos: Vec2,
    count: usize,
    color: &str,
    speed: f32,
) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let v = rng.gen_range(0.0..=speed);
            Particle {
                pos,
                vel: Vec2::from_angle(angle) * v,
                life: 30.0 + rng.gen_range(0.0..20.0),
                max_life: 50.0,
                size: 1.0 + rng.gen_range(0.0..3.0),
                color: color.to_string(),
                alpha: 1.0,
                decay: 0.02,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_alliance_rules() {
        assert!(Team::Blue.allied_with(Team::Blue));
        assert!(!Team::Blue.allied_with(Team::Red));
        assert!(!Team::None.allied_with(Team::None));
    }

    #[test]
    fn test_respawn_restores_loadout() {
        let mut p = Player::new(Uuid::new_v4(), "Tester".into(), true, Team::Red, Vec2::ZERO);
        p.hp = 0.0;
        p.is_dead = true;
        p.weapon_states.awp.current_ammo = 0;
        p.weapon_states.magic_wand.is_reloading = true;
        *p.grenades.get_mut(GrenadeKind::Flash) = 0;
        *p.grenade_cooldowns.get_mut(GrenadeKind::Flash) = 9000.0;
        p.flash_intensity = 1.0;

        p.respawn(Vec2::new(50.0, 60.0));

        assert!(p.alive());
        assert_eq!(p.hp, MAX_HP);
        assert_eq!(p.pos, Vec2::new(50.0, 60.0));
        assert_eq!(p.weapon_states, WeaponStates::full());
        assert_eq!(*p.grenades.get(GrenadeKind::Flash), MAX_GRENADE_STOCK);
        assert_eq!(*p.grenade_cooldowns.get(GrenadeKind::Flash), 0.0);
        assert_eq!(p.flash_intensity, 0.0);
        assert!(p.brain.is_some());
    }

    #[test]
    fn test_particles_expire() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut burst = particle_burst(&mut rng, Vec2::ZERO, 5, "#fff", 2.0);
        assert_eq!(burst.len(), 5);
        for _ in 0..60 {
            burst.retain_mut(|p| p.advance(1.0));
        }
        assert!(burst.is_empty());
    }
}
