//! Bot perception and behaviour
//!
//! The state machine is a pure transition table over perception stimuli; the
//! tactics for each state are computed by [`think`], which updates the bot's
//! heading and velocity and reports the actions the world should carry out.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::combat::WeaponType;
use super::entities::{Player, PlayerId, Team, PLAYER_SPEED};
use super::grenade::GrenadeKind;
use super::map::MapData;
use super::physics::PhysicsSystem;
use super::raycast::line_of_sight;

/// Blind intensity above which a bot stands still
const BLIND_FREEZE: f32 = 0.8;
/// Extra blind decay per frame while frozen
const BLIND_RECOVERY: f32 = 0.01;
const OPTIMAL_RANGE_AWP: f32 = 500.0;
const OPTIMAL_RANGE: f32 = 250.0;
const RANGE_BAND: f32 = 50.0;
const LOW_HP: f32 = 30.0;
const KITE_NEAR: f32 = 300.0;
const KITE_FAR: f32 = 500.0;
const FIRE_CHANCE: f64 = 0.05;
const FIRE_WINDOW: f32 = 200.0;
const GRENADE_CHANCE: f64 = 0.005;
const ARRIVAL_RADIUS: f32 = 10.0;
const HOLD_FRAMES: f32 = 100.0;
const LOOK_AROUND_RATE: f32 = 0.1;
const PATROL_MIN: f32 = 300.0;
const PATROL_SPREAD: f32 = 400.0;
const PATROL_SPEED_FACTOR: f32 = 0.8;

/// Behaviour state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotState {
    #[default]
    Idle,
    Searching,
    Investigating,
    Chasing,
}

/// Perception events that drive state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    /// An enemy is visible
    TargetSighted,
    /// The tracked enemy is no longer visible
    TargetLost,
    /// Took damage from someone
    Damaged,
    /// Finished holding at an investigation point
    WaypointHeld,
    /// Nothing to react to
    NoTarget,
}

impl BotState {
    /// Transition table
    pub fn next(self, stimulus: Stimulus) -> BotState {
        match (self, stimulus) {
            (_, Stimulus::TargetSighted) | (_, Stimulus::Damaged) => BotState::Chasing,
            (BotState::Chasing, Stimulus::TargetLost) => BotState::Investigating,
            (BotState::Investigating, Stimulus::WaypointHeld) => BotState::Searching,
            (BotState::Idle, Stimulus::NoTarget) => BotState::Searching,
            (state, _) => state,
        }
    }
}

/// Per-bot memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotBrain {
    pub state: BotState,
    pub target_id: Option<PlayerId>,
    pub last_known_pos: Option<Vec2>,
    pub patrol_point: Option<Vec2>,
    /// -1 left, 0 none, 1 right
    pub strafe_dir: i8,
    /// Frames until the strafe direction is re-rolled
    pub strafe_timer: f32,
    /// Frames left holding at an investigation point
    pub hold_timer: Option<f32>,
}

impl BotBrain {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// React to being hit by `attacker`
    pub fn on_damaged(&mut self, attacker: PlayerId) {
        self.state = self.state.next(Stimulus::Damaged);
        self.target_id = Some(attacker);
        self.strafe_timer = 0.0;
    }

    /// Movement was fully blocked last step; give up on the patrol point
    pub fn on_blocked(&mut self) {
        if self.state == BotState::Searching {
            self.patrol_point = None;
        }
    }
}

/// A living player the bot may consider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: PlayerId,
    pub team: Team,
    pub pos: Vec2,
}

/// Actions the world should attempt on the bot's behalf this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BotActions {
    pub fire: bool,
    pub reload: bool,
    pub throw: Option<(GrenadeKind, Vec2)>,
}

/// Is `other` a valid enemy for a bot on `team`?
fn is_enemy(team: Team, other: Team) -> bool {
    team == Team::None || other != team
}

/// Run one perception/decision step for a living bot.
pub fn think(bot: &mut Player, contacts: &[Contact], map: &MapData, rng: &mut impl Rng, dt: f32) -> BotActions {
    let Some(mut brain) = bot.brain.take() else {
        return BotActions::default();
    };
    let actions = decide(bot, &mut brain, contacts, map, rng, dt);
    bot.brain = Some(brain);
    actions
}

fn decide(
    bot: &mut Player,
    brain: &mut BotBrain,
    contacts: &[Contact],
    map: &MapData,
    rng: &mut impl Rng,
    dt: f32,
) -> BotActions {
    let mut actions = BotActions::default();

    if bot.flash_intensity > BLIND_FREEZE {
        bot.vel = Vec2::ZERO;
        bot.flash_intensity -= dt * BLIND_RECOVERY;
        return actions;
    }

    let weapon = *bot.weapon_state();
    if weapon.current_ammo == 0 && !weapon.is_reloading {
        actions.reload = true;
    }

    let visible = perceive(bot, brain, contacts, map);

    match visible {
        Some(target) => {
            brain.state = brain.state.next(Stimulus::TargetSighted);
            brain.target_id = Some(target.id);
            brain.last_known_pos = Some(target.pos);
            brain.patrol_point = None;
        }
        None if brain.state == BotState::Chasing => {
            brain.state = brain.state.next(Stimulus::TargetLost);
            brain.patrol_point = Some(brain.last_known_pos.unwrap_or(bot.pos));
            brain.strafe_timer = 0.0;
            brain.hold_timer = None;
        }
        None => {}
    }

    match (brain.state, visible) {
        (BotState::Chasing, Some(target)) => {
            chase(bot, brain, target, weapon.is_reloading, rng, dt, &mut actions);
        }
        (BotState::Investigating, _) if brain.patrol_point.is_some() => {
            investigate(bot, brain, dt);
        }
        _ => patrol(bot, brain, map, rng),
    }

    actions
}

/// Re-acquire the tracked target if still visible, else lock the nearest
/// visible enemy at any range.
fn perceive(bot: &Player, brain: &BotBrain, contacts: &[Contact], map: &MapData) -> Option<Contact> {
    let enemies: Vec<&Contact> = contacts
        .iter()
        .filter(|c| c.id != bot.id && is_enemy(bot.team, c.team))
        .collect();

    let tracked = brain
        .target_id
        .and_then(|id| enemies.iter().find(|c| c.id == id))
        .filter(|c| line_of_sight(map, bot.pos, c.pos));
    if let Some(current) = tracked {
        return Some(**current);
    }

    enemies
        .into_iter()
        .filter(|c| line_of_sight(map, bot.pos, c.pos))
        .min_by(|a, b| bot.pos.distance(a.pos).total_cmp(&bot.pos.distance(b.pos)))
        .copied()
}

fn chase(
    bot: &mut Player,
    brain: &mut BotBrain,
    target: Contact,
    reloading: bool,
    rng: &mut impl Rng,
    dt: f32,
    actions: &mut BotActions,
) {
    let angle = (target.pos - bot.pos).to_angle();
    bot.rotation = angle;
    let toward = Vec2::from_angle(angle);
    let side = toward.perp();
    let distance = bot.pos.distance(target.pos);
    let optimal = if bot.weapon == WeaponType::Awp {
        OPTIMAL_RANGE_AWP
    } else {
        OPTIMAL_RANGE
    };

    let mut movement = Vec2::ZERO;

    if bot.hp < LOW_HP || reloading {
        if reloading {
            movement = -toward;
        } else {
            let strafe = if brain.strafe_dir != 0 {
                brain.strafe_dir as f32
            } else if rng.gen_bool(0.5) {
                1.0
            } else {
                -1.0
            };
            movement = side * strafe;
            if distance < KITE_NEAR {
                movement += toward * -0.8;
            } else if distance > KITE_FAR {
                movement += toward * 0.5;
            }
        }
    } else {
        if distance < optimal - RANGE_BAND {
            movement = -toward;
        } else if distance > optimal + RANGE_BAND {
            movement = toward;
        }

        if brain.strafe_timer <= 0.0 {
            let roll: f32 = rng.gen();
            brain.strafe_dir = if roll < 0.4 {
                -1
            } else if roll < 0.8 {
                1
            } else {
                0
            };
            brain.strafe_timer = 30.0 + rng.gen_range(0.0..60.0);
        } else {
            brain.strafe_timer -= dt;
        }
        if brain.strafe_dir != 0 {
            movement += side * brain.strafe_dir as f32;
        }

        if !reloading && rng.gen_bool(FIRE_CHANCE) && (distance - optimal).abs() < FIRE_WINDOW {
            actions.fire = true;
        }

        if rng.gen_bool(GRENADE_CHANCE) {
            let kind = GrenadeKind::ALL[rng.gen_range(0..GrenadeKind::ALL.len())];
            actions.throw = Some((kind, target.pos));
        }
    }

    bot.vel = movement.normalize_or_zero() * PLAYER_SPEED;
}

fn investigate(bot: &mut Player, brain: &mut BotBrain, dt: f32) {
    let Some(point) = brain.patrol_point else {
        return;
    };

    if bot.pos.distance(point) > ARRIVAL_RADIUS {
        let angle = (point - bot.pos).to_angle();
        bot.rotation = angle;
        bot.vel = Vec2::from_angle(angle) * PLAYER_SPEED;
        return;
    }

    bot.vel = Vec2::ZERO;
    bot.rotation += dt * LOOK_AROUND_RATE;
    let hold = brain.hold_timer.get_or_insert(HOLD_FRAMES);
    *hold -= dt;
    if *hold <= 0.0 {
        brain.state = brain.state.next(Stimulus::WaypointHeld);
        brain.patrol_point = None;
        brain.hold_timer = None;
    }
}

fn patrol(bot: &mut Player, brain: &mut BotBrain, map: &MapData, rng: &mut impl Rng) {
    brain.state = brain.state.next(Stimulus::NoTarget);

    let reached = brain.patrol_point.map_or(true, |p| {
        (bot.pos.x - p.x).abs() < ARRIVAL_RADIUS && (bot.pos.y - p.y).abs() < ARRIVAL_RADIUS
    });
    if reached {
        let angle = rng.gen_range(0.0..TAU);
        let distance = PATROL_MIN + rng.gen_range(0.0..PATROL_SPREAD);
        let candidate = bot.pos + Vec2::from_angle(angle) * distance;
        brain.patrol_point = Some(PhysicsSystem::clamp_to_map(map, candidate, map.tile_size));
    }

    if let Some(point) = brain.patrol_point {
        let angle = (point - bot.pos).to_angle();
        bot.rotation = angle;
        bot.vel = Vec2::from_angle(angle) * (PLAYER_SPEED * PATROL_SPEED_FACTOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::tests::open_room;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uuid::Uuid;

    fn bot_at(pos: Vec2, team: Team) -> Player {
        Player::new(Uuid::new_v4(), "Glitch".into(), true, team, pos)
    }

    fn contact(pos: Vec2, team: Team) -> Contact {
        Contact {
            id: Uuid::new_v4(),
            team,
            pos,
        }
    }

    #[test]
    fn test_transition_table() {
        use BotState::*;
        use Stimulus::*;

        for state in [Idle, Searching, Investigating, Chasing] {
            assert_eq!(state.next(TargetSighted), Chasing);
            assert_eq!(state.next(Damaged), Chasing);
        }
        assert_eq!(Chasing.next(TargetLost), Investigating);
        assert_eq!(Searching.next(TargetLost), Searching);
        assert_eq!(Investigating.next(WaypointHeld), Searching);
        assert_eq!(Chasing.next(WaypointHeld), Chasing);
        assert_eq!(Idle.next(NoTarget), Searching);
        assert_eq!(Investigating.next(NoTarget), Investigating);
    }

    #[test]
    fn test_locks_nearest_visible_enemy() {
        let map = open_room(30, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut bot = bot_at(Vec2::new(100.0, 200.0), Team::Blue);
        let far = contact(Vec2::new(900.0, 200.0), Team::Red);
        let near = contact(Vec2::new(400.0, 200.0), Team::Red);
        let ally = contact(Vec2::new(150.0, 200.0), Team::Blue);

        think(&mut bot, &[far, near, ally], &map, &mut rng, 1.0);

        let brain = bot.brain.as_ref().unwrap();
        assert_eq!(brain.state, BotState::Chasing);
        assert_eq!(brain.target_id, Some(near.id));
        assert_eq!(brain.last_known_pos, Some(near.pos));
        assert!(bot.rotation.abs() < 1e-6);
    }

    #[test]
    fn test_ffa_bot_targets_everyone() {
        let map = open_room(30, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut bot = bot_at(Vec2::new(100.0, 200.0), Team::None);
        let other = contact(Vec2::new(300.0, 200.0), Team::None);

        think(&mut bot, &[other], &map, &mut rng, 1.0);
        assert_eq!(bot.brain.as_ref().unwrap().target_id, Some(other.id));
    }

    #[test]
    fn test_lost_target_investigates_last_known_position() {
        let map = open_room(30, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut bot = bot_at(Vec2::new(100.0, 200.0), Team::Red);
        let enemy = contact(Vec2::new(500.0, 200.0), Team::Blue);

        think(&mut bot, &[enemy], &map, &mut rng, 1.0);
        // Enemy disappears (dead or out of the contact list)
        think(&mut bot, &[], &map, &mut rng, 1.0);

        let brain = bot.brain.as_ref().unwrap();
        assert_eq!(brain.state, BotState::Investigating);
        assert_eq!(brain.patrol_point, Some(enemy.pos));
        assert!(bot.vel.x > 0.0);
    }

    #[test]
    fn test_hold_then_search() {
        let map = open_room(30, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut bot = bot_at(Vec2::new(300.0, 200.0), Team::Red);
        {
            let brain = bot.brain.as_mut().unwrap();
            brain.state = BotState::Investigating;
            brain.patrol_point = Some(Vec2::new(302.0, 200.0));
        }

        for _ in 0..99 {
            think(&mut bot, &[], &map, &mut rng, 1.0);
            assert_eq!(bot.brain.as_ref().unwrap().state, BotState::Investigating);
            assert_eq!(bot.vel, Vec2::ZERO);
        }
        think(&mut bot, &[], &map, &mut rng, 1.0);
        assert_eq!(bot.brain.as_ref().unwrap().state, BotState::Searching);
    }

    #[test]
    fn test_patrol_point_inside_map() {
        let map = open_room(60, 60);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut bot = bot_at(Vec2::new(1200.0, 1200.0), Team::Red);

        think(&mut bot, &[], &map, &mut rng, 1.0);

        let brain = bot.brain.as_ref().unwrap();
        assert_eq!(brain.state, BotState::Searching);
        let point = brain.patrol_point.unwrap();
        let d = bot.pos.distance(point);
        assert!((PATROL_MIN - 1e-3..=PATROL_MIN + PATROL_SPREAD + 1e-3).contains(&d));
        assert!(map.contains(point));
        assert!((bot.vel.length() - PLAYER_SPEED * PATROL_SPEED_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_blinded_bot_freezes() {
        let map = open_room(30, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut bot = bot_at(Vec2::new(100.0, 200.0), Team::Red);
        bot.vel = Vec2::new(3.0, 0.0);
        bot.flash_intensity = 1.0;
        let enemy = contact(Vec2::new(300.0, 200.0), Team::Blue);

        let actions = think(&mut bot, &[enemy], &map, &mut rng, 1.0);

        assert_eq!(actions, BotActions::default());
        assert_eq!(bot.vel, Vec2::ZERO);
        assert!((bot.flash_intensity - 0.99).abs() < 1e-6);
        assert_eq!(bot.brain.as_ref().unwrap().state, BotState::Idle);
    }

    #[test]
    fn test_empty_clip_requests_reload_and_retreats() {
        let map = open_room(30, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut bot = bot_at(Vec2::new(400.0, 200.0), Team::Red);
        bot.weapon_states.magic_wand.current_ammo = 0;
        bot.weapon_states.magic_wand.is_reloading = true;
        let enemy = contact(Vec2::new(600.0, 200.0), Team::Blue);

        let actions = think(&mut bot, &[enemy], &map, &mut rng, 1.0);
        // Already reloading: no second request, back away from the target
        assert!(!actions.reload);
        assert!(!actions.fire);
        assert!(bot.vel.x < 0.0);

        bot.weapon_states.magic_wand.is_reloading = false;
        let actions = think(&mut bot, &[enemy], &map, &mut rng, 1.0);
        assert!(actions.reload);
    }

    /// Velocity after one chase step against an enemy `distance` units to the right
    fn chase_velocity(distance: f32, weapon: WeaponType, hp: f32, seed: u64) -> Vec2 {
        let map = open_room(30, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut bot = bot_at(Vec2::new(100.0, 200.0), Team::Red);
        bot.weapon = weapon;
        bot.hp = hp;
        let enemy = contact(Vec2::new(100.0 + distance, 200.0), Team::Blue);

        think(&mut bot, &[enemy], &map, &mut rng, 1.0);
        assert_eq!(bot.brain.as_ref().unwrap().state, BotState::Chasing);
        bot.vel
    }

    #[test]
    fn test_wand_holds_mid_range() {
        for seed in 0..8 {
            assert!(chase_velocity(100.0, WeaponType::MagicWand, 100.0, seed).x < 0.0);
            assert!(chase_velocity(400.0, WeaponType::MagicWand, 100.0, seed).x > 0.0);
            // inside the band only strafing remains
            assert!(chase_velocity(250.0, WeaponType::MagicWand, 100.0, seed).x.abs() < 1e-4);
        }
    }

    #[test]
    fn test_awp_keeps_its_distance() {
        for seed in 0..8 {
            // 300 is comfortable for the wand but too close for the AWP
            assert!(chase_velocity(300.0, WeaponType::Awp, 100.0, seed).x < 0.0);
            assert!(chase_velocity(300.0, WeaponType::MagicWand, 100.0, seed).x.abs() < 1e-4);
            assert!(chase_velocity(500.0, WeaponType::Awp, 100.0, seed).x.abs() < 1e-4);
            assert!(chase_velocity(600.0, WeaponType::Awp, 100.0, seed).x > 0.0);
        }
    }

    #[test]
    fn test_low_hp_bot_kites() {
        for seed in 0..8 {
            let near = chase_velocity(200.0, WeaponType::MagicWand, 20.0, seed);
            assert!(near.x < 0.0);
            assert!(near.y.abs() > 0.0);
            assert!(chase_velocity(600.0, WeaponType::MagicWand, 20.0, seed).x > 0.0);

            let between = chase_velocity(400.0, WeaponType::MagicWand, 20.0, seed);
            assert!(between.x.abs() < 1e-4);
            assert!((between.y.abs() - PLAYER_SPEED).abs() < 1e-4);
        }
    }
}
