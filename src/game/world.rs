//! Authoritative world state and the per-tick update order
//!
//! One `World` exists per match and is owned by the match task. A tick runs
//! respawns, status effects, controls (input or bot AI), movement,
//! projectiles, grenades, explosions, fire zones, particles and finally the
//! match lifecycle check, always in that order.

use std::collections::VecDeque;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::time::frames_to_ms;

use super::bot::{self, Contact};
use super::combat::{CombatSystem, DamageRecord, DamageSource, KillEvent, Projectile, KILL_FEED_LEN, PROJECTILE_WALL_RADIUS};
use super::entities::{particle_burst, Particle, Player, PlayerId, Team, TeamScores, PLAYER_SPEED};
use super::grenade::{
    self, blast_damage, Detonation, Explosion, FireZone, GrenadeKind, GrenadeProjectile, DETONATION_SHAKE,
};
use super::input::InputSnapshot;
use super::lifecycle::{
    deathmatch_winner, elimination_winner, GameConfig, GameMode, GameOverLatch, RoundResult, RoundState,
    TeamHeadcount, RESPAWN_MS, ROUND_INTERMISSION_MS, ROUND_START_SHAKE,
};
use super::map::MapData;
use super::physics::PhysicsSystem;
use super::raycast::line_of_sight;
use super::snapshot::WorldSnapshot;

pub const BOT_NAMES: [&str; 8] = [
    "ShadowSlayer",
    "NeonViper",
    "Glitch",
    "SniperWolf",
    "ManaAddict",
    "GrenadeGod",
    "PixelRogue",
    "VoidWalker",
];

/// Screen shake lost per frame
const SCREENSHAKE_DECAY: f32 = 30.0;
/// Blind intensity lost per frame
const BLIND_DECAY: f32 = 0.02;
/// Chance per frame that a fire zone emits a flame particle
const FIRE_PARTICLE_CHANCE: f64 = 0.2;

/// Lifecycle notifications produced by one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub kills: Vec<KillEvent>,
    /// Winner label, present only on the tick the match is decided
    pub game_over: Option<String>,
}

/// What a player attempts this tick after input or AI
#[derive(Debug, Clone, Copy, Default)]
struct Actions {
    fire: bool,
    reload: bool,
    throw_at: Option<Vec2>,
}

/// The whole simulation for one match
pub struct World {
    map: MapData,
    config: GameConfig,
    /// Mirrors only apply snapshots and never simulate
    authority: bool,
    pub players: Vec<Player>,
    pub projectiles: Vec<Projectile>,
    pub grenades: Vec<GrenadeProjectile>,
    pub explosions: Vec<Explosion>,
    pub fire_zones: Vec<FireZone>,
    pub particles: Vec<Particle>,
    pub kill_feed: VecDeque<KillEvent>,
    pub team_scores: TeamScores,
    pub screenshake: f32,
    tick: u64,
    /// Simulation clock (ms)
    clock_ms: f64,
    round: RoundState,
    game_over: GameOverLatch,
    rng: ChaCha8Rng,
    pending_kills: Vec<KillEvent>,
}

impl World {
    /// Create an authoritative world and seed its bots.
    pub fn new(map: MapData, config: GameConfig, seed: u64) -> Self {
        let mut world = Self::empty(map, config, seed, true);

        for squad in world.config.bot_roster() {
            for i in 0..squad.count {
                let name = BOT_NAMES[(i + squad.name_offset) % BOT_NAMES.len()];
                world.spawn_player(None, name.to_string(), true, squad.team);
            }
        }

        info!(
            mode = ?world.config.mode,
            team_mode = world.config.is_team_mode(),
            bots = world.players.len(),
            seed,
            "World created"
        );
        world
    }

    /// Create a non-authoritative mirror that only renders snapshots.
    pub fn mirror(map: MapData, config: GameConfig) -> Self {
        Self::empty(map, config, 0, false)
    }

    fn empty(map: MapData, config: GameConfig, seed: u64, authority: bool) -> Self {
        Self {
            map,
            config,
            authority,
            players: Vec::new(),
            projectiles: Vec::new(),
            grenades: Vec::new(),
            explosions: Vec::new(),
            fire_zones: Vec::new(),
            particles: Vec::new(),
            kill_feed: VecDeque::with_capacity(KILL_FEED_LEN + 1),
            team_scores: TeamScores::default(),
            screenshake: 0.0,
            tick: 0,
            clock_ms: 0.0,
            round: RoundState::InProgress,
            game_over: GameOverLatch::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            pending_kills: Vec::new(),
        }
    }

    pub fn map(&self) -> &MapData {
        &self.map
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn round(&self) -> RoundState {
        self.round
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.fired()
    }

    pub fn winner(&self) -> Option<&str> {
        self.game_over.winner()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Number of non-bot participants
    pub fn human_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_bot).count()
    }

    fn next_id(&mut self) -> Uuid {
        Uuid::from_u128(self.rng.gen())
    }

    fn random_spawn(&mut self, team: Team) -> Vec2 {
        self.map
            .spawns_for(team)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default()
    }

    fn burst(&mut self, pos: Vec2, count: usize, color: &str, speed: f32) {
        let particles = particle_burst(&mut self.rng, pos, count, color, speed);
        self.particles.extend(particles);
    }

    fn spawn_player(&mut self, id: Option<PlayerId>, name: String, is_bot: bool, team: Team) -> PlayerId {
        let id = id.unwrap_or_else(|| self.next_id());
        let spawn = self.random_spawn(team);
        self.players.push(Player::new(id, name, is_bot, team, spawn));
        id
    }

    /// Admit a remote participant. Team modes put them on Blue unless Blue
    /// already outnumbers Red.
    pub fn add_remote_player(&mut self, id: PlayerId, name: String) -> &Player {
        if let Some(existing) = self.index_of(id) {
            debug!(player_id = %id, "Player already in world");
            return &self.players[existing];
        }

        let team = if self.config.is_team_mode() {
            let count = TeamHeadcount::of(&self.players);
            if count.blue_total <= count.red_total {
                Team::Blue
            } else {
                Team::Red
            }
        } else {
            Team::None
        };

        self.spawn_player(Some(id), name, false, team);
        let index = self.players.len() - 1;
        let player = &self.players[index];
        info!(player_id = %id, name = %player.name, team = ?team, "Player admitted");
        player
    }

    /// Remove a participant immediately
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.index_of(id)?;
        let player = self.players.remove(index);
        info!(player_id = %id, name = %player.name, "Player removed");
        Some(player)
    }

    /// Store the latest input for a human player. Returns false for unknown
    /// ids and bots.
    pub fn set_input(&mut self, id: PlayerId, input: InputSnapshot) -> bool {
        match self.player_mut(id) {
            Some(player) if !player.is_bot => {
                player.input = input;
                true
            }
            _ => false,
        }
    }

    /// Advance the simulation by `dt` frames.
    pub fn update(&mut self, dt: f32) -> TickOutcome {
        if !self.authority || self.game_over.fired() {
            return TickOutcome::default();
        }

        let elapsed = frames_to_ms(dt);
        self.tick += 1;
        self.clock_ms += f64::from(elapsed);

        if self.screenshake > 0.0 {
            self.screenshake = (self.screenshake - dt * SCREENSHAKE_DECAY).max(0.0);
        }

        let active = self.update_respawns(elapsed);
        self.update_status(&active, dt, elapsed);
        self.update_controls(&active, dt);
        self.update_movement(&active, dt);
        self.update_projectiles(dt);
        self.update_grenades(dt, elapsed);
        self.explosions.retain_mut(|e| e.update(dt));
        self.update_fire_zones(dt, elapsed);
        self.particles.retain_mut(|p| p.advance(dt));
        let game_over = self.update_lifecycle(elapsed);

        TickOutcome {
            kills: std::mem::take(&mut self.pending_kills),
            game_over,
        }
    }

    /// Tick Deathmatch respawn timers. Returns which players may act this
    /// tick: alive and not respawned during it.
    fn update_respawns(&mut self, elapsed: f32) -> Vec<bool> {
        let active: Vec<bool> = self.players.iter().map(Player::alive).collect();
        if self.config.mode != GameMode::Deathmatch {
            return active;
        }

        for i in 0..self.players.len() {
            if active[i] {
                continue;
            }
            self.players[i].respawn_timer -= elapsed;
            if self.players[i].respawn_timer <= 0.0 {
                self.respawn(i);
            }
        }
        active
    }

    fn respawn(&mut self, index: usize) {
        let team = self.players[index].team;
        let spawn = self.random_spawn(team);
        self.players[index].respawn(spawn);
        self.burst(spawn, 20, "#ffffff", 2.0);
    }

    fn update_status(&mut self, active: &[bool], dt: f32, elapsed: f32) {
        for (player, &active) in self.players.iter_mut().zip(active) {
            if !active {
                continue;
            }
            grenade::regenerate(&mut player.grenades, &mut player.grenade_cooldowns, elapsed);

            let clip_size = player.weapon.stats().clip_size;
            let weapon = player.weapon_state_mut();
            if weapon.is_reloading {
                weapon.reload_timer -= elapsed;
                if weapon.reload_timer <= 0.0 {
                    weapon.is_reloading = false;
                    weapon.reload_timer = 0.0;
                    weapon.current_ammo = clip_size;
                }
            }

            if player.flash_intensity > 0.0 {
                player.flash_intensity = (player.flash_intensity - dt * BLIND_DECAY).max(0.0);
            }
        }
    }

    fn update_controls(&mut self, active: &[bool], dt: f32) {
        let contacts: Vec<Contact> = self
            .players
            .iter()
            .filter(|p| p.alive())
            .map(|p| Contact {
                id: p.id,
                team: p.team,
                pos: p.pos,
            })
            .collect();

        for i in 0..self.players.len() {
            if !active[i] {
                continue;
            }

            let actions = if self.players[i].is_bot {
                let decided = bot::think(&mut self.players[i], &contacts, &self.map, &mut self.rng, dt);
                if let Some((kind, _)) = decided.throw {
                    self.players[i].selected_grenade = kind;
                }
                Actions {
                    fire: decided.fire,
                    reload: decided.reload,
                    throw_at: decided.throw.map(|(_, at)| at),
                }
            } else {
                self.apply_input(i)
            };

            if actions.reload {
                self.start_reload(i);
            }
            if actions.fire {
                self.try_shoot(i);
            }
            if let Some(target) = actions.throw_at {
                self.try_throw_grenade(i, target);
            }
        }
    }

    fn apply_input(&mut self, index: usize) -> Actions {
        let player = &mut self.players[index];
        let intent = player.input.intent(player.pos);

        if let Some(weapon) = intent.weapon {
            player.weapon = weapon;
        }
        if let Some(kind) = intent.grenade {
            player.selected_grenade = kind;
        }
        player.vel = intent.move_dir * PLAYER_SPEED;
        player.rotation = intent.aim;

        Actions {
            fire: intent.fire,
            reload: intent.reload,
            throw_at: intent.throw_at,
        }
    }

    fn update_movement(&mut self, active: &[bool], dt: f32) {
        for (player, &active) in self.players.iter_mut().zip(active) {
            if !active || player.is_dead {
                continue;
            }
            let result = PhysicsSystem::move_with_collision(&self.map, player.pos, player.vel, player.radius, dt);
            player.pos = result.pos;
            if result.fully_blocked() {
                if let Some(brain) = player.brain.as_mut() {
                    brain.on_blocked();
                }
            }
        }
    }

    fn start_reload(&mut self, index: usize) {
        let player = &mut self.players[index];
        let stats = player.weapon.stats();
        let weapon = player.weapon_state_mut();
        if !weapon.is_reloading && weapon.current_ammo < stats.clip_size {
            weapon.is_reloading = true;
            weapon.reload_timer = stats.reload_ms;
        }
    }

    fn try_shoot(&mut self, index: usize) -> bool {
        let now = self.clock_ms;
        let player = &self.players[index];
        let weapon = *player.weapon_state();

        if weapon.is_reloading || weapon.current_ammo == 0 {
            if weapon.current_ammo == 0 {
                self.start_reload(index);
            }
            return false;
        }

        let kind = player.weapon;
        let stats = kind.stats();
        if !CombatSystem::can_fire(player.last_shot_time, now, stats.fire_interval_ms) {
            return false;
        }

        let spread = (self.rng.gen::<f32>() - 0.5) * stats.spread;
        let id = self.next_id();

        let player = &mut self.players[index];
        player.last_shot_time = Some(now);
        player.weapon_state_mut().current_ammo -= 1;
        let origin = player.pos;
        let projectile = Projectile::fire(id, player.id, origin, player.rotation + spread, kind);

        if stats.screenshake > 0.0 {
            self.screenshake = stats.screenshake;
        }
        self.projectiles.push(projectile);
        self.burst(origin, 3, stats.color, 2.0);
        true
    }

    fn try_throw_grenade(&mut self, index: usize, target: Vec2) -> bool {
        let now = self.clock_ms;
        let player = &self.players[index];
        let kind = player.selected_grenade;
        if !grenade::can_throw(&player.grenades, kind, player.last_grenade_time, now) {
            return false;
        }

        let id = self.next_id();
        let player = &mut self.players[index];
        player.last_grenade_time = Some(now);
        grenade::consume(&mut player.grenades, &mut player.grenade_cooldowns, kind);
        let thrown = GrenadeProjectile::throw(id, player.id, kind, player.pos, player.rotation, Some(target));
        debug!(player_id = %player.id, kind = ?kind, "Grenade thrown");
        self.grenades.push(thrown);
        true
    }

    /// Is a hit from `attacker_id` on `target` blocked as friendly fire?
    /// Unknown attackers have no team to protect.
    fn is_friendly(&self, attacker_id: PlayerId, target: &Player) -> bool {
        self.player(attacker_id)
            .is_some_and(|a| CombatSystem::is_friendly_fire(a.id, a.team, target.id, target.team))
    }

    fn update_projectiles(&mut self, dt: f32) {
        let mut projectiles = std::mem::take(&mut self.projectiles);
        projectiles.retain_mut(|projectile| self.step_projectile(projectile, dt));
        self.projectiles = projectiles;
    }

    /// Returns false when the projectile is consumed
    fn step_projectile(&mut self, projectile: &mut Projectile, dt: f32) -> bool {
        if !projectile.update(dt) {
            return false;
        }

        if self.map.collides(projectile.pos, PROJECTILE_WALL_RADIUS) {
            self.burst(projectile.pos, 5, "#ffffff", 2.0);
            return false;
        }

        let hit = self
            .players
            .iter()
            .filter(|t| t.id != projectile.owner_id && t.alive())
            .filter(|t| !self.is_friendly(projectile.owner_id, t))
            .find(|t| projectile.check_hit(t.pos, t.radius))
            .map(|t| t.id);

        match hit {
            Some(target) => {
                self.damage_player(
                    target,
                    projectile.damage,
                    projectile.owner_id,
                    DamageSource::Weapon(projectile.weapon),
                );
                self.burst(projectile.pos, 10, "#ff0000", 3.0);
                false
            }
            None => true,
        }
    }

    fn update_grenades(&mut self, dt: f32, elapsed: f32) {
        let mut grenades = std::mem::take(&mut self.grenades);
        let mut detonated = Vec::new();
        grenades.retain_mut(|g| {
            if g.update(&self.map, dt, elapsed) {
                detonated.push(g.clone());
                false
            } else {
                true
            }
        });
        self.grenades = grenades;

        for g in &detonated {
            self.detonate(g);
        }
    }

    fn detonate(&mut self, g: &GrenadeProjectile) {
        self.explosions.push(Explosion::new(g.pos, g.kind, g.owner_id));
        self.screenshake = DETONATION_SHAKE;

        match g.kind.detonation() {
            Detonation::Blast { damage, radius } => {
                let victims: Vec<(PlayerId, f32)> = self
                    .players
                    .iter()
                    .filter(|p| p.alive() && !self.is_friendly(g.owner_id, p))
                    .filter_map(|p| blast_damage(damage, radius, p.pos.distance(g.pos)).map(|d| (p.id, d)))
                    .collect();
                for (id, amount) in victims {
                    self.damage_player(id, amount, g.owner_id, DamageSource::Grenade(GrenadeKind::He));
                }
                self.burst(g.pos, 30, &g.color, 5.0);
            }
            Detonation::Blind { radius } => {
                let owner_team = self.player(g.owner_id).map(|p| p.team);
                for player in self.players.iter_mut() {
                    if player.is_dead || player.id == g.owner_id {
                        continue;
                    }
                    if owner_team.is_some_and(|team| team.allied_with(player.team)) {
                        continue;
                    }
                    if PhysicsSystem::is_in_radius(player.pos, g.pos, radius) && line_of_sight(&self.map, g.pos, player.pos) {
                        player.flash_intensity = 1.0;
                    }
                }
                self.burst(g.pos, 20, "#ffffff", 6.0);
            }
            Detonation::Ignite {
                radius,
                duration_ms,
                pulse_damage,
            } => {
                let id = self.next_id();
                self.fire_zones
                    .push(FireZone::new(id, g.pos, g.owner_id, radius, duration_ms, pulse_damage));
            }
        }
    }

    fn update_fire_zones(&mut self, dt: f32, elapsed: f32) {
        let mut zones = std::mem::take(&mut self.fire_zones);
        zones.retain_mut(|zone| {
            let (burning, pulse) = zone.update(dt, elapsed);

            if pulse {
                let victims: Vec<PlayerId> = self
                    .players
                    .iter()
                    .filter(|p| p.alive() && !self.is_friendly(zone.owner_id, p))
                    .filter(|p| PhysicsSystem::is_in_radius(p.pos, zone.pos, zone.radius + p.radius))
                    .map(|p| p.id)
                    .collect();
                for id in victims {
                    self.damage_player(id, zone.pulse_damage, zone.owner_id, DamageSource::Grenade(GrenadeKind::Molotov));
                }
            }

            if self.rng.gen_bool(FIRE_PARTICLE_CHANCE) {
                let offset = Vec2::new(self.rng.gen::<f32>() - 0.5, self.rng.gen::<f32>() - 0.5) * zone.radius;
                let size = 2.0 + self.rng.gen::<f32>() * 5.0;
                self.particles.push(Particle {
                    pos: zone.pos + offset,
                    vel: Vec2::new(0.0, -1.0),
                    life: 20.0,
                    max_life: 20.0,
                    size,
                    color: "#f97316".to_string(),
                    alpha: 0.8,
                    decay: 0.05,
                });
            }

            burning
        });
        self.fire_zones = zones;
    }

    /// Apply damage and resolve death, scoring, assist and the kill feed.
    /// Dead or unknown targets are ignored.
    pub fn damage_player(&mut self, target_id: PlayerId, amount: f32, attacker_id: PlayerId, source: DamageSource) {
        let now = self.clock_ms;
        let Some(index) = self.index_of(target_id) else {
            return;
        };

        let (history, victim_name, victim_color, victim_pos) = {
            let target = &mut self.players[index];
            if target.is_dead {
                return;
            }

            let (hp, died) = CombatSystem::apply_damage(target.hp, amount);
            target.hp = hp;
            target.damage_history.push(DamageRecord {
                attacker_id,
                amount,
                time: now,
            });
            CombatSystem::prune_history(&mut target.damage_history, now);

            if !died {
                if let Some(brain) = target.brain.as_mut() {
                    brain.on_damaged(attacker_id);
                }
                return;
            }

            target.is_dead = true;
            target.vel = Vec2::ZERO;
            if self.config.mode == GameMode::Deathmatch {
                target.respawn_timer = RESPAWN_MS;
            }
            (
                std::mem::take(&mut target.damage_history),
                target.name.clone(),
                target.color.clone(),
                target.pos,
            )
        };

        self.burst(victim_pos, 40, &victim_color, 4.0);

        let Some(attacker_index) = self.index_of(attacker_id) else {
            debug!(victim = %victim_name, attacker_id = %attacker_id, "Kill by unknown attacker, no credit");
            return;
        };

        let attacker_team = self.players[attacker_index].team;
        let team_mode = self.config.is_team_mode();
        let assister = CombatSystem::select_assist(&history, Some(attacker_id), target_id, |id| {
            self.player(id)
                .is_some_and(|helper| !team_mode || helper.team.allied_with(attacker_team))
        })
        .and_then(|id| self.player(id))
        .map(|helper| helper.name.clone());

        let attacker = &mut self.players[attacker_index];
        attacker.score += 1;
        if self.config.mode != GameMode::Elimination && attacker.team != Team::None {
            self.team_scores.increment(attacker.team);
        }

        let event = KillEvent {
            killer: attacker.name.clone(),
            victim: victim_name,
            weapon: source,
            assister,
            time: now,
        };
        info!(
            killer = %event.killer,
            victim = %event.victim,
            weapon = ?event.weapon,
            assister = ?event.assister,
            "Kill"
        );
        self.record_kill(event);
    }

    fn record_kill(&mut self, event: KillEvent) {
        self.kill_feed.push_back(event.clone());
        while self.kill_feed.len() > KILL_FEED_LEN {
            self.kill_feed.pop_front();
        }
        self.pending_kills.push(event);
    }

    fn update_lifecycle(&mut self, elapsed: f32) -> Option<String> {
        let winner = match self.config.mode {
            GameMode::Deathmatch => deathmatch_winner(&self.config, &self.team_scores, &self.players),
            GameMode::Elimination => self.update_rounds(elapsed),
        }?;

        let winner = self.game_over.trigger(winner)?;
        info!(
            winner = %winner,
            tick = self.tick,
            blue = self.team_scores.blue,
            red = self.team_scores.red,
            "Game over"
        );
        Some(winner)
    }

    fn update_rounds(&mut self, elapsed: f32) -> Option<String> {
        match self.round {
            RoundState::InProgress => {
                let result = TeamHeadcount::of(&self.players).round_result()?;
                match result {
                    RoundResult::Won(team) => {
                        self.team_scores.increment(team);
                        info!(
                            winner = ?team,
                            blue = self.team_scores.blue,
                            red = self.team_scores.red,
                            "Round over"
                        );
                    }
                    RoundResult::Draw => info!("Round drawn"),
                }

                if let Some(winner) = elimination_winner(&self.config, &self.team_scores) {
                    return Some(winner);
                }
                self.round = RoundState::Intermission {
                    remaining_ms: ROUND_INTERMISSION_MS,
                };
                None
            }
            RoundState::Intermission { remaining_ms } => {
                let remaining_ms = remaining_ms - elapsed;
                if remaining_ms <= 0.0 {
                    self.start_new_round();
                } else {
                    self.round = RoundState::Intermission { remaining_ms };
                }
                None
            }
        }
    }

    fn start_new_round(&mut self) {
        for i in 0..self.players.len() {
            self.respawn(i);
        }
        self.projectiles.clear();
        self.grenades.clear();
        self.fire_zones.clear();
        self.explosions.clear();
        self.round = RoundState::InProgress;
        self.screenshake = ROUND_START_SHAKE;
        info!(blue = self.team_scores.blue, red = self.team_scores.red, "Round started");
    }

    /// Full state for replication
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            players: self.players.clone(),
            projectiles: self.projectiles.clone(),
            grenades: self.grenades.clone(),
            explosions: self.explosions.clone(),
            fire_zones: self.fire_zones.clone(),
            particles: self.particles.clone(),
            screenshake: self.screenshake,
            kill_feed: self.kill_feed.iter().cloned().collect(),
            team_scores: self.team_scores,
            round: self.round,
            winner: self.game_over.winner().map(str::to_string),
        }
    }

    /// Replace this world's state with a received snapshot
    pub fn apply_snapshot(&mut self, snapshot: WorldSnapshot) {
        self.tick = snapshot.tick;
        self.players = snapshot.players;
        self.projectiles = snapshot.projectiles;
        self.grenades = snapshot.grenades;
        self.explosions = snapshot.explosions;
        self.fire_zones = snapshot.fire_zones;
        self.particles = snapshot.particles;
        self.screenshake = snapshot.screenshake;
        self.kill_feed = snapshot.kill_feed.into();
        self.team_scores = snapshot.team_scores;
        self.round = snapshot.round;
        if let Some(winner) = snapshot.winner {
            self.game_over.trigger(winner);
        }
    }
}
