//! Game modes, round flow and win conditions

use serde::{Deserialize, Serialize};

use super::entities::{Player, Team, TeamScores};

/// Deathmatch respawn delay (ms)
pub const RESPAWN_MS: f32 = 2000.0;
/// Pause between Elimination rounds (ms)
pub const ROUND_INTERMISSION_MS: f32 = 3000.0;
pub const TEAM_DEATHMATCH_SCORE_TO_WIN: u32 = 20;
pub const FFA_SCORE_TO_WIN: u32 = 15;
/// Screen shake when a new round begins
pub const ROUND_START_SHAKE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Deathmatch,
    Elimination,
}

/// Per-match rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub mode: GameMode,
    pub bots_enabled: bool,
    /// Blue bots in Elimination
    pub ally_count: usize,
    /// Red bots in Elimination
    pub enemy_count: usize,
    /// Deathmatch: teams (true) or free-for-all (false)
    pub team_deathmatch: bool,
    pub rounds_to_win: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Deathmatch,
            bots_enabled: true,
            ally_count: 2,
            enemy_count: 3,
            team_deathmatch: false,
            rounds_to_win: 5,
        }
    }
}

impl GameConfig {
    /// Do players belong to Blue/Red rather than FFA?
    pub fn is_team_mode(&self) -> bool {
        self.mode == GameMode::Elimination || self.team_deathmatch
    }

    /// Bots seeded at match start
    pub fn bot_roster(&self) -> Vec<BotSquad> {
        if !self.bots_enabled {
            return Vec::new();
        }
        let squad = |team, count, name_offset| BotSquad {
            team,
            count,
            name_offset,
        };
        match self.mode {
            GameMode::Elimination => vec![
                squad(Team::Blue, self.ally_count, 0),
                squad(Team::Red, self.enemy_count, 4),
            ],
            GameMode::Deathmatch if self.team_deathmatch => {
                vec![squad(Team::Blue, 2, 0), squad(Team::Red, 3, 2)]
            }
            GameMode::Deathmatch => vec![squad(Team::None, 5, 0)],
        }
    }
}

/// A group of bots on one team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotSquad {
    pub team: Team,
    pub count: usize,
    /// Index of the first name in the bot name list
    pub name_offset: usize,
}

/// Elimination round phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RoundState {
    InProgress,
    Intermission { remaining_ms: f32 },
}

/// Outcome of an Elimination round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Won(Team),
    Draw,
}

/// Alive and rostered counts per team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamHeadcount {
    pub blue_total: usize,
    pub red_total: usize,
    pub blue_alive: usize,
    pub red_alive: usize,
}

impl TeamHeadcount {
    pub fn of(players: &[Player]) -> Self {
        let mut count = Self::default();
        for p in players {
            match p.team {
                Team::Blue => {
                    count.blue_total += 1;
                    count.blue_alive += usize::from(p.alive());
                }
                Team::Red => {
                    count.red_total += 1;
                    count.red_alive += usize::from(p.alive());
                }
                Team::None => {}
            }
        }
        count
    }

    /// Decide a round. Needs both teams rostered.
    pub fn round_result(&self) -> Option<RoundResult> {
        if self.blue_total == 0 || self.red_total == 0 {
            return None;
        }
        match (self.blue_alive, self.red_alive) {
            (0, 0) => Some(RoundResult::Draw),
            (0, _) => Some(RoundResult::Won(Team::Red)),
            (_, 0) => Some(RoundResult::Won(Team::Blue)),
            _ => None,
        }
    }
}

/// Deathmatch winner label, if a score limit has been reached
pub fn deathmatch_winner(config: &GameConfig, scores: &TeamScores, players: &[Player]) -> Option<String> {
    if config.team_deathmatch {
        [Team::Blue, Team::Red]
            .into_iter()
            .find(|&team| scores.get(team) >= TEAM_DEATHMATCH_SCORE_TO_WIN)
            .map(|team| team.winner_label().to_string())
    } else {
        players
            .iter()
            .find(|p| p.score >= FFA_SCORE_TO_WIN)
            .map(|p| p.name.to_uppercase())
    }
}

/// Elimination winner label, if a team has enough rounds
pub fn elimination_winner(config: &GameConfig, scores: &TeamScores) -> Option<String> {
    [Team::Blue, Team::Red]
        .into_iter()
        .find(|&team| scores.get(team) >= config.rounds_to_win)
        .map(|team| team.winner_label().to_string())
}

/// Edge-triggered game-over signal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameOverLatch {
    winner: Option<String>,
}

impl GameOverLatch {
    /// Latch `winner`; returns it only the first time.
    pub fn trigger(&mut self, winner: String) -> Option<String> {
        if self.winner.is_some() {
            return None;
        }
        self.winner = Some(winner.clone());
        Some(winner)
    }

    pub fn fired(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use uuid::Uuid;

    fn player(name: &str, team: Team, alive: bool) -> Player {
        let mut p = Player::new(Uuid::new_v4(), name.into(), false, team, Vec2::ZERO);
        p.is_dead = !alive;
        p
    }

    #[test]
    fn test_round_result() {
        let count = TeamHeadcount::of(&[player("a", Team::Blue, true), player("b", Team::Red, false)]);
        assert_eq!(count.round_result(), Some(RoundResult::Won(Team::Blue)));

        let count = TeamHeadcount::of(&[player("a", Team::Blue, false), player("b", Team::Red, false)]);
        assert_eq!(count.round_result(), Some(RoundResult::Draw));

        let count = TeamHeadcount::of(&[player("a", Team::Blue, true), player("b", Team::Red, true)]);
        assert_eq!(count.round_result(), None);

        // One side has nobody rostered yet
        let count = TeamHeadcount::of(&[player("a", Team::Blue, true)]);
        assert_eq!(count.round_result(), None);
    }

    #[test]
    fn test_deathmatch_limits() {
        let mut config = GameConfig {
            team_deathmatch: true,
            ..GameConfig::default()
        };
        let mut scores = TeamScores {
            blue: 19,
            ..TeamScores::default()
        };
        assert_eq!(deathmatch_winner(&config, &scores, &[]), None);
        scores.blue = 20;
        assert_eq!(deathmatch_winner(&config, &scores, &[]).as_deref(), Some("BLUE TEAM"));

        config.team_deathmatch = false;
        let mut ace = player("NeonViper", Team::None, true);
        ace.score = 14;
        assert_eq!(deathmatch_winner(&config, &scores, &[ace.clone()]), None);
        ace.score = 15;
        assert_eq!(deathmatch_winner(&config, &scores, &[ace]).as_deref(), Some("NEONVIPER"));
    }

    #[test]
    fn test_elimination_limit() {
        let config = GameConfig {
            mode: GameMode::Elimination,
            rounds_to_win: 3,
            ..GameConfig::default()
        };
        let scores = TeamScores {
            red: 3,
            blue: 2,
            none: 0,
        };
        assert_eq!(elimination_winner(&config, &scores).as_deref(), Some("RED TEAM"));
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut latch = GameOverLatch::default();
        assert_eq!(latch.trigger("RED TEAM".into()).as_deref(), Some("RED TEAM"));
        assert_eq!(latch.trigger("BLUE TEAM".into()), None);
        assert_eq!(latch.winner(), Some("RED TEAM"));
    }

    #[test]
    fn test_bot_roster() {
        let ffa = GameConfig::default();
        let roster = ffa.bot_roster();
        assert_eq!(roster.len(), 1);
        assert_eq!((roster[0].team, roster[0].count), (Team::None, 5));
        assert!(!ffa.is_team_mode());

        let elim = GameConfig {
            mode: GameMode::Elimination,
            ally_count: 1,
            enemy_count: 4,
            ..GameConfig::default()
        };
        let roster = elim.bot_roster();
        assert_eq!((roster[0].team, roster[0].count, roster[0].name_offset), (Team::Blue, 1, 0));
        assert_eq!((roster[1].team, roster[1].count, roster[1].name_offset), (Team::Red, 4, 4));
        assert!(elim.is_team_mode());

        let none = GameConfig {
            bots_enabled: false,
            ..GameConfig::default()
        };
        assert!(none.bot_roster().is_empty());
    }
}
