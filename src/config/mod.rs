//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::lifecycle::{GameConfig, GameMode};
use crate::game::map::{MapData, MapError};
use crate::game::MatchSettings;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, comma-separated, or `*`
    pub client_origin: String,

    /// Rules for every match this server hosts
    pub game: GameConfig,
    /// Human participants per match
    pub max_players: usize,
    /// JSON tile grid; the built-in arena when unset
    pub map_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        let defaults = GameConfig::default();
        let mode = match lookup("GAME_MODE") {
            None => defaults.mode,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "deathmatch" => GameMode::Deathmatch,
                "elimination" => GameMode::Elimination,
                _ => return Err(ConfigError::invalid("GAME_MODE", value)),
            },
        };

        let game = GameConfig {
            mode,
            bots_enabled: parse_flag(&lookup, "BOTS_ENABLED", defaults.bots_enabled)?,
            ally_count: parse_var(&lookup, "ALLY_COUNT", defaults.ally_count)?,
            enemy_count: parse_var(&lookup, "ENEMY_COUNT", defaults.enemy_count)?,
            team_deathmatch: parse_flag(&lookup, "TEAM_DEATHMATCH", defaults.team_deathmatch)?,
            rounds_to_win: parse_var(&lookup, "ROUNDS_TO_WIN", defaults.rounds_to_win)?,
        };
        if game.rounds_to_win == 0 {
            return Err(ConfigError::invalid("ROUNDS_TO_WIN", "0"));
        }

        let max_players = parse_var(&lookup, "MAX_PLAYERS", 8usize)?;
        if max_players == 0 {
            return Err(ConfigError::invalid("MAX_PLAYERS", "0"));
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(server_addr.clone()))?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origin: lookup("CLIENT_ORIGIN").unwrap_or_else(|| "*".to_string()),
            game,
            max_players,
            map_path: lookup("MAP_PATH").filter(|p| !p.trim().is_empty()).map(PathBuf::from),
        })
    }

    /// Load the configured map
    pub fn load_map(&self) -> Result<MapData, MapError> {
        match &self.map_path {
            Some(path) => MapData::load(path),
            None => MapData::arena(),
        }
    }

    /// Settings handed to every new match
    pub fn match_settings(&self) -> Result<MatchSettings, MapError> {
        Ok(MatchSettings {
            map: self.load_map()?,
            game: self.game.clone(),
            max_players: self.max_players,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(name, value)),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::invalid(name, value)),
        },
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl ConfigError {
    fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.game, GameConfig::default());
        assert_eq!(config.max_players, 8);
        assert!(config.map_path.is_none());
    }

    #[test]
    fn test_port_overrides_server_addr() {
        let config = config(&[("PORT", "9000"), ("SERVER_ADDR", "127.0.0.1:1")]).unwrap();
        assert_eq!(config.server_addr.port(), 9000);
    }

    #[test]
    fn test_game_rules() {
        let config = config(&[
            ("GAME_MODE", "Elimination"),
            ("BOTS_ENABLED", "false"),
            ("ALLY_COUNT", "1"),
            ("ENEMY_COUNT", "4"),
            ("ROUNDS_TO_WIN", "3"),
        ])
        .unwrap();
        assert_eq!(config.game.mode, GameMode::Elimination);
        assert!(!config.game.bots_enabled);
        assert_eq!((config.game.ally_count, config.game.enemy_count), (1, 4));
        assert_eq!(config.game.rounds_to_win, 3);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            config(&[("GAME_MODE", "capture_the_flag")]),
            Err(ConfigError::Invalid { name: "GAME_MODE", .. })
        ));
        assert!(matches!(
            config(&[("TEAM_DEATHMATCH", "maybe")]),
            Err(ConfigError::Invalid { name: "TEAM_DEATHMATCH", .. })
        ));
        assert!(matches!(
            config(&[("ROUNDS_TO_WIN", "0")]),
            Err(ConfigError::Invalid { name: "ROUNDS_TO_WIN", .. })
        ));
        assert!(matches!(config(&[("PORT", "nope")]), Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_builtin_map_when_unset() {
        let settings = config(&[]).unwrap().match_settings().unwrap();
        assert_eq!(settings.map.width, 40);
        assert_eq!(settings.map.height, 25);
    }
}
