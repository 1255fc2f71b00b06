//! Game tunables.
//!
//! Every economic constant and timing rule lives here so a host can override
//! them from a JSON document without touching the engine.

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The override document was not valid JSON for [`GameConfig`].
    #[error("failed to parse game config: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// A field parsed but holds a value the engine cannot run with.
    #[error("invalid game config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Longest accepted turn duration, one day.
pub const MAX_TURN_DURATION_SECS: i64 = 86_400;

/// Tunable rules of a session.
///
/// Unspecified fields in an override document keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Coins granted to every newly admitted player
    pub starting_coins: i64,

    /// Seconds a player has to act before the turn is skipped
    pub turn_duration_secs: i64,

    /// The game finishes once the round counter exceeds this
    pub max_rounds: u32,

    /// Coins granted when a roll passes or lands on Start
    pub lap_bonus: i64,

    /// Coins granted by a special event tile
    pub special_event_bonus: i64,

    /// Extra rent charged per property level
    pub rent_per_level: i64,

    /// Extra upgrade cost per existing property level
    pub upgrade_cost_per_level: i64,

    /// Share of a property's value charged for an upgrade, before the level surcharge
    pub upgrade_base_ratio: f64,

    /// Net worth contributed by each property level
    pub net_worth_per_level: i64,

    /// Maximum number of events kept in the log
    pub event_log_capacity: usize,

    /// Players required before the host may start
    pub min_players: usize,

    /// Shortest accepted player name, after trimming
    pub min_name_len: usize,

    /// Longest accepted player name, after trimming
    pub max_name_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_coins: 1000,
            turn_duration_secs: 30,
            max_rounds: 15,
            lap_bonus: 300,
            special_event_bonus: 100,
            rent_per_level: 35,
            upgrade_cost_per_level: 80,
            upgrade_base_ratio: 0.5,
            net_worth_per_level: 100,
            event_log_capacity: 30,
            min_players: 2,
            min_name_len: 2,
            max_name_len: 24,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value keeps the clock arithmetic in range and the
    /// economy one-directional.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turn_duration_secs <= 0 || self.turn_duration_secs > MAX_TURN_DURATION_SECS {
            return Err(invalid(
                "turn_duration_secs",
                format!("must be within 1..={}", MAX_TURN_DURATION_SECS),
            ));
        }

        let amounts = [
            ("starting_coins", self.starting_coins),
            ("lap_bonus", self.lap_bonus),
            ("special_event_bonus", self.special_event_bonus),
            ("rent_per_level", self.rent_per_level),
            ("upgrade_cost_per_level", self.upgrade_cost_per_level),
            ("net_worth_per_level", self.net_worth_per_level),
        ];
        if let Some((field, value)) = amounts.iter().find(|(_, v)| *v < 0) {
            return Err(invalid(*field, format!("must not be negative, got {}", value)));
        }

        if !self.upgrade_base_ratio.is_finite() || self.upgrade_base_ratio < 0.0 {
            return Err(invalid(
                "upgrade_base_ratio",
                format!("must be a non-negative number, got {}", self.upgrade_base_ratio),
            ));
        }
        if self.min_players < 2 {
            return Err(invalid("min_players", format!("must be at least 2, got {}", self.min_players)));
        }
        if self.min_name_len == 0 || self.min_name_len > self.max_name_len {
            return Err(invalid(
                "min_name_len",
                format!(
                    "must be within 1..={} (max_name_len), got {}",
                    self.max_name_len, self.min_name_len
                ),
            ));
        }
        Ok(())
    }

    /// Turn duration as a chrono duration, clamped to the accepted range.
    pub fn turn_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.turn_duration_secs.clamp(1, MAX_TURN_DURATION_SECS))
    }

    /// Rent owed for landing on a property at `level`.
    pub fn rent_for(&self, base_rent: i64, level: u32) -> i64 {
        base_rent + i64::from(level) * self.rent_per_level
    }

    /// Cost of raising a property from `level` to `level + 1`.
    pub fn upgrade_cost(&self, value: i64, level: u32) -> i64 {
        let cost = (value as f64 * self.upgrade_base_ratio).floor() as i64
            + i64::from(level) * self.upgrade_cost_per_level;
        cost.max(0)
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.starting_coins, 1000);
        assert_eq!(config.max_rounds, 15);
        assert_eq!(config.turn_duration(), chrono::Duration::seconds(30));
    }

    #[test]
    fn test_partial_override() {
        let config = GameConfig::from_json_str(r#"{"max_rounds": 3, "lap_bonus": 50}"#).unwrap();
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.lap_bonus, 50);
        assert_eq!(config.starting_coins, 1000);
    }

    #[test]
    fn test_invalid_override() {
        let result = GameConfig::from_json_str(r#"{"max_rounds": "many"}"#);
        assert!(matches!(result, Err(ConfigError::Json { .. })));
    }

    fn rejected_field(raw: &str) -> &'static str {
        match GameConfig::from_json_str(raw) {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected invalid config for {}, got {:?}", raw, other),
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_turn_duration_bounds() {
        assert_eq!(rejected_field(r#"{"turn_duration_secs": 0}"#), "turn_duration_secs");
        assert_eq!(rejected_field(r#"{"turn_duration_secs": -5}"#), "turn_duration_secs");
        assert_eq!(
            rejected_field(r#"{"turn_duration_secs": 9223372036854775807}"#),
            "turn_duration_secs"
        );
        let config = GameConfig::from_json_str(r#"{"turn_duration_secs": 86400}"#).unwrap();
        assert_eq!(config.turn_duration(), chrono::Duration::days(1));

        let unchecked = GameConfig {
            turn_duration_secs: i64::MAX,
            ..GameConfig::default()
        };
        assert_eq!(unchecked.turn_duration(), chrono::Duration::days(1));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        assert_eq!(rejected_field(r#"{"upgrade_base_ratio": -2.0}"#), "upgrade_base_ratio");
        assert_eq!(rejected_field(r#"{"rent_per_level": -1}"#), "rent_per_level");
        assert_eq!(
            rejected_field(r#"{"upgrade_cost_per_level": -80}"#),
            "upgrade_cost_per_level"
        );
        assert_eq!(rejected_field(r#"{"net_worth_per_level": -100}"#), "net_worth_per_level");
        assert_eq!(rejected_field(r#"{"lap_bonus": -300}"#), "lap_bonus");

        let unchecked = GameConfig {
            upgrade_base_ratio: -2.0,
            ..GameConfig::default()
        };
        assert_eq!(unchecked.upgrade_cost(280, 0), 0);
    }

    #[test]
    fn test_player_and_name_limits() {
        assert_eq!(rejected_field(r#"{"min_players": 1}"#), "min_players");
        assert_eq!(
            rejected_field(r#"{"min_name_len": 10, "max_name_len": 5}"#),
            "min_name_len"
        );
        assert_eq!(rejected_field(r#"{"min_name_len": 0}"#), "min_name_len");
    }

    #[test]
    fn test_upgrade_and_rent_pricing() {
        let config = GameConfig::default();
        assert_eq!(config.upgrade_cost(280, 0), 140);
        assert_eq!(config.upgrade_cost(280, 1), 220);
        assert_eq!(config.upgrade_cost(245, 0), 122);
        assert_eq!(config.rent_for(45, 0), 45);
        assert_eq!(config.rent_for(45, 2), 115);
    }
}
