//! Players seated in the session.

use chrono::{DateTime, Utc};

use super::board::Property;

/// Player identifier.
pub type PlayerId = uuid::Uuid;

/// A seated player.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,

    /// Display name (trimmed)
    pub name: String,

    /// Balance; rent may drive it negative
    pub coins: i64,

    /// Board index, always `0..BOARD_SIZE`
    pub position: usize,

    pub is_host: bool,

    /// Recomputed after every tile resolution as `coins <= 0`
    pub is_bankrupt: bool,

    /// Owned property ids, in acquisition order
    pub properties: Vec<String>,

    /// Admission sequence number, used to break net worth ties
    pub join_order: usize,

    pub joined_at: DateTime<Utc>,
}

impl Player {
    pub fn new(
        id: PlayerId,
        name: String,
        coins: i64,
        is_host: bool,
        join_order: usize,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            coins,
            position: 0,
            is_host,
            is_bankrupt: false,
            properties: Vec::new(),
            join_order,
            joined_at,
        }
    }

    pub fn owns(&self, property_id: &str) -> bool {
        self.properties.iter().any(|p| p == property_id)
    }

    /// Remove a property from the owned list, returning whether it was there.
    pub fn forfeit(&mut self, property_id: &str) -> bool {
        let before = self.properties.len();
        self.properties.retain(|p| p != property_id);
        self.properties.len() != before
    }

    /// Coins plus the value of every property this player owns, each level
    /// adding `per_level`.
    pub fn net_worth(&self, properties: &[Property], per_level: i64) -> i64 {
        let owned: i64 = properties
            .iter()
            .filter(|p| p.owner_id == Some(self.id))
            .map(|p| p.value + i64::from(p.level) * per_level)
            .sum();
        self.coins + owned
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "coins": self.coins,
            "position": self.position,
            "is_host": self.is_host,
            "is_bankrupt": self.is_bankrupt,
            "properties": self.properties,
            "joined_at": self.joined_at.to_rfc3339()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::board::generate_board;

    fn make_player() -> Player {
        Player::new(uuid::Uuid::nil(), "Alice".to_string(), 1000, true, 0, Utc::now())
    }

    #[test]
    fn test_player_new() {
        let player = make_player();
        assert_eq!(player.coins, 1000);
        assert_eq!(player.position, 0);
        assert!(player.is_host);
        assert!(!player.is_bankrupt);
        assert!(player.properties.is_empty());
    }

    #[test]
    fn test_forfeit() {
        let mut player = make_player();
        player.properties = vec!["property-1".into(), "property-4".into()];

        assert!(player.forfeit("property-1"));
        assert!(!player.forfeit("property-1"));
        assert!(player.owns("property-4"));
        assert!(!player.owns("property-1"));
    }

    #[test]
    fn test_net_worth() {
        let (_, mut properties) = generate_board();
        let mut player = make_player();
        player.coins = 720;

        properties[0].owner_id = Some(player.id);
        properties[0].level = 2;
        properties[1].owner_id = Some(uuid::Uuid::from_u128(9));

        // 720 + 280 + 2 * 100
        assert_eq!(player.net_worth(&properties, 100), 1200);
    }
}
