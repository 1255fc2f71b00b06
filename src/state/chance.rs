//! Luck and bad luck tables.
//!
//! Each table has three equally likely effects. Drawing picks one uniformly;
//! applying it mutates the session and the effect's text goes to the log.

use tracing::debug;

use super::board::TileType;
use super::player::PlayerId;
use super::rng::GameRng;
use super::session::Session;

/// A chance effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanceEffect {
    /// Flat coins for the drawing player
    Bonus(i64),
    /// Move forward this many tiles, wrapping without a lap bonus
    Advance(usize),
    /// Flat coins for every player
    GlobalBonus(i64),
    /// Flat coins taken from the drawing player
    Penalty(i64),
    /// Drawing player loses one owned property at random
    ForfeitProperty,
    /// Every player keeps 90% of their coins, rounded down
    GlobalCrisis,
}

pub const LUCK_TABLE: [ChanceEffect; 3] = [
    ChanceEffect::Bonus(200),
    ChanceEffect::Advance(3),
    ChanceEffect::GlobalBonus(80),
];

pub const BAD_LUCK_TABLE: [ChanceEffect; 3] = [
    ChanceEffect::Penalty(150),
    ChanceEffect::ForfeitProperty,
    ChanceEffect::GlobalCrisis,
];

/// Table for a tile type; empty for non-chance tiles.
pub fn table_for(tile_type: TileType) -> &'static [ChanceEffect] {
    match tile_type {
        TileType::Luck => &LUCK_TABLE,
        TileType::BadLuck => &BAD_LUCK_TABLE,
        _ => &[],
    }
}

/// Draw an effect uniformly from the tile's table.
pub fn draw(tile_type: TileType, rng: &mut GameRng) -> Option<ChanceEffect> {
    let table = table_for(tile_type);
    rng.choose_index(table.len()).map(|i| table[i])
}

impl ChanceEffect {
    pub fn message(&self) -> String {
        match self {
            Self::Bonus(amount) => format!("Lucky investment! +{} coins.", amount),
            Self::Advance(steps) => format!("Tailwind bonus! Advance {} tiles.", steps),
            Self::GlobalBonus(amount) => {
                format!("Global tourism boom! Everyone gets +{} coins.", amount)
            }
            Self::Penalty(amount) => format!("Unexpected taxes: -{} coins.", amount),
            Self::ForfeitProperty => "Property damage! Lose a random property.".to_string(),
            Self::GlobalCrisis => "Global crisis: all players lose 10% of coins.".to_string(),
        }
    }

    /// Apply to the session on behalf of `player_id`. Unknown players are a
    /// no-op for personal effects.
    pub fn apply(&self, session: &mut Session, player_id: PlayerId, rng: &mut GameRng) -> String {
        let board_len = session.board.len();
        match *self {
            Self::Bonus(amount) => {
                if let Ok(player) = session.player_mut(player_id) {
                    player.coins += amount;
                }
            }
            Self::Penalty(amount) => {
                if let Ok(player) = session.player_mut(player_id) {
                    player.coins -= amount;
                }
            }
            Self::Advance(steps) => {
                if let Ok(player) = session.player_mut(player_id) {
                    player.position = (player.position + steps) % board_len;
                }
            }
            Self::GlobalBonus(amount) => {
                for player in &mut session.players {
                    player.coins += amount;
                }
            }
            Self::GlobalCrisis => {
                for player in &mut session.players {
                    player.coins = (player.coins * 9).div_euclid(10);
                }
            }
            Self::ForfeitProperty => forfeit_random(session, player_id, rng),
        }
        self.message()
    }
}

fn forfeit_random(session: &mut Session, player_id: PlayerId, rng: &mut GameRng) {
    let Ok(player) = session.player_mut(player_id) else {
        return;
    };
    let Some(index) = rng.choose_index(player.properties.len()) else {
        return;
    };
    let property_id = player.properties.remove(index);

    if let Ok(property) = session.property_mut(&property_id) {
        debug!(%player_id, property = %property.name, "property forfeited");
        property.release();
    }
}
