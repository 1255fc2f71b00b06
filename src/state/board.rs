//! Static board layout.
//!
//! The board is 40 tiles with a fixed type per index and 14 landmark
//! properties laid onto the property tiles in ascending index order.

use super::player::PlayerId;

/// Number of tiles on the board.
pub const BOARD_SIZE: usize = 40;

const PROPERTY_INDEXES: [usize; 14] = [1, 3, 6, 8, 11, 13, 16, 18, 21, 23, 26, 28, 31, 36];
const LUCK_INDEXES: [usize; 5] = [2, 9, 19, 27, 34];
const BAD_LUCK_INDEXES: [usize; 5] = [7, 14, 24, 32, 38];
const SPECIAL_INDEXES: [usize; 4] = [5, 15, 25, 35];

/// Landmark table: (name, country, value, base rent).
const LANDMARKS: [(&str, &str, i64, i64); 14] = [
    ("Cristo Redentor", "Brazil", 280, 45),
    ("Torre Eiffel", "France", 320, 52),
    ("Taj Mahal", "India", 260, 42),
    ("Grande Muralha da China", "China", 300, 48),
    ("Coliseu", "Italy", 310, 50),
    ("Machu Picchu", "Peru", 250, 40),
    ("Pirâmides de Gizé", "Egypt", 330, 54),
    ("Estátua da Liberdade", "USA", 270, 43),
    ("Sagrada Família", "Spain", 290, 46),
    ("Big Ben", "UK", 240, 39),
    ("Moai de Rapa Nui", "Chile", 220, 36),
    ("Burj Khalifa", "UAE", 360, 58),
    ("Angkor Wat", "Cambodia", 245, 38),
    ("Opera de Sydney", "Australia", 275, 44),
];

/// Tile types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileType {
    Property,
    Luck,
    BadLuck,
    SpecialEvent,
    Neutral,
}

impl TileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Luck => "luck",
            Self::BadLuck => "bad_luck",
            Self::SpecialEvent => "special_event",
            Self::Neutral => "neutral",
        }
    }

    /// Luck and bad luck tiles draw from the chance tables.
    pub fn is_chance(&self) -> bool {
        matches!(self, Self::Luck | Self::BadLuck)
    }
}

/// A single board position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub tile_type: TileType,
    pub property_id: Option<String>,
    pub label: String,
}

impl Tile {
    pub fn id(&self) -> String {
        format!("tile-{}", self.index)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "id": self.id(),
            "index": self.index,
            "type": self.tile_type.as_str(),
            "label": self.label
        });
        if let Some(property_id) = &self.property_id {
            obj["property_id"] = serde_json::json!(property_id);
        }
        obj
    }
}

/// A purchasable landmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub country: String,
    pub value: i64,
    pub rent: i64,
    pub owner_id: Option<PlayerId>,
    pub level: u32,
}

impl Property {
    pub fn is_owned(&self) -> bool {
        self.owner_id.is_some()
    }

    /// Drop ownership and all upgrades.
    pub fn release(&mut self) {
        self.owner_id = None;
        self.level = 0;
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "country": self.country,
            "value": self.value,
            "rent": self.rent,
            "owner_id": self.owner_id,
            "level": self.level
        })
    }
}

/// Build the board and its property list.
pub fn generate_board() -> (Vec<Tile>, Vec<Property>) {
    let properties: Vec<Property> = LANDMARKS
        .iter()
        .enumerate()
        .map(|(idx, (name, country, value, rent))| Property {
            id: format!("property-{}", idx + 1),
            name: name.to_string(),
            country: country.to_string(),
            value: *value,
            rent: *rent,
            owner_id: None,
            level: 0,
        })
        .collect();

    let board = (0..BOARD_SIZE)
        .map(|index| {
            if let Some(slot) = PROPERTY_INDEXES.iter().position(|i| *i == index) {
                let property = &properties[slot];
                return Tile {
                    index,
                    tile_type: TileType::Property,
                    property_id: Some(property.id.clone()),
                    label: format!("{} ({})", property.name, property.country),
                };
            }

            let (tile_type, label) = if LUCK_INDEXES.contains(&index) {
                (TileType::Luck, "Luck")
            } else if BAD_LUCK_INDEXES.contains(&index) {
                (TileType::BadLuck, "Bad Luck")
            } else if SPECIAL_INDEXES.contains(&index) {
                (TileType::SpecialEvent, "Special Event")
            } else if index == 0 {
                (TileType::Neutral, "Start")
            } else {
                (TileType::Neutral, "Neutral")
            };

            Tile {
                index,
                tile_type,
                property_id: None,
                label: label.to_string(),
            }
        })
        .collect();

    (board, properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_board_shape() {
        let (board, properties) = generate_board();
        assert_eq!(board.len(), BOARD_SIZE);
        assert_eq!(properties.len(), 14);

        for (i, tile) in board.iter().enumerate() {
            assert_eq!(tile.index, i);
        }
    }

    #[test]
    fn test_tile_type_counts() {
        let (board, _) = generate_board();
        let count = |t: TileType| board.iter().filter(|tile| tile.tile_type == t).count();

        assert_eq!(count(TileType::Property), 14);
        assert_eq!(count(TileType::Luck), 5);
        assert_eq!(count(TileType::BadLuck), 5);
        assert_eq!(count(TileType::SpecialEvent), 4);
        assert_eq!(count(TileType::Neutral), 12);
        assert_eq!(board[0].label, "Start");
        assert_eq!(board[10].label, "Neutral");
    }

    #[test]
    fn test_properties_in_ascending_tile_order() {
        let (board, properties) = generate_board();
        let linked: Vec<&str> = board
            .iter()
            .filter_map(|t| t.property_id.as_deref())
            .collect();
        let ids: Vec<&str> = properties.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(linked, ids);

        assert_eq!(board[1].label, "Cristo Redentor (Brazil)");
        assert_eq!(board[36].property_id.as_deref(), Some("property-14"));
    }

    #[test]
    fn test_properties_start_unowned() {
        let (_, properties) = generate_board();
        assert!(properties.iter().all(|p| !p.is_owned() && p.level == 0));
        assert_eq!(properties[0].value, 280);
        assert_eq!(properties[0].rent, 45);
    }

    #[test]
    fn test_release() {
        let (_, mut properties) = generate_board();
        let property = &mut properties[0];
        property.owner_id = Some(uuid::Uuid::nil());
        property.level = 3;

        property.release();

        assert!(!property.is_owned());
        assert_eq!(property.level, 0);
    }
}
