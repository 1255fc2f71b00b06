//! Gameplay actions: rolling, resolving the landed tile, buying and
//! upgrading properties.
//!
//! Every action checks all of its preconditions before touching the
//! session, so a failed action leaves no trace.

use tracing::debug;

use super::board::TileType;
use super::chance;
use super::engine::GameEngine;
use super::error::{GameError, Result};
use super::player::PlayerId;
use super::session::{EventKind, LastRoll};
use super::turn::TURN_CHANGED;

/// The unresolved effect of the tile a player just landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTileAction {
    pub player_id: PlayerId,
    pub tile_index: usize,
    pub tile_type: TileType,
    pub title: String,
    pub description: String,
    pub property_id: Option<String>,
    pub property_value: Option<i64>,
    /// Whether the property is still unowned
    pub can_buy: Option<bool>,
}

impl PendingTileAction {
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "player_id": self.player_id,
            "tile_index": self.tile_index,
            "tile_type": self.tile_type.as_str(),
            "title": self.title,
            "description": self.description
        });
        if let Some(property_id) = &self.property_id {
            obj["property_id"] = serde_json::json!(property_id);
            obj["property_value"] = serde_json::json!(self.property_value);
            obj["can_buy"] = serde_json::json!(self.can_buy);
        }
        obj
    }
}

/// What resolving a tile will do, decided before anything is mutated.
enum TileOutcome {
    Purchase { property_id: String, price: i64 },
    Decline { property_id: String },
    Rent { property_id: String, owner_id: PlayerId, amount: i64 },
    OwnProperty { property_id: String },
    Chance(chance::ChanceEffect),
    Special(i64),
    Neutral,
}

impl GameEngine {
    /// Roll the die for the current player and stage the landed tile.
    ///
    /// Does not advance the turn; the player must resolve the tile next.
    pub fn roll_dice(&mut self, player_id: PlayerId) -> Result<u32> {
        self.require_turn(player_id)?;
        if self.session.pending_tile_action.is_some() {
            return Err(GameError::TileActionPending);
        }
        let key = self.session.turn_key();
        if key.is_some() && self.session.last_processed_turn == key {
            return Err(GameError::TurnAlreadyProcessed);
        }

        let from = self.session.player(player_id)?.position;
        let roll = self.rng.roll_die();
        let board_len = self.session.board.len();
        let unwrapped = from + roll as usize;
        let to = unwrapped % board_len;
        let pending = self.pending_for(player_id, to)?;

        let lap_bonus = self.config.lap_bonus;
        let player = self.session.player_mut(player_id)?;
        player.position = to;
        let name = player.name.clone();
        if unwrapped >= board_len {
            player.coins += lap_bonus;
            self.record(
                EventKind::EventTriggered,
                format!("{} completed a lap and earned +{} coins.", name, lap_bonus),
            );
        }

        self.session.last_processed_turn = key;
        self.session.last_roll = Some(LastRoll {
            player_id,
            value: roll,
        });
        self.session.pending_tile_action = Some(pending);

        debug!(%player_id, roll, from, to, "dice rolled");
        self.record(EventKind::RollDice, format!("{} rolled {}.", name, roll));
        self.commit();
        Ok(roll)
    }

    /// Resolve the current player's pending tile, then advance the turn.
    ///
    /// `buy` only matters on an unowned property. Returns a message
    /// describing what happened.
    pub fn resolve_tile_action(&mut self, player_id: PlayerId, buy: Option<bool>) -> Result<String> {
        let player = self.session.player(player_id)?;
        let (name, coins) = (player.name.clone(), player.coins);
        self.require_turn(player_id)?;
        let pending = self
            .session
            .pending_tile_action
            .as_ref()
            .ok_or(GameError::NoPendingTileAction)?;
        if pending.player_id != player_id {
            return Err(GameError::PendingActionNotOwned);
        }

        let outcome = match (pending.tile_type, pending.property_id.as_deref()) {
            (TileType::Property, Some(property_id)) => {
                let property = self.session.property(property_id)?;
                match property.owner_id {
                    None if buy.unwrap_or(false) => {
                        if coins < property.value {
                            return Err(GameError::InsufficientBalance {
                                needed: property.value,
                                available: coins,
                            });
                        }
                        TileOutcome::Purchase {
                            property_id: property.id.clone(),
                            price: property.value,
                        }
                    }
                    None => TileOutcome::Decline {
                        property_id: property.id.clone(),
                    },
                    Some(owner_id) if owner_id != player_id => TileOutcome::Rent {
                        property_id: property.id.clone(),
                        owner_id,
                        amount: self.config.rent_for(property.rent, property.level),
                    },
                    Some(_) => TileOutcome::OwnProperty {
                        property_id: property.id.clone(),
                    },
                }
            }
            (tile_type, _) if tile_type.is_chance() => chance::draw(tile_type, &mut self.rng)
                .map(TileOutcome::Chance)
                .unwrap_or(TileOutcome::Neutral),
            (TileType::SpecialEvent, _) => TileOutcome::Special(self.config.special_event_bonus),
            _ => TileOutcome::Neutral,
        };

        let message = self.apply_tile_outcome(player_id, &name, outcome)?;

        self.session.pending_tile_action = None;
        self.mark_bankruptcies();
        self.advance_turn(TURN_CHANGED);
        self.commit();
        Ok(message)
    }

    fn apply_tile_outcome(
        &mut self,
        player_id: PlayerId,
        name: &str,
        outcome: TileOutcome,
    ) -> Result<String> {
        let message = match outcome {
            TileOutcome::Purchase { property_id, price } => {
                let property_name = self.transfer_property(player_id, &property_id, price)?;
                self.record(
                    EventKind::BuyProperty,
                    format!("{} bought {} for {}.", name, property_name, price),
                );
                format!("Property purchased: {} for {} coins.", property_name, price)
            }
            TileOutcome::Decline { property_id } => {
                let property_name = self.session.property(&property_id)?.name.clone();
                self.record(
                    EventKind::EventTriggered,
                    format!("{} skipped buying {}.", name, property_name),
                );
                format!("You decided not to buy {}.", property_name)
            }
            TileOutcome::Rent {
                property_id,
                owner_id,
                amount,
            } => {
                let property_name = self.session.property(&property_id)?.name.clone();
                self.session.player_mut(player_id)?.coins -= amount;
                if let Ok(owner) = self.session.player_mut(owner_id) {
                    owner.coins += amount;
                }
                debug!(%player_id, %owner_id, amount, "rent paid");
                self.record(
                    EventKind::EventTriggered,
                    format!("{} paid {} in rent for {}.", name, amount, property_name),
                );
                format!("Rent paid: {} coins for {}.", amount, property_name)
            }
            TileOutcome::OwnProperty { property_id } => {
                let property_name = self.session.property(&property_id)?.name.clone();
                self.record(
                    EventKind::EventTriggered,
                    format!("{} landed on owned property {}.", name, property_name),
                );
                format!("You landed on your own property {}.", property_name)
            }
            TileOutcome::Chance(effect) => {
                let message = effect.apply(&mut self.session, player_id, &mut self.rng);
                debug!(%player_id, ?effect, "chance effect applied");
                self.record(EventKind::EventTriggered, message.clone());
                message
            }
            TileOutcome::Special(bonus) => {
                self.session.player_mut(player_id)?.coins += bonus;
                self.record(
                    EventKind::EventTriggered,
                    format!("{} gained +{} from a special event.", name, bonus),
                );
                format!("Special event: +{} coins.", bonus)
            }
            TileOutcome::Neutral => {
                self.record(
                    EventKind::EventTriggered,
                    format!("{} landed on a neutral tile.", name),
                );
                "Neutral tile: no effect.".to_string()
            }
        };
        Ok(message)
    }

    /// Buy the property under the current player outside tile resolution.
    ///
    /// Leaves any pending tile action in place and does not end the turn.
    pub fn buy_property(&mut self, player_id: PlayerId, property_id: &str) -> Result<()> {
        self.require_turn(player_id)?;
        let player = self.session.player(player_id)?;
        let property = self.session.property(property_id)?;
        if property.is_owned() {
            return Err(GameError::PropertyAlreadyOwned(property_id.to_string()));
        }
        if player.coins < property.value {
            return Err(GameError::InsufficientBalance {
                needed: property.value,
                available: player.coins,
            });
        }
        let on_tile = self
            .session
            .board
            .get(player.position)
            .and_then(|t| t.property_id.as_deref())
            == Some(property_id);
        if !on_tile {
            return Err(GameError::NotOnPropertyTile);
        }

        let name = player.name.clone();
        let price = property.value;
        let property_name = self.transfer_property(player_id, property_id, price)?;

        if let Some(pending) = self.session.pending_tile_action.as_mut() {
            if pending.property_id.as_deref() == Some(property_id) {
                pending.can_buy = Some(false);
            }
        }

        self.record(
            EventKind::BuyProperty,
            format!("{} bought {} for {}.", name, property_name, price),
        );
        self.commit();
        Ok(())
    }

    /// Raise an owned property one level.
    pub fn upgrade_property(&mut self, player_id: PlayerId, property_id: &str) -> Result<()> {
        self.require_turn(player_id)?;
        let player = self.session.player(player_id)?;
        let property = self.session.property(property_id)?;
        if property.owner_id != Some(player_id) {
            return Err(GameError::NotPropertyOwner(property_id.to_string()));
        }
        let cost = self.config.upgrade_cost(property.value, property.level);
        if player.coins < cost {
            return Err(GameError::InsufficientBalance {
                needed: cost,
                available: player.coins,
            });
        }
        let name = player.name.clone();

        self.session.player_mut(player_id)?.coins -= cost;
        let property = self.session.property_mut(property_id)?;
        property.level += 1;
        let (property_name, level) = (property.name.clone(), property.level);

        debug!(%player_id, property_id, level, cost, "property upgraded");
        self.record(
            EventKind::UpgradeProperty,
            format!("{} upgraded {} to level {}.", name, property_name, level),
        );
        self.commit();
        Ok(())
    }

    /// Debit `price` and hand `property_id` to `player_id`. Returns the
    /// property's name.
    fn transfer_property(
        &mut self,
        player_id: PlayerId,
        property_id: &str,
        price: i64,
    ) -> Result<String> {
        let property = self.session.property_mut(property_id)?;
        property.owner_id = Some(player_id);
        let property_name = property.name.clone();

        let player = self.session.player_mut(player_id)?;
        player.coins -= price;
        player.properties.push(property_id.to_string());
        Ok(property_name)
    }

    /// Describe the decision required on `position` for `player_id`.
    pub(crate) fn pending_for(&self, player_id: PlayerId, position: usize) -> Result<PendingTileAction> {
        let tile = &self.session.board[position % self.session.board.len()];
        let mut pending = PendingTileAction {
            player_id,
            tile_index: tile.index,
            tile_type: tile.tile_type,
            title: String::new(),
            description: String::new(),
            property_id: None,
            property_value: None,
            can_buy: None,
        };

        let (title, description) = match (tile.tile_type, tile.property_id.as_deref()) {
            (TileType::Property, Some(property_id)) => {
                let property = self.session.property(property_id)?;
                let owner = match property.owner_id {
                    Some(owner_id) => self
                        .session
                        .player(owner_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|_| "Other".to_string()),
                    None => "None".to_string(),
                };
                pending.property_id = Some(property.id.clone());
                pending.property_value = Some(property.value);
                pending.can_buy = Some(!property.is_owned());
                (
                    format!("Property: {}", property.name),
                    format!("Value: {} | Current owner: {}", property.value, owner),
                )
            }
            (TileType::Luck, _) => (
                "Luck".to_string(),
                "You landed on a luck tile. Resolve to reveal your reward!".to_string(),
            ),
            (TileType::BadLuck, _) => (
                "Bad Luck".to_string(),
                "You landed on a bad luck tile. Resolve to reveal the penalty!".to_string(),
            ),
            (TileType::SpecialEvent, _) => (
                "Special Event".to_string(),
                "Special event bonus available.".to_string(),
            ),
            _ => (
                "Neutral".to_string(),
                "No action required on this tile.".to_string(),
            ),
        };
        pending.title = title;
        pending.description = description;
        Ok(pending)
    }
}
