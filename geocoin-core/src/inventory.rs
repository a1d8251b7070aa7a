//! The player's coin inventory and its JSON persistence shape.
//!
//! The inventory is an ordered coin list not tied to any cell. It persists
//! independently of cache momentos as a JSON array of
//! `{"cell":{"i":..,"j":..},"serial":..,"isCollected":..}` records.

use serde::{Deserialize, Serialize};

use crate::error::{GeocoinError, Result};
use crate::types::{Cell, Coin, CoinKey};

/// Coins currently held by the player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    coins: Vec<Coin>,
}

/// Persisted wire shape of one inventory coin.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CoinRecord {
    cell: Cell,
    serial: u32,
    #[serde(rename = "isCollected")]
    is_collected: bool,
}

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Held coins in acquisition order.
    #[must_use]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Number of held coins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Whether the player holds no coins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Whether a coin with this identity is held.
    #[must_use]
    pub fn contains(&self, key: CoinKey) -> bool {
        self.coins.iter().any(|coin| coin.key() == key)
    }

    /// Append a coin.
    pub fn push(&mut self, coin: Coin) {
        self.coins.push(coin);
    }

    /// Remove and return the coin with this identity.
    ///
    /// Removal matches by identity, never by position. This is the
    /// double-deposit guard.
    ///
    /// # Errors
    ///
    /// Returns [`GeocoinError::CoinNotFound`] if the coin is not held.
    pub fn take(&mut self, key: CoinKey) -> Result<Coin> {
        let position = self
            .coins
            .iter()
            .position(|coin| coin.key() == key)
            .ok_or(GeocoinError::CoinNotFound(key))?;
        Ok(self.coins.remove(position))
    }

    /// Drop every held coin (session reset).
    pub fn clear(&mut self) {
        self.coins.clear();
    }

    /// Encode the inventory for the blob store.
    ///
    /// # Errors
    ///
    /// Returns [`GeocoinError::Serialization`] if JSON encoding fails.
    pub fn to_json(&self) -> Result<String> {
        let records: Vec<CoinRecord> = self
            .coins
            .iter()
            .map(|coin| CoinRecord {
                cell: coin.origin,
                serial: coin.serial,
                is_collected: coin.collected,
            })
            .collect();
        serde_json::to_string(&records).map_err(|e| GeocoinError::Serialization(e.to_string()))
    }

    /// Decode an inventory previously produced by [`Inventory::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`GeocoinError::Serialization`] if the JSON does not parse.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<CoinRecord> =
            serde_json::from_str(json).map_err(|e| GeocoinError::Serialization(e.to_string()))?;
        Ok(Self {
            coins: records
                .into_iter()
                .map(|record| Coin {
                    origin: record.cell,
                    serial: record.serial,
                    collected: record.is_collected,
                })
                .collect(),
        })
    }
}
