//! The geocache engine: deterministic cache generation, momento
//! serialization, and the collect/deposit transitions.
//!
//! A [`Geocache`] is the mutable coin list for one cell, materialized on
//! demand while the player is nearby and torn down again afterwards. Its
//! state survives teardown through the momento snapshot format:
//!
//! ```text
//! <i>:<j>#<serial>X<flag>[,<i>:<j>#<serial>X<flag>...]
//! ```
//!
//! one record per coin, flag `1` for collected, `0` for uncollected, no
//! trailing delimiter, empty list serialized as the empty string. A restored
//! cache is indistinguishable from the one that produced the snapshot.

use tracing::debug;

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::{GeocoinError, Result};
use crate::inventory::Inventory;
use crate::luck::Luck;
use crate::types::{Cell, CellId, Coin, CoinKey};

const RECORD_DELIMITER: char = ',';
const CELL_DELIMITER: char = ':';
const SERIAL_DELIMITER: char = '#';
const FLAG_DELIMITER: char = 'X';

/// Whether a cell hosts a cache at all.
///
/// Pure in the cell value: `luck("i,j") < spawn_probability`.
#[must_use]
pub fn spawns_cache(cell: Cell, luck: &dyn Luck, spawn_probability: f64) -> bool {
    luck.luck(&cell.key()) < spawn_probability
}

/// The coin collection associated with one cell.
///
/// Collected coins remain listed (as tombstones, `collected = true`) until
/// the cache is closed, so a momento remembers which serials were already
/// taken and regeneration cannot resurrect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geocache {
    cell: CellId,
    coins: Vec<Coin>,
}

impl Geocache {
    /// The cell this cache belongs to.
    #[must_use]
    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// All listed coins, in list order, tombstones included.
    #[must_use]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Coins currently available to collect.
    pub fn live_coins(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter().filter(|coin| !coin.collected)
    }

    /// Generate a fresh cache for a cell that has never been visited.
    ///
    /// The coin count is deterministic in the cell identity,
    /// `floor(luck("i,j#coins") * max_cache_coins) + 1`, so revisiting a
    /// cell before or after teardown always sees the same batch.
    #[must_use]
    pub fn generate(board: &Board, cell: CellId, luck: &dyn Luck, config: &GameConfig) -> Self {
        let origin = board.cell(cell);
        let roll = luck.luck(&format!("{}{}coins", origin.key(), SERIAL_DELIMITER));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = (roll * f64::from(config.max_cache_coins)).floor() as u32 + 1;

        let coins = (0..count)
            .map(|serial| Coin {
                origin,
                serial,
                collected: false,
            })
            .collect();

        debug!(cell = %origin, coins = count, "Generated fresh geocache");
        Self { cell, coins }
    }

    /// Reconstruct a cache from a momento snapshot. Exact inverse of
    /// [`Geocache::serialize`].
    ///
    /// # Errors
    ///
    /// Returns [`GeocoinError::MalformedSnapshot`] if any record does not
    /// parse; callers fall back to [`Geocache::generate`] for the cell.
    pub fn restore(cell: CellId, snapshot: &str) -> Result<Self> {
        if snapshot.is_empty() {
            return Ok(Self {
                cell,
                coins: Vec::new(),
            });
        }

        let mut coins = Vec::new();
        for record in snapshot.split(RECORD_DELIMITER) {
            coins.push(parse_record(snapshot, record)?);
        }
        Ok(Self { cell, coins })
    }

    /// Encode the coin list as a momento snapshot string, in list order.
    #[must_use]
    pub fn serialize(&self) -> String {
        let records: Vec<String> = self
            .coins
            .iter()
            .map(|coin| {
                format!(
                    "{i}{CELL_DELIMITER}{j}{SERIAL_DELIMITER}{serial}{FLAG_DELIMITER}{flag}",
                    i = coin.origin.i,
                    j = coin.origin.j,
                    serial = coin.serial,
                    flag = u8::from(coin.collected),
                )
            })
            .collect();
        records.join(&RECORD_DELIMITER.to_string())
    }

    /// Mark a live coin collected and move its record to the tail of the
    /// list, returning the collected copy for the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`GeocoinError::CoinNotFound`] if no live coin with that key
    /// is listed. An already-collected tombstone does not match, which is
    /// the double-collect guard.
    pub fn collect(&mut self, key: CoinKey) -> Result<Coin> {
        let position = self
            .coins
            .iter()
            .position(|coin| coin.key() == key && !coin.collected)
            .ok_or(GeocoinError::CoinNotFound(key))?;

        let mut coin = self.coins.remove(position);
        coin.collected = true;
        self.coins.push(coin);
        debug!(coin = %key, "Collected coin from geocache");
        Ok(coin)
    }

    /// Append a coin to this cache's list, unclaimed again
    /// (`collected = false`).
    ///
    /// If the cache still lists a tombstone for the same identity (the coin
    /// was collected from here earlier in the session), the tombstone is
    /// dropped first so a cell never lists two records for one coin.
    pub fn deposit(&mut self, mut coin: Coin) {
        let key = coin.key();
        self.coins.retain(|listed| listed.key() != key);
        coin.collected = false;
        self.coins.push(coin);
        debug!(coin = %key, "Deposited coin into geocache");
    }
}

fn parse_record(snapshot: &str, record: &str) -> Result<Coin> {
    let malformed = |reason: &str| GeocoinError::MalformedSnapshot {
        snapshot: truncate(snapshot),
        reason: format!("{reason} in record {record:?}"),
    };

    let (cell_part, rest) = record
        .split_once(SERIAL_DELIMITER)
        .ok_or_else(|| malformed("missing serial delimiter"))?;
    let (i_part, j_part) = cell_part
        .split_once(CELL_DELIMITER)
        .ok_or_else(|| malformed("missing cell delimiter"))?;
    let (serial_part, flag_part) = rest
        .split_once(FLAG_DELIMITER)
        .ok_or_else(|| malformed("missing flag delimiter"))?;

    let i: i32 = i_part.parse().map_err(|_| malformed("bad cell row"))?;
    let j: i32 = j_part.parse().map_err(|_| malformed("bad cell column"))?;
    let serial: u32 = serial_part.parse().map_err(|_| malformed("bad serial"))?;
    let collected = match flag_part {
        "0" => false,
        "1" => true,
        _ => return Err(malformed("bad collected flag")),
    };

    Ok(Coin {
        origin: Cell::new(i, j),
        serial,
        collected,
    })
}

/// Keep snapshot excerpts in errors readable.
fn truncate(snapshot: &str) -> String {
    const MAX: usize = 128;
    if snapshot.len() <= MAX {
        snapshot.to_string()
    } else {
        let cut = snapshot
            .char_indices()
            .take_while(|&(idx, _)| idx < MAX)
            .last()
            .map_or(0, |(idx, ch)| idx + ch.len_utf8());
        format!("{}...", &snapshot[..cut])
    }
}

// ---------------------------------------------------------------------------
// Transfer protocol
// ---------------------------------------------------------------------------

/// Collect a coin out of a geocache into the player's inventory.
///
/// The cache keeps a collected tombstone; the live coin moves to the
/// inventory. Atomic from the player's perspective: on error nothing moved.
///
/// # Errors
///
/// Returns [`GeocoinError::CoinNotFound`] if the coin is not live in the
/// cache (absent, or already collected).
pub fn collect_into_inventory(
    cache: &mut Geocache,
    key: CoinKey,
    inventory: &mut Inventory,
) -> Result<()> {
    let coin = cache.collect(key)?;
    inventory.push(coin);
    Ok(())
}

/// Deposit a coin from the player's inventory into a geocache.
///
/// # Errors
///
/// Returns [`GeocoinError::CoinNotFound`] if the inventory does not hold the
/// coin, which is the double-deposit guard. The cache is untouched on error.
pub fn deposit_from_inventory(
    key: CoinKey,
    inventory: &mut Inventory,
    cache: &mut Geocache,
) -> Result<()> {
    let coin = inventory.take(key)?;
    cache.deposit(coin);
    Ok(())
}
