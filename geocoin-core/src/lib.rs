//! # Geocoin Core Library
//!
//! World model for a location-based collectible game: a player moves across
//! a virtual grid overlaid on real-world coordinates, and caches of
//! collectible coins appear deterministically near the player.
//!
//! The hard part is keeping an infinite world stable while materializing it
//! lazily:
//!
//! - Cells exist only once observed, and the same `(i, j)` always resolves
//!   to the same canonical identity ([`board::Board`]).
//! - Whether a cell hosts a cache, and how many coins a fresh cache holds,
//!   are pure functions of the cell key ([`luck`], [`cache`]).
//! - A cache torn down when the player walks away is reconstructed exactly,
//!   collected-coin state included, from its momento snapshot
//!   ([`momento::MomentoStore`], [`cache::Geocache::serialize`]).
//! - Coins move between caches and the player inventory exclusively and
//!   atomically ([`inventory`], [`cache::collect_into_inventory`]).
//!
//! Everything here is single-threaded and event-driven: each operation runs
//! to completion in response to one external event, so no state needs
//! locking.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod inventory;
pub mod luck;
pub mod momento;
pub mod persistence;
pub mod types;

pub use board::Board;
pub use cache::{Geocache, collect_into_inventory, deposit_from_inventory, spawns_cache};
pub use config::GameConfig;
pub use error::{GeocoinError, Result};
pub use inventory::Inventory;
pub use luck::{HashLuck, Luck};
pub use momento::MomentoStore;
pub use persistence::{BlobStore, MemStore, SqliteStore};
pub use types::*;
