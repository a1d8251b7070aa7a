//! Core type definitions for the Geocoin world model.
//!
//! Identity types are small and `Copy`; everything persisted is serializable.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Geographic position
// ---------------------------------------------------------------------------

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new point.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Grid identity
// ---------------------------------------------------------------------------

/// A discrete grid cell: row `i`, column `j` in a fixed-width tiling of
/// geographic space. Immutable value; canonical identity is established by
/// interning through [`crate::board::Board`], which hands out [`CellId`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Row index: `floor(lat / tile_width)`.
    pub i: i32,
    /// Column index: `floor(lng / tile_width)`.
    pub j: i32,
}

impl Cell {
    /// Create a cell value.
    #[must_use]
    pub fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// The procedural-generation key for this cell, `"i,j"`.
    ///
    /// Fed to [`crate::luck::Luck`] for the cache spawn decision.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{},{}", self.i, self.j)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// Stable handle to a canonical cell in a [`crate::board::Board`] arena.
///
/// Two lookups for the same `(i, j)` on the same board always return the
/// same `CellId`, so downstream maps (open caches, momento store) can key on
/// it as the cell's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) u32);

impl CellId {
    /// Arena slot index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

/// The geographic rectangle covered by one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    /// Corner at `(i * tile_width, j * tile_width)`.
    pub south_west: GeoPoint,
    /// Corner at `((i + 1) * tile_width, (j + 1) * tile_width)`.
    pub north_east: GeoPoint,
}

// ---------------------------------------------------------------------------
// Coins
// ---------------------------------------------------------------------------

/// Composite identity of a coin: the cell where it was generated plus its
/// serial within that cell's generation batch. Immutable for the coin's
/// lifetime; equality is by this key, never by list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoinKey {
    /// Cell where the coin was generated.
    pub origin: Cell,
    /// Serial within the origin cell's batch.
    pub serial: u32,
}

impl fmt::Display for CoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Matches the momento record prefix, "<i>:<j>#<serial>".
        write!(f, "{}:{}#{}", self.origin.i, self.origin.j, self.serial)
    }
}

/// A collectible coin. Only the `collected` flag and the coin's container
/// (a geocache list vs. the inventory) ever change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coin {
    /// Cell where the coin was generated.
    pub origin: Cell,
    /// Serial within the origin cell's batch.
    pub serial: u32,
    /// Whether the coin has been collected. Inside a geocache list a
    /// collected record is a tombstone; the live copy is in the inventory.
    pub collected: bool,
}

impl Coin {
    /// The coin's immutable composite identity.
    #[must_use]
    pub fn key(&self) -> CoinKey {
        CoinKey {
            origin: self.origin,
            serial: self.serial,
        }
    }
}
