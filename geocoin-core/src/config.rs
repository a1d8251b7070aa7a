//! Configuration for the Geocoin world, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// World generation and session tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of one grid tile in degrees.
    #[serde(default = "default_tile_width")]
    pub tile_width: f64,
    /// Caches materialize within this many cells of the player
    /// (a `(2r + 1)²` square).
    #[serde(default = "default_visibility_radius")]
    pub visibility_radius: u32,
    /// A cell hosts a cache iff its luck roll lands below this.
    #[serde(default = "default_spawn_probability")]
    pub spawn_probability: f64,
    /// Upper bound on the coin count of a freshly generated cache
    /// (`floor(roll * max) + 1`).
    #[serde(default = "default_max_cache_coins")]
    pub max_cache_coins: u32,
    /// Starting position for a fresh session.
    #[serde(default = "default_start")]
    pub start: GeoPoint,
    /// Persistence settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_width: default_tile_width(),
            visibility_radius: default_visibility_radius(),
            spawn_probability: default_spawn_probability(),
            max_cache_coins: default_max_cache_coins(),
            start: default_start(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`crate::GeocoinError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::GeocoinError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Session persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path of the SQLite blob store.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Use WAL mode for the store.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Persist position and inventory after every move/collect/deposit.
    #[serde(default = "default_true")]
    pub autosave: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            wal_mode: true,
            autosave: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}
fn default_db_path() -> String {
    "geocoin.db".to_string()
}
fn default_tile_width() -> f64 {
    1e-4
}
fn default_visibility_radius() -> u32 {
    8
}
fn default_spawn_probability() -> f64 {
    0.1
}
fn default_max_cache_coins() -> u32 {
    10
}
/// Fresh sessions anchor at a fixed classroom courtyard.
fn default_start() -> GeoPoint {
    GeoPoint::new(36.989_493_795_784_01, -122.062_771_285_485_04)
}
