//! The movement/visibility driver.
//!
//! A [`GameSession`] owns the board, the momento store, the inventory, and
//! the currently open caches. Every external event (a movement command, a
//! tracked position update, a collect or deposit click) runs to completion
//! synchronously:
//!
//! 1. compute the visible neighborhood for the new position;
//! 2. close caches that fell out of the spawn set (serialize into the
//!    momento store, drop the in-memory object);
//! 3. materialize newly visible spawning cells, preferring a stored momento
//!    over fresh generation;
//! 4. append the position to the travelled path and persist session state.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use geocoin_core::cache::{collect_into_inventory, deposit_from_inventory, spawns_cache};
use geocoin_core::persistence::{KEY_INVENTORY, KEY_PLAYER_LOCATION};
use geocoin_core::{
    BlobStore, Board, CellId, CoinKey, GameConfig, GeoPoint, Geocache, GeocoinError, HashLuck,
    Inventory, Luck, MomentoStore, Result,
};

/// Discrete player commands, mirroring the host's control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Step one tile north.
    MoveUp,
    /// Step one tile south.
    MoveDown,
    /// Step one tile west.
    MoveLeft,
    /// Step one tile east.
    MoveRight,
    /// Start accepting external position updates.
    StartTracking,
    /// Stop accepting external position updates.
    StopTracking,
    /// Wipe the session back to a fresh start.
    Reset,
}

/// One player's game session: all mutable world state plus its wiring to
/// the host-supplied blob store.
pub struct GameSession {
    config: GameConfig,
    board: Board,
    luck: Box<dyn Luck>,
    momentos: MomentoStore,
    inventory: Inventory,
    open_caches: HashMap<CellId, Geocache>,
    position: GeoPoint,
    travelled: Vec<GeoPoint>,
    tracking: bool,
    store: Option<Box<dyn BlobStore>>,
}

impl GameSession {
    /// Create a session at the configured start position, with the default
    /// luck hash and no persistent store.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let board = Board::new(config.tile_width);
        let position = config.start;
        Self {
            config,
            board,
            luck: Box::new(HashLuck),
            momentos: MomentoStore::new(),
            inventory: Inventory::new(),
            open_caches: HashMap::new(),
            position,
            travelled: Vec::new(),
            tracking: false,
            store: None,
        }
    }

    /// Replace the luck source (tests script this).
    #[must_use]
    pub fn with_luck(mut self, luck: Box<dyn Luck>) -> Self {
        self.luck = luck;
        self
    }

    /// Attach a blob store for session persistence.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Restore persisted position and inventory (absent keys mean a fresh
    /// session), then materialize the starting neighborhood.
    ///
    /// Storage failures degrade the session to in-memory-only; corrupt
    /// blobs are logged and replaced by fresh defaults.
    pub fn resume(&mut self) {
        if let Some(location_json) = self.read_blob(KEY_PLAYER_LOCATION) {
            match serde_json::from_str::<GeoPoint>(&location_json) {
                Ok(point) => self.position = point,
                Err(e) => warn!(error = %e, "Corrupt saved position, starting fresh"),
            }
        }
        if let Some(inventory_json) = self.read_blob(KEY_INVENTORY) {
            match Inventory::from_json(&inventory_json) {
                Ok(inventory) => self.inventory = inventory,
                Err(e) => warn!(error = %e, "Corrupt saved inventory, starting fresh"),
            }
        }

        info!(
            position = %self.position,
            coins = self.inventory.len(),
            "Session resumed"
        );
        self.travelled.push(self.position);
        self.refresh_visible();
    }

    /// Close every open cache into the momento store and persist. Called at
    /// session end; the session can keep running in-memory afterwards.
    pub fn suspend(&mut self) {
        let open: Vec<CellId> = self.open_caches.keys().copied().collect();
        for cell in open {
            self.close_cache(cell);
        }
        self.persist();
        info!(momentos = self.momentos.len(), "Session suspended");
    }

    /// Handle a discrete player command.
    pub fn command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::MoveUp => self.step(1, 0),
            SessionCommand::MoveDown => self.step(-1, 0),
            SessionCommand::MoveLeft => self.step(0, -1),
            SessionCommand::MoveRight => self.step(0, 1),
            SessionCommand::StartTracking => {
                self.tracking = true;
                info!("Position tracking started");
            }
            SessionCommand::StopTracking => {
                self.tracking = false;
                info!("Position tracking stopped");
            }
            SessionCommand::Reset => self.reset(),
        }
    }

    /// Deliver an external position update (geolocation watch). Ignored
    /// unless tracking was started.
    pub fn position_update(&mut self, point: GeoPoint) {
        if self.tracking {
            self.move_to(point);
        } else {
            debug!(position = %point, "Dropped position update, tracking off");
        }
    }

    /// Move the player to a position: refresh cache visibility, extend the
    /// travelled path, persist.
    pub fn move_to(&mut self, point: GeoPoint) {
        self.position = point;
        self.travelled.push(point);
        self.refresh_visible();
        if self.config.persistence.autosave {
            self.persist();
        }
    }

    fn step(&mut self, di: i32, dj: i32) {
        let width = self.config.tile_width;
        let next = GeoPoint::new(
            self.position.lat + f64::from(di) * width,
            self.position.lng + f64::from(dj) * width,
        );
        self.move_to(next);
    }

    /// Wipe inventory, momentos, open caches, and the travelled path;
    /// return to the configured start and persist the cleared state.
    pub fn reset(&mut self) {
        self.inventory.clear();
        self.momentos.clear();
        self.open_caches.clear();
        self.travelled.clear();
        self.position = self.config.start;
        self.travelled.push(self.position);
        self.refresh_visible();
        self.persist();
        info!("Session reset");
    }

    // ------------------------------------------------------------------
    // Coin commands
    // ------------------------------------------------------------------

    /// Collect a coin from an open cache into the inventory.
    ///
    /// # Errors
    ///
    /// [`GeocoinError::CacheNotOpen`] if the cell has no materialized cache,
    /// [`GeocoinError::CoinNotFound`] if the coin is not live there. The
    /// inventory is unchanged on error.
    pub fn collect(&mut self, cell: CellId, coin: CoinKey) -> Result<()> {
        let cell_value = self.board.cell(cell);
        let cache = self
            .open_caches
            .get_mut(&cell)
            .ok_or(GeocoinError::CacheNotOpen(cell_value))?;
        collect_into_inventory(cache, coin, &mut self.inventory)?;
        if self.config.persistence.autosave {
            self.persist();
        }
        Ok(())
    }

    /// Deposit an inventory coin into an open cache.
    ///
    /// # Errors
    ///
    /// [`GeocoinError::CacheNotOpen`] if the cell has no materialized cache,
    /// [`GeocoinError::CoinNotFound`] if the inventory does not hold the
    /// coin. The cache is unchanged on error.
    pub fn deposit(&mut self, cell: CellId, coin: CoinKey) -> Result<()> {
        let cell_value = self.board.cell(cell);
        let cache = self
            .open_caches
            .get_mut(&cell)
            .ok_or(GeocoinError::CacheNotOpen(cell_value))?;
        deposit_from_inventory(coin, &mut self.inventory, cache)?;
        if self.config.persistence.autosave {
            self.persist();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Materialization
    // ------------------------------------------------------------------

    fn refresh_visible(&mut self) {
        let visible = self
            .board
            .cells_near(self.position, self.config.visibility_radius);

        let spawning: Vec<CellId> = visible
            .into_iter()
            .filter(|&cell| {
                spawns_cache(
                    self.board.cell(cell),
                    self.luck.as_ref(),
                    self.config.spawn_probability,
                )
            })
            .collect();
        let spawn_set: HashSet<CellId> = spawning.iter().copied().collect();

        let left_view: Vec<CellId> = self
            .open_caches
            .keys()
            .copied()
            .filter(|cell| !spawn_set.contains(cell))
            .collect();
        for cell in left_view {
            self.close_cache(cell);
        }

        // Materialize in neighborhood order so iteration is reproducible.
        for cell in spawning {
            if !self.open_caches.contains_key(&cell) {
                let cache = self.materialize(cell);
                let _ = self.open_caches.insert(cell, cache);
            }
        }

        debug!(
            position = %self.position,
            open = self.open_caches.len(),
            "Refreshed visible caches"
        );
    }

    /// Rebuild a cache from its momento if one exists, else generate it.
    /// A malformed momento is logged and replaced by fresh generation so a
    /// single corrupt snapshot cannot block world generation.
    fn materialize(&self, cell: CellId) -> Geocache {
        if let Some(snapshot) = self.momentos.get(cell) {
            match Geocache::restore(cell, snapshot) {
                Ok(cache) => return cache,
                Err(e) => {
                    warn!(
                        cell = %self.board.cell(cell),
                        error = %e,
                        "Discarding unreadable momento"
                    );
                }
            }
        }
        Geocache::generate(&self.board, cell, self.luck.as_ref(), &self.config)
    }

    fn close_cache(&mut self, cell: CellId) {
        if let Some(cache) = self.open_caches.remove(&cell) {
            self.momentos.put(cell, cache.serialize());
            debug!(cell = %self.board.cell(cell), "Closed cache into momento");
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn read_blob(&mut self, key: &str) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Storage unavailable, continuing in memory");
                self.store = None;
                None
            }
        }
    }

    fn persist(&mut self) {
        if self.store.is_none() {
            return;
        }
        if let Err(e) = self.try_persist() {
            warn!(error = %e, "Storage unavailable, continuing in memory");
            self.store = None;
        }
    }

    fn try_persist(&mut self) -> Result<()> {
        let location_json = serde_json::to_string(&self.position)
            .map_err(|e| GeocoinError::Serialization(e.to_string()))?;
        let inventory_json = self.inventory.to_json()?;
        let Some(store) = self.store.as_mut() else {
            return Ok(());
        };
        store.set(KEY_PLAYER_LOCATION, &location_json)?;
        store.set(KEY_INVENTORY, &inventory_json)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // State accessors (for the rendering host)
    // ------------------------------------------------------------------

    /// Current player position.
    #[must_use]
    pub fn position(&self) -> GeoPoint {
        self.position
    }

    /// Whether external position updates are being applied.
    #[must_use]
    pub fn tracking(&self) -> bool {
        self.tracking
    }

    /// The player's held coins.
    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The canonical grid.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Momento snapshots of every cache closed so far.
    #[must_use]
    pub fn momentos(&self) -> &MomentoStore {
        &self.momentos
    }

    /// The currently materialized cache for a cell, if any.
    #[must_use]
    pub fn open_cache(&self, cell: CellId) -> Option<&Geocache> {
        self.open_caches.get(&cell)
    }

    /// Cells with a materialized cache, sorted for stable display.
    #[must_use]
    pub fn open_cells(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self.open_caches.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Every position visited this session, in order, duplicates included.
    #[must_use]
    pub fn travelled(&self) -> &[GeoPoint] {
        &self.travelled
    }

    /// Whether persistence is still attached (false once degraded).
    #[must_use]
    pub fn storage_attached(&self) -> bool {
        self.store.is_some()
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("position", &self.position)
            .field("open_caches", &self.open_caches.len())
            .field("momentos", &self.momentos.len())
            .field("inventory", &self.inventory.len())
            .field("tracking", &self.tracking)
            .finish_non_exhaustive()
    }
}
