//! The momento store: per-cell snapshot strings that let a geocache be
//! torn down and later reconstructed exactly.
//!
//! Keyed by canonical [`CellId`], so it relies on the board's interning
//! guarantee. Entries are overwritten on every close and never expire;
//! session-scoped memory growth is acceptable here.

use std::collections::HashMap;

use crate::types::CellId;

/// Mapping from cell identity to the serialized snapshot of that cell's
/// cache contents.
#[derive(Debug, Clone, Default)]
pub struct MomentoStore {
    snapshots: HashMap<CellId, String>,
}

impl MomentoStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot for a cell, overwriting any prior one.
    pub fn put(&mut self, cell: CellId, snapshot: String) {
        let _ = self.snapshots.insert(cell, snapshot);
    }

    /// The stored snapshot for a cell, if any.
    #[must_use]
    pub fn get(&self, cell: CellId) -> Option<&str> {
        self.snapshots.get(&cell).map(String::as_str)
    }

    /// Number of cells with a stored snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop every snapshot (session reset).
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::Cell;

    #[test]
    fn put_overwrites_and_get_returns_latest() {
        let mut board = Board::new(1e-4);
        let cell = board.intern(Cell::new(1, 2));
        let mut store = MomentoStore::new();

        assert!(store.get(cell).is_none());
        store.put(cell, "1:2#0X0".to_string());
        store.put(cell, "1:2#0X1".to_string());
        assert_eq!(store.get(cell), Some("1:2#0X1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn distinct_cells_are_independent() {
        let mut board = Board::new(1e-4);
        let a = board.intern(Cell::new(0, 0));
        let b = board.intern(Cell::new(0, 1));
        let mut store = MomentoStore::new();

        store.put(a, "0:0#0X0".to_string());
        assert!(store.get(b).is_none());
        assert_eq!(store.get(a), Some("0:0#0X0"));
    }
}
