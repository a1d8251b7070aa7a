//! The grid board: converts continuous geographic positions to discrete
//! cells and canonicalizes cell identity.
//!
//! Cells are interned in an arena; the same `(i, j)` always resolves to the
//! same [`CellId`] handle, which is what the momento store and the open
//! cache table key on. The arena grows monotonically for the session; cells
//! are never destroyed.

use std::collections::HashMap;

use crate::types::{Cell, CellBounds, CellId, GeoPoint};

/// The world grid: a fixed-width tiling of geographic space plus the
/// canonical cell arena.
#[derive(Debug, Clone)]
pub struct Board {
    tile_width: f64,
    cells: Vec<Cell>,
    index: HashMap<Cell, CellId>,
}

impl Board {
    /// Create an empty board with the given tile width in degrees.
    #[must_use]
    pub fn new(tile_width: f64) -> Self {
        Self {
            tile_width,
            cells: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Tile width in degrees.
    #[must_use]
    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    /// Number of cells observed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Look up or create the canonical handle for a cell value.
    pub fn intern(&mut self, cell: Cell) -> CellId {
        if let Some(&id) = self.index.get(&cell) {
            return id;
        }
        let id = CellId(u32::try_from(self.cells.len()).unwrap_or(u32::MAX));
        self.cells.push(cell);
        let _ = self.index.insert(cell, id);
        id
    }

    /// The cell value behind a handle minted by this board.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Cell {
        self.cells[id.index()]
    }

    /// The canonical handle for a cell value, if it has been observed.
    #[must_use]
    pub fn lookup(&self, cell: Cell) -> Option<CellId> {
        self.index.get(&cell).copied()
    }

    /// Canonical cell containing a geographic position.
    ///
    /// `i = floor(lat / tile_width)`, `j = floor(lng / tile_width)`.
    pub fn cell_at(&mut self, point: GeoPoint) -> CellId {
        #[allow(clippy::cast_possible_truncation)]
        let i = (point.lat / self.tile_width).floor() as i32;
        #[allow(clippy::cast_possible_truncation)]
        let j = (point.lng / self.tile_width).floor() as i32;
        self.intern(Cell::new(i, j))
    }

    /// Geographic rectangle covered by a cell.
    #[must_use]
    pub fn bounds_of(&self, id: CellId) -> CellBounds {
        let Cell { i, j } = self.cell(id);
        CellBounds {
            south_west: GeoPoint::new(f64::from(i) * self.tile_width, f64::from(j) * self.tile_width),
            north_east: GeoPoint::new(
                f64::from(i + 1) * self.tile_width,
                f64::from(j + 1) * self.tile_width,
            ),
        }
    }

    /// Canonical cells in the `(2r + 1)²` square centred on the cell
    /// containing `point`.
    ///
    /// Order is row-major (`di` ascending, then `dj` ascending) and stable,
    /// so downstream iteration (spawn checks, materialization) is
    /// reproducible.
    pub fn cells_near(&mut self, point: GeoPoint, radius: u32) -> Vec<CellId> {
        let origin_id = self.cell_at(point);
        let origin = self.cell(origin_id);
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let mut result = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
        for di in -r..=r {
            for dj in -r..=r {
                result.push(self.intern(Cell::new(origin.i + di, origin.j + dj)));
            }
        }
        result
    }
}
