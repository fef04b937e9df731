//! Spatial partitioning for broad-phase collision
//!
//! The map interior (everything inside the one-tile border) is cut into a
//! fixed array of cells. Each cell remembers which entities currently overlap
//! it, so collision checks only look at entities sharing a cell.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec2;
use thiserror::Error;

use super::entity::EntityId;
use super::rect::Rect;

/// Invalid grid configuration
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid cell size {cell_size} is not a positive multiple of tile size {tile_size}")]
    CellSize { cell_size: f32, tile_size: f32 },
    #[error("map interior {interior_width} x {interior_height} px cannot hold a single grid cell")]
    InteriorTooSmall {
        interior_width: f32,
        interior_height: f32,
    },
}

/// Cell address within the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    // Row first so the derived ordering is row-major
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub fn new(col: usize, row: usize) -> Self {
        Self { row, col }
    }
}

/// Spreadsheet-style label: row letters then 1-based column (`A1`, `C12`, `AB3`)
impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = self.row + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        write!(f, "{}{}", String::from_utf8_lossy(&letters), self.col + 1)
    }
}

/// One partition of the map interior
#[derive(Debug, Clone)]
pub struct GridCell {
    pub coord: CellCoord,
    pub bounds: Rect,
    members: BTreeSet<EntityId>,
}

impl GridCell {
    pub fn members(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    tile_size: f32,
    cell_size: Vec2,
    cols: usize,
    rows: usize,
    cells: Vec<GridCell>, // Row-major: [row * cols + col]
}

impl SpatialGrid {
    /// Partition a `map_size` pixel map whose outer ring of `tile_size` tiles
    /// is excluded. `cell_size` must be a multiple of `tile_size`.
    pub fn new(map_size: Vec2, tile_size: f32, cell_size: Vec2) -> Result<Self, GridError> {
        for extent in [cell_size.x, cell_size.y] {
            let tiles = extent / tile_size;
            if tile_size <= 0.0 || extent <= 0.0 || (tiles - tiles.round()).abs() > 1e-4 {
                return Err(GridError::CellSize {
                    cell_size: extent,
                    tile_size,
                });
            }
        }

        let interior = map_size - Vec2::splat(2.0 * tile_size);
        let cols = (interior.x / cell_size.x).floor().max(0.0) as usize;
        let rows = (interior.y / cell_size.y).floor().max(0.0) as usize;
        if cols == 0 || rows == 0 {
            return Err(GridError::InteriorTooSmall {
                interior_width: interior.x,
                interior_height: interior.y,
            });
        }

        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let min = Vec2::new(
                    tile_size + col as f32 * cell_size.x,
                    tile_size + row as f32 * cell_size.y,
                );
                cells.push(GridCell {
                    coord: CellCoord::new(col, row),
                    bounds: Rect::from_min_size(min, cell_size),
                    members: BTreeSet::new(),
                });
            }
        }

        log::info!(
            "Spatial grid: {} x {} cells of {} x {} px",
            cols,
            rows,
            cell_size.x,
            cell_size.y
        );

        Ok(Self {
            tile_size,
            cell_size,
            cols,
            rows,
            cells,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Cell containing a pixel position.
    ///
    /// Positions outside the interior clamp to the nearest edge cell instead
    /// of failing, since mobile entities pass through the border ring.
    pub fn cell_at(&self, pos: Vec2) -> CellCoord {
        let col = ((pos.x - self.tile_size) / self.cell_size.x).floor();
        let row = ((pos.y - self.tile_size) / self.cell_size.y).floor();
        CellCoord::new(
            col.clamp(0.0, (self.cols - 1) as f32) as usize,
            row.clamp(0.0, (self.rows - 1) as f32) as usize,
        )
    }

    /// Distinct cells holding any of the rectangle's four corners, row-major
    pub fn cells_overlapping(&self, rect: &Rect) -> Vec<CellCoord> {
        let mut coords: Vec<CellCoord> = rect.corners().iter().map(|&c| self.cell_at(c)).collect();
        coords.sort_unstable();
        coords.dedup();
        coords
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        if coord.col >= self.cols || coord.row >= self.rows {
            return None;
        }
        self.cells.get(coord.row * self.cols + coord.col)
    }

    fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut GridCell> {
        if coord.col >= self.cols || coord.row >= self.rows {
            return None;
        }
        self.cells.get_mut(coord.row * self.cols + coord.col)
    }

    /// Add an entity to a cell. Returns `false` for a coordinate outside the grid.
    pub fn assign(&mut self, id: EntityId, coord: CellCoord) -> bool {
        match self.cell_mut(coord) {
            Some(cell) => {
                cell.members.insert(id);
                true
            }
            None => false,
        }
    }

    /// Remove an entity from a cell
    pub fn remove(&mut self, id: EntityId, coord: CellCoord) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.members.remove(&id);
        }
    }

    /// Remove an entity from every cell (used on despawn)
    pub fn remove_everywhere(&mut self, id: EntityId) {
        for cell in &mut self.cells {
            cell.members.remove(&id);
        }
    }

    /// Members of the given cells, each reported once, in first-seen order
    pub fn candidates(&self, coords: &[CellCoord]) -> Vec<EntityId> {
        let mut seen = BTreeSet::new();
        coords
            .iter()
            .filter_map(|&coord| self.cell(coord))
            .flat_map(|cell| cell.members())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Cells an entity is currently registered in
    pub fn cells_containing(&self, id: EntityId) -> Vec<CellCoord> {
        self.cells
            .iter()
            .filter(|cell| cell.contains(id))
            .map(|cell| cell.coord)
            .collect()
    }
}
