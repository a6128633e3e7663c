//! Presentation layout metadata derived when a grid is dealt.

use candy_cascade_core::CellCoord;
use serde::{Deserialize, Serialize};

/// Default side length of a rendered cell in presentation units.
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Placement parameters used to derive [`GridInfo`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Horizontal position of the grid's top-left corner.
    pub origin_x: f32,
    /// Vertical position of the grid's top-left corner.
    pub origin_y: f32,
    /// Side length of a single square cell.
    pub cell_size: f32,
}

impl GridLayout {
    /// Creates a layout anchored at the provided origin.
    #[must_use]
    pub const fn new(origin_x: f32, origin_y: f32, cell_size: f32) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_size,
        }
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(0.0, 0.0, DEFAULT_CELL_SIZE)
    }
}

/// Position and size of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellLayout {
    /// Grid coordinate the entry describes.
    pub cell: CellCoord,
    /// Horizontal position of the cell's top-left corner.
    pub x: f32,
    /// Vertical position of the cell's top-left corner.
    pub y: f32,
    /// Side length of the cell.
    pub size: f32,
}

/// Per-cell layout metadata handed to the presentation layer.
///
/// The metadata is informational: gameplay state lives in the grid alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridInfo {
    columns: u32,
    rows: u32,
    layout: GridLayout,
    cells: Vec<CellLayout>,
}

impl GridInfo {
    pub(crate) fn new(columns: u32, rows: u32, layout: GridLayout) -> Self {
        let mut cells = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(CellLayout {
                    cell: CellCoord::new(column as i32, row as i32),
                    x: layout.origin_x + column as f32 * layout.cell_size,
                    y: layout.origin_y + row as f32 * layout.cell_size,
                    size: layout.cell_size,
                });
            }
        }
        Self {
            columns,
            rows,
            layout,
            cells,
        }
    }

    /// Layout parameters the metadata was derived from.
    #[must_use]
    pub const fn layout(&self) -> GridLayout {
        self.layout
    }

    /// Number of columns described.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows described.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.layout.cell_size
    }

    /// Total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.layout.cell_size
    }

    /// Row-major layout entries.
    #[must_use]
    pub fn cells(&self) -> &[CellLayout] {
        &self.cells
    }

    /// Layout entry for the provided cell.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&CellLayout> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells
            .get(row as usize * self.columns as usize + column as usize)
    }

    /// Maps a presentation-space position to the coordinate beneath it.
    ///
    /// Positions outside the grid map to coordinates outside the grid bounds
    /// rather than being clamped. Returns `None` only when the layout has no
    /// usable cell size.
    #[must_use]
    pub fn coord_at(&self, x: f32, y: f32) -> Option<CellCoord> {
        if self.layout.cell_size <= f32::EPSILON || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let column = ((x - self.layout.origin_x) / self.layout.cell_size).floor();
        let row = ((y - self.layout.origin_y) / self.layout.cell_size).floor();
        Some(CellCoord::new(column as i32, row as i32))
    }
}
