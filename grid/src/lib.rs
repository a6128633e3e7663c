#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for Candy Cascade.
//!
//! The [`Grid`] exclusively owns cell storage. Its contents change only
//! through [`Grid::swap`], [`Grid::clear`], and
//! [`Grid::apply_gravity_and_refill`]; every other consumer reads through a
//! [`GridView`] captured by [`query::grid_view`].

mod layout;

use std::fmt;

use candy_cascade_core::{
    Cell, CellCoord, ColumnRefill, Fall, GridView, PieceKind, PieceSource, RefillReport, Spawn,
};
use thiserror::Error;
use tracing::{debug, trace};

pub use layout::{CellLayout, GridInfo, GridLayout, DEFAULT_CELL_SIZE};

const MAX_REROLLS: usize = 32;

/// Errors reported by grid reads and writes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Grids need at least one column and one row.
    #[error("grid dimensions must be positive (received {columns}x{rows})")]
    InvalidDimensions {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// A coordinate lies outside the grid.
    #[error("cell {cell} lies outside the grid")]
    OutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
    },
    /// Swaps are only defined for cells that share an edge.
    #[error("cells {first} and {second} are not adjacent")]
    NotAdjacent {
        /// First coordinate of the swap.
        first: CellCoord,
        /// Second coordinate of the swap.
        second: CellCoord,
    },
    /// The piece source cannot avoid dealing a ready-made match.
    #[error("piece source offers {available} kinds; at least 3 are required")]
    InsufficientKinds {
        /// Number of kinds the source produces.
        available: usize,
    },
    /// A textual row holds a character that names no piece kind.
    #[error("unknown piece letter `{letter}` at {cell}")]
    UnknownPiece {
        /// Character that failed to parse.
        letter: char,
        /// Position of the character.
        cell: CellCoord,
    },
    /// Textual rows disagree on their width.
    #[error("row {row} holds {found} cells; expected {expected}")]
    RaggedRows {
        /// Offending row index.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
}

/// Represents the authoritative Candy Cascade grid state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Deals a full grid that contains no ready-made match.
    ///
    /// Cells are filled row by row, left to right. A draw that would complete
    /// a run of three with the two cells to its left or the two cells above it
    /// is re-rolled.
    pub fn initialize(
        columns: u32,
        rows: u32,
        layout: GridLayout,
        source: &mut impl PieceSource,
    ) -> Result<(Self, GridInfo), GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::InvalidDimensions { columns, rows });
        }

        let mut grid = Self {
            columns,
            rows,
            cells: vec![Cell::Empty; columns as usize * rows as usize],
        };

        let mut rerolls = 0usize;
        for row in 0..rows as i32 {
            for column in 0..columns as i32 {
                let cell = CellCoord::new(column, row);
                let forbidden = grid.forbidden_kinds(cell);
                let kind = grid.draw_allowed(source, &forbidden, &mut rerolls)?;
                grid.put(cell, Cell::Piece(kind));
            }
        }

        debug!(columns, rows, rerolls, "dealt initial grid");
        grid.assert_full("initialize");
        Ok((grid, GridInfo::new(columns, rows, layout)))
    }

    /// Builds a grid from rows of piece letters, top row first.
    ///
    /// Intended for presets and tests; the rows are taken as-is, so they may
    /// contain matches.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let row_count = rows.len() as u32;
        let column_count = rows
            .first()
            .map_or(0, |row| row.as_ref().chars().count() as u32);
        if row_count == 0 || column_count == 0 {
            return Err(GridError::InvalidDimensions {
                columns: column_count,
                rows: row_count,
            });
        }

        let mut cells = Vec::with_capacity(column_count as usize * row_count as usize);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count() as u32;
            if found != column_count {
                return Err(GridError::RaggedRows {
                    row: row_index as u32,
                    expected: column_count,
                    found,
                });
            }
            for (column_index, letter) in row.chars().enumerate() {
                let kind = PieceKind::from_letter(letter).ok_or(GridError::UnknownPiece {
                    letter,
                    cell: CellCoord::new(column_index as i32, row_index as i32),
                })?;
                cells.push(Cell::Piece(kind));
            }
        }

        Ok(Self {
            columns: column_count,
            rows: row_count,
            cells,
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the coordinate lies within the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Bounds-checked read of a single cell.
    pub fn cell_at(&self, cell: CellCoord) -> Result<Cell, GridError> {
        self.index(cell)
            .map(|index| self.cells[index])
            .ok_or(GridError::OutOfBounds { cell })
    }

    /// Reports whether every cell holds a piece.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Exchanges the contents of two adjacent cells.
    pub fn swap(&mut self, first: CellCoord, second: CellCoord) -> Result<(), GridError> {
        let first_index = self
            .index(first)
            .ok_or(GridError::OutOfBounds { cell: first })?;
        let second_index = self
            .index(second)
            .ok_or(GridError::OutOfBounds { cell: second })?;
        if !first.is_adjacent(second) {
            return Err(GridError::NotAdjacent { first, second });
        }

        self.cells.swap(first_index, second_index);
        Ok(())
    }

    /// Marks the provided cells empty.
    ///
    /// Every coordinate is validated before any cell changes, so an
    /// out-of-bounds entry leaves the grid untouched. Duplicates are allowed.
    pub fn clear(&mut self, cells: &[CellCoord]) -> Result<(), GridError> {
        let indices = cells
            .iter()
            .map(|cell| self.index(*cell).ok_or(GridError::OutOfBounds { cell: *cell }))
            .collect::<Result<Vec<usize>, GridError>>()?;

        for index in indices {
            self.cells[index] = Cell::Empty;
        }
        Ok(())
    }

    /// Compacts every column downward and refills the vacated top cells.
    ///
    /// Surviving pieces keep their relative order within a column. Fresh
    /// pieces are drawn bottom to top, so the lowest vacated cell receives the
    /// first draw.
    pub fn apply_gravity_and_refill(&mut self, source: &mut impl PieceSource) -> RefillReport {
        let mut report = RefillReport::default();

        for column in 0..self.columns as i32 {
            let mut refill = ColumnRefill {
                column,
                ..ColumnRefill::default()
            };

            let mut write_row = self.rows as i32 - 1;
            for read_row in (0..self.rows as i32).rev() {
                let from = CellCoord::new(column, read_row);
                let Cell::Piece(kind) = self.get(from) else {
                    continue;
                };
                if read_row != write_row {
                    let to = CellCoord::new(column, write_row);
                    self.put(to, Cell::Piece(kind));
                    self.put(from, Cell::Empty);
                    refill.falls.push(Fall { from, to, kind });
                }
                write_row -= 1;
            }

            let vacated = write_row + 1;
            for row in (0..vacated).rev() {
                let cell = CellCoord::new(column, row);
                let kind = source.next_kind();
                self.put(cell, Cell::Piece(kind));
                refill.spawns.push(Spawn {
                    cell,
                    entry_row: row - vacated,
                    kind,
                });
            }

            if !refill.falls.is_empty() || !refill.spawns.is_empty() {
                trace!(
                    column,
                    falls = refill.falls.len(),
                    spawns = refill.spawns.len(),
                    "column refilled"
                );
                report.columns.push(refill);
            }
        }

        self.assert_full("apply_gravity_and_refill");
        report
    }

    fn forbidden_kinds(&self, cell: CellCoord) -> Vec<PieceKind> {
        let mut forbidden = Vec::with_capacity(2);
        for (first, second) in [
            (cell.offset(-1, 0), cell.offset(-2, 0)),
            (cell.offset(0, -1), cell.offset(0, -2)),
        ] {
            let first = self.index(first).and_then(|index| self.cells[index].kind());
            let second = self.index(second).and_then(|index| self.cells[index].kind());
            if let (Some(first), Some(second)) = (first, second) {
                if first == second && !forbidden.contains(&first) {
                    forbidden.push(first);
                }
            }
        }
        forbidden
    }

    fn draw_allowed(
        &self,
        source: &mut impl PieceSource,
        forbidden: &[PieceKind],
        rerolls: &mut usize,
    ) -> Result<PieceKind, GridError> {
        for _ in 0..MAX_REROLLS {
            let kind = source.next_kind();
            if !forbidden.contains(&kind) {
                return Ok(kind);
            }
            *rerolls += 1;
        }

        source
            .kinds()
            .iter()
            .copied()
            .find(|kind| !forbidden.contains(kind))
            .ok_or(GridError::InsufficientKinds {
                available: source.kinds().len(),
            })
    }

    fn assert_full(&self, operation: &str) {
        if let Some(index) = self.cells.iter().position(|cell| cell.is_empty()) {
            let column = index % self.columns as usize;
            let row = index / self.columns as usize;
            panic!("invariant violation: {operation} left cell ({column}, {row}) empty");
        }
    }

    fn get(&self, cell: CellCoord) -> Cell {
        self.index(cell).map_or(Cell::Empty, |index| self.cells[index])
    }

    fn put(&mut self, cell: CellCoord, value: Cell) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = value;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            Some(row as usize * self.columns as usize + column as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.cells.chunks(self.columns as usize).enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use candy_cascade_core::{CellCoord, GridView, PieceKind};

    use super::Grid;

    /// Captures a read-only view of the grid's cells.
    #[must_use]
    pub fn grid_view(grid: &Grid) -> GridView<'_> {
        super::view_of(grid)
    }

    /// Provides the grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(grid: &Grid) -> (u32, u32) {
        (grid.columns, grid.rows)
    }

    /// Returns the kind at the provided cell, if it lies within the grid.
    #[must_use]
    pub fn kind_at(grid: &Grid, cell: CellCoord) -> Option<PieceKind> {
        grid_view(grid).kind_at(cell)
    }

    /// Collects the grid's kinds row by row; empty cells yield `None`.
    #[must_use]
    pub fn kinds_by_row(grid: &Grid) -> Vec<Vec<Option<PieceKind>>> {
        grid.cells
            .chunks(grid.columns as usize)
            .map(|row| row.iter().map(|cell| cell.kind()).collect())
            .collect()
    }
}

fn view_of(grid: &Grid) -> GridView<'_> {
    match GridView::new(&grid.cells, grid.columns, grid.rows) {
        Some(view) => view,
        None => panic!(
            "invariant violation: grid storage holds {} cells for {}x{}",
            grid.cells.len(),
            grid.columns,
            grid.rows
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candy_cascade_system_catalog::PieceCatalog;

    struct Scripted {
        kinds: Vec<PieceKind>,
        sequence: Vec<PieceKind>,
        cursor: usize,
    }

    impl Scripted {
        fn new(sequence: &[PieceKind]) -> Self {
            Self {
                kinds: PieceKind::ALL.to_vec(),
                sequence: sequence.to_vec(),
                cursor: 0,
            }
        }
    }

    impl PieceSource for Scripted {
        fn next_kind(&mut self) -> PieceKind {
            let kind = self.sequence[self.cursor % self.sequence.len()];
            self.cursor += 1;
            kind
        }

        fn kinds(&self) -> &[PieceKind] {
            &self.kinds
        }
    }

    #[test]
    fn initialize_rejects_zero_dimensions() {
        let mut catalog = PieceCatalog::new(6, 1).expect("valid catalog");
        let error = Grid::initialize(0, 4, GridLayout::default(), &mut catalog)
            .expect_err("zero columns must be rejected");
        assert_eq!(error, GridError::InvalidDimensions { columns: 0, rows: 4 });
    }

    #[test]
    fn initialize_rerolls_constant_source() {
        let mut source = Scripted::new(&[PieceKind::Red]);
        let (grid, info) = Grid::initialize(5, 5, GridLayout::default(), &mut source)
            .expect("fallback kinds keep the grid match-free");

        assert!(grid.is_full());
        assert_eq!(info.cells().len(), 25);
        assert_eq!(grid.cell_at(CellCoord::new(2, 0)), Ok(Cell::Piece(PieceKind::Orange)));
    }

    #[test]
    fn initialize_reports_insufficient_kinds() {
        let mut source = Scripted::new(&[PieceKind::Red]);
        source.kinds = vec![PieceKind::Red];

        let error = Grid::initialize(3, 1, GridLayout::default(), &mut source)
            .expect_err("single-kind source cannot avoid a run");
        assert_eq!(error, GridError::InsufficientKinds { available: 1 });
    }

    #[test]
    fn cell_at_rejects_out_of_bounds() {
        let grid = Grid::from_rows(&["RGB", "GBR"]).expect("valid rows");
        assert_eq!(
            grid.cell_at(CellCoord::new(-1, 0)),
            Err(GridError::OutOfBounds {
                cell: CellCoord::new(-1, 0)
            })
        );
        assert!(grid.cell_at(CellCoord::new(3, 0)).is_err());
        assert!(grid.cell_at(CellCoord::new(0, 2)).is_err());
    }

    #[test]
    fn swap_requires_adjacent_cells() {
        let mut grid = Grid::from_rows(&["RGB", "GBR"]).expect("valid rows");
        let before = grid.clone();

        assert_eq!(
            grid.swap(CellCoord::new(0, 0), CellCoord::new(2, 0)),
            Err(GridError::NotAdjacent {
                first: CellCoord::new(0, 0),
                second: CellCoord::new(2, 0),
            })
        );
        assert_eq!(
            grid.swap(CellCoord::new(0, 0), CellCoord::new(0, 0)),
            Err(GridError::NotAdjacent {
                first: CellCoord::new(0, 0),
                second: CellCoord::new(0, 0),
            })
        );
        assert_eq!(grid, before);

        grid.swap(CellCoord::new(0, 0), CellCoord::new(0, 1))
            .expect("vertical neighbours swap");
        assert_eq!(grid.to_string(), "GGB\nRBR");
    }

    #[test]
    fn clear_is_all_or_nothing() {
        let mut grid = Grid::from_rows(&["RGB", "GBR"]).expect("valid rows");
        let before = grid.clone();

        assert!(grid
            .clear(&[CellCoord::new(0, 0), CellCoord::new(5, 5)])
            .is_err());
        assert_eq!(grid, before);

        grid.clear(&[CellCoord::new(0, 0), CellCoord::new(0, 0)])
            .expect("in-bounds cells clear");
        assert_eq!(grid.to_string(), ".GB\nGBR");
    }

    #[test]
    fn gravity_preserves_column_order_and_reports_moves() {
        let mut grid = Grid::from_rows(&["R", "G", "B", "Y"]).expect("valid rows");
        grid.clear(&[CellCoord::new(0, 1), CellCoord::new(0, 3)])
            .expect("cells clear");

        let mut source = Scripted::new(&[PieceKind::Purple, PieceKind::Orange]);
        let report = grid.apply_gravity_and_refill(&mut source);

        assert_eq!(grid.to_string(), "O\nP\nR\nB");
        let column = &report.columns[0];
        assert_eq!(
            column.falls,
            vec![
                Fall {
                    from: CellCoord::new(0, 2),
                    to: CellCoord::new(0, 3),
                    kind: PieceKind::Blue,
                },
                Fall {
                    from: CellCoord::new(0, 0),
                    to: CellCoord::new(0, 2),
                    kind: PieceKind::Red,
                },
            ]
        );
        assert_eq!(
            column.spawns,
            vec![
                Spawn {
                    cell: CellCoord::new(0, 1),
                    entry_row: -1,
                    kind: PieceKind::Purple,
                },
                Spawn {
                    cell: CellCoord::new(0, 0),
                    entry_row: -2,
                    kind: PieceKind::Orange,
                },
            ]
        );
    }

    #[test]
    fn gravity_skips_full_columns() {
        let mut grid = Grid::from_rows(&["RG", "BY"]).expect("valid rows");
        grid.clear(&[CellCoord::new(1, 1)]).expect("cell clears");

        let mut source = Scripted::new(&[PieceKind::Purple]);
        let report = grid.apply_gravity_and_refill(&mut source);

        assert_eq!(report.columns.len(), 1);
        assert_eq!(report.columns[0].column, 1);
        assert_eq!(report.spawned_count(), 1);
        assert_eq!(grid.to_string(), "RP\nBG");
    }

    #[test]
    fn from_rows_validates_shape_and_letters() {
        assert_eq!(
            Grid::from_rows(&["RG", "B"]),
            Err(GridError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
        assert_eq!(
            Grid::from_rows(&["RX"]),
            Err(GridError::UnknownPiece {
                letter: 'X',
                cell: CellCoord::new(1, 0),
            })
        );
        let empty: [&str; 0] = [];
        assert!(Grid::from_rows(&empty).is_err());
    }

    #[test]
    fn query_exposes_read_only_view() {
        let grid = Grid::from_rows(&["RG", "BY"]).expect("valid rows");
        let view = query::grid_view(&grid);

        assert_eq!(view.dimensions(), (2, 2));
        assert_eq!(query::kind_at(&grid, CellCoord::new(1, 1)), Some(PieceKind::Yellow));
        assert_eq!(
            query::kinds_by_row(&grid)[0],
            vec![Some(PieceKind::Red), Some(PieceKind::Green)]
        );
    }
}
