#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Candy Cascade engine.
//!
//! This crate defines the data surface that connects the presentation layer,
//! the authoritative grid, and the pure systems. Adapters submit [`Command`]
//! values describing swap intents, the session resolves them against the grid
//! and broadcasts [`Event`] values in animation order. Systems read immutable
//! [`GridView`] snapshots and never reach into grid storage directly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of distinct piece kinds a catalog can be configured with.
pub const MAX_PIECE_KINDS: usize = PieceKind::ALL.len();

/// Minimum length of a contiguous run that counts as a match.
pub const MIN_MATCH_LENGTH: usize = 3;

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Requests that two grid cells exchange their pieces.
    RequestSwap {
        /// Cell the player grabbed.
        from: CellCoord,
        /// Cell the grabbed piece should move into.
        to: CellCoord,
    },
    /// Rebuilds the grid and resets every session counter.
    Restart {
        /// Seed used to draw the fresh grid and all later refills.
        seed: u64,
    },
}

/// Events broadcast by the session after processing commands.
///
/// Events are emitted in the order a presentation layer would animate them:
/// a swap, then for each cascade round the matches, the cleared cells, the
/// falls, and the spawns, followed by the settled summary and score update.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a fresh grid was dealt.
    SessionStarted {
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
        /// Number of accepted swaps allowed before the game ends.
        move_limit: u32,
    },
    /// Confirms that a swap passed validation and consumed a move.
    SwapAccepted {
        /// Cell the player grabbed.
        from: CellCoord,
        /// Cell the grabbed piece moved into.
        to: CellCoord,
        /// One-based number of the move that was consumed.
        move_number: u32,
    },
    /// Reports that a swap request was rejected without touching the grid.
    SwapRejected {
        /// Cell the player grabbed.
        from: CellCoord,
        /// Cell the grabbed piece should have moved into.
        to: CellCoord,
        /// Specific reason the request failed.
        reason: SwapRejection,
    },
    /// Reports the runs detected at the start of a cascade round.
    MatchesFound {
        /// Zero-based cascade round index.
        round: u32,
        /// Runs detected in the round.
        matches: Vec<Match>,
    },
    /// Reports the cells emptied in a cascade round.
    CellsCleared {
        /// Zero-based cascade round index.
        round: u32,
        /// Union of all matched cells, each listed once.
        cells: Vec<CellCoord>,
    },
    /// Reports that a surviving piece dropped to a lower cell.
    PieceFell {
        /// Zero-based cascade round index.
        round: u32,
        /// Movement of the piece.
        fall: Fall,
    },
    /// Reports that a fresh piece entered the grid from above.
    PieceSpawned {
        /// Zero-based cascade round index.
        round: u32,
        /// Placement of the new piece.
        spawn: Spawn,
    },
    /// Announces that a resolution finished and the grid is stable.
    ResolutionSettled {
        /// Number of cascade rounds that ran.
        rounds: u32,
        /// Total number of cells removed across all rounds.
        removed: u32,
    },
    /// Reports a score change.
    ScoreChanged {
        /// Points added by the latest resolution.
        delta: u64,
        /// Score after applying the delta.
        score: u64,
    },
    /// Announces that the move limit was reached.
    GameOver {
        /// Accepted moves at the moment the game ended.
        move_count: u32,
        /// Final score.
        score: u64,
    },
}

/// Cardinal directions between neighbouring cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Column and row delta applied when stepping in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that requests pointing past the top or left edge
/// can be represented and rejected rather than wrapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell, with row zero at the top.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Returns the coordinate shifted by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// Returns the neighbouring coordinate in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (columns, rows) = direction.offset();
        self.offset(columns, rows)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Closed set of candy kinds that can occupy a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    /// Red candy.
    Red,
    /// Orange candy.
    Orange,
    /// Yellow candy.
    Yellow,
    /// Green candy.
    Green,
    /// Blue candy.
    Blue,
    /// Purple candy.
    Purple,
}

impl PieceKind {
    /// Every kind in catalog order.
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Purple,
    ];

    /// Single-letter identifier used in text renderings of the grid.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Orange => 'O',
            Self::Yellow => 'Y',
            Self::Green => 'G',
            Self::Blue => 'B',
            Self::Purple => 'P',
        }
    }

    /// Parses the letter produced by [`PieceKind::letter`].
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.letter() == letter.to_ascii_uppercase())
    }
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Transient hole left by a removed piece; never observable at rest.
    #[default]
    Empty,
    /// Cell occupied by a candy of the given kind.
    Piece(PieceKind),
}

impl Cell {
    /// Kind of the occupying piece, if any.
    #[must_use]
    pub const fn kind(self) -> Option<PieceKind> {
        match self {
            Self::Empty => None,
            Self::Piece(kind) => Some(kind),
        }
    }

    /// Reports whether the cell holds no piece.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("."),
            Self::Piece(kind) => write!(f, "{}", kind.letter()),
        }
    }
}

/// Source of freshly drawn piece kinds.
///
/// The grid consults a source when dealing the initial board and when
/// refilling vacated cells. Production code uses a seeded catalog; tests may
/// inject scripted sequences.
pub trait PieceSource {
    /// Draws the next kind.
    fn next_kind(&mut self) -> PieceKind;

    /// Kinds this source can produce.
    fn kinds(&self) -> &[PieceKind];
}

/// Read-only view into dense row-major grid storage.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Cell],
    columns: u32,
    rows: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new view backed by the provided row-major cell slice.
    ///
    /// Returns `None` when the slice length does not match the dimensions.
    #[must_use]
    pub fn new(cells: &'a [Cell], columns: u32, rows: u32) -> Option<Self> {
        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).ok()?;
        (cells.len() == expected).then_some(Self {
            cells,
            columns,
            rows,
        })
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the coordinate lies within the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Returns the contents of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<Cell> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Returns the kind occupying the provided cell, if any.
    #[must_use]
    pub fn kind_at(&self, cell: CellCoord) -> Option<PieceKind> {
        self.cell(cell).and_then(Cell::kind)
    }

    /// Iterates over every cell in row-major order alongside its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + 'a {
        let columns = self.columns;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let column = (index % columns as usize) as i32;
            let row = (index / columns as usize) as i32;
            (CellCoord::new(column, row), *cell)
        })
    }

    /// Raw row-major storage backing the view.
    #[must_use]
    pub const fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            let width = usize::try_from(self.columns).ok()?;
            Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
        } else {
            None
        }
    }
}

/// Axis along which a run was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Run along a row, ordered left to right.
    Horizontal,
    /// Run along a column, ordered top to bottom.
    Vertical,
}

/// Maximal contiguous run of at least three same-kind pieces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    kind: PieceKind,
    axis: Axis,
    cells: Vec<CellCoord>,
}

impl Match {
    /// Creates a match descriptor from an ordered run of cells.
    #[must_use]
    pub fn new(kind: PieceKind, axis: Axis, cells: Vec<CellCoord>) -> Self {
        Self { kind, axis, cells }
    }

    /// Kind shared by every cell in the run.
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Axis the run lies on.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// Cells composing the run, in scan order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Length of the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Scoring units earned by the run: one per piece beyond the second.
    #[must_use]
    pub fn scoring_units(&self) -> u64 {
        self.cells.len().saturating_sub(MIN_MATCH_LENGTH - 1) as u64
    }

    /// Reports whether the run covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }
}

/// Movement of a surviving piece during gravity compaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fall {
    /// Cell the piece occupied before compaction.
    pub from: CellCoord,
    /// Cell the piece occupies after compaction.
    pub to: CellCoord,
    /// Kind of the moving piece.
    pub kind: PieceKind,
}

/// Fresh piece placed into a vacated cell during refill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spawn {
    /// Cell the new piece settles into.
    pub cell: CellCoord,
    /// Virtual row above the grid the piece enters from; always negative.
    pub entry_row: i32,
    /// Kind drawn for the new piece.
    pub kind: PieceKind,
}

/// Gravity and refill outcome for a single column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRefill {
    /// Column the report describes.
    pub column: i32,
    /// Surviving pieces that moved, ordered bottom to top.
    pub falls: Vec<Fall>,
    /// Fresh pieces, ordered bottom to top.
    pub spawns: Vec<Spawn>,
}

/// Gravity and refill outcome for the whole grid.
///
/// Columns that were already full are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefillReport {
    /// Per-column reports in ascending column order.
    pub columns: Vec<ColumnRefill>,
}

impl RefillReport {
    /// Iterates over every fall in column order.
    pub fn falls(&self) -> impl Iterator<Item = &Fall> {
        self.columns.iter().flat_map(|column| column.falls.iter())
    }

    /// Iterates over every spawn in column order.
    pub fn spawns(&self) -> impl Iterator<Item = &Spawn> {
        self.columns.iter().flat_map(|column| column.spawns.iter())
    }

    /// Number of fresh pieces placed.
    #[must_use]
    pub fn spawned_count(&self) -> usize {
        self.columns.iter().map(|column| column.spawns.len()).sum()
    }
}

/// One clear, gravity, and refill cycle within a resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CascadeRound {
    /// Runs detected at the start of the round.
    pub matches: Vec<Match>,
    /// Union of matched cells, sorted and listed once.
    pub removed: Vec<CellCoord>,
    /// Falls and spawns that refilled the removed cells.
    pub refill: RefillReport,
}

impl CascadeRound {
    /// Scoring units earned by every run in the round.
    #[must_use]
    pub fn scoring_units(&self) -> u64 {
        self.matches.iter().map(Match::scoring_units).sum()
    }
}

/// Aggregate outcome of one accepted swap and every cascade round it caused.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Cell the player grabbed.
    pub from: CellCoord,
    /// Cell the grabbed piece moved into.
    pub to: CellCoord,
    /// Cascade rounds in the order they ran; empty for an unproductive swap.
    pub rounds: Vec<CascadeRound>,
}

impl ResolutionResult {
    /// Reports whether the swap produced at least one match.
    #[must_use]
    pub fn is_productive(&self) -> bool {
        !self.rounds.is_empty()
    }

    /// Number of cascade rounds that ran.
    #[must_use]
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Iterates over every match found in every round.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|round| round.matches.iter())
    }

    /// Total number of matches across all rounds.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches().count()
    }

    /// Length of each match in discovery order.
    #[must_use]
    pub fn match_sizes(&self) -> Vec<usize> {
        self.matches().map(Match::len).collect()
    }

    /// Cells removed in every round, in round order.
    ///
    /// A coordinate appears once per round that emptied it.
    #[must_use]
    pub fn removed_cells(&self) -> Vec<CellCoord> {
        self.rounds
            .iter()
            .flat_map(|round| round.removed.iter().copied())
            .collect()
    }

    /// Total number of cells removed across all rounds.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.rounds.iter().map(|round| round.removed.len()).sum()
    }

    /// Scoring units earned across all rounds.
    #[must_use]
    pub fn scoring_units(&self) -> u64 {
        self.rounds.iter().map(CascadeRound::scoring_units).sum()
    }
}

/// Reasons a swap request may be rejected before touching the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapRejection {
    /// A coordinate lies outside the grid.
    OutOfBounds {
        /// First offending coordinate.
        cell: CellCoord,
    },
    /// The cells are identical or do not share an edge.
    InvalidAdjacency,
    /// The session already reached its move limit.
    GameOver,
}

impl fmt::Display for SwapRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { cell } => write!(f, "cell {cell} lies outside the grid"),
            Self::InvalidAdjacency => f.write_str("cells are not adjacent"),
            Self::GameOver => f.write_str("the game is over"),
        }
    }
}

/// Result of a swap request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapOutcome {
    /// The request failed validation; the grid and counters are unchanged.
    Rejected(SwapRejection),
    /// The swap consumed a move and every cascade round ran to completion.
    Resolved(ResolutionResult),
}

impl SwapOutcome {
    /// Reports whether the request consumed a move.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Resolution details when the request was accepted.
    #[must_use]
    pub const fn resolution(&self) -> Option<&ResolutionResult> {
        match self {
            Self::Resolved(result) => Some(result),
            Self::Rejected(_) => None,
        }
    }

    /// Rejection reason when the request failed validation.
    #[must_use]
    pub const fn rejection(&self) -> Option<SwapRejection> {
        match self {
            Self::Rejected(reason) => Some(*reason),
            Self::Resolved(_) => None,
        }
    }
}
