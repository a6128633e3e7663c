#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure match detection over immutable grid snapshots.
//!
//! Rows are scanned left to right and columns top to bottom as two
//! independent passes. A cell may therefore belong to a horizontal and a
//! vertical run at once; callers that remove matches take the union through
//! [`matched_cells`].

use std::collections::BTreeSet;

use candy_cascade_core::{Axis, Cell, CellCoord, GridView, Match, PieceKind, MIN_MATCH_LENGTH};

/// Returns every maximal run of at least three same-kind pieces.
///
/// Horizontal runs come first, ordered by row then column, followed by
/// vertical runs ordered by column then row. An empty result means the grid is
/// stable.
#[must_use]
pub fn find_matches(view: GridView<'_>) -> Vec<Match> {
    let (columns, rows) = view.dimensions();
    let mut matches = Vec::new();

    for row in 0..rows as i32 {
        scan_line(
            &view,
            Axis::Horizontal,
            (0..columns as i32).map(|column| CellCoord::new(column, row)),
            &mut matches,
        );
    }
    for column in 0..columns as i32 {
        scan_line(
            &view,
            Axis::Vertical,
            (0..rows as i32).map(|row| CellCoord::new(column, row)),
            &mut matches,
        );
    }

    matches
}

/// Union of every matched coordinate, sorted and listed once.
#[must_use]
pub fn matched_cells(matches: &[Match]) -> Vec<CellCoord> {
    let cells: BTreeSet<CellCoord> = matches
        .iter()
        .flat_map(|run| run.cells().iter().copied())
        .collect();
    cells.into_iter().collect()
}

/// Enumerates every adjacent swap that would produce at least one match.
///
/// Each pair is listed once with the left or upper cell first.
#[must_use]
pub fn possible_swaps(view: GridView<'_>) -> Vec<(CellCoord, CellCoord)> {
    let (columns, rows) = view.dimensions();
    let mut scratch: Vec<Cell> = view.cells().to_vec();
    let mut swaps = Vec::new();

    for row in 0..rows as i32 {
        for column in 0..columns as i32 {
            let origin = CellCoord::new(column, row);
            for neighbour in [origin.offset(1, 0), origin.offset(0, 1)] {
                if !view.contains(neighbour) {
                    continue;
                }
                let (first, second) = (
                    index_of(origin, columns),
                    index_of(neighbour, columns),
                );
                if scratch[first] == scratch[second] {
                    continue;
                }
                scratch.swap(first, second);
                let forms_match = GridView::new(&scratch, columns, rows)
                    .is_some_and(|swapped| {
                        completes_run(&swapped, origin) || completes_run(&swapped, neighbour)
                    });
                scratch.swap(first, second);
                if forms_match {
                    swaps.push((origin, neighbour));
                }
            }
        }
    }

    swaps
}

/// Reports whether any adjacent swap would produce a match.
#[must_use]
pub fn has_possible_move(view: GridView<'_>) -> bool {
    !possible_swaps(view).is_empty()
}

fn scan_line(
    view: &GridView<'_>,
    axis: Axis,
    line: impl Iterator<Item = CellCoord>,
    out: &mut Vec<Match>,
) {
    let mut run: Vec<CellCoord> = Vec::new();
    let mut run_kind: Option<PieceKind> = None;

    for cell in line {
        let kind = view.kind_at(cell);
        if kind.is_some() && kind == run_kind {
            run.push(cell);
            continue;
        }
        flush_run(axis, run_kind, &mut run, out);
        run_kind = kind;
        if kind.is_some() {
            run.push(cell);
        }
    }
    flush_run(axis, run_kind, &mut run, out);
}

fn flush_run(axis: Axis, kind: Option<PieceKind>, run: &mut Vec<CellCoord>, out: &mut Vec<Match>) {
    match kind {
        Some(kind) if run.len() >= MIN_MATCH_LENGTH => {
            out.push(Match::new(kind, axis, std::mem::take(run)));
        }
        _ => run.clear(),
    }
}

fn completes_run(view: &GridView<'_>, cell: CellCoord) -> bool {
    let Some(kind) = view.kind_at(cell) else {
        return false;
    };
    let extent = |columns: i32, rows: i32| {
        (1..)
            .map(|step| cell.offset(columns * step, rows * step))
            .take_while(|neighbour| view.kind_at(*neighbour) == Some(kind))
            .count()
    };

    let horizontal = 1 + extent(-1, 0) + extent(1, 0);
    let vertical = 1 + extent(0, -1) + extent(0, 1);
    horizontal >= MIN_MATCH_LENGTH || vertical >= MIN_MATCH_LENGTH
}

fn index_of(cell: CellCoord, columns: u32) -> usize {
    cell.row() as usize * columns as usize + cell.column() as usize
}
