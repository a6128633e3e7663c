#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Swap validation and cascade resolution for Candy Cascade.
//!
//! [`CascadeEngine::request_swap`] is the only path that mutates a grid on the
//! player's behalf. It validates the request, applies the swap, and then runs
//! clear, gravity, and detection rounds until the grid is stable. The caller
//! receives the aggregate of every round at once.

use candy_cascade_core::{
    CascadeRound, CellCoord, PieceSource, ResolutionResult, SwapOutcome, SwapRejection,
};
use candy_cascade_grid::{query, Grid, GridError};
use candy_cascade_system_matching::{find_matches, matched_cells};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Points awarded per piece a run extends beyond the minimum length.
pub const DEFAULT_POINTS_PER_EXTRA: u64 = 60;

/// Converts resolution results into score deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    points_per_extra: u64,
}

impl ScoringRules {
    /// Creates rules awarding `points_per_extra` per scoring unit.
    #[must_use]
    pub const fn new(points_per_extra: u64) -> Self {
        Self { points_per_extra }
    }

    /// Points awarded per scoring unit.
    #[must_use]
    pub const fn points_per_extra(&self) -> u64 {
        self.points_per_extra
    }

    /// Score delta earned by a resolution.
    ///
    /// A run of length `L` contributes `L - 2` units; units from every match
    /// in every round are summed.
    #[must_use]
    pub fn points(&self, result: &ResolutionResult) -> u64 {
        result.scoring_units().saturating_mul(self.points_per_extra)
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::new(DEFAULT_POINTS_PER_EXTRA)
    }
}

/// Resolves swap requests against a grid and counts consumed moves.
#[derive(Debug, Default)]
pub struct CascadeEngine {
    moves: u32,
}

impl CascadeEngine {
    /// Creates an engine with no consumed moves.
    #[must_use]
    pub const fn new() -> Self {
        Self { moves: 0 }
    }

    /// Number of swaps that passed validation.
    #[must_use]
    pub const fn move_count(&self) -> u32 {
        self.moves
    }

    /// Forgets every consumed move.
    pub fn reset(&mut self) {
        self.moves = 0;
    }

    /// Validates and resolves a swap between two cells.
    ///
    /// Rejected requests leave the grid and the move counter untouched. An
    /// accepted swap consumes exactly one move whether or not it produces a
    /// match; a swap without matches stays in place.
    #[instrument(skip(self, grid, source), fields(move_count = self.moves))]
    pub fn request_swap(
        &mut self,
        grid: &mut Grid,
        source: &mut impl PieceSource,
        from: CellCoord,
        to: CellCoord,
    ) -> SwapOutcome {
        if let Err(error) = grid.swap(from, to) {
            let reason = rejection_for(error);
            debug!(%reason, "swap rejected");
            return SwapOutcome::Rejected(reason);
        }
        self.moves = self.moves.saturating_add(1);

        let rounds = resolve(grid, source);
        let result = ResolutionResult { from, to, rounds };
        debug!(
            rounds = result.round_count(),
            removed = result.total_removed(),
            units = result.scoring_units(),
            "swap resolved"
        );
        SwapOutcome::Resolved(result)
    }
}

/// Runs cascade rounds until the grid holds no match.
///
/// Returns an empty list when the grid is already stable.
fn resolve(grid: &mut Grid, source: &mut impl PieceSource) -> Vec<CascadeRound> {
    let (columns, rows) = query::dimensions(grid);
    let expected_rounds = (columns as usize * rows as usize / 3).max(1);
    let mut rounds = Vec::new();

    loop {
        let matches = find_matches(query::grid_view(grid));
        if matches.is_empty() {
            break;
        }

        let removed = matched_cells(&matches);
        if let Err(error) = grid.clear(&removed) {
            panic!("invariant violation: matched cell could not be cleared: {error}");
        }
        let refill = grid.apply_gravity_and_refill(source);

        debug!(
            round = rounds.len(),
            matches = matches.len(),
            removed = removed.len(),
            spawned = refill.spawned_count(),
            "cascade round"
        );
        rounds.push(CascadeRound {
            matches,
            removed,
            refill,
        });
        if rounds.len() == expected_rounds + 1 {
            warn!(expected_rounds, "cascade outlasted the expected round count");
        }
    }

    rounds
}

fn rejection_for(error: GridError) -> SwapRejection {
    match error {
        GridError::OutOfBounds { cell } => SwapRejection::OutOfBounds { cell },
        _ => SwapRejection::InvalidAdjacency,
    }
}
