#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session glue for Candy Cascade.
//!
//! A [`Session`] owns the grid, the seeded piece catalog, and the cascade
//! engine. It turns resolutions into score, enforces the move limit, and
//! reports everything that happened as an ordered [`Event`] timeline through
//! [`apply`]. Presentation layers pull the counters with
//! [`Session::current_state`] after each command instead of polling.

mod config;

use candy_cascade_core::{CellCoord, Command, Event, SwapOutcome, SwapRejection};
use candy_cascade_grid::{Grid, GridError, GridInfo};
use candy_cascade_system_cascade::{CascadeEngine, ScoringRules};
use candy_cascade_system_catalog::{CatalogError, PieceCatalog};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub use config::{SessionConfig, DEFAULT_GRID_SIDE, DEFAULT_MOVE_LIMIT};

/// Errors raised while building or restarting a session.
#[derive(Debug, PartialEq, Error)]
pub enum SessionError {
    /// Sessions need at least one move.
    #[error("move limit must be positive")]
    ZeroMoveLimit,
    /// Layout metadata needs a positive, finite cell size.
    #[error("cell size must be positive and finite (received {cell_size})")]
    InvalidCellSize {
        /// Rejected cell size.
        cell_size: f32,
    },
    /// The piece catalog rejected the configuration.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The grid could not be dealt.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Counters a presentation layer reads after each command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionState {
    /// Accepted swaps so far.
    pub move_count: u32,
    /// Accepted swaps allowed in total.
    pub move_limit: u32,
    /// Accumulated score.
    pub score: u64,
    /// Whether the move limit has been reached.
    pub is_game_over: bool,
}

impl SessionState {
    /// Accepted swaps left before the game ends.
    #[must_use]
    pub const fn moves_remaining(&self) -> u32 {
        self.move_limit.saturating_sub(self.move_count)
    }
}

/// One game from the initial deal to the move limit.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    scoring: ScoringRules,
    catalog: PieceCatalog,
    grid: Grid,
    info: GridInfo,
    engine: CascadeEngine,
    score: u64,
}

impl Session {
    /// Validates the configuration and deals the first grid.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let (catalog, grid, info) = deal(&config, config.seed)?;
        Ok(Self {
            scoring: config.scoring(),
            config,
            catalog,
            grid,
            info,
            engine: CascadeEngine::new(),
            score: 0,
        })
    }

    /// Configuration the session was built from.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current grid contents.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Layout metadata of the current grid.
    #[must_use]
    pub const fn grid_info(&self) -> &GridInfo {
        &self.info
    }

    /// Snapshot of the move counter, score, and game-over flag.
    #[must_use]
    pub fn current_state(&self) -> SessionState {
        SessionState {
            move_count: self.engine.move_count(),
            move_limit: self.config.move_limit,
            score: self.score,
            is_game_over: self.is_game_over(),
        }
    }

    /// Reports whether the move limit has been reached.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.engine.move_count() >= self.config.move_limit
    }

    /// Resolves a swap and adds the earned points to the score.
    ///
    /// Once the move limit is reached every request is rejected with
    /// [`SwapRejection::GameOver`].
    pub fn request_swap(&mut self, from: CellCoord, to: CellCoord) -> SwapOutcome {
        if self.is_game_over() {
            return SwapOutcome::Rejected(SwapRejection::GameOver);
        }

        let outcome = self
            .engine
            .request_swap(&mut self.grid, &mut self.catalog, from, to);
        if let Some(result) = outcome.resolution() {
            self.score = self.score.saturating_add(self.scoring.points(result));
        }
        outcome
    }

    /// Deals a fresh grid from `seed` and resets every counter.
    #[instrument(skip(self))]
    pub fn restart(&mut self, seed: u64) -> Result<(), SessionError> {
        let (catalog, grid, info) = deal(&self.config, seed)?;
        self.config.seed = seed;
        self.catalog = catalog;
        self.grid = grid;
        self.info = info;
        self.engine.reset();
        self.score = 0;
        debug!("session restarted");
        Ok(())
    }
}

/// Applies a command and appends the resulting events in presentation order.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RequestSwap { from, to } => request_swap(session, from, to, out_events),
        Command::Restart { seed } => {
            if let Err(error) = session.restart(seed) {
                warn!(%error, seed, "restart failed; keeping the current game");
                return;
            }
            out_events.push(Event::SessionStarted {
                columns: session.grid.columns(),
                rows: session.grid.rows(),
                move_limit: session.config.move_limit,
            });
        }
    }
}

#[instrument(skip(session, out_events))]
fn request_swap(
    session: &mut Session,
    from: CellCoord,
    to: CellCoord,
    out_events: &mut Vec<Event>,
) {
    let score_before = session.score;
    let result = match session.request_swap(from, to) {
        SwapOutcome::Rejected(reason) => {
            debug!(%reason, "swap rejected");
            out_events.push(Event::SwapRejected { from, to, reason });
            return;
        }
        SwapOutcome::Resolved(result) => result,
    };

    let rounds = result.round_count() as u32;
    let removed = result.total_removed() as u32;
    out_events.push(Event::SwapAccepted {
        from,
        to,
        move_number: session.engine.move_count(),
    });
    for (index, round) in result.rounds.into_iter().enumerate() {
        let round_index = index as u32;
        out_events.push(Event::MatchesFound {
            round: round_index,
            matches: round.matches,
        });
        out_events.push(Event::CellsCleared {
            round: round_index,
            cells: round.removed,
        });
        for column in round.refill.columns {
            out_events.extend(column.falls.into_iter().map(|fall| Event::PieceFell {
                round: round_index,
                fall,
            }));
            out_events.extend(column.spawns.into_iter().map(|spawn| Event::PieceSpawned {
                round: round_index,
                spawn,
            }));
        }
    }

    let state = session.current_state();
    let delta = state.score - score_before;
    out_events.push(Event::ResolutionSettled { rounds, removed });
    if delta > 0 {
        out_events.push(Event::ScoreChanged {
            delta,
            score: state.score,
        });
    }
    if state.is_game_over {
        info!(
            move_count = state.move_count,
            score = state.score,
            "move limit reached"
        );
        out_events.push(Event::GameOver {
            move_count: state.move_count,
            score: state.score,
        });
    }
}

fn deal(
    config: &SessionConfig,
    seed: u64,
) -> Result<(PieceCatalog, Grid, GridInfo), SessionError> {
    let mut catalog = PieceCatalog::new(config.kind_count, seed)?;
    let (grid, info) =
        Grid::initialize(config.columns, config.rows, config.layout(), &mut catalog)?;
    Ok((catalog, grid, info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_remaining_saturates_past_the_limit() {
        let state = SessionState {
            move_count: 12,
            move_limit: 10,
            score: 0,
            is_game_over: true,
        };
        assert_eq!(state.moves_remaining(), 0);
    }

    #[test]
    fn finished_session_leaves_grid_untouched() {
        let mut session = Session::new(SessionConfig {
            move_limit: 1,
            ..SessionConfig::default()
        })
        .expect("valid session");
        let _ = session.request_swap(CellCoord::new(0, 0), CellCoord::new(0, 1));
        let grid = session.grid().clone();
        let score = session.current_state().score;

        let outcome = session.request_swap(CellCoord::new(3, 3), CellCoord::new(4, 3));

        assert_eq!(outcome, SwapOutcome::Rejected(SwapRejection::GameOver));
        assert_eq!(session.grid(), &grid);
        assert_eq!(session.current_state().score, score);
        assert_eq!(session.current_state().move_count, 1);
    }
}
