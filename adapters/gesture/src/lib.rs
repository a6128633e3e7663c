#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reduces pointer drags into discrete swap commands.
//!
//! The adapter lives on the presentation side of the boundary. It knows about
//! positions and cell sizes through [`GridInfo`]; the session only ever sees
//! the resulting [`Command::RequestSwap`].

use candy_cascade_core::{CellCoord, Command, Direction};
use candy_cascade_grid::GridInfo;
use glam::Vec2;
use tracing::trace;

/// Fraction of a cell the pointer must travel before a drag selects a
/// neighbour.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Press {
    cell: CellCoord,
    position: Vec2,
}

/// Tracks one drag at a time from press to release.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureAdapter {
    threshold: f32,
    press: Option<Press>,
}

impl GestureAdapter {
    /// Creates an adapter with the provided threshold, expressed as a
    /// fraction of the cell size.
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            press: None,
        }
    }

    /// Cell grabbed by the current drag, if any.
    #[must_use]
    pub fn grabbed(&self) -> Option<CellCoord> {
        self.press.map(|press| press.cell)
    }

    /// Starts a drag at `position`.
    ///
    /// Presses outside the grid are ignored and return `None`. A new press
    /// replaces any drag still in progress.
    pub fn press(&mut self, info: &GridInfo, position: Vec2) -> Option<CellCoord> {
        let cell = info
            .coord_at(position.x, position.y)
            .filter(|cell| info.cell(*cell).is_some());
        self.press = cell.map(|cell| Press { cell, position });
        trace!(?position, ?cell, "pointer pressed");
        cell
    }

    /// Finishes the drag and returns the swap it describes.
    ///
    /// Short drags produce no command. The target cell is not bounds-checked:
    /// dragging past the edge yields a request the session rejects.
    pub fn release(&mut self, info: &GridInfo, position: Vec2) -> Option<Command> {
        let press = self.press.take()?;
        let minimum = self.threshold * info.layout().cell_size;
        let direction = drag_direction(position - press.position, minimum)?;
        Some(Command::RequestSwap {
            from: press.cell,
            to: press.cell.step(direction),
        })
    }

    /// Abandons the drag in progress.
    pub fn cancel(&mut self) {
        self.press = None;
    }
}

impl Default for GestureAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

/// Chooses the direction of the dominant drag axis.
///
/// Returns `None` when the drag is shorter than `minimum` along both axes or
/// did not move at all. Horizontal wins ties. Positive `y` points toward
/// higher rows.
#[must_use]
pub fn drag_direction(delta: Vec2, minimum: f32) -> Option<Direction> {
    if !delta.is_finite() || delta == Vec2::ZERO {
        return None;
    }
    let magnitude = delta.abs();
    if magnitude.max_element() < minimum {
        return None;
    }

    let direction = if magnitude.x >= magnitude.y {
        if delta.x > 0.0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if delta.y > 0.0 {
        Direction::South
    } else {
        Direction::North
    };
    Some(direction)
}
