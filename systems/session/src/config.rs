//! Session configuration and its TOML loader.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use candy_cascade_core::MAX_PIECE_KINDS;
use candy_cascade_grid::{GridError, GridLayout, DEFAULT_CELL_SIZE};
use candy_cascade_system_cascade::{ScoringRules, DEFAULT_POINTS_PER_EXTRA};
use candy_cascade_system_catalog::{CatalogError, MIN_PIECE_KINDS};
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Default number of columns and rows.
pub const DEFAULT_GRID_SIDE: u32 = 8;

/// Default number of accepted swaps before the game ends.
pub const DEFAULT_MOVE_LIMIT: u32 = 100;

/// Tunable parameters of a game session.
///
/// Every field falls back to its default when omitted from a TOML document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Number of distinct candy kinds in play.
    pub kind_count: usize,
    /// Accepted swaps allowed before the game ends.
    pub move_limit: u32,
    /// Points per piece a run extends beyond the minimum length.
    pub points_per_extra: u64,
    /// Side length of a rendered cell.
    pub cell_size: f32,
    /// Seed for the initial deal and every refill.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_GRID_SIDE,
            rows: DEFAULT_GRID_SIDE,
            kind_count: MAX_PIECE_KINDS,
            move_limit: DEFAULT_MOVE_LIMIT,
            points_per_extra: DEFAULT_POINTS_PER_EXTRA,
            cell_size: DEFAULT_CELL_SIZE,
            seed: 0,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse session config toml contents")?;
        config
            .validate()
            .context("session config contains invalid values")?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to load session config {}", path.display()))
    }

    /// Checks that the values describe a playable session.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(GridError::InvalidDimensions {
                columns: self.columns,
                rows: self.rows,
            }
            .into());
        }
        if !(MIN_PIECE_KINDS..=MAX_PIECE_KINDS).contains(&self.kind_count) {
            return Err(CatalogError::InvalidKindCount {
                count: self.kind_count,
            }
            .into());
        }
        if self.move_limit == 0 {
            return Err(SessionError::ZeroMoveLimit);
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(SessionError::InvalidCellSize {
                cell_size: self.cell_size,
            });
        }
        Ok(())
    }

    /// Layout used to derive grid metadata.
    #[must_use]
    pub fn layout(&self) -> GridLayout {
        GridLayout::new(0.0, 0.0, self.cell_size)
    }

    /// Scoring rules derived from the configured weight.
    #[must_use]
    pub const fn scoring(&self) -> ScoringRules {
        ScoringRules::new(self.points_per_extra)
    }
}
