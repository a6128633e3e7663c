#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic piece catalog that draws candy kinds uniformly at random.

use candy_cascade_core::{PieceKind, PieceSource, MAX_PIECE_KINDS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Smallest kind count that still lets the grid deal a match-free board.
pub const MIN_PIECE_KINDS: usize = 3;

/// Errors raised when configuring a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The requested kind count falls outside the supported range.
    #[error("catalog supports 3 to 6 kinds (received {count})")]
    InvalidKindCount {
        /// Requested number of kinds.
        count: usize,
    },
}

/// Seeded catalog of candy kinds.
///
/// Draws are independent and uniform over the configured kinds; the catalog
/// keeps no memory of earlier draws beyond its generator state.
#[derive(Clone, Debug)]
pub struct PieceCatalog {
    kinds: Vec<PieceKind>,
    rng: ChaCha8Rng,
}

impl PieceCatalog {
    /// Creates a catalog offering the first `kind_count` kinds.
    pub fn new(kind_count: usize, seed: u64) -> Result<Self, CatalogError> {
        if !(MIN_PIECE_KINDS..=MAX_PIECE_KINDS).contains(&kind_count) {
            return Err(CatalogError::InvalidKindCount { count: kind_count });
        }

        Ok(Self {
            kinds: PieceKind::ALL[..kind_count].to_vec(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Draws a kind uniformly from the configured set.
    pub fn random_kind(&mut self) -> PieceKind {
        let index = self.rng.gen_range(0..self.kinds.len());
        self.kinds[index]
    }

    /// Number of kinds the catalog offers.
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }
}

impl PieceSource for PieceCatalog {
    fn next_kind(&mut self) -> PieceKind {
        self.random_kind()
    }

    fn kinds(&self) -> &[PieceKind] {
        &self.kinds
    }
}
