use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A target rectangle described by its area and perimeter in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Puzzle {
    pub area: u32,
    pub perimeter: u32,
}

/// Every pair here is realizable with whole-unit sides.
pub const DEFAULT_CATALOG: [Puzzle; 8] = [
    Puzzle::new(15, 16),
    Puzzle::new(12, 14),
    Puzzle::new(16, 16),
    Puzzle::new(8, 12),
    Puzzle::new(20, 18),
    Puzzle::new(9, 12),
    Puzzle::new(10, 14),
    Puzzle::new(6, 10),
];

impl Puzzle {
    pub const fn new(area: u32, perimeter: u32) -> Self {
        Self { area, perimeter }
    }

    /// Side lengths `(w, h)` with `w <= h` that solve this puzzle, if any.
    ///
    /// `w + h = perimeter / 2` and `w * h = area`, so `w` and `h` are the
    /// roots of `x^2 - (perimeter / 2) x + area`.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        if self.perimeter % 2 != 0 {
            return None;
        }
        let half = u64::from(self.perimeter / 2);
        let disc = (half * half).checked_sub(4 * u64::from(self.area))?;
        let root = exact_sqrt(disc)?;
        // half and root share parity whenever disc is a perfect square
        let w = (half - root) / 2;
        let h = (half + root) / 2;
        if w == 0 {
            return None;
        }
        Some((u32::try_from(w).ok()?, u32::try_from(h).ok()?))
    }

    pub fn is_feasible(&self) -> bool {
        self.dimensions().is_some()
    }

    pub fn area_matches(&self, area: u32) -> bool {
        self.area == area
    }

    pub fn perimeter_matches(&self, perimeter: u32) -> bool {
        self.perimeter == perimeter
    }

    /// Exact match on both quantities; there is no tolerance.
    pub fn is_solved_by(&self, area: u32, perimeter: u32) -> bool {
        self.area_matches(area) && self.perimeter_matches(perimeter)
    }
}

fn exact_sqrt(n: u64) -> Option<u64> {
    let mut r = (n as f64).sqrt() as u64;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    (r * r == n).then_some(r)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("puzzle catalog is empty")]
    EmptyCatalog,
}

/// Shuffled pass over the catalog. Each puzzle is served exactly once per
/// pass; exhausting a pass reshuffles.
#[derive(Debug, Clone)]
pub struct PuzzleSequence {
    catalog: Vec<Puzzle>,
    order: Vec<Puzzle>,
    position: usize,
    passes: u64,
    rng: StdRng,
}

impl PuzzleSequence {
    pub fn new(catalog: Vec<Puzzle>, rng: StdRng) -> Result<Self, PuzzleError> {
        if catalog.is_empty() {
            return Err(PuzzleError::EmptyCatalog);
        }
        let mut seq = Self {
            order: catalog.clone(),
            catalog,
            position: 0,
            passes: 0,
            rng,
        };
        seq.reshuffle();
        Ok(seq)
    }

    pub fn with_seed(catalog: Vec<Puzzle>, seed: u64) -> Result<Self, PuzzleError> {
        Self::new(catalog, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(catalog: Vec<Puzzle>) -> Result<Self, PuzzleError> {
        Self::new(catalog, StdRng::from_entropy())
    }

    /// Fresh uniform permutation of the catalog, back to the start.
    pub fn reshuffle(&mut self) {
        self.order.clone_from(&self.catalog);
        self.order.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn current(&self) -> Puzzle {
        // position < order.len() and order is never empty
        self.order[self.position]
    }

    pub fn advance(&mut self) -> Puzzle {
        self.position += 1;
        if self.position >= self.order.len() {
            self.passes += 1;
            self.reshuffle();
            debug!(passes = self.passes, "catalog exhausted, reshuffled");
        }
        self.current()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Completed reshuffles since construction.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn order(&self) -> &[Puzzle] {
        &self.order
    }

    /// Share of the current pass already solved.
    pub fn completed_fraction(&self) -> f64 {
        self.position as f64 / self.order.len() as f64
    }
}
