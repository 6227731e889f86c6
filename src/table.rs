//! Accumulated-cost matrix used by a single alignment.
//!
//! The table is a flat, row-major heap buffer of `rows × cols`
//! [`DistanceScore`] cells, all starting out `Infeasible`. It is created
//! inside one `align` call and dropped when the call returns.

use crate::error::{try_vec, Result};
use crate::score::DistanceScore;

#[derive(Debug, Clone)]
pub struct CostTable {
    rows: usize,
    cols: usize,
    cells: Vec<DistanceScore>,
}

impl CostTable {
    /// Allocate a `rows × cols` table filled with `Infeasible`.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let requested = rows.saturating_mul(cols);
        let mut cells = try_vec(requested, "allocating the accumulated-cost table")?;
        cells.resize(requested, DistanceScore::Infeasible);
        Ok(Self { rows, cols, cells })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell `(i, j)`.
    ///
    /// # Panics
    /// Panics if `(i, j)` lies outside the table.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> DistanceScore {
        self.cells[self.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: DistanceScore) {
        let idx = self.index(i, j);
        self.cells[idx] = value;
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        assert!(
            i < self.rows && j < self.cols,
            "cell ({i}, {j}) outside {}x{} table",
            self.rows,
            self.cols
        );
        i * self.cols + j
    }
}
