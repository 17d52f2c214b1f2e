//! Dense row-major matrices used for weights and momentum buffers.
//!
//! Only construction helpers live here. The multiply-accumulate loops are
//! written out inline in [`crate::Network`] so the hot path stays obvious.

use std::ops::{Index, IndexMut};

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A `rows x cols` matrix stored contiguously in row-major order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Matrix with every entry equal to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Matrix of independent draws from the uniform distribution on `[low, high)`.
    ///
    /// Panics if `low >= high` (see [`Uniform::new`]).
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Self {
        let dist = Uniform::new(low, high);
        let data = (0..rows * cols).map(|_| dist.sample(rng)).collect();
        Self { rows, cols, data }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major view of all entries.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn row(&self, r: usize) -> &[f64] {
        let start = r * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        let start = r * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// True if no entry is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        debug_assert!(c < self.cols);
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        debug_assert!(c < self.cols);
        &mut self.data[r * self.cols + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn filled_sets_every_entry() {
        let m = Matrix::filled(3, 4, 0.5);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 4);
        assert!(m.as_slice().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn random_stays_in_range_and_is_seed_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::random(5, 6, -1.0, 1.0, &mut rng);
        assert_eq!(m.as_slice().len(), 30);
        assert!(m.as_slice().iter().all(|&v| (-1.0..1.0).contains(&v)));

        let mut rng = StdRng::seed_from_u64(7);
        let again = Matrix::random(5, 6, -1.0, 1.0, &mut rng);
        assert_eq!(m, again);
    }

    fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> Matrix {
        assert_eq!(data.len(), rows * cols);
        Matrix { rows, cols, data }
    }

    #[test]
    fn rows_are_row_major() {
        let mut m = from_flat(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m[(0, 2)], 3.0);

        m[(1, 0)] = -4.0;
        m.row_mut(0)[1] = -2.0;
        assert_eq!(m.as_slice(), &[1.0, -2.0, 3.0, -4.0, 5.0, 6.0]);
    }

    #[test]
    fn is_finite_spots_nan_and_infinity() {
        let mut m = Matrix::filled(2, 2, 1.0);
        assert!(m.is_finite());
        m[(1, 1)] = f64::NAN;
        assert!(!m.is_finite());
        m[(1, 1)] = f64::NEG_INFINITY;
        assert!(!m.is_finite());
    }
}
