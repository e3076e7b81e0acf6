//! The [`Field2`] row-major two-dimensional array.
//!
//! Every grid quantity (pressure, both velocity components, the pressure
//! correction and the per-face momentum coefficients) is stored as a
//! `Field2`. Row `j` runs along x, so `field[(j, i)]` is the value in row
//! `j`, column `i`, matching the `(ny, nx)` shape convention of the solver.

use std::ops::{Index, IndexMut};

/// A dense, row-major 2-D array of `f64`.
///
/// The shape is fixed at construction. Indexing takes `(row, col)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2 {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Field2 {
    /// Create a zero-filled array of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Create an array with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build an array from nested rows; `None` if they are ragged.
    #[cfg(test)]
    fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return None;
        }
        let data = rows.into_iter().flatten().collect();
        Some(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the array holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major view of the data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable flat row-major view of the data.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Borrow row `j`.
    pub fn row(&self, j: usize) -> &[f64] {
        &self.data[j * self.cols..(j + 1) * self.cols]
    }

    /// Mutably borrow row `j`.
    pub fn row_mut(&mut self, j: usize) -> &mut [f64] {
        &mut self.data[j * self.cols..(j + 1) * self.cols]
    }

    /// Collect column `i` top to bottom in row order.
    pub fn column(&self, i: usize) -> Vec<f64> {
        (0..self.rows).map(|j| self[(j, i)]).collect()
    }

    /// Set every entry to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Overwrite this array with the contents of `other`.
    ///
    /// Returns `false` and leaves `self` untouched if the shapes differ.
    pub fn copy_from(&mut self, other: &Field2) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        self.data.copy_from_slice(&other.data);
        true
    }

    /// Euclidean norm over all entries.
    pub fn l2_norm(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Euclidean norm of `self - other`.
    ///
    /// Both arrays must have the same shape.
    pub fn l2_distance(&self, other: &Field2) -> f64 {
        debug_assert_eq!(self.shape(), other.shape());
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Returns `true` if no entry is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Index<(usize, usize)> for Field2 {
    type Output = f64;

    fn index(&self, (j, i): (usize, usize)) -> &f64 {
        debug_assert!(i < self.cols, "column {i} out of range {}", self.cols);
        &self.data[j * self.cols + i]
    }
}

impl IndexMut<(usize, usize)> for Field2 {
    fn index_mut(&mut self, (j, i): (usize, usize)) -> &mut f64 {
        debug_assert!(i < self.cols, "column {i} out of range {}", self.cols);
        &mut self.data[j * self.cols + i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zeros_has_requested_shape() {
        let f = Field2::zeros(3, 4);
        assert_eq!(f.shape(), (3, 4));
        assert_eq!(f.len(), 12);
        assert!(f.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn index_is_row_major() {
        let mut f = Field2::zeros(2, 3);
        f[(1, 2)] = 7.0;
        assert_eq!(f.as_slice()[5], 7.0);
        assert_eq!(f.row(1), &[0.0, 0.0, 7.0]);
        assert_eq!(f.column(2), vec![0.0, 7.0]);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Field2::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_none());
        let f = Field2::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(f[(1, 0)], 3.0);
    }

    #[test]
    fn copy_from_rejects_shape_mismatch() {
        let mut a = Field2::zeros(2, 2);
        let b = Field2::filled(2, 3, 1.0);
        assert!(!a.copy_from(&b));
        assert_eq!(a, Field2::zeros(2, 2));
        let c = Field2::filled(2, 2, 5.0);
        assert!(a.copy_from(&c));
        assert_eq!(a, c);
    }

    #[test]
    fn norms() {
        let a = Field2::from_rows(vec![vec![3.0, 4.0]]).unwrap();
        assert!((a.l2_norm() - 5.0).abs() < 1e-15);
        let b = Field2::zeros(1, 2);
        assert!((a.l2_distance(&b) - 5.0).abs() < 1e-15);
        assert_eq!(a.l2_distance(&a), 0.0);
    }

    #[test]
    fn non_finite_detected() {
        let mut f = Field2::zeros(2, 2);
        assert!(f.is_finite());
        f[(0, 1)] = f64::NAN;
        assert!(!f.is_finite());
    }

    proptest! {
        #[test]
        fn distance_is_symmetric_and_bounded(
            a in proptest::collection::vec(-10.0f64..10.0, 12),
            b in proptest::collection::vec(-10.0f64..10.0, 12),
        ) {
            let fa = Field2::from_rows(a.chunks(4).map(<[f64]>::to_vec).collect()).unwrap();
            let fb = Field2::from_rows(b.chunks(4).map(<[f64]>::to_vec).collect()).unwrap();
            let d_ab = fa.l2_distance(&fb);
            let d_ba = fb.l2_distance(&fa);
            prop_assert!((d_ab - d_ba).abs() < 1e-12);
            prop_assert!(d_ab <= fa.l2_norm() + fb.l2_norm() + 1e-12);
        }
    }
}
