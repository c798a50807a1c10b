//! Compressed sparse row matrix for document-term weights.

use ndarray::Array2;

/// Row-major sparse matrix (documents x terms).
#[derive(Debug, Clone, Default)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// Build from per-row `(column, value)` entries.
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>, n_cols: usize) -> Self {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let nnz = rows.iter().map(Vec::len).sum();
        let mut indices = Vec::with_capacity(nnz);
        let mut data = Vec::with_capacity(nnz);

        indptr.push(0);
        for row in &rows {
            for &(col, value) in row {
                debug_assert!(col < n_cols);
                indices.push(col);
                data.push(value);
            }
            indptr.push(indices.len());
        }

        Self {
            n_rows: rows.len(),
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    /// Number of rows (documents).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (terms).
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Entries of one row.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.indptr[i]..self.indptr[i + 1];
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.data[range].iter().copied())
    }

    /// `self * dense`, with `dense` of shape `(n_cols, k)`.
    pub fn dot(&self, dense: &Array2<f64>) -> Array2<f64> {
        let k = dense.ncols();
        let mut out = Array2::zeros((self.n_rows, k));
        for i in 0..self.n_rows {
            let mut out_row = out.row_mut(i);
            for (col, value) in self.row(i) {
                out_row.scaled_add(value, &dense.row(col));
            }
        }
        out
    }

    /// `self^T * dense`, with `dense` of shape `(n_rows, k)`.
    pub fn t_dot(&self, dense: &Array2<f64>) -> Array2<f64> {
        let k = dense.ncols();
        let mut out = Array2::zeros((self.n_cols, k));
        for i in 0..self.n_rows {
            let dense_row = dense.row(i);
            for (col, value) in self.row(i) {
                out.row_mut(col).scaled_add(value, &dense_row);
            }
        }
        out
    }

    /// Dense copy, for small matrices and tests.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.n_rows, self.n_cols));
        for i in 0..self.n_rows {
            for (col, value) in self.row(i) {
                out[[i, col]] += value;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> CsrMatrix {
        // [[1, 0, 2],
        //  [0, 3, 0]]
        CsrMatrix::from_rows(vec![vec![(0, 1.0), (2, 2.0)], vec![(1, 3.0)]], 3)
    }

    #[test]
    fn test_dot_matches_dense() {
        let m = sample();
        let rhs = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        assert_eq!(m.dot(&rhs), m.to_dense().dot(&rhs));
        assert_eq!(m.nnz(), 3);
    }

    #[test]
    fn test_t_dot_matches_dense() {
        let m = sample();
        let rhs = array![[1.0], [2.0]];
        assert_eq!(m.t_dot(&rhs), m.to_dense().t().dot(&rhs));
    }
}
