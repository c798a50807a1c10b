//! Truncated SVD for sparse document-term matrices.
//!
//! Randomized range finder with a few power iterations, followed by an exact
//! eigen-decomposition of the small projected Gram matrix. The random test
//! matrix is drawn from a seeded generator so every run on the same corpus
//! produces the same projection.

use crate::sparse::CsrMatrix;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Singular values below this are treated as zero.
const RANK_EPS: f64 = 1e-10;

/// Truncated SVD configuration.
#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    /// Requested number of components.
    pub n_components: usize,
    /// Extra random directions sampled beyond `n_components`.
    pub n_oversamples: usize,
    /// Power iterations on the range finder.
    pub n_iter: usize,
    /// Seed for the random test matrix.
    pub seed: u64,
}

/// Fitted projection.
#[derive(Debug, Clone)]
pub struct SvdResult {
    /// Singular values, descending.
    pub singular_values: Array1<f64>,
    /// Right singular vectors as rows, shape `(k, n_terms)`.
    pub components: Array2<f64>,
    /// Document coordinates `A * V`, shape `(n_docs, k)`.
    pub embedding: Array2<f64>,
}

impl TruncatedSvd {
    /// Create a configuration with the given component count.
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            n_oversamples: 10,
            n_iter: 5,
            seed: 0,
        }
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of power iterations.
    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    /// Fit on `matrix` and project its rows.
    ///
    /// The number of returned components is capped by the matrix rank bound
    /// `min(n_docs, n_terms)`. Components past the numerical rank have zero
    /// singular value and zero coordinates.
    pub fn fit_transform(&self, matrix: &CsrMatrix) -> SvdResult {
        let n_docs = matrix.n_rows();
        let n_terms = matrix.n_cols();
        let rank_bound = n_docs.min(n_terms);
        let k = self.n_components.min(rank_bound);
        if k == 0 {
            return SvdResult {
                singular_values: Array1::zeros(0),
                components: Array2::zeros((0, n_terms)),
                embedding: Array2::zeros((n_docs, 0)),
            };
        }
        let l = (k + self.n_oversamples).min(rank_bound);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let omega = Array2::from_shape_fn((n_terms, l), |_| rng.gen_range(-1.0f64..1.0));

        let mut q = orthonormalize(matrix.dot(&omega));
        for _ in 0..self.n_iter {
            let z = orthonormalize(matrix.t_dot(&q));
            q = orthonormalize(matrix.dot(&z));
        }

        // B = Q^T A, stored transposed as A^T Q: (n_terms, l)
        let bt = matrix.t_dot(&q);
        let gram = bt.t().dot(&bt);
        let (eigenvalues, eigenvectors) = symmetric_eigen(&gram);

        let mut singular_values = Array1::zeros(k);
        let mut components = Array2::zeros((k, n_terms));

        for i in 0..k {
            let sigma = eigenvalues[i].max(0.0).sqrt();
            if sigma <= RANK_EPS {
                continue;
            }
            let mut v = bt.dot(&eigenvectors.column(i)) / sigma;

            // Deterministic sign: largest-magnitude loading is positive.
            let pivot = v
                .iter()
                .copied()
                .fold(0.0f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
            if pivot < 0.0 {
                v.mapv_inplace(|x| -x);
            }

            singular_values[i] = sigma;
            components.row_mut(i).assign(&v);
        }

        let embedding = matrix.dot(&components.t().to_owned());

        SvdResult {
            singular_values,
            components,
            embedding,
        }
    }
}

/// Modified Gram-Schmidt on the columns. Dependent columns become zero.
fn orthonormalize(mut m: Array2<f64>) -> Array2<f64> {
    let cols = m.ncols();
    for j in 0..cols {
        for p in 0..j {
            let proj = m.column(p).dot(&m.column(j));
            if proj != 0.0 {
                let prev = m.column(p).to_owned();
                m.column_mut(j).scaled_add(-proj, &prev);
            }
        }
        let norm = m.column(j).dot(&m.column(j)).sqrt();
        if norm > RANK_EPS {
            m.column_mut(j).mapv_inplace(|x| x / norm);
        } else {
            m.column_mut(j).fill(0.0);
        }
    }
    m
}

/// Eigen-decomposition of a small symmetric matrix by cyclic Jacobi rotations.
///
/// Returns eigenvalues sorted descending and the matching eigenvectors as
/// columns.
fn symmetric_eigen(matrix: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    for _sweep in 0..100 {
        let off: f64 = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| a[[i, j]] * a[[i, j]])
            .sum();
        let scale: f64 = a.diag().iter().map(|x| x * x).sum::<f64>().max(1.0);
        if off <= 1e-22 * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() < 1e-300 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let t = if theta == 0.0 { 1.0 } else { t };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&x, &y| {
        a[[y, y]]
            .partial_cmp(&a[[x, x]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let eigenvalues = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let eigenvectors = v.select(Axis(1), &order);
    (eigenvalues, eigenvectors)
}
