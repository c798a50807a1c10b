//! Column standardization.

use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Standard deviations at or below this are treated as zero.
const MIN_STD: f64 = 1e-12;

/// Per-column mean and population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl StandardScaler {
    /// Fit on the columns of `data`.
    pub fn fit(data: &Array2<f64>) -> Self {
        let n_cols = data.ncols();
        if data.nrows() == 0 {
            return Self {
                mean: Array1::zeros(n_cols),
                std: Array1::zeros(n_cols),
            };
        }
        Self {
            mean: data.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_cols)),
            std: data.std_axis(Axis(0), 0.0),
        }
    }

    /// Z-score each column. Constant columns map to zero.
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut out = data.clone();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (mean, std) = (self.mean[j], self.std[j]);
            if std > MIN_STD {
                col.mapv_inplace(|x| (x - mean) / std);
            } else {
                col.fill(0.0);
            }
        }
        out
    }

    /// Column means.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Column population standard deviations.
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}

/// Standardize the columns of `data`.
pub fn standardize_columns(data: &Array2<f64>) -> Array2<f64> {
    StandardScaler::fit(data).transform(data)
}

/// Standardize a single series.
pub fn standardize(values: ArrayView1<'_, f64>) -> Array1<f64> {
    let column = values.to_owned().insert_axis(Axis(1));
    standardize_columns(&column).remove_axis(Axis(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_zero_mean_unit_variance() {
        let data = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let z = standardize_columns(&data);
        for col in z.axis_iter(Axis(1)) {
            assert_relative_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-12);
            assert_relative_eq!(col.std(0.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_population_std() {
        let scaler = StandardScaler::fit(&array![[0.0], [2.0]]);
        assert_relative_eq!(scaler.std()[0], 1.0);
        assert_relative_eq!(scaler.mean()[0], 1.0);
    }

    #[test]
    fn test_constant_column_is_zero() {
        let data = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let z = standardize_columns(&data);
        assert!(z.column(0).iter().all(|&x| x == 0.0));
        assert!(z.column(1).iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_single_series() {
        let z = standardize(array![1.0, 3.0].view());
        assert_relative_eq!(z[0], -1.0);
        assert_relative_eq!(z[1], 1.0);
    }

    #[test]
    fn test_empty() {
        let data = Array2::<f64>::zeros((0, 3));
        let z = standardize_columns(&data);
        assert_eq!(z.dim(), (0, 3));
    }
}
