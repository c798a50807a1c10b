//! Engagement feature: the mean of the standardized interaction counters.

use crate::scaler::standardize_columns;
use ndarray::{Array1, Array2, Axis};
use pulse_core::Engagement;

/// Counter matrix with columns likes, retweets, replies, quotes.
pub fn engagement_matrix<'a, I>(counters: I) -> Array2<f64>
where
    I: IntoIterator<Item = &'a Engagement>,
{
    let rows: Vec<[f64; 4]> = counters.into_iter().map(Engagement::as_array).collect();
    let mut matrix = Array2::zeros((rows.len(), 4));
    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            matrix[[i, j]] = *value;
        }
    }
    matrix
}

/// Standardize each counter across the dataset and average per record.
pub fn engagement_scores<'a, I>(counters: I) -> Array1<f64>
where
    I: IntoIterator<Item = &'a Engagement>,
{
    let z = standardize_columns(&engagement_matrix(counters));
    if z.nrows() == 0 {
        return Array1::zeros(0);
    }
    z.mean_axis(Axis(1)).unwrap_or_else(|| Array1::zeros(z.nrows()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn counters(likes: u64, retweets: u64, replies: u64, quotes: u64) -> Engagement {
        Engagement {
            like_count: likes,
            retweet_count: retweets,
            reply_count: replies,
            quote_count: quotes,
        }
    }

    #[test]
    fn test_matrix_layout() {
        let m = engagement_matrix(&[counters(1, 2, 3, 4)]);
        assert_eq!(m.row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_more_engagement_scores_higher() {
        let data = vec![counters(0, 0, 0, 0), counters(10, 5, 2, 1), counters(100, 50, 20, 10)];
        let scores = engagement_scores(&data);
        assert!(scores[0] < scores[1]);
        assert!(scores[1] < scores[2]);
        assert_relative_eq!(scores.sum(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_counters_are_zero() {
        let data = vec![counters(3, 3, 3, 3); 5];
        let scores = engagement_scores(&data);
        assert!(scores.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_empty() {
        assert_eq!(engagement_scores(&[]).len(), 0);
    }
}
