use crate::geoalg::f64_math::map_operations::MapOperation::*;
use crate::geoalg::f64_math::matrix::Matrix;

/// Binary cross-entropy in bits, summed over the output row:
/// sum of -y * log2(a) - (1 - y) * log2(1 - a).
pub fn cross_entropy(predictions: &Matrix, targets: &Matrix) -> f64 {
    let first = targets.map(Negate).elementwise_multiply(&predictions.map(Log2));
    let second = targets.map(OneMinus).elementwise_multiply(&predictions.map(OneMinus).map(Log2));

    first.sub(&second).sum()
}

/// Output layer error for sigmoid activations under cross-entropy: a - y.
/// The sigmoid derivative cancels, so no sigmoid prime term appears.
pub fn cross_entropy_delta(predictions: &Matrix, targets: &Matrix) -> Matrix {
    predictions.sub(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_entropy() {
        let predictions = Matrix::row_vector(vec![0.5, 0.75]);
        let targets = Matrix::row_vector(vec![0., 1.]);

        // -log2(0.5) - log2(0.75)
        let expected = 1. - 0.75f64.log2();
        let actual = cross_entropy(&predictions, &targets);

        assert!((actual - expected).abs() < 1e-12);
    }

    #[test]
    fn test_cross_entropy_perfect_prediction_is_small() {
        let predictions = Matrix::row_vector(vec![1e-9, 1. - 1e-9]);
        let targets = Matrix::row_vector(vec![0., 1.]);

        assert!(cross_entropy(&predictions, &targets) < 1e-6);
    }

    #[test]
    fn test_cross_entropy_delta() {
        let predictions = Matrix::row_vector(vec![0.25, 0.75]);
        let targets = Matrix::row_vector(vec![0., 1.]);

        let actual = cross_entropy_delta(&predictions, &targets);
        let expected = Matrix::row_vector(vec![0.25, -0.25]);

        assert_eq!(actual, expected);
    }
}
