const ROWS_DIFFERENT_LENGTHS: &str = "Cannot take dot product of two &[f64] of unequal length.";

/// Dot product of two row slices.
pub fn dot_product_of_vector_slices(lhs: &[f64], rhs: &[f64]) -> f64 {
    assert_eq!(lhs.len(), rhs.len(), "{}", ROWS_DIFFERENT_LENGTHS);

    let mut sum = 0f64;
    for i in 0..lhs.len() {
        sum += lhs[i] * rhs[i];
    }

    sum
}

/// Calculates the Kronecker Delta given i and j that are equatable to eachother.
pub fn kronecker_delta_f64<I: PartialEq>(i: I, j: I) -> f64 {
    if i == j { 1.0 } else { 0.0 }
}

/// Converts label into a vector of length bounds.
/// If label is not one of 0..bounds, the vector will be zeroes.
pub fn one_hot_encode(label: f64, bounds: usize) -> Vec<f64> {
    (0..bounds)
        .map(|x| kronecker_delta_f64(label, x as f64))
        .collect()
}

/// Argmax. Returns index and value at the index.
/// Ties resolve to the first occurrence.
pub fn vector_row_max(values: &[f64]) -> (usize, f64) {
    let mut max = values[0];
    let mut index = 0;
    for i in 1..values.len() {
        if values[i] > max {
            max = values[i];
            index = i;
        }
    }

    (index, max)
}

/// Argmin. Returns index and value at the index.
/// Ties resolve to the first occurrence.
pub fn vector_row_min(values: &[f64]) -> (usize, f64) {
    let mut min = values[0];
    let mut index = 0;
    for i in 1..values.len() {
        if values[i] < min {
            min = values[i];
            index = i;
        }
    }

    (index, min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_row_max() {
        let tc = vec![2., 5., 7., 3.2, 1.7];
        let (i, m) = vector_row_max(&tc);

        assert_eq!(i, 2);
        assert_eq!(m, 7.);
    }

    #[test]
    fn test_vector_row_max_ties() {
        let tc = vec![1., 9., 3., 9.];
        let (i, m) = vector_row_max(&tc);

        assert_eq!(i, 1);
        assert_eq!(m, 9.);
    }

    #[test]
    fn test_vector_row_min() {
        let tc = vec![2., -5., 7., -5., 1.7];
        let (i, m) = vector_row_min(&tc);

        assert_eq!(i, 1);
        assert_eq!(m, -5.);
    }

    #[test]
    fn test_kronecker() {
        let actual = kronecker_delta_f64(3, 0);
        assert_eq!(actual, 0.);

        let actual = kronecker_delta_f64(0, 0);
        assert_eq!(actual, 1.);

        let actual = kronecker_delta_f64(5., 5.);
        assert_eq!(actual, 1.);
    }

    #[test]
    fn test_one_hot_encode() {
        let actual = one_hot_encode(3., 5);
        let expected = vec![0., 0., 0., 1., 0.];

        assert_eq!(actual, expected);

        let actual = one_hot_encode(7., 3);
        assert_eq!(actual, vec![0., 0., 0.]);
    }

    #[test]
    fn test_dot_product_of_slices() {
        let lhs = &[1., 2., 3., 4.];
        let rhs = &[10., 20., 30., 40.];

        let actual = dot_product_of_vector_slices(lhs, rhs);
        let expected = 300.;

        assert_eq!(actual, expected);
    }

    #[test]
    #[should_panic]
    fn test_invalid_dot_product() {
        let lhs = &[1., 2.];
        let rhs = &[10., 20., 30.];

        dot_product_of_vector_slices(lhs, rhs);
    }
}
