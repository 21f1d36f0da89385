use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{ser, Deserialize, Serialize, Serializer};

use crate::error::{NnError, Result};
use super::map_operations::MapOperation;
use super::optimized_functions::*;

/// Persisted form of a matrix: column count and the row-major values.
/// Rows are inferred, so a matrix with rows but no columns has no persisted form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatrixRecord {
    pub columns: usize,
    pub values: Vec<f64>,
}

#[derive(Serialize)]
struct MatrixRecordRef<'a> {
    columns: usize,
    values: &'a [f64],
}

/// Matrix is implemented as a single dimensional vector of f64s.
/// This implementation of Matrix is row-major.
/// Every operation returns a newly allocated matrix; only `set` mutates in place.
#[derive(PartialEq, Debug, Clone, Default, Deserialize)]
#[serde(try_from = "MatrixRecord")]
pub struct Matrix {
    rows: usize,
    columns: usize,
    values: Vec<f64>
}

impl TryFrom<MatrixRecord> for Matrix {
    type Error = NnError;

    fn try_from(record: MatrixRecord) -> Result<Self> {
        if record.columns == 0 {
            if !record.values.is_empty() {
                return Err(NnError::Serialization(format!(
                    "matrix with zero columns holds {} values", record.values.len())));
            }

            return Ok(Matrix::default());
        }

        if record.values.len() % record.columns != 0 {
            return Err(NnError::Serialization(format!(
                "{} values do not fill rows of {} columns", record.values.len(), record.columns)));
        }

        let rows = record.values.len() / record.columns;
        Ok(Matrix::new(rows, record.columns, record.values))
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.columns == 0 && self.rows > 0 {
            return Err(ser::Error::custom(format!(
                "a {} x 0 matrix can not be persisted without losing its rows", self.rows)));
        }

        MatrixRecordRef { columns: self.columns, values: &self.values }.serialize(serializer)
    }
}

impl Matrix {
    /// Returns a new Matrix.
    pub fn new(rows: usize, columns: usize, values: Vec<f64>) -> Self {
        assert_eq!(rows * columns, values.len(), "Value count must equal rows * columns.");

        Self { rows, columns, values }
    }

    /// Creates a 1 x n matrix from the values.
    pub fn row_vector(values: Vec<f64>) -> Self {
        Self::new(1, values.len(), values)
    }

    /// Creates a matrix with rows * columns elements where every element is zero.
    pub fn new_zeroed(rows: usize, columns: usize) -> Self {
        Self::new(rows, columns, vec![0.0f64; rows * columns])
    }

    /// Zero matrix of the same shape as self.
    pub fn zeroed_like(&self) -> Self {
        Self::new_zeroed(self.rows, self.columns)
    }

    /// Matrix with a one at (row, column) and zeros everywhere else.
    pub fn one_hot(rows: usize, columns: usize, row: usize, column: usize) -> Result<Self> {
        let mut m = Self::new_zeroed(rows, columns);
        m.set(row, column, 1.)?;

        Ok(m)
    }

    /// Returns a rows x columns matrix drawn from the standard normal distribution.
    pub fn new_randomized_normal<R: Rng + ?Sized>(rows: usize, columns: usize, rng: &mut R) -> Self {
        let values = (0..rows * columns)
            .map(|_| StandardNormal.sample(rng))
            .collect();

        Self::new(rows, columns, values)
    }

    /// Standard normal values divided by sqrt(rows).
    /// Keeps the variance of a weighted sum over `rows` inputs independent of layer width.
    pub fn new_randomized_normalized<R: Rng + ?Sized>(rows: usize, columns: usize, rng: &mut R) -> Self {
        let scale = 1. / (rows as f64).sqrt();

        Self::new_randomized_normal(rows, columns, rng).scale(scale)
    }

    /// Returns size of underlying vector.
    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.rows == 0 || self.columns == 0 }

    pub fn row_count(&self) -> usize { self.rows }

    pub fn column_count(&self) -> usize { self.columns }

    pub fn shape(&self) -> (usize, usize) { (self.rows, self.columns) }

    /// Returns a slice of the values in row-major order.
    pub fn read_values(&self) -> &[f64] { &self.values }

    fn check_bounds(&self, row: usize, column: usize) -> Result<usize> {
        if row >= self.rows || column >= self.columns {
            return Err(NnError::OutOfRange { row, column, rows: self.rows, columns: self.columns });
        }

        Ok(row * self.columns + column)
    }

    /// Gets value at specified row and column.
    pub fn at(&self, row: usize, column: usize) -> Result<f64> {
        let index = self.check_bounds(row, column)?;
        Ok(self.values[index])
    }

    /// Sets value at specified row and column.
    pub fn set(&mut self, row: usize, column: usize, value: f64) -> Result<()> {
        let index = self.check_bounds(row, column)?;
        self.values[index] = value;

        Ok(())
    }

    /// Returns slice of matrix that is a row of the matrix.
    pub fn row(&self, row_index: usize) -> &[f64] {
        assert!(row_index < self.rows, "Tried to get a row that was out of bounds.");

        let start = row_index * self.columns;
        let end = start + self.columns;
        &self.values[start..end]
    }

    /// Returns a newly allocated matrix that is the transpose of self.
    pub fn transpose(&self) -> Matrix {
        if self.rows <= 1 || self.columns <= 1 {
            return Self::new(self.columns, self.rows, self.values.clone());
        }

        let capacity = self.len();
        let mut transposed = Vec::with_capacity(capacity);
        for i in 0..capacity {
            let index_to_push = self.columns * (i % self.rows) + i / self.rows;
            transposed.push(self.values[index_to_push]);
        }

        Self::new(self.columns, self.rows, transposed)
    }

    fn zip_with(&self, rhs: &Matrix, operation: &'static str, f: fn(f64, f64) -> f64) -> Result<Matrix> {
        if self.shape() != rhs.shape() {
            return Err(NnError::ShapeMismatch { operation, lhs: self.shape(), rhs: rhs.shape() });
        }

        let values = self.values.iter()
            .zip(rhs.values.iter())
            .map(|(&x, &y)| f(x, y))
            .collect();

        Ok(Self::new(self.rows, self.columns, values))
    }

    /// Elementwise sum, failing when shapes differ.
    pub fn try_add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |x, y| x + y)
    }

    /// Elementwise difference, failing when shapes differ.
    pub fn try_sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "subtract", |x, y| x - y)
    }

    /// Elementwise product, failing when shapes differ.
    pub fn try_elementwise_multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "elementwise multiply", |x, y| x * y)
    }

    /// Matrix product, failing when lhs columns differ from rhs rows.
    /// Multiplies rows of self against rows of the transposed rhs.
    pub fn try_dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.columns != rhs.rows {
            return Err(NnError::ShapeMismatch { operation: "dot", lhs: self.shape(), rhs: rhs.shape() });
        }

        let mut floats = Vec::with_capacity(self.rows * rhs.columns);
        let t = rhs.transpose();

        for row in 0..self.rows {
            let ls = self.row(row);
            for t_row in 0..t.rows {
                floats.push(dot_product_of_vector_slices(ls, t.row(t_row)));
            }
        }

        Ok(Self::new(self.rows, rhs.columns, floats))
    }

    /// Adds two matrices of the same order.
    /// Panics on mismatched shapes.
    pub fn add(&self, rhs: &Matrix) -> Matrix {
        self.try_add(rhs).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Panics on mismatched shapes.
    pub fn sub(&self, rhs: &Matrix) -> Matrix {
        self.try_sub(rhs).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Panics on mismatched shapes.
    pub fn elementwise_multiply(&self, rhs: &Matrix) -> Matrix {
        self.try_elementwise_multiply(rhs).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Matrix multiplication. Panics when lhs columns differ from rhs rows.
    pub fn mul(&self, rhs: &Matrix) -> Matrix {
        self.try_dot(rhs).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Applies a named scalar operation to every element.
    pub fn map(&self, operation: MapOperation) -> Matrix {
        self.map_with_capture(|x| operation.apply(x))
    }

    /// Applies an arbitrary scalar function to every element.
    pub fn map_with_capture(&self, func: impl Fn(f64) -> f64) -> Matrix {
        let values = self.values.iter().map(|&val| func(val)).collect();

        Self::new(self.rows, self.columns, values)
    }

    /// Scales matrix by scalar.
    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(MapOperation::Scale(scalar))
    }

    /// Sum of every element.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    fn extreme(&self, find: fn(&[f64]) -> (usize, f64)) -> Result<(usize, f64)> {
        if self.is_empty() {
            return Err(NnError::EmptyMatrix);
        }

        Ok(find(&self.values))
    }

    /// Row-major index of the largest value, first occurrence on ties.
    pub fn max_index(&self) -> Result<usize> {
        Ok(self.extreme(vector_row_max)?.0)
    }

    pub fn max_value(&self) -> Result<f64> {
        Ok(self.extreme(vector_row_max)?.1)
    }

    /// Row-major index of the smallest value, first occurrence on ties.
    pub fn min_index(&self) -> Result<usize> {
        Ok(self.extreme(vector_row_min)?.0)
    }

    pub fn min_value(&self) -> Result<f64> {
        Ok(self.extreme(vector_row_min)?.1)
    }

    /// Logistic function 1 / (1 + e^-x) applied elementwise.
    pub fn sigmoid(&self) -> Matrix {
        self.map(MapOperation::Negate)
            .map(MapOperation::Exp)
            .map(MapOperation::OnePlus)
            .map(MapOperation::Invert)
    }

    /// Derivative of the logistic function, sigmoid(x) * (1 - sigmoid(x)).
    pub fn sigmoid_prime(&self) -> Matrix {
        let s = self.sigmoid();
        s.elementwise_multiply(&s.map(MapOperation::OneMinus))
    }
}

/// Number of digits before the decimal point.
fn integer_digits(value: f64) -> usize {
    let mut value = value.abs();
    let mut digits = 1;
    while value >= 10. {
        value /= 10.;
        digits += 1;
    }

    digits
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widest = self.values.iter().fold(0., |acc: f64, x| acc.max(x.abs()));
        let width = integer_digits(widest) + 5;

        for row in 0..self.rows {
            if row > 0 { writeln!(f)?; }

            write!(f, "|")?;
            for value in self.row(row) {
                write!(f, " {value:>width$.2}")?;
            }
            write!(f, " |")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn assert_close(actual: &Matrix, expected: &Matrix) {
        assert_eq!(actual.shape(), expected.shape());
        for (a, e) in actual.read_values().iter().zip(expected.read_values()) {
            assert!((a - e).abs() < 1e-9, "{a} != {e}");
        }
    }

    #[test]
    fn test_matrix_add() {
        let lhs = Matrix::new(3, 3, vec![
            1., 2., 3.,
            4., 5., 6.,
            7., 8., 9.
        ]);

        let rhs = Matrix::new(3, 3, vec![
            -1., -2., -3.,
            -4., -5., -6.,
            -7., -8., -9.
        ]);

        let actual = lhs.add(&rhs);
        let expected = Matrix::new_zeroed(3, 3);

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_add_then_sub_restores() {
        let rng = &mut StdRng::seed_from_u64(11);
        let a = Matrix::new_randomized_normal(4, 6, rng);
        let b = Matrix::new_randomized_normal(4, 6, rng);

        let actual = a.try_add(&b).unwrap().try_sub(&b).unwrap();

        assert_close(&actual, &a);
    }

    #[test]
    fn test_elementwise_multiply() {
        let lhs = Matrix::new(2, 2, vec![1., 2., 3., 4.]);
        let rhs = Matrix::new(2, 2, vec![5., 6., 7., 8.]);

        let actual = lhs.elementwise_multiply(&rhs);
        let expected = Matrix::new(2, 2, vec![5., 12., 21., 32.]);

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_mismatched_shapes() {
        let lhs = Matrix::new_zeroed(2, 3);
        let rhs = Matrix::new_zeroed(3, 2);

        assert!(matches!(lhs.try_add(&rhs), Err(NnError::ShapeMismatch { operation: "add", .. })));
        assert!(matches!(lhs.try_sub(&rhs), Err(NnError::ShapeMismatch { operation: "subtract", .. })));
        assert!(matches!(lhs.try_elementwise_multiply(&rhs), Err(NnError::ShapeMismatch { .. })));
        assert!(matches!(lhs.try_dot(&lhs), Err(NnError::ShapeMismatch { operation: "dot", .. })));
    }

    #[test]
    #[should_panic]
    fn test_unchecked_add_panics() {
        Matrix::new_zeroed(1, 2).add(&Matrix::new_zeroed(2, 1));
    }

    #[test]
    fn transpose_test() {
        let m = Matrix::new(5, 4, vec![
            0., 1., 2., 3.,
            4., 5., 6., 7.,
            8., 9., 10., 11.,
            12., 13., 14., 15.,
            16., 17., 18., 19.
        ]);

        let expected = Matrix::new(4, 5, vec![
            0., 4., 8., 12., 16.,
            1., 5., 9., 13., 17.,
            2., 6., 10., 14., 18.,
            3., 7., 11., 15., 19.
        ]);

        let actual = m.transpose();
        assert_eq!(actual, expected);
    }

    #[test]
    fn transpose_vector() {
        let m = Matrix::row_vector(vec![1., 2., 3.]);
        let actual = m.transpose();

        assert_eq!(actual.shape(), (3, 1));
        assert_eq!(actual.read_values(), &[1., 2., 3.]);
    }

    #[test]
    fn matrix_mul() {
        let lhs = Matrix::new(4, 3, vec![
            1., 2., 3.,
            4., 5., 6.,
            7., 8., 9.,
            10., 11., 12.
        ]);

        let rhs = Matrix::new(3, 5, vec![
            1., 2., 3., 4., 5.,
            6., 7., 8., 9., 10.,
            11., 12., 13., 14., 15.
        ]);

        // Resultant matrix has as many rows as lhs, and as many columns as rhs.
        let expected = Matrix::new(4, 5, vec![
            46., 52., 58., 64., 70.,
            100., 115., 130., 145., 160.,
            154., 178., 202., 226., 250.,
            208., 241., 274., 307., 340.
        ]);

        let actual = lhs.mul(&rhs);

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_dot_transpose_identity() {
        let rng = &mut StdRng::seed_from_u64(3);
        let a = Matrix::new_randomized_normal(3, 4, rng);
        let b = Matrix::new_randomized_normal(4, 2, rng);

        let lhs = a.try_dot(&b).unwrap().transpose();
        let rhs = b.transpose().try_dot(&a.transpose()).unwrap();

        assert_close(&lhs, &rhs);
    }

    #[test]
    fn test_at_and_set() {
        let mut m = Matrix::new_zeroed(2, 3);
        m.set(1, 2, 4.5).unwrap();

        assert_eq!(m.at(1, 2).unwrap(), 4.5);
        assert_eq!(m.read_values(), &[0., 0., 0., 0., 0., 4.5]);

        assert!(matches!(m.at(2, 0), Err(NnError::OutOfRange { row: 2, column: 0, .. })));
        assert!(matches!(m.set(0, 3, 1.), Err(NnError::OutOfRange { .. })));
    }

    #[test]
    fn test_one_hot() {
        let actual = Matrix::one_hot(1, 4, 0, 2).unwrap();
        assert_eq!(actual.read_values(), &[0., 0., 1., 0.]);

        assert!(Matrix::one_hot(1, 4, 0, 4).is_err());
    }

    #[test]
    fn test_extremes() {
        let m = Matrix::new(2, 3, vec![
            3., -1., 7.,
            7., -1., 2.
        ]);

        assert_eq!(m.max_index().unwrap(), 2);
        assert_eq!(m.max_value().unwrap(), 7.);
        assert_eq!(m.min_index().unwrap(), 1);
        assert_eq!(m.min_value().unwrap(), -1.);
    }

    #[test]
    fn test_extremes_of_empty() {
        let m = Matrix::new_zeroed(0, 3);

        assert!(matches!(m.max_index(), Err(NnError::EmptyMatrix)));
        assert!(matches!(m.min_value(), Err(NnError::EmptyMatrix)));
    }

    #[test]
    fn test_sum() {
        let m = Matrix::new(2, 2, vec![1., 2., 3., -4.5]);
        assert_eq!(m.sum(), 1.5);
    }

    #[test]
    fn test_map() {
        let m = Matrix::new(1, 3, vec![1., -2., 4.]);

        assert_eq!(m.map(MapOperation::Negate).read_values(), &[-1., 2., -4.]);
        assert_eq!(m.scale(0.5).read_values(), &[0.5, -1., 2.]);
        assert_eq!(m.map_with_capture(|x| x * x).read_values(), &[1., 4., 16.]);
    }

    #[test]
    fn test_sigmoid() {
        let m = Matrix::row_vector(vec![-30., -2.5, -0.1, 0., 0.1, 2.5, 30.]);
        let s = m.sigmoid();

        for (x, y) in m.read_values().iter().zip(s.read_values()) {
            assert!(*y > 0. && *y < 1.);
            assert!((y - 1. / (1. + (-x).exp())).abs() < 1e-12);
        }

        assert_eq!(s.at(0, 3).unwrap(), 0.5);
    }

    #[test]
    fn test_sigmoid_prime() {
        let m = Matrix::row_vector(vec![-3., -0.5, 0., 0.5, 3.]);
        let s = m.sigmoid();
        let expected = s.elementwise_multiply(&s.map(MapOperation::OneMinus));

        assert_close(&m.sigmoid_prime(), &expected);
        assert_eq!(m.sigmoid_prime().at(0, 2).unwrap(), 0.25);
    }

    #[test]
    fn test_normalized_init_scale() {
        let rng = &mut StdRng::seed_from_u64(5);
        let plain = Matrix::new_randomized_normal(16, 2, rng);

        let rng = &mut StdRng::seed_from_u64(5);
        let normalized = Matrix::new_randomized_normalized(16, 2, rng);

        assert_close(&normalized, &plain.scale(0.25));
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Matrix::new_zeroed(2, 2);
        let mut copy = original.clone();
        copy.set(0, 0, 9.).unwrap();

        assert_eq!(original.at(0, 0).unwrap(), 0.);
        assert_eq!(copy.at(0, 0).unwrap(), 9.);
    }

    #[test]
    fn test_serialized_form() {
        let m = Matrix::new(2, 2, vec![1., 2.5, -3., 4.]);
        let json = serde_json::to_string(&m).unwrap();

        assert_eq!(json, r#"{"columns":2,"values":[1.0,2.5,-3.0,4.0]}"#);

        let restored: Matrix = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, m);
    }

    #[test]
    fn test_serialized_round_trip_is_exact() {
        let rng = &mut StdRng::seed_from_u64(17);
        let m = Matrix::new_randomized_normalized(7, 3, rng);

        let restored: Matrix = serde_json::from_str(&serde_json::to_string(&m).unwrap()).unwrap();

        assert_eq!(restored, m);
    }

    #[test]
    fn test_zero_column_matrix_is_not_persisted() {
        let m = Matrix::new_zeroed(3, 0);

        assert!(serde_json::to_string(&m).is_err());
    }

    #[test]
    fn test_empty_matrix_round_trip() {
        let json = serde_json::to_string(&Matrix::default()).unwrap();
        assert_eq!(json, r#"{"columns":0,"values":[]}"#);

        let restored: Matrix = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.shape(), (0, 0));
    }

    #[test]
    fn test_malformed_record() {
        let actual = serde_json::from_str::<Matrix>(r#"{"columns":2,"values":[1.0,2.0,3.0]}"#);
        assert!(actual.is_err());

        let actual = serde_json::from_str::<Matrix>(r#"{"columns":0,"values":[1.0]}"#);
        assert!(actual.is_err());
    }

    #[test]
    fn test_display() {
        let m = Matrix::new(2, 2, vec![1., 22.5, -3., 4.]);
        let actual = m.to_string();

        assert_eq!(actual, "|    1.00   22.50 |\n|   -3.00    4.00 |");
    }
}
