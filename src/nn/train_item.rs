use crate::error::{NnError, Result};
use crate::geoalg::f64_math::matrix::Matrix;
use crate::geoalg::f64_math::optimized_functions::one_hot_encode;

/// One labeled example: a 1 x n input row, its class label and the number of classes.
/// Immutable once constructed.
#[derive(PartialEq, Debug, Clone)]
pub struct TrainItem {
    values: Matrix,
    label: f64,
    distinct: usize,
}

impl TrainItem {
    /// Creates an item from raw features.
    /// The label must be a whole number in 0..distinct so it can index the one-hot target exactly.
    pub fn new(values: Vec<f64>, label: f64, distinct: usize) -> Result<Self> {
        if label < 0. || label.fract() != 0. || label >= distinct as f64 {
            return Err(NnError::InvalidLabel { label, distinct });
        }

        Ok(Self {
            values: Matrix::row_vector(values),
            label,
            distinct,
        })
    }

    pub fn values(&self) -> &Matrix { &self.values }

    pub fn label(&self) -> f64 { self.label }

    pub fn distinct(&self) -> usize { self.distinct }

    /// 1 x distinct target row with a one at the label.
    pub fn one_hot_target(&self) -> Matrix {
        Matrix::row_vector(one_hot_encode(self.label, self.distinct))
    }
}
