use serde::{Deserialize, Serialize};

/// Scalar operation applied to every element of a matrix by `Matrix::map`.
/// Parameterized operations carry their constant, so a map can be inspected and compared.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MapOperation {
    /// -x
    Negate,
    /// e^x
    Exp,
    /// 1 + x
    OnePlus,
    /// 1 - x
    OneMinus,
    /// 1 / x
    Invert,
    /// log2(x)
    Log2,
    /// c * x
    Scale(f64),
}

impl MapOperation {
    pub fn apply(&self, x: f64) -> f64 {
        match *self {
            MapOperation::Negate => -x,
            MapOperation::Exp => x.exp(),
            MapOperation::OnePlus => 1. + x,
            MapOperation::OneMinus => 1. - x,
            MapOperation::Invert => 1. / x,
            MapOperation::Log2 => x.log2(),
            MapOperation::Scale(c) => c * x,
        }
    }
}
