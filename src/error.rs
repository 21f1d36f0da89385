use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Errors surfaced by the user facing entry points of the crate.
/// Shape disagreements inside forward and backward propagation are invariant violations and panic instead.
#[derive(Error, Debug)]
pub enum NnError {
    /// Operand dimensions are incompatible for the requested operation.
    #[error("Shape mismatch in {operation}: lhs is {lhs:?}, rhs is {rhs:?}")]
    ShapeMismatch {
        operation: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    /// Indexed access outside of a matrix.
    #[error("Index ({row}, {column}) is outside of a {rows} x {columns} matrix")]
    OutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    /// Max or min queried on a matrix without elements.
    #[error("Cannot query extreme value of an empty matrix")]
    EmptyMatrix,

    /// Label that can not index a one-hot target of `distinct` classes.
    #[error("Label {label} is not a class index below {distinct}")]
    InvalidLabel {
        label: f64,
        distinct: usize,
    },

    /// Persisted data does not describe a valid matrix or network.
    #[error("Malformed persisted data: {0}")]
    Serialization(String),

    /// Training hyperparameters that can not drive a training run.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
