pub mod error;
pub mod geoalg;
pub mod nn;
pub mod partition;
pub mod partitioner;
pub mod statistics;
pub mod timed;

pub use error::{NnError, Result};
pub use geoalg::f64_math::map_operations::MapOperation;
pub use geoalg::f64_math::matrix::Matrix;
pub use nn::network::{Gradients, Network};
pub use nn::train_item::TrainItem;
pub use nn::trainer::{EpochReport, LogReporter, Reporter, TrainingHyperParameters, TrainingOutcome};
