pub mod cost_functions;
pub mod learning_rate;
pub mod network;
pub mod persistence;
pub mod train_item;
pub mod trainer;
