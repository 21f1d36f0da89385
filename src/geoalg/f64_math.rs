pub mod map_operations;
pub mod matrix;
pub mod optimized_functions;
