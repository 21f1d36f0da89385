pub mod f64_math;
