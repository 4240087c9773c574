mod matrix;
mod vector;

pub use matrix::{symmetric_add_gramian, symmetric_jacobi_eigendecomposition};
pub use vector::{vector_add, vector_max, vector_mul, vector_scale};
