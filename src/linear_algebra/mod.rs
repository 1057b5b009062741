pub use self::matrix::Matrix;
pub use self::vector::Vector;

use crate::error::ShapeMismatch;

mod matrix;
mod vector;

pub type Value = f64;

/// Rows by columns. Vectors are columns, so a vector of length `n` is `(n, 1)`.
pub type Shape = (usize, usize);

pub trait ValueType {
    const ZERO: Self;
    const ONE: Self;
}

impl ValueType for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
}

pub(crate) fn check_shape(
    operation: &'static str,
    left: Shape,
    right: Shape,
) -> Result<(), ShapeMismatch> {
    if left == right {
        Ok(())
    } else {
        Err(ShapeMismatch {
            operation,
            left,
            right,
        })
    }
}
