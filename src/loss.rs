use crate::error::ShapeMismatch;
use crate::linear_algebra::{Value, Vector};

/// Calculates the quadratic cost, half the squared distance between `actual` and `expected`.
pub fn quadratic_cost(actual: &Vector, expected: &Vector) -> Result<Value, ShapeMismatch> {
    let delta = expected.checked_sub(actual)?.map(Value::abs);
    Ok(0.5 * delta.dot(&delta)?)
}

/// Calculates the derivative of the quadratic cost with respect to `actual`.
pub fn quadratic_cost_prime(actual: &Vector, expected: &Vector) -> Result<Vector, ShapeMismatch> {
    actual.checked_sub(expected)
}
