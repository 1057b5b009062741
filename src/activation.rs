use crate::linear_algebra::Value;

pub fn sigmoid(x: Value) -> Value {
    1.0 / (1.0 + (-x).exp())
}

/// The derivative of the sigmoid, expressed in terms of the sigmoid's output `s`
/// rather than its input.
pub fn sigmoid_prime(s: Value) -> Value {
    s * (1.0 - s)
}
