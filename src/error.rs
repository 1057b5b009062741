use thiserror::Error;

use crate::linear_algebra::Shape;

/// Two operands of a matrix or vector operation disagree on their dimensions.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("shape mismatch in {operation}: {left:?} against {right:?}")]
pub struct ShapeMismatch {
    pub operation: &'static str,
    pub left: Shape,
    pub right: Shape,
}
