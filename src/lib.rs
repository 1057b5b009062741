pub use self::error::ShapeMismatch;
pub use self::gradient_descent::Gradients;
pub use self::layer::Layer;
pub use self::network::{Network, DEFAULT_LEARNING_RATE};
pub use self::training::Sample;

pub mod activation;
pub mod linear_algebra;
pub mod loss;

mod error;
mod gradient_descent;
mod layer;
mod network;
mod rng;
mod training;
