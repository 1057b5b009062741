use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::ShapeMismatch;
use crate::linear_algebra::{check_shape, Matrix, Value, Vector};

/// One fully connected layer, mapping `inputs()` activations to `outputs()` activations.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "RawLayer")]
pub struct Layer {
    pub(crate) weights: Matrix,
    pub(crate) biases: Vector,
}

#[derive(Deserialize)]
struct RawLayer {
    weights: Matrix,
    biases: Vector,
}

impl TryFrom<RawLayer> for Layer {
    type Error = ShapeMismatch;

    fn try_from(raw: RawLayer) -> Result<Self, Self::Error> {
        Self::new(raw.weights, raw.biases)
    }
}

impl Layer {
    /// `weights` is `outputs × inputs`; `biases` must have one entry per output.
    pub fn new(weights: Matrix, biases: Vector) -> Result<Self, ShapeMismatch> {
        check_shape("layer biases", (weights.rows(), 1), biases.shape())?;
        Ok(Self { weights, biases })
    }

    /// Draws every weight and bias independently from a uniform distribution on [-1, 1].
    pub fn random(inputs: usize, outputs: usize, rng: &mut impl Rng) -> Self {
        let uniform_distribution = Uniform::new_inclusive(-1.0, 1.0);

        let mut weights = Matrix::zeros(outputs, inputs);
        weights
            .values_mut()
            .for_each(|x| *x = uniform_distribution.sample(rng));

        let mut biases = Vector::zeros(outputs);
        biases
            .iter_mut()
            .for_each(|x| *x = uniform_distribution.sample(rng));

        Self { weights, biases }
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Vector {
        &self.biases
    }

    pub fn inputs(&self) -> usize {
        self.weights.columns()
    }

    pub fn outputs(&self) -> usize {
        self.weights.rows()
    }
}

pub(crate) fn fully_connected_forward(
    inputs: &Vector,
    weights: &Matrix,
    biases: &Vector,
) -> Result<Vector, ShapeMismatch> {
    let mut outputs = weights.mul_vector(inputs)?;
    outputs.add_assign_checked(biases)?;
    Ok(outputs)
}

/// Returns the weight and bias gradients of a layer given the gradients at its
/// pre-activation outputs.
pub(crate) fn fully_connected_backward(
    inputs: &Vector,
    output_gradients: &Vector,
) -> (Matrix, Vector) {
    let weight_gradients = Matrix::outer(output_gradients, inputs);
    let bias_gradients = output_gradients.clone();

    (weight_gradients, bias_gradients)
}

/// Carries output gradients back through the weights to the layer's inputs.
pub(crate) fn fully_connected_input_gradients(
    output_gradients: &Vector,
    weights: &Matrix,
) -> Result<Vector, ShapeMismatch> {
    weights.transpose_mul_vector(output_gradients)
}

pub(crate) fn activation_forward(inputs: &Vector, activation: impl Fn(Value) -> Value) -> Vector {
    inputs.map(activation)
}

/// `activation_prime` takes the activation's outputs, not its inputs.
pub(crate) fn activation_backward(
    outputs: &Vector,
    output_gradients: &Vector,
    activation_prime: impl Fn(Value) -> Value,
) -> Result<Vector, ShapeMismatch> {
    output_gradients.hadamard(&outputs.map(activation_prime))
}
