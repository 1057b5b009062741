use crate::error::ShapeMismatch;
use crate::layer::Layer;
use crate::linear_algebra::{check_shape, Matrix, Value, Vector};
use crate::network::Network;

/// Weight and bias gradients summed over a mini-batch, shaped like a network's layers.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    weight_gradients: Vec<Matrix>,
    bias_gradients: Vec<Vector>,
}

impl Gradients {
    pub fn zeros(network: &Network) -> Self {
        Self {
            weight_gradients: network
                .layers()
                .iter()
                .map(|layer| Matrix::zeros(layer.outputs(), layer.inputs()))
                .collect(),
            bias_gradients: network
                .layers()
                .iter()
                .map(|layer| Vector::zeros(layer.outputs()))
                .collect(),
        }
    }

    pub fn weight_gradients(&self) -> &[Matrix] {
        &self.weight_gradients
    }

    pub fn bias_gradients(&self) -> &[Vector] {
        &self.bias_gradients
    }

    /// Checks that these gradients have the same number and shapes of layers as `layers`.
    pub(crate) fn check_layers(&self, layers: &[Layer]) -> Result<(), ShapeMismatch> {
        check_shape(
            "gradient layers",
            (layers.len(), 1),
            (self.weight_gradients.len(), 1),
        )?;

        for ((layer, weight_gradients), bias_gradients) in layers
            .iter()
            .zip(&self.weight_gradients)
            .zip(&self.bias_gradients)
        {
            check_shape("weight gradients", layer.weights.shape(), weight_gradients.shape())?;
            check_shape("bias gradients", layer.biases.shape(), bias_gradients.shape())?;
        }
        Ok(())
    }

    pub(crate) fn accumulate(
        &mut self,
        layer: usize,
        weight_gradients: &Matrix,
        bias_gradients: &Vector,
    ) -> Result<(), ShapeMismatch> {
        let missing_layer = ShapeMismatch {
            operation: "gradient layer",
            left: (self.weight_gradients.len(), 1),
            right: (layer + 1, 1),
        };

        self.weight_gradients
            .get_mut(layer)
            .ok_or(missing_layer)?
            .add_assign_checked(weight_gradients)?;
        self.bias_gradients
            .get_mut(layer)
            .ok_or(missing_layer)?
            .add_assign_checked(bias_gradients)
    }

    /// Moves every parameter against its gradient: `parameter -= gradient * rate`.
    pub(crate) fn descend(&self, layers: &mut [Layer], rate: Value) -> Result<(), ShapeMismatch> {
        self.check_layers(layers)?;

        for ((layer, weight_gradients), bias_gradients) in layers
            .iter_mut()
            .zip(&self.weight_gradients)
            .zip(&self.bias_gradients)
        {
            layer.weights.sub_assign_checked(&(weight_gradients * rate))?;
            layer.biases.sub_assign_checked(&(bias_gradients * rate))?;
        }
        Ok(())
    }
}
