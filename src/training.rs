use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, trace_span};

use crate::activation::sigmoid_prime;
use crate::error::ShapeMismatch;
use crate::gradient_descent::Gradients;
use crate::layer::{activation_backward, fully_connected_backward, fully_connected_input_gradients};
use crate::linear_algebra::{Value, Vector};
use crate::loss::{quadratic_cost, quadratic_cost_prime};
use crate::network::Network;
use crate::rng;

/// An input and the output the network is expected to produce for it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Sample {
    pub input: Vector,
    pub expected: Vector,
}

impl Sample {
    pub fn new(input: impl Into<Vector>, expected: impl Into<Vector>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
        }
    }
}

impl Network {
    /// Runs one sample forward and adds its weight and bias gradients to `gradients`.
    pub fn backpropagate(
        &self,
        sample: &Sample,
        gradients: &mut Gradients,
    ) -> Result<(), ShapeMismatch> {
        let _span = trace_span!("Network::backpropagate").entered();

        gradients.check_layers(&self.layers)?;

        let activations = self.propagate_forward(&sample.input)?;

        let output = &activations[activations.len() - 1];
        let output_gradients = quadratic_cost_prime(output, &sample.expected)?;
        let mut error = activation_backward(output, &output_gradients, sigmoid_prime)?;

        for (index, layer) in self.layers.iter().enumerate().rev() {
            // activations[index] is this layer's input.
            let (weight_gradients, bias_gradients) =
                fully_connected_backward(&activations[index], &error);
            gradients.accumulate(index, &weight_gradients, &bias_gradients)?;

            if index > 0 {
                let input_gradients = fully_connected_input_gradients(&error, &layer.weights)?;
                error = activation_backward(&activations[index], &input_gradients, sigmoid_prime)?;
            }
        }

        Ok(())
    }

    /// Trains with mini-batch stochastic gradient descent.
    ///
    /// Each epoch shuffles all of `samples` in place and trains on the first `batch_size` of
    /// them, so a small batch size won't necessarily visit every sample. A `batch_size` larger
    /// than the dataset is clamped to it.
    pub fn train(
        &mut self,
        samples: &mut [Sample],
        epochs: usize,
        batch_size: usize,
    ) -> Result<(), ShapeMismatch> {
        rng::with_rng(|rng| self.train_with_rng(samples, epochs, batch_size, rng))
    }

    pub fn train_with_rng(
        &mut self,
        samples: &mut [Sample],
        epochs: usize,
        batch_size: usize,
        rng: &mut impl Rng,
    ) -> Result<(), ShapeMismatch> {
        let _span = trace_span!("Network::train", epochs, batch_size).entered();

        let batch_size = if batch_size > samples.len() {
            trace!(samples = samples.len(), "Clamping batch size to the dataset.");
            samples.len()
        } else {
            batch_size
        };

        // An empty batch isn't guarded against; the division makes the update non-finite.
        let rate = self.learning_rate / batch_size as Value;

        for epoch in 0..epochs {
            debug!(epoch, batch_size, "Training epoch.");

            samples.shuffle(rng);

            let mut gradients = Gradients::zeros(self);
            for sample in &samples[..batch_size] {
                self.backpropagate(sample, &mut gradients)?;
            }

            gradients.descend(&mut self.layers, rate)?;
        }

        Ok(())
    }

    /// The quadratic cost of the network's output for `sample`.
    pub fn cost(&self, sample: &Sample) -> Result<Value, ShapeMismatch> {
        quadratic_cost(&self.predict(&sample.input)?, &sample.expected)
    }
}
