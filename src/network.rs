use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, trace_span};

use crate::activation::sigmoid;
use crate::error::ShapeMismatch;
use crate::layer::{activation_forward, fully_connected_forward, Layer};
use crate::linear_algebra::{check_shape, Value, Vector};
use crate::rng;

pub const DEFAULT_LEARNING_RATE: Value = 0.1;

/// A fully connected feedforward network with sigmoid activations on every layer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    pub(crate) layers: Vec<Layer>,
    /// Always non-negative. Training descends by this amount per unit of averaged gradient.
    pub(crate) learning_rate: Value,
}

#[derive(Deserialize)]
struct RawNetwork {
    layers: Vec<Layer>,
    learning_rate: Value,
}

impl TryFrom<RawNetwork> for Network {
    type Error = ShapeMismatch;

    fn try_from(raw: RawNetwork) -> Result<Self, Self::Error> {
        Self::from_layers(raw.layers, raw.learning_rate)
    }
}

impl Network {
    /// Builds a network with one layer per adjacent pair of sizes in `topology`.
    /// Only the magnitude of `learning_rate` is used.
    pub fn new(topology: &[usize], learning_rate: Value) -> Self {
        rng::with_rng(|rng| Self::random(topology, learning_rate, rng))
    }

    pub fn random(topology: &[usize], learning_rate: Value, rng: &mut impl Rng) -> Self {
        let mut layers = Vec::with_capacity(topology.len().saturating_sub(1));
        for sizes in topology.windows(2) {
            layers.push(Layer::random(sizes[0], sizes[1], rng));
        }

        info!(?topology, learning_rate, "Initialized network.");

        Self {
            layers,
            learning_rate: learning_rate.abs(),
        }
    }

    /// Builds a network from explicit layers, each of which must accept the previous layer's outputs.
    pub fn from_layers(layers: Vec<Layer>, learning_rate: Value) -> Result<Self, ShapeMismatch> {
        for pair in layers.windows(2) {
            check_shape(
                "layer chain",
                (pair[0].outputs(), 1),
                (pair[1].inputs(), 1),
            )?;
        }

        Ok(Self {
            layers,
            learning_rate: learning_rate.abs(),
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn learning_rate(&self) -> Value {
        self.learning_rate
    }

    /// The layer sizes from input to output. Empty if the network has no layers.
    pub fn topology(&self) -> Vec<usize> {
        match self.layers.first() {
            Some(first) => std::iter::once(first.inputs())
                .chain(self.layers.iter().map(Layer::outputs))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the activation trace: `input` followed by the output of every layer.
    pub fn propagate_forward(&self, input: &Vector) -> Result<Vec<Vector>, ShapeMismatch> {
        let _span = trace_span!("Network::propagate_forward").entered();

        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input.clone());

        for layer in &self.layers {
            let previous = &activations[activations.len() - 1];
            let fully_connected = fully_connected_forward(previous, &layer.weights, &layer.biases)?;
            activations.push(activation_forward(&fully_connected, sigmoid));
        }

        Ok(activations)
    }

    /// Returns only the output layer's activations.
    pub fn predict(&self, input: &Vector) -> Result<Vector, ShapeMismatch> {
        self.layers.iter().try_fold(input.clone(), |activation, layer| {
            let fully_connected = fully_connected_forward(&activation, &layer.weights, &layer.biases)?;
            Ok(activation_forward(&fully_connected, sigmoid))
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    use crate::linear_algebra::Matrix;

    fn network(topology: &[usize]) -> Network {
        Network::random(topology, DEFAULT_LEARNING_RATE, &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn construction() {
        let n = network(&[4, 3, 2]);

        assert_eq!(n.layers().len(), 2);
        assert_eq!(n.layers()[0].weights().shape(), (3, 4));
        assert_eq!(n.layers()[0].biases().shape(), (3, 1));
        assert_eq!(n.layers()[1].weights().shape(), (2, 3));
        assert_eq!(n.layers()[1].biases().shape(), (2, 1));
        assert_eq!(n.topology(), vec![4, 3, 2]);
        assert_eq!(n.learning_rate(), 0.1);
    }

    #[test]
    fn learning_rate_magnitude() {
        let n = Network::random(&[2, 1], -0.5, &mut StdRng::seed_from_u64(3));
        assert_eq!(n.learning_rate(), 0.5);
    }

    #[test]
    fn instances_do_not_share_parameters() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = Network::random(&[3, 2, 1], 0.1, &mut rng);
        let b = Network::random(&[3, 2, 1], 0.1, &mut rng);
        assert_ne!(a, b);

        let mut c = a.clone();
        c.layers[0].weights *= 2.0;
        assert_ne!(a, c);

        let replay = Network::random(&[3, 2, 1], 0.1, &mut StdRng::seed_from_u64(11));
        assert_eq!(a.layers()[0], replay.layers()[0]);
    }

    #[test]
    fn short_topology() {
        let n = network(&[5]);
        assert!(n.layers().is_empty());
        assert!(n.topology().is_empty());

        let input = Vector::from([1.0, 2.0]);
        assert_eq!(n.propagate_forward(&input), Ok(vec![input.clone()]));
        assert_eq!(n.predict(&input), Ok(input));
    }

    #[test]
    fn from_layers() {
        let first = Layer::new(Matrix::zeros(3, 2), Vector::zeros(3)).unwrap();
        let second = Layer::new(Matrix::zeros(1, 3), Vector::zeros(1)).unwrap();
        let n = Network::from_layers(vec![first.clone(), second], 0.2).unwrap();
        assert_eq!(n.topology(), vec![2, 3, 1]);

        let bad = Layer::new(Matrix::zeros(1, 4), Vector::zeros(1)).unwrap();
        assert_eq!(
            Network::from_layers(vec![first, bad], 0.2),
            Err(ShapeMismatch {
                operation: "layer chain",
                left: (3, 1),
                right: (4, 1),
            }),
        );
    }

    #[test]
    fn trace_shape() {
        let topology = [3, 5, 4, 2];
        let n = network(&topology);

        let activations = n.propagate_forward(&Vector::from([0.2, -0.7, 1.0])).unwrap();
        assert_eq!(activations.len(), topology.len());
        for (activation, &size) in activations.iter().zip(&topology) {
            assert_eq!(activation.len(), size);
        }
    }

    #[test]
    fn activations_are_bounded() {
        let n = network(&[3, 6, 6, 2]);

        for input in [
            Vector::from([0.0, 0.0, 0.0]),
            Vector::from([1.0, -1.0, 0.5]),
            Vector::from([5.0, 3.0, -4.0]),
            Vector::from([-10.0, 10.0, 2.5]),
        ] {
            let activations = n.propagate_forward(&input).unwrap();
            for activation in &activations[1..] {
                assert!(activation.iter().all(|&a| a > 0.0 && a < 1.0), "{activation:?}");
            }
        }
    }

    #[test]
    fn forward_is_deterministic() {
        let n = network(&[2, 4, 3]);
        let input = Vector::from([0.3, 0.9]);

        let first = n.propagate_forward(&input).unwrap();
        let second = n.propagate_forward(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(n.predict(&input).unwrap(), first[first.len() - 1]);
    }

    #[test]
    fn known_weights() {
        let hidden = Layer::new([[1.0, -1.0], [0.5, 0.5]].into(), Vector::from([0.0, -1.0])).unwrap();
        let output = Layer::new([[2.0, -2.0]].into(), Vector::from([0.5])).unwrap();
        let n = Network::from_layers(vec![hidden, output], 0.1).unwrap();

        let activations = n.propagate_forward(&Vector::from([2.0, 1.0])).unwrap();

        let h = [sigmoid(1.0), sigmoid(0.5)];
        assert_eq!(activations[1], Vector::from(h));
        assert_eq!(
            activations[2],
            Vector::from([sigmoid(2.0 * h[0] - 2.0 * h[1] + 0.5)]),
        );
    }

    #[test]
    fn wrong_input_length() {
        let n = network(&[2, 2, 1]);

        assert_eq!(
            n.propagate_forward(&Vector::from([1.0, 2.0, 3.0])),
            Err(ShapeMismatch {
                operation: "matrix-vector product",
                left: (2, 1),
                right: (3, 1),
            }),
        );
        assert!(n.predict(&Vector::from([1.0])).is_err());
    }

    #[test]
    fn serde_round_trip() {
        let n = network(&[3, 2, 1]);
        let json = serde_json::to_string(&n).unwrap();
        let m: Network = serde_json::from_str(&json).unwrap();
        assert_eq!(n, m);
    }

    #[test]
    fn deserialize_checks_layer_chain() {
        let chained = r#"{"layers":[
            {"weights":{"values":[0.0,0.0],"rows":1,"columns":2},"biases":[0.0]},
            {"weights":{"values":[0.0],"rows":1,"columns":1},"biases":[0.0]}
        ],"learning_rate":0.1}"#;
        let n: Network = serde_json::from_str(chained).unwrap();
        assert_eq!(n.topology(), vec![2, 1, 1]);

        let broken = r#"{"layers":[
            {"weights":{"values":[0.0,0.0],"rows":1,"columns":2},"biases":[0.0]},
            {"weights":{"values":[0.0,0.0],"rows":1,"columns":2},"biases":[0.0]}
        ],"learning_rate":0.1}"#;
        assert!(serde_json::from_str::<Network>(broken).is_err());

        let negative_rate = r#"{"layers":[],"learning_rate":-0.5}"#;
        let n: Network = serde_json::from_str(negative_rate).unwrap();
        assert_eq!(n.learning_rate(), 0.5);
    }
}
