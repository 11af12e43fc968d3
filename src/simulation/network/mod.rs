//! Feedforward threshold network controlling autonomous vehicles.
//!
//! The network is a fixed-topology multi-layer perceptron whose units fire
//! `1` when their weighted input sum exceeds the unit's bias and `0`
//! otherwise. Parameters are evolved by [`Network::mutate`], never by
//! gradients.

use ndarray::{Array1, Array2, ShapeError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod layer;
pub mod mutation;

pub use layer::{Layer, LayerSnapshot};
pub use mutation::MutationStrength;

/// Errors raised when building, loading or running a network.
#[derive(Debug, Error, PartialEq)]
pub enum NetworkError {
    /// A network needs at least one layer.
    #[error("network must contain at least one layer")]
    EmptyNetwork,
    /// A shape needs an input size and at least one further layer size.
    #[error("network shape needs at least two sizes, got {0}")]
    ShapeTooShort(usize),
    /// A layer has no inputs or no outputs.
    #[error("layer {layer} has zero-sized dimensions")]
    ZeroSizedLayer {
        /// Index of the offending layer.
        layer: usize,
    },
    /// The weight matrix has the wrong number of rows.
    #[error("layer {layer} has {actual} weight rows, expected {expected}")]
    WeightRows {
        /// Index of the offending layer.
        layer: usize,
        /// Declared input count.
        expected: usize,
        /// Rows found.
        actual: usize,
    },
    /// A weight row has the wrong number of columns.
    #[error("layer {layer} weight row {row} has {actual} columns, expected {expected}")]
    WeightColumns {
        /// Index of the offending layer.
        layer: usize,
        /// Index of the offending row.
        row: usize,
        /// Declared output count.
        expected: usize,
        /// Columns found.
        actual: usize,
    },
    /// The bias vector has the wrong length.
    #[error("layer {layer} has {actual} biases, expected {expected}")]
    BiasLength {
        /// Index of the offending layer.
        layer: usize,
        /// Declared output count.
        expected: usize,
        /// Biases found.
        actual: usize,
    },
    /// A layer's input count differs from the previous layer's output count.
    #[error("layer {layer} takes {actual} inputs but the previous layer yields {expected}")]
    MismatchedTopology {
        /// Index of the offending layer.
        layer: usize,
        /// Output count of the previous layer.
        expected: usize,
        /// Input count of this layer.
        actual: usize,
    },
    /// Inference was called with the wrong number of inputs.
    #[error("expected {expected} inputs, got {actual}")]
    InputSize {
        /// Layer input count.
        expected: usize,
        /// Inputs supplied.
        actual: usize,
    },
    /// Mutation strength outside `[0, 1]`.
    #[error("mutation strength {0} must be between 0.0 and 1.0")]
    InvalidMutationStrength(f64),
    /// Parameter arrays could not be shaped into a matrix.
    #[error("invalid weight matrix: {0}")]
    Shape(#[from] ShapeError),
}

/// Persisted form of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerData {
    /// Number of inputs; must equal the number of weight rows.
    pub input_count: usize,
    /// Number of outputs; must equal the bias count and every row's length.
    pub output_count: usize,
    /// One bias per output.
    pub biases: Vec<f64>,
    /// `weights[i][j]` is the influence of input `i` on output `j`.
    pub weights: Vec<Vec<f64>>,
}

/// Persisted form of a network: its layers in inference order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    /// Layers from input to output.
    pub layers: Vec<LayerData>,
}

/// Ordered stack of threshold layers.
///
/// Serializes through [`NetworkData`], so loading validates every dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "NetworkData", try_from = "NetworkData")]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Creates a randomly initialized network from a shape such as
    /// `[ray_count, 6, 4]`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, shape: &[usize]) -> Result<Self, NetworkError> {
        if shape.len() < 2 {
            return Err(NetworkError::ShapeTooShort(shape.len()));
        }
        if let Some(index) = shape.iter().position(|&size| size == 0) {
            return Err(NetworkError::ZeroSizedLayer {
                layer: index.saturating_sub(1),
            });
        }

        let layers = shape
            .windows(2)
            .map(|pair| Layer::random(rng, pair[0], pair[1]))
            .collect();
        Ok(Self { layers })
    }

    pub(crate) fn from_layers(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Layers from input to output.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of inputs the first layer expects.
    pub fn input_count(&self) -> usize {
        self.layers.first().map_or(0, Layer::input_count)
    }

    /// Number of outputs the last layer yields.
    pub fn output_count(&self) -> usize {
        self.layers.last().map_or(0, Layer::output_count)
    }

    /// Layer sizes from input to output, e.g. `[5, 6, 4]`.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = vec![self.input_count()];
        shape.extend(self.layers.iter().map(Layer::output_count));
        shape
    }

    /// Feeds `inputs` through every layer in order and returns the last
    /// layer's binary outputs.
    pub fn feed_forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        let mut signal = inputs.to_vec();
        for layer in &mut self.layers {
            signal = layer.feed_forward(&signal)?.to_vec();
        }
        Ok(signal)
    }

    /// Copies every layer for drawing.
    pub fn snapshot(&self) -> Vec<LayerSnapshot> {
        self.layers.iter().map(Layer::snapshot).collect()
    }

    /// Converts to the persisted form.
    pub fn to_data(&self) -> NetworkData {
        NetworkData {
            layers: self
                .layers
                .iter()
                .map(|layer| LayerData {
                    input_count: layer.input_count(),
                    output_count: layer.output_count(),
                    biases: layer.biases().to_vec(),
                    weights: layer.weights().rows().into_iter().map(|row| row.to_vec()).collect(),
                })
                .collect(),
        }
    }
}

impl From<Network> for NetworkData {
    fn from(network: Network) -> Self {
        network.to_data()
    }
}

impl TryFrom<NetworkData> for Network {
    type Error = NetworkError;

    fn try_from(data: NetworkData) -> Result<Self, Self::Error> {
        Network::try_from(&data)
    }
}

impl TryFrom<&NetworkData> for Network {
    type Error = NetworkError;

    fn try_from(data: &NetworkData) -> Result<Self, Self::Error> {
        if data.layers.is_empty() {
            return Err(NetworkError::EmptyNetwork);
        }

        let mut layers = Vec::with_capacity(data.layers.len());
        let mut previous_outputs: Option<usize> = None;

        for (index, layer) in data.layers.iter().enumerate() {
            validate_layer(index, layer)?;

            if let Some(expected) = previous_outputs {
                if layer.input_count != expected {
                    return Err(NetworkError::MismatchedTopology {
                        layer: index,
                        expected,
                        actual: layer.input_count,
                    });
                }
            }
            previous_outputs = Some(layer.output_count);

            let weights = Array2::from_shape_vec(
                (layer.input_count, layer.output_count),
                layer.weights.concat(),
            )?;
            let biases = Array1::from(layer.biases.clone());
            layers.push(Layer::with_parameters(biases, weights));
        }

        Ok(Self { layers })
    }
}

fn validate_layer(index: usize, layer: &LayerData) -> Result<(), NetworkError> {
    if layer.input_count == 0 || layer.output_count == 0 {
        return Err(NetworkError::ZeroSizedLayer { layer: index });
    }
    if layer.weights.len() != layer.input_count {
        return Err(NetworkError::WeightRows {
            layer: index,
            expected: layer.input_count,
            actual: layer.weights.len(),
        });
    }
    if let Some((row, values)) = layer
        .weights
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != layer.output_count)
    {
        return Err(NetworkError::WeightColumns {
            layer: index,
            row,
            expected: layer.output_count,
            actual: values.len(),
        });
    }
    if layer.biases.len() != layer.output_count {
        return Err(NetworkError::BiasLength {
            layer: index,
            expected: layer.output_count,
            actual: layer.biases.len(),
        });
    }
    Ok(())
}
