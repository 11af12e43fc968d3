//! A single fully connected threshold layer.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::NetworkError;

/// One layer of the feedforward network.
///
/// `weights[[i, j]]` is the influence of input `i` on output `j`. The input and
/// output buffers are scratch space overwritten by every inference call.
#[derive(Debug, Clone)]
pub struct Layer {
    inputs: Array1<f64>,
    outputs: Array1<f64>,
    biases: Array1<f64>,
    weights: Array2<f64>,
}

/// Drawable copy of a layer's parameters and last activations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    /// Inputs seen by the last inference call.
    pub inputs: Vec<f64>,
    /// Outputs produced by the last inference call.
    pub outputs: Vec<f64>,
    /// Per-output thresholds.
    pub biases: Vec<f64>,
    /// Weight matrix, one row per input.
    pub weights: Vec<Vec<f64>>,
}

impl Layer {
    /// Creates a layer with weights and biases drawn uniformly from `[-1, 1)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, input_count: usize, output_count: usize) -> Self {
        let weights = Array2::from_shape_fn((input_count, output_count), |_| {
            rng.random_range(-1.0..1.0)
        });
        let biases = Array1::from_shape_fn(output_count, |_| rng.random_range(-1.0..1.0));
        Self::with_parameters(biases, weights)
    }

    /// Wraps existing parameters. Callers check that `biases` has one entry
    /// per weight column.
    pub(super) fn with_parameters(biases: Array1<f64>, weights: Array2<f64>) -> Self {
        Self {
            inputs: Array1::zeros(weights.nrows()),
            outputs: Array1::zeros(weights.ncols()),
            biases,
            weights,
        }
    }

    /// Number of inputs.
    pub fn input_count(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of outputs.
    pub fn output_count(&self) -> usize {
        self.weights.ncols()
    }

    /// Per-output thresholds.
    pub fn biases(&self) -> ArrayView1<'_, f64> {
        self.biases.view()
    }

    /// Weight matrix (`input_count` × `output_count`).
    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Inputs seen by the last inference call.
    pub fn inputs(&self) -> ArrayView1<'_, f64> {
        self.inputs.view()
    }

    /// Outputs produced by the last inference call.
    pub fn outputs(&self) -> ArrayView1<'_, f64> {
        self.outputs.view()
    }

    /// Runs the layer on `given`.
    ///
    /// Output `j` is `1` when `Σ_i input[i] * weight[i][j]` strictly exceeds
    /// `bias[j]`, otherwise `0`.
    pub fn feed_forward(&mut self, given: &[f64]) -> Result<ArrayView1<'_, f64>, NetworkError> {
        if given.len() != self.input_count() {
            return Err(NetworkError::InputSize {
                expected: self.input_count(),
                actual: given.len(),
            });
        }

        self.inputs.assign(&ArrayView1::from(given));
        let sums = self.inputs.dot(&self.weights);

        Zip::from(&mut self.outputs)
            .and(&sums)
            .and(&self.biases)
            .for_each(|output, &sum, &bias| {
                *output = if sum > bias { 1.0 } else { 0.0 };
            });

        Ok(self.outputs.view())
    }

    /// Copies parameters and activations for drawing.
    pub fn snapshot(&self) -> LayerSnapshot {
        LayerSnapshot {
            inputs: self.inputs.to_vec(),
            outputs: self.outputs.to_vec(),
            biases: self.biases.to_vec(),
            weights: self.weights.rows().into_iter().map(|row| row.to_vec()).collect(),
        }
    }
}
