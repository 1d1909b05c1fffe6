use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use crate::error::{LayerFault, PredictionError};

/// One fully-connected layer of a trained network.
///
/// `weights` is `(input_size, size)` and `biases` is `(1, size)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer{
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    pub fn new(weights: Matrix, biases: Matrix, activator: ActivationFunction) -> Layer {
        Layer { weights, biases, activator }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    pub fn size(&self) -> usize {
        self.weights.cols
    }

    /// Forward pass for a single sample.
    pub fn feed_from(&self, input: &[f64]) -> Result<Vec<f64>, PredictionError> {
        let mismatch = PredictionError::DimensionMismatch {
            expected: self.input_size(),
            actual: input.len(),
        };
        let z = Matrix::row(input)
            .checked_mul(&self.weights)
            .and_then(|wx| wx.checked_add(&self.biases))
            .ok_or(mismatch)?;
        let pre = z.data.into_iter().next().unwrap_or_default();
        Ok(self.activator.apply(&pre))
    }

    pub(crate) fn validate(&self) -> Result<(), LayerFault> {
        if !self.weights.is_well_formed() || !self.biases.is_well_formed() {
            return Err(LayerFault::Ragged);
        }
        if self.biases.rows != 1 || self.biases.cols != self.size() {
            return Err(LayerFault::BiasShape {
                rows: self.biases.rows,
                cols: self.biases.cols,
                expected: self.size(),
            });
        }
        Ok(())
    }
}
