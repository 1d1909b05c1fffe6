use crate::activation::activation::{softmax, ActivationFunction};
use crate::error::{PredictionError, ValidationError};
use crate::layers::dense::Layer;
use serde::{Serialize, Deserialize};

/// A trained dense network used as a food classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Network {
        Network { layers }
    }

    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(Layer::input_size)
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(Layer::size)
    }

    /// Forward pass through every layer.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>, PredictionError> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.feed_from(&current)?;
        }
        Ok(current)
    }

    /// Class probabilities. A network whose last layer is not Softmax
    /// has its raw outputs passed through one.
    pub fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>, PredictionError> {
        let last = self.layers.last()
            .ok_or_else(|| PredictionError::MalformedModel("network has no layers".into()))?;
        let output = self.forward(input)?;
        if last.activator == ActivationFunction::Softmax {
            Ok(output)
        } else {
            Ok(softmax(&output))
        }
    }

    /// Checks that every layer is well-formed and that layer widths chain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.layers.is_empty() {
            return Err(ValidationError::EmptyNetwork);
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate().map_err(|fault| ValidationError::Layer { layer: i, fault })?;
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].size() != pair[1].input_size() {
                return Err(ValidationError::LayerChain {
                    layer: i,
                    outputs: pair[0].size(),
                    inputs: pair[1].input_size(),
                });
            }
        }
        Ok(())
    }
}
