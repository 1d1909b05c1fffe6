use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, PredictionError, ValidationError};
use crate::model::forest::RandomForest;
use crate::model::{invalid, read_json, write_json};
use crate::network::Network;

/// A fitted classifier from scaled features to class probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassifierModel {
    RandomForest(RandomForest),
    NeuralNetwork(Network),
}

impl ClassifierModel {
    pub fn n_features(&self) -> Option<usize> {
        match self {
            ClassifierModel::RandomForest(forest) => Some(forest.n_features),
            ClassifierModel::NeuralNetwork(network) => network.input_size(),
        }
    }

    pub fn n_classes(&self) -> Option<usize> {
        match self {
            ClassifierModel::RandomForest(forest) => Some(forest.n_classes),
            ClassifierModel::NeuralNetwork(network) => network.output_size(),
        }
    }

    /// Per-class probabilities for one scaled sample.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError> {
        let proba = match self {
            ClassifierModel::RandomForest(forest) => forest.predict_proba(features)?,
            ClassifierModel::NeuralNetwork(network) => network.predict_proba(features)?,
        };
        if proba.iter().any(|p| !p.is_finite()) {
            return Err(PredictionError::NonFiniteOutput);
        }
        Ok(proba)
    }

    /// Most probable class index and its probability.
    pub fn predict(&self, features: &[f64]) -> Result<(usize, f64), PredictionError> {
        let proba = self.predict_proba(features)?;
        argmax(&proba).ok_or(PredictionError::EmptyDistribution)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ClassifierModel::RandomForest(forest) => forest.validate(),
            ClassifierModel::NeuralNetwork(network) => network.validate(),
        }
    }

    pub fn load_json(path: &Path) -> Result<ClassifierModel, ArtifactLoadError> {
        let classifier: ClassifierModel = read_json(path)?;
        classifier.validate().map_err(|e| invalid(path, e))?;
        Ok(classifier)
    }

    pub fn save_json(&self, path: &Path) -> std::io::Result<()> {
        write_json(self, path)
    }
}

/// Index and value of the largest entry; the first one wins ties.
pub fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::layers::dense::Layer;
    use crate::math::matrix::Matrix;
    use crate::model::forest::{DecisionTree, Node};

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some((1, 0.4)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn forest_json_is_tagged() {
        let json = r#"{
            "type": "RandomForest",
            "n_features": 1,
            "n_classes": 2,
            "trees": [{"nodes": [
                {"kind": "Split", "feature": 0, "threshold": 0.0, "left": 1, "right": 2},
                {"kind": "Leaf", "distribution": [3.0, 1.0]},
                {"kind": "Leaf", "distribution": [0.0, 2.0]}
            ]}]
        }"#;
        let clf: ClassifierModel = serde_json::from_str(json).unwrap();
        assert!(clf.validate().is_ok());
        assert_eq!(clf.predict(&[-1.0]).unwrap(), (0, 0.75));
        assert_eq!(clf.predict(&[1.0]).unwrap(), (1, 1.0));
    }

    #[test]
    fn network_classifier_reports_shape() {
        let clf = ClassifierModel::NeuralNetwork(Network::new(vec![Layer::new(
            Matrix::zeros(4, 3),
            Matrix::zeros(1, 3),
            ActivationFunction::Softmax,
        )]));
        assert_eq!(clf.n_features(), Some(4));
        assert_eq!(clf.n_classes(), Some(3));
        let (_, confidence) = clf.predict(&[1.0; 4]).unwrap();
        assert!((confidence - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn load_rejects_invalid_forest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clf.json");
        let clf = ClassifierModel::RandomForest(RandomForest {
            n_features: 1,
            n_classes: 2,
            trees: vec![DecisionTree::new(vec![Node::Leaf { distribution: vec![1.0] }])],
        });
        clf.save_json(&path).unwrap();
        assert!(matches!(ClassifierModel::load_json(&path), Err(ArtifactLoadError::Invalid { .. })));
    }
}
