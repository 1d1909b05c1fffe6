use serde::{Deserialize, Serialize};

use crate::error::{PredictionError, TreeFault, ValidationError};

/// A node of a fitted decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    /// Go `left` when `x[feature] <= threshold`, otherwise `right`.
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    /// Per-class weights at this leaf (counts or fractions).
    Leaf { distribution: Vec<f64> },
}

/// A fitted tree. Node 0 is the root; children always follow their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        DecisionTree { nodes }
    }

    /// Walks from the root to the leaf `x` falls in.
    pub fn leaf(&self, x: &[f64]) -> Result<&[f64], PredictionError> {
        let mut idx = 0;
        // Validated trees only move forward, so this bound is never hit.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(Node::Split { feature, threshold, left, right }) => {
                    let value = x.get(*feature).copied().ok_or_else(|| {
                        PredictionError::MalformedModel(format!("split on missing feature {}", feature))
                    })?;
                    idx = if value <= *threshold { *left } else { *right };
                }
                Some(Node::Leaf { distribution }) => return Ok(distribution.as_slice()),
                None => break,
            }
        }
        Err(PredictionError::MalformedModel(format!("tree walk escaped at node {}", idx)))
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), TreeFault> {
        if self.nodes.is_empty() {
            return Err(TreeFault::NoNodes);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { feature, left, right, threshold } => {
                    if *feature >= n_features {
                        return Err(TreeFault::FeatureOutOfRange { node: i, feature: *feature, n_features });
                    }
                    if !threshold.is_finite() {
                        return Err(TreeFault::NonFiniteThreshold { node: i });
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(TreeFault::BadChild { node: i, child: *child });
                        }
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(TreeFault::LeafWidth {
                            node: i,
                            actual: distribution.len(),
                            expected: n_classes,
                        });
                    }
                    if distribution.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(TreeFault::BadWeight { node: i });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Random forest classifier: the average of each tree's normalized leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if x.len() != self.n_features {
            return Err(PredictionError::DimensionMismatch {
                expected: self.n_features,
                actual: x.len(),
            });
        }
        if self.trees.is_empty() || self.n_classes == 0 {
            return Err(PredictionError::EmptyDistribution);
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf(x)?;
            let total: f64 = leaf.iter().sum();
            if total > 0.0 {
                for (p, w) in proba.iter_mut().zip(leaf) {
                    *p += w / total;
                }
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trees.is_empty() {
            return Err(ValidationError::EmptyForest);
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|fault| ValidationError::Tree { tree: i, fault })?;
        }
        Ok(())
    }
}
