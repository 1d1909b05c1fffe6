//! Error taxonomy for the recognition pipeline.
//!
//! Only `DecodeError` is allowed to escape `Predictor::predict`; everything
//! else is folded into a sentinel `PredictionResult` at that boundary.

use std::path::PathBuf;
use thiserror::Error;

/// A model artifact could not be loaded at startup.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

/// A model artifact parsed but is structurally unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("mean has {mean} entries but scale has {scale}")]
    ScalerLengths { mean: usize, scale: usize },
    #[error("mean/scale contain non-finite values")]
    NonFiniteScaler,
    #[error("forest has no trees")]
    EmptyForest,
    #[error("tree {tree}: {fault}")]
    Tree { tree: usize, fault: TreeFault },
    #[error("network has no layers")]
    EmptyNetwork,
    #[error("layer {layer}: {fault}")]
    Layer { layer: usize, fault: LayerFault },
    #[error("layer {layer} outputs {outputs} values but the next layer takes {inputs}")]
    LayerChain { layer: usize, outputs: usize, inputs: usize },
    #[error("label encoder has no classes")]
    NoClasses,
    #[error("label encoder contains an empty class name")]
    EmptyClassName,
    #[error("duplicate class name '{0}'")]
    DuplicateClass(String),
}

/// What is wrong with one decision tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeFault {
    #[error("tree has no nodes")]
    NoNodes,
    #[error("node {node} splits on feature {feature} of {n_features}")]
    FeatureOutOfRange { node: usize, feature: usize, n_features: usize },
    #[error("node {node} has a non-finite threshold")]
    NonFiniteThreshold { node: usize },
    #[error("node {node} points to invalid child {child}")]
    BadChild { node: usize, child: usize },
    #[error("leaf {node} has {actual} classes, expected {expected}")]
    LeafWidth { node: usize, actual: usize, expected: usize },
    #[error("leaf {node} has a negative or non-finite weight")]
    BadWeight { node: usize },
}

/// What is wrong with one dense layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayerFault {
    #[error("matrix rows/cols disagree with its data")]
    Ragged,
    #[error("biases are {rows}x{cols}, expected 1x{expected}")]
    BiasShape { rows: usize, cols: usize, expected: usize },
}

/// The uploaded file is not a decodable image.
#[derive(Debug, Error)]
#[error("cannot decode image {origin}: {source}")]
pub struct DecodeError {
    /// Path of the offending file.
    pub origin: String,
    #[source]
    pub source: image::ImageError,
}

/// A single feature candidate could not be computed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error(
        "image of {resolution}px is too small for {cells_per_block}x{cells_per_block} blocks of {pixels_per_cell}px cells"
    )]
    ImageTooSmall {
        resolution: u32,
        pixels_per_cell: u32,
        cells_per_block: u32,
    },
}

/// The scaler refused a feature vector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("scaler expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// No candidate could be extracted and scaled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no feature candidate fits the scaler (expected {expected:?}, attempted lengths {attempted:?})")]
pub struct FeatureMismatchError {
    pub expected: Option<usize>,
    pub attempted: Vec<usize>,
}

/// The classifier or label decoding failed at request time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("classifier expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("class index {0} is not in the label vocabulary")]
    UnknownClassIndex(usize),
    #[error("classifier produced a non-finite probability")]
    NonFiniteOutput,
    #[error("classifier produced an empty distribution")]
    EmptyDistribution,
    #[error("malformed classifier: {0}")]
    MalformedModel(String),
}

/// The service configuration file is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
