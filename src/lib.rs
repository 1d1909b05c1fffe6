pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod error;
pub mod config;
pub mod logging;
pub mod preprocess;
pub mod features;
pub mod model;
pub mod resolve;
pub mod predictor;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::network::Network;
pub use config::ServiceConfig;
pub use error::{
    ArtifactLoadError, DecodeError, FeatureError, FeatureMismatchError, PredictionError, ScaleError, ValidationError,
};
pub use features::{Candidate, ExtractionPlan, FeatureScheme, HogParams, ResolutionSpec};
pub use model::{ClassifierModel, LabelEncoder, ModelArtifacts, ScalerModel};
pub use predictor::{Outcome, PredictionResult, Predictor, UNKNOWN_LABEL};
pub use resolve::{Resolver, Selection};
