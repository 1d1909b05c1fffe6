use serde::{Deserialize, Serialize};

use crate::features::Candidate;

/// Optional annotations attached to a saved scaler.
/// All fields are Option<> so older artifacts (without metadata) deserialize cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalerMetadata {
    #[serde(default)]
    pub description: Option<String>,
    /// The feature layout the scaler was fit on. When present the resolver
    /// tries it before guessing from the vector length.
    #[serde(default)]
    pub feature_scheme: Option<Candidate>,
}
