pub mod hog;
pub mod pixels;
pub mod plan;
pub mod scheme;

pub use hog::{BlockNorm, HogParams};
pub use plan::ExtractionPlan;
pub use scheme::{Candidate, FeatureScheme, ResolutionSpec};
