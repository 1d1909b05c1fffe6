//! Schema resolution: picking the feature layout a scaler was fit on.
//!
//! Model artifacts carry no record of how their training features were
//! built, so the resolver compares each candidate's length with the
//! scaler's `expected_features`. When nothing matches it walks a fixed
//! fallback list and lets the scaler's own dimensionality check decide;
//! a vector of the wrong size is never scaled.

use std::ops::ControlFlow;

use image::RgbImage;
use tracing::{debug, warn};

use crate::error::{FeatureError, FeatureMismatchError, ScaleError};
use crate::features::{Candidate, ExtractionPlan};
use crate::model::ScalerModel;

/// Outcome of matching candidate lengths against an expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Matched(Candidate),
    Fallback(Vec<Candidate>),
}

/// A candidate that extracted and scaled cleanly.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatures {
    pub candidate: Candidate,
    pub scaled: Vec<f64>,
}

#[derive(Debug)]
enum AttemptFailure {
    Extract(FeatureError),
    Scale { len: usize, source: ScaleError },
}

/// Returns the first candidate whose length equals `expected`, in the order
/// given. With no expectation or no match, falls back to `fallbacks`.
pub fn select(candidates: &[Candidate], expected: Option<usize>, fallbacks: &[Candidate]) -> Selection {
    if let Some(expected) = expected {
        let mut matches = candidates.iter().filter(|c| c.feature_len() == Some(expected));
        if let Some(first) = matches.next() {
            let others: Vec<String> = matches.map(Candidate::to_string).collect();
            if !others.is_empty() {
                warn!(chosen = %first, ?others, expected, "several feature candidates share the expected length");
            }
            return Selection::Matched(*first);
        }
    }
    Selection::Fallback(fallbacks.to_vec())
}

pub struct Resolver<'a> {
    plan: &'a ExtractionPlan,
}

impl<'a> Resolver<'a> {
    pub fn new(plan: &'a ExtractionPlan) -> Self {
        Resolver { plan }
    }

    /// Candidates to try, in order, for this scaler.
    pub fn attempt_order(&self, scaler: &ScalerModel) -> Vec<Candidate> {
        let expected = scaler.expected_features();
        let mut order = Vec::new();

        if let Some(marked) = scaler.scheme_marker() {
            match (marked.feature_len(), expected) {
                (Some(len), Some(expected)) if len != expected => {
                    warn!(marker = %marked, len, expected, "ignoring feature-scheme marker that contradicts the scaler");
                }
                (None, _) => warn!(marker = %marked, "ignoring feature-scheme marker that cannot be extracted"),
                _ => order.push(*marked),
            }
        }

        let selected = match select(&self.plan.candidates(), expected, &self.plan.fallbacks()) {
            Selection::Matched(candidate) => vec![candidate],
            Selection::Fallback(list) => {
                debug!(?expected, "no candidate length matches; using fallbacks");
                list
            }
        };
        for candidate in selected {
            if !order.contains(&candidate) {
                order.push(candidate);
            }
        }
        order
    }

    /// Extracts and scales the first workable candidate.
    pub fn resolve(&self, image: &RgbImage, scaler: &ScalerModel) -> Result<ScaledFeatures, FeatureMismatchError> {
        let outcome = self.attempt_order(scaler).into_iter().try_fold(Vec::new(), |mut attempted, candidate| {
            match attempt(candidate, image, scaler) {
                Ok(features) => ControlFlow::Break(features),
                Err(failure) => {
                    match failure {
                        AttemptFailure::Extract(e) => debug!(%candidate, "extraction failed: {}", e),
                        AttemptFailure::Scale { len, source } => {
                            debug!(%candidate, "scaler rejected features: {}", source);
                            attempted.push(len);
                        }
                    }
                    ControlFlow::Continue(attempted)
                }
            }
        });

        match outcome {
            ControlFlow::Break(features) => {
                debug!(candidate = %features.candidate, "resolved feature scheme");
                Ok(features)
            }
            ControlFlow::Continue(attempted) => Err(FeatureMismatchError {
                expected: scaler.expected_features(),
                attempted,
            }),
        }
    }
}

fn attempt(candidate: Candidate, image: &RgbImage, scaler: &ScalerModel) -> Result<ScaledFeatures, AttemptFailure> {
    let features = candidate.extract(image).map_err(AttemptFailure::Extract)?;
    let scaled = scaler
        .transform(&features)
        .map_err(|source| AttemptFailure::Scale { len: features.len(), source })?;
    Ok(ScaledFeatures { candidate, scaled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureScheme, HogParams, ResolutionSpec};
    use image::Rgb;
    use rand::seq::SliceRandom;

    fn plan() -> ExtractionPlan {
        ExtractionPlan::default()
    }

    fn image() -> RgbImage {
        RgbImage::from_fn(120, 100, |x, y| Rgb([(x * 2) as u8, (y * 2) as u8, 128]))
    }

    fn scaler_for(len: usize) -> ScalerModel {
        ScalerModel::standard(vec![0.0; len], vec![1.0; len])
    }

    #[test]
    fn unique_match_wins_for_any_ordering() {
        let plan = plan();
        let mut rng = rand::thread_rng();
        for target in plan.candidates() {
            let expected = target.feature_len();
            let mut shuffled = plan.candidates();
            for _ in 0..10 {
                shuffled.shuffle(&mut rng);
                assert_eq!(select(&shuffled, expected, &plan.fallbacks()), Selection::Matched(target));
            }
        }
    }

    #[test]
    fn precedence_picks_first_on_shared_length() {
        // 64px/8 and 128px/16 both yield 1764-long descriptors.
        let plan = ExtractionPlan::new(vec![
            ResolutionSpec::new(64, HogParams::with_cell(8)),
            ResolutionSpec::new(128, HogParams::with_cell(16)),
        ]);
        match select(&plan.candidates(), Some(1764), &plan.fallbacks()) {
            Selection::Matched(c) => assert_eq!(c.resolution.size, 64),
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn no_expectation_falls_back() {
        let plan = plan();
        assert_eq!(select(&plan.candidates(), None, &plan.fallbacks()), Selection::Fallback(plan.fallbacks()));
        assert_eq!(select(&plan.candidates(), Some(3), &plan.fallbacks()), Selection::Fallback(plan.fallbacks()));
    }

    #[test]
    fn resolves_each_default_candidate() {
        let plan = plan();
        let resolver = Resolver::new(&plan);
        let img = image();
        for target in plan.candidates() {
            let len = target.feature_len().unwrap();
            let resolved = resolver.resolve(&img, &scaler_for(len)).unwrap();
            assert_eq!(resolved.candidate, target);
            assert_eq!(resolved.scaled.len(), len);
        }
    }

    #[test]
    fn unmatched_expectation_is_a_typed_mismatch() {
        let plan = plan();
        let err = Resolver::new(&plan).resolve(&image(), &scaler_for(1000)).unwrap_err();
        assert_eq!(err.expected, Some(1000));
        assert_eq!(err.attempted, vec![27648 + 4356, 4356]);
    }

    #[test]
    fn passthrough_scaler_takes_combined_fallback() {
        let plan = plan();
        let resolved = Resolver::new(&plan).resolve(&image(), &ScalerModel::passthrough()).unwrap();
        assert_eq!(resolved.candidate.scheme, FeatureScheme::Combined);
        assert_eq!(resolved.candidate.resolution.size, 96);
    }

    #[test]
    fn fallback_skips_unextractable_candidates() {
        // 8px primary with 8px cells cannot host a 2x2 block.
        let plan = ExtractionPlan::new(vec![ResolutionSpec::new(8, HogParams::with_cell(8))]);
        let err = Resolver::new(&plan).resolve(&image(), &ScalerModel::passthrough()).unwrap_err();
        assert_eq!(err.expected, None);
        assert!(err.attempted.is_empty());
    }

    #[test]
    fn marker_is_tried_first() {
        let plan = plan();
        let marked = Candidate::new(ResolutionSpec::new(48, HogParams::with_cell(8)), FeatureScheme::Hog);
        let len = marked.feature_len().unwrap();
        let scaler = scaler_for(len).with_feature_scheme(marked);
        let resolver = Resolver::new(&plan);
        assert_eq!(resolver.attempt_order(&scaler)[0], marked);
        assert_eq!(resolver.resolve(&image(), &scaler).unwrap().candidate, marked);
    }

    #[test]
    fn contradicting_marker_is_ignored() {
        let plan = plan();
        let marked = Candidate::new(ResolutionSpec::new(48, HogParams::with_cell(8)), FeatureScheme::Hog);
        let scaler = scaler_for(4356).with_feature_scheme(marked);
        let order = Resolver::new(&plan).attempt_order(&scaler);
        assert!(!order.contains(&marked));
        assert_eq!(order[0].feature_len(), Some(4356));
    }
}
