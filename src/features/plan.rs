use serde::{Deserialize, Serialize};

use crate::features::hog::HogParams;
use crate::features::scheme::{Candidate, FeatureScheme, ResolutionSpec};

/// Resolutions to try, highest priority first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionPlan {
    pub resolutions: Vec<ResolutionSpec>,
}

impl Default for ExtractionPlan {
    /// 96 px with 8 px cells, then 64 px and 128 px with 16 px cells.
    /// 128/16 reproduces the 1764-long descriptor of the earliest models.
    fn default() -> Self {
        ExtractionPlan {
            resolutions: vec![
                ResolutionSpec::new(96, HogParams::with_cell(8)),
                ResolutionSpec::new(64, HogParams::with_cell(16)),
                ResolutionSpec::new(128, HogParams::with_cell(16)),
            ],
        }
    }
}

impl ExtractionPlan {
    pub fn new(resolutions: Vec<ResolutionSpec>) -> Self {
        ExtractionPlan { resolutions }
    }

    pub fn primary(&self) -> Option<ResolutionSpec> {
        self.resolutions.first().copied()
    }

    /// Every candidate in priority order: resolutions in plan order, and
    /// within each resolution combined, flat, then hog.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.resolutions
            .iter()
            .flat_map(|&res| FeatureScheme::PRECEDENCE.map(|scheme| Candidate::new(res, scheme)))
            .collect()
    }

    /// Candidates tried when nothing matches: combined then hog at the
    /// primary resolution.
    pub fn fallbacks(&self) -> Vec<Candidate> {
        self.primary()
            .map(|res| {
                vec![
                    Candidate::new(res, FeatureScheme::Combined),
                    Candidate::new(res, FeatureScheme::Hog),
                ]
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_candidate_lengths() {
        let lens: Vec<Option<usize>> = ExtractionPlan::default()
            .candidates()
            .iter()
            .map(Candidate::feature_len)
            .collect();
        assert_eq!(
            lens,
            vec![
                Some(27648 + 4356), Some(27648), Some(4356),
                Some(12288 + 324), Some(12288), Some(324),
                Some(49152 + 1764), Some(49152), Some(1764),
            ]
        );
    }

    #[test]
    fn default_lengths_are_unambiguous() {
        let mut lens: Vec<usize> = ExtractionPlan::default()
            .candidates()
            .iter()
            .filter_map(Candidate::feature_len)
            .collect();
        let before = lens.len();
        lens.sort_unstable();
        lens.dedup();
        assert_eq!(lens.len(), before);
    }

    #[test]
    fn fallbacks_use_primary_resolution() {
        let plan = ExtractionPlan::default();
        let fb = plan.fallbacks();
        assert_eq!(fb.len(), 2);
        assert_eq!(fb[0].scheme, FeatureScheme::Combined);
        assert_eq!(fb[1].scheme, FeatureScheme::Hog);
        assert!(fb.iter().all(|c| c.resolution.size == 96));
        assert!(ExtractionPlan::new(vec![]).fallbacks().is_empty());
    }

    #[test]
    fn plan_reads_from_json() {
        let json = r#"{"resolutions":[{"size":128,"hog":{"orientations":9,"pixels_per_cell":16,"cells_per_block":2}}]}"#;
        let plan: ExtractionPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.candidates()[2].feature_len(), Some(1764));
    }
}
