//! Shared confidence model
//!
//! One tiering rule serves both subsystems: the matcher feeds it a fixed
//! per-tier score, the aggregator feeds it overlap evidence. The band
//! boundaries are configuration, not literals, so callers can retune them
//! per corpus.

use serde::{Deserialize, Serialize};

use super::types::ConfidenceTier;

/// Band boundaries and evidence cutoffs for tier derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringBands {
    /// Scores at or above this are high confidence
    pub high: f64,
    /// Scores at or above this (and below `high`) are medium confidence
    pub medium: f64,
    /// Signal count that makes evidence high-confidence on its own
    pub corroboration: usize,
    /// Coverage above this makes a single signal high-confidence
    pub high_coverage: f64,
    /// Coverage above this keeps one or two signals at medium
    pub medium_coverage: f64,
}

impl Default for ScoringBands {
    fn default() -> Self {
        Self {
            high: 0.9,
            medium: 0.7,
            corroboration: 3,
            high_coverage: 0.7,
            medium_coverage: 0.3,
        }
    }
}

/// Derives confidence tiers from match scores and overlap evidence.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    bands: ScoringBands,
}

impl ConfidenceScorer {
    /// Create a scorer with the given bands
    pub fn new(bands: ScoringBands) -> Self {
        Self { bands }
    }

    /// Band boundaries in use
    pub fn bands(&self) -> &ScoringBands {
        &self.bands
    }

    /// Tier for a match confidence score.
    pub fn tier_for_score(&self, score: f64) -> ConfidenceTier {
        if score <= 0.0 {
            ConfidenceTier::None
        } else if score >= self.bands.high {
            ConfidenceTier::High
        } else if score >= self.bands.medium {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    /// Tier for overlap evidence: how many sources overlapped and the
    /// largest fraction of the target any one of them covered.
    pub fn tier_for_overlap(&self, signals: usize, max_coverage: f64) -> ConfidenceTier {
        if signals == 0 {
            ConfidenceTier::None
        } else if signals >= self.bands.corroboration || max_coverage > self.bands.high_coverage {
            ConfidenceTier::High
        } else if max_coverage > self.bands.medium_coverage {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(ScoringBands::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_tiers_follow_band_boundaries() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.tier_for_score(1.0), ConfidenceTier::High);
        assert_eq!(scorer.tier_for_score(0.9), ConfidenceTier::High);
        assert_eq!(scorer.tier_for_score(0.8), ConfidenceTier::Medium);
        assert_eq!(scorer.tier_for_score(0.75), ConfidenceTier::Medium);
        assert_eq!(scorer.tier_for_score(0.5), ConfidenceTier::Low);
        assert_eq!(scorer.tier_for_score(0.0), ConfidenceTier::None);
    }

    #[test]
    fn overlap_tiers_weigh_count_and_coverage() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.tier_for_overlap(0, 0.0), ConfidenceTier::None);
        // One fully-contained source is high on coverage alone
        assert_eq!(scorer.tier_for_overlap(1, 1.0), ConfidenceTier::High);
        // Three corroborating sources are high regardless of coverage
        assert_eq!(scorer.tier_for_overlap(3, 0.2), ConfidenceTier::High);
        assert_eq!(scorer.tier_for_overlap(2, 0.5), ConfidenceTier::Medium);
        assert_eq!(scorer.tier_for_overlap(1, 0.3), ConfidenceTier::Low);
        assert_eq!(scorer.tier_for_overlap(2, 0.1), ConfidenceTier::Low);
    }

    #[test]
    fn retuned_bands_move_the_boundaries() {
        let scorer = ConfidenceScorer::new(ScoringBands {
            high: 0.95,
            medium: 0.5,
            corroboration: 5,
            high_coverage: 0.9,
            medium_coverage: 0.1,
        });
        assert_eq!(scorer.tier_for_score(0.9), ConfidenceTier::Medium);
        assert_eq!(scorer.tier_for_overlap(3, 0.2), ConfidenceTier::Medium);
    }
}
