//! Batch output types

use serde::{Deserialize, Serialize};

use crate::domain::types::{EnrichedChunk, RecoveredSpan};

/// Coverage summary attached to every batch result.
///
/// Low coverage is a warning signal for operator visibility, never an
/// error: the per-record results are still returned in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Records in the batch
    pub total: usize,
    /// Records resolved without falling back to lost/interpolated
    pub resolved: usize,
    /// `resolved / total` (1.0 for an empty batch)
    pub rate: f64,
    /// Set when the rate falls below the configured threshold
    pub low_coverage: bool,
}

impl BatchSummary {
    pub(crate) fn new(total: usize, resolved: usize, threshold: f64) -> Self {
        let rate = if total == 0 {
            1.0
        } else {
            resolved as f64 / total as f64
        };
        Self {
            total,
            resolved,
            rate,
            low_coverage: rate < threshold,
        }
    }
}

/// Result of relocating one document's annotations, order-preserving with
/// the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryOutput {
    pub spans: Vec<RecoveredSpan>,
    pub summary: BatchSummary,
}

/// Result of aligning one document's chunkings, order-preserving with the
/// target list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentOutput {
    pub chunks: Vec<EnrichedChunk>,
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batches_never_warn() {
        let summary = BatchSummary::new(0, 0, 0.7);
        assert_eq!(summary.rate, 1.0);
        assert!(!summary.low_coverage);
    }

    #[test]
    fn low_rates_raise_the_warning() {
        let summary = BatchSummary::new(10, 6, 0.7);
        assert!(summary.low_coverage);
        let summary = BatchSummary::new(10, 7, 0.7);
        assert!(!summary.low_coverage);
    }
}
