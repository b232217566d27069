//! Span reconciliation entry points

use std::collections::HashMap;

use log::debug;

use crate::api::config::Config;
use crate::api::error::Result;
use crate::api::input::{AlignmentRequest, RecoveryRequest};
use crate::api::output::{AlignmentOutput, BatchSummary, RecoveryOutput};
use crate::domain::aggregate::MetadataAggregator;
use crate::domain::interpolate;
use crate::domain::overlap;
use crate::domain::types::{
    Annotation, ChunkRef, OverlapRecord, RecoveryMethod, SourceChunk, Span, TargetChunk,
};
use crate::domain::validator;
use crate::domain::{ConfidenceScorer, DomainError, TextMatcher};

/// Reconciles text-span references after a document's segmentation changes.
///
/// Both operations are pure functions over the supplied inputs: the
/// reconciler carries configuration only and holds no state between calls.
pub struct SpanReconciler {
    config: Config,
    scorer: ConfidenceScorer,
}

impl SpanReconciler {
    /// Create a reconciler with the default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default()).expect("default config should always be valid")
    }

    /// Create a reconciler with a custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let scorer = ConfidenceScorer::new(*config.bands());
        Ok(Self { config, scorer })
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Relocate one document's annotations into its revised text.
    ///
    /// Results are order-preserving with the input. Lost annotations receive
    /// an interpolated position from the nearest recovered neighbor when one
    /// exists; they stay flagged for review either way.
    pub fn recover_annotations(
        &self,
        text: &str,
        annotations: &[Annotation],
        chunks: &[ChunkRef],
    ) -> Result<RecoveryOutput> {
        validator::validate_document(text)?;
        for annotation in annotations {
            validator::validate_shape(&annotation.span)?;
            if annotation.original_text.is_empty() {
                return Err(DomainError::EmptyOriginalText(annotation.id.clone()).into());
            }
        }
        for chunk in chunks {
            validator::validate_bounds(text, &chunk.span)?;
        }

        let matcher = TextMatcher::new(text, self.config.matching(), &self.scorer);
        let mut spans: Vec<_> = annotations
            .iter()
            .map(|annotation| matcher.relocate(annotation, chunks))
            .collect();

        // Displacements of the recovered records, ordered by old offset,
        // drive the position estimate for the lost ones.
        let mut displacements: Vec<(Span, isize)> = annotations
            .iter()
            .zip(&spans)
            .filter(|(_, recovered)| recovered.method != RecoveryMethod::Lost)
            .filter_map(|(annotation, recovered)| {
                let new_span = recovered.span?;
                let shift = new_span.start as isize - annotation.span.start as isize;
                Some((annotation.span, shift))
            })
            .collect();
        displacements.sort_by_key(|(span, _)| (span.start, span.end));

        for (annotation, recovered) in annotations.iter().zip(spans.iter_mut()) {
            if recovered.method != RecoveryMethod::Lost || recovered.span.is_some() {
                continue;
            }
            if let Some(&shift) = interpolate::nearest(&displacements, &annotation.span) {
                if let Some(estimate) = interpolate::shifted_span(text, &annotation.span, shift) {
                    if validator::validate_bounds(text, &estimate).is_ok() {
                        debug!(
                            "annotation {}: interpolated to {}..{} from neighbor displacement {}",
                            annotation.id, estimate.start, estimate.end, shift
                        );
                        recovered.span = Some(estimate);
                        recovered.text = Some(text[estimate.start..estimate.end].to_string());
                    }
                }
            }
        }

        let resolved = spans
            .iter()
            .filter(|recovered| recovered.method != RecoveryMethod::Lost)
            .count();
        let summary = BatchSummary::new(spans.len(), resolved, self.config.low_coverage_threshold);
        Ok(RecoveryOutput { spans, summary })
    }

    /// Transfer attributes from one document's structural chunks onto its
    /// semantic chunks.
    ///
    /// Results are order-preserving with the target list. Targets with no
    /// overlapping source take their attributes from the nearest source
    /// chunk and come back flagged as interpolated.
    pub fn align_chunks(
        &self,
        text: &str,
        sources: &[SourceChunk],
        targets: &[TargetChunk],
    ) -> Result<AlignmentOutput> {
        validator::validate_document(text)?;
        for source in sources {
            validator::validate_bounds(text, &source.span)?;
        }
        for target in targets {
            validator::validate_bounds(text, &target.span)?;
        }

        let records = overlap::index_overlaps(sources, targets);
        let aggregator = MetadataAggregator::new(&self.scorer);

        let by_id: HashMap<&str, &SourceChunk> =
            sources.iter().map(|s| (s.id.as_str(), s)).collect();
        let mut ordered: Vec<(Span, &SourceChunk)> =
            sources.iter().map(|s| (s.span, s)).collect();
        ordered.sort_by_key(|(span, _)| (span.start, span.end));

        let chunks: Vec<_> = targets
            .iter()
            .zip(&records)
            .map(|(target, overlaps)| {
                if overlaps.is_empty() {
                    let nearest = interpolate::nearest(&ordered, &target.span).copied();
                    aggregator.interpolated(target, nearest)
                } else {
                    let pairs: Vec<(&SourceChunk, &OverlapRecord)> = overlaps
                        .iter()
                        .filter_map(|record| {
                            by_id.get(record.source_id.as_str()).map(|s| (*s, record))
                        })
                        .collect();
                    aggregator.enrich(target, &pairs)
                }
            })
            .collect();

        let resolved = chunks.iter().filter(|chunk| !chunk.interpolated).count();
        let summary = BatchSummary::new(chunks.len(), resolved, self.config.low_coverage_threshold);
        Ok(AlignmentOutput { chunks, summary })
    }

    /// Recover annotations for several independent documents.
    ///
    /// Documents share no state, so they fan out across the rayon pool when
    /// the `parallel` feature is enabled; per-document processing stays
    /// sequential either way to keep offset tie-breaks deterministic. One
    /// document's invalid input does not abort the others.
    pub fn recover_documents(&self, requests: &[RecoveryRequest]) -> Vec<Result<RecoveryOutput>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            requests
                .par_iter()
                .map(|r| self.recover_annotations(&r.text, &r.annotations, &r.chunks))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            requests
                .iter()
                .map(|r| self.recover_annotations(&r.text, &r.annotations, &r.chunks))
                .collect()
        }
    }

    /// Align chunkings for several independent documents. See
    /// [`Self::recover_documents`] for the parallelism contract.
    pub fn align_documents(&self, requests: &[AlignmentRequest]) -> Vec<Result<AlignmentOutput>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            requests
                .par_iter()
                .map(|r| self.align_chunks(&r.text, &r.sources, &r.targets))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            requests
                .iter()
                .map(|r| self.align_chunks(&r.text, &r.sources, &r.targets))
                .collect()
        }
    }
}

impl Default for SpanReconciler {
    fn default() -> Self {
        Self::new()
    }
}
