//! Metadata aggregation onto target chunks
//!
//! Each attribute field has one merge rule, applied over the overlapping
//! source chunks in span order: set-valued fields take the distinct union,
//! range-valued fields widen to the envelope, categorical fields follow a
//! fixed priority order, and scalar options take the first value present.

use log::debug;

use super::scoring::ConfidenceScorer;
use super::types::{
    ChunkAttributes, ConfidenceTier, ContentLabel, ContentLayer, EnrichedChunk, OverlapRecord,
    PageRange, SourceChunk, TargetChunk,
};

/// Merges attributes from overlapping source chunks onto target chunks.
pub struct MetadataAggregator<'a> {
    scorer: &'a ConfidenceScorer,
}

impl<'a> MetadataAggregator<'a> {
    /// Create an aggregator using the shared confidence scorer
    pub fn new(scorer: &'a ConfidenceScorer) -> Self {
        Self { scorer }
    }

    /// Aggregate the overlapping sources onto one target chunk.
    ///
    /// `pairs` holds the sources overlapping this target with their overlap
    /// records, in source span order, and must be non-empty; targets with
    /// no overlap take the interpolation path instead.
    pub fn enrich(&self, target: &TargetChunk, pairs: &[(&SourceChunk, &OverlapRecord)]) -> EnrichedChunk {
        let mut attributes = ChunkAttributes::default();

        for (source, _) in pairs {
            let attrs = &source.attributes;
            union_into(&mut attributes.heading_path, &attrs.heading_path);
            union_into(&mut attributes.bounding_boxes, &attrs.bounding_boxes);
            attributes.page_range = widen(attributes.page_range, attrs.page_range);
            if attributes.section_level.is_none() {
                attributes.section_level = attrs.section_level;
            }
            if attributes.list_marker.is_none() {
                attributes.list_marker = attrs.list_marker.clone();
            }
            if attributes.code_language.is_none() {
                attributes.code_language = attrs.code_language.clone();
            }
            if attributes.hyperlink.is_none() {
                attributes.hyperlink = attrs.hyperlink.clone();
            }
        }

        attributes.content_layer = ContentLayer::PRIORITY
            .iter()
            .copied()
            .find(|layer| {
                pairs
                    .iter()
                    .any(|(s, _)| s.attributes.content_layer == Some(*layer))
            });
        attributes.content_label = ContentLabel::PRIORITY
            .iter()
            .copied()
            .find(|label| {
                pairs
                    .iter()
                    .any(|(s, _)| s.attributes.content_label == Some(*label))
            });

        let max_fraction = pairs
            .iter()
            .map(|(_, r)| r.fraction)
            .fold(0.0_f64, f64::max);
        let confidence = self.scorer.tier_for_overlap(pairs.len(), max_fraction);
        debug!(
            "target {}: {} overlap(s), max fraction {:.3}, tier {}",
            target.id,
            pairs.len(),
            max_fraction,
            confidence
        );

        EnrichedChunk {
            id: target.id.clone(),
            span: target.span,
            text: target.text.clone(),
            attributes,
            confidence,
            overlap_count: pairs.len(),
            max_fraction,
            interpolated: false,
        }
    }

    /// Build the fallback result for a target no source overlaps: attributes
    /// copied wholesale from the nearest source chunk (or empty when there
    /// are no sources at all), tier none, flagged as interpolated.
    pub fn interpolated(&self, target: &TargetChunk, nearest: Option<&SourceChunk>) -> EnrichedChunk {
        let attributes = nearest
            .map(|source| source.attributes.clone())
            .unwrap_or_default();
        if let Some(source) = nearest {
            debug!("target {}: no overlap, interpolated from {}", target.id, source.id);
        }
        EnrichedChunk {
            id: target.id.clone(),
            span: target.span,
            text: target.text.clone(),
            attributes,
            confidence: ConfidenceTier::None,
            overlap_count: 0,
            max_fraction: 0.0,
            interpolated: true,
        }
    }
}

/// Append the values of `extra` not already present, keeping first-seen order.
fn union_into<T: PartialEq + Clone>(acc: &mut Vec<T>, extra: &[T]) {
    for value in extra {
        if !acc.contains(value) {
            acc.push(value.clone());
        }
    }
}

/// Envelope of two optional page ranges: min of starts, max of ends.
fn widen(acc: Option<PageRange>, next: Option<PageRange>) -> Option<PageRange> {
    match (acc, next) {
        (Some(a), Some(b)) => Some(PageRange {
            start: a.start.min(b.start),
            end: a.end.max(b.end),
        }),
        (a, b) => a.or(b),
    }
}
