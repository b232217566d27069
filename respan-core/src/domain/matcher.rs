//! Annotation relocation state machine
//!
//! Tiers run in strict order (exact, context, chunk-bounded, trigram) and
//! the first hit wins. Each tier carries a fixed confidence score from the
//! settings. Every accepted span passes the offset validator before it is
//! returned; a validator failure downgrades the record to lost instead of
//! ever returning a mismatched span.

use log::{debug, warn};
use smallvec::SmallVec;

use super::normalize::FoldedText;
use super::scoring::ConfidenceScorer;
use super::trigram;
use super::types::{Annotation, ChunkRef, RecoveredSpan, RecoveryMethod, Span};
use super::validator;

/// Matcher tunables, carried by the public config.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    /// Confidence assigned to an exact verbatim hit
    pub tier_exact: f64,
    /// Confidence assigned to a context-anchored hit
    pub tier_context: f64,
    /// Confidence assigned to a hit inside the referenced chunks
    pub tier_chunk_bounded: f64,
    /// Confidence assigned to a trigram-similarity hit
    pub tier_trigram: f64,
    /// Results below this confidence are flagged for review
    pub review_threshold: f64,
    /// Minimum trigram similarity the fuzzy tier will accept
    pub trigram_floor: f64,
    /// Bytes of slack around the recorded offset for the positional window
    pub position_tolerance: usize,
    /// Bytes of slack around referenced chunks, tolerating boundary drift
    pub chunk_drift_tolerance: usize,
    /// Cap on candidate windows per trigram scan
    pub max_scan_windows: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            tier_exact: 1.0,
            tier_context: 0.9,
            tier_chunk_bounded: 0.8,
            tier_trigram: 0.75,
            review_threshold: 0.85,
            trigram_floor: 0.6,
            position_tolerance: 32,
            chunk_drift_tolerance: 128,
            max_scan_windows: 200_000,
        }
    }
}

/// What the validator can guarantee about an accepted span.
#[derive(Debug, Clone, Copy)]
enum Expectation {
    /// The slice must equal the annotation's original text byte-for-byte
    Original,
    /// The slice is allowed to differ (anchored or fuzzy relocation);
    /// bounds and character boundaries are what can be checked
    Relocated,
}

/// Relocates annotation spans within one revised document text.
///
/// Holds the folded view of the document so repeated relocations against the
/// same text share the normalization work.
pub struct TextMatcher<'a> {
    text: &'a str,
    folded: FoldedText,
    settings: &'a MatchSettings,
    scorer: &'a ConfidenceScorer,
}

impl<'a> TextMatcher<'a> {
    /// Build a matcher over already-validated document text.
    pub fn new(text: &'a str, settings: &'a MatchSettings, scorer: &'a ConfidenceScorer) -> Self {
        Self {
            text,
            folded: FoldedText::fold(text),
            settings,
            scorer,
        }
    }

    /// Relocate one annotation. Infallible per record: every failure mode
    /// ends in a lost result, never an error.
    pub fn relocate(&self, annotation: &Annotation, chunks: &[ChunkRef]) -> RecoveredSpan {
        let whole = Span::new(0, self.text.len());
        let needle = &annotation.original_text;
        let origin = annotation.span.start;

        // Tier 1a: verbatim hit inside the positional window.
        let window = self.window_around(origin, needle.len(), self.settings.position_tolerance);
        if let Some(span) = self.find_nearest(needle, origin, &window) {
            return self.accept(annotation, span, RecoveryMethod::Exact, Expectation::Original);
        }

        // Tier 1b: verbatim hits anywhere in the document. A unique hit is
        // exact; with several hits the anchors get a chance to disambiguate
        // before the offset-distance rule decides.
        let occurrences = self.occurrences(needle, &whole);
        if occurrences.len() == 1 {
            let span = Span::new(occurrences[0], occurrences[0] + needle.len());
            return self.accept(annotation, span, RecoveryMethod::Exact, Expectation::Original);
        }
        if occurrences.len() > 1 {
            if let Some((span, expect)) = self.context_tier(annotation, &whole) {
                return self.accept(annotation, span, RecoveryMethod::Context, expect);
            }
            let start = nearest_offset(&occurrences, origin);
            let span = Span::new(start, start + needle.len());
            return self.accept(annotation, span, RecoveryMethod::Exact, Expectation::Original);
        }

        // The original text is absent from the document below this point.

        // Tier 2: anchor context over the whole document.
        if let Some((span, expect)) = self.context_tier(annotation, &whole) {
            return self.accept(annotation, span, RecoveryMethod::Context, expect);
        }

        // Tier 3: the same search, bounded to the referenced chunks.
        let region = self.chunk_region(annotation, chunks);
        if let Some(region) = &region {
            if let Some((span, expect)) = self.context_tier(annotation, region) {
                return self.accept(annotation, span, RecoveryMethod::ChunkBounded, expect);
            }
        }

        // Tier 4: trigram similarity, chunk region first when one exists.
        if let Some((span, similarity)) = self.trigram_tier(annotation, region.as_ref()) {
            debug!(
                "annotation {}: trigram window at {}..{} scored {:.3}",
                annotation.id, span.start, span.end, similarity
            );
            return self.accept(annotation, span, RecoveryMethod::Trigram, Expectation::Relocated);
        }

        debug!("annotation {}: no tier matched", annotation.id);
        RecoveredSpan::lost(&annotation.id)
    }

    /// Locate the span through its captured anchors, restricted to `region`.
    ///
    /// Two paths, tried in order:
    /// - the full `before + original + after` concatenation, which proves
    ///   the original text and one occurrence of its surroundings;
    /// - the two anchors independently bracketing whatever the original
    ///   text has become, for documents where the text itself was edited.
    fn context_tier(&self, annotation: &Annotation, region: &Span) -> Option<(Span, Expectation)> {
        let ctx = &annotation.anchor_context;
        if ctx.is_empty() {
            return None;
        }
        let original = &annotation.original_text;
        let origin = annotation.span.start;
        let anchor_origin = origin.saturating_sub(ctx.before.len());

        let full = format!("{}{}{}", ctx.before, original, ctx.after);
        if let Some(hit) = self.find_nearest(&full, anchor_origin, region) {
            let start = hit.start + ctx.before.len();
            let span = Span::new(start, start + original.len());
            return Some((span, Expectation::Original));
        }

        if ctx.before.is_empty() || ctx.after.is_empty() {
            return None;
        }
        let before_hit = self.find_nearest(&ctx.before, anchor_origin, region)?;
        let tail = Span::new(before_hit.end, region.end);
        let after_start = self.occurrences(&ctx.after, &tail).first().copied()?;
        let inner = Span::new(before_hit.end, after_start);

        // The bracketed text must still resemble the original in size,
        // or the anchors have latched onto unrelated positions.
        let (lo, hi) = (original.len() / 2, original.len() * 2 + 8);
        if inner.is_empty() || inner.len() < lo || inner.len() > hi {
            return None;
        }
        Some((inner, Expectation::Relocated))
    }

    /// Bounding region over the annotation's referenced chunks, widened by
    /// the drift tolerance. Stale refs are skipped; they are per-record
    /// damage, not a reason to fail the batch.
    fn chunk_region(&self, annotation: &Annotation, chunks: &[ChunkRef]) -> Option<Span> {
        let mut lo = usize::MAX;
        let mut hi = 0usize;
        for id in &annotation.source_chunk_refs {
            match chunks.iter().find(|c| &c.id == id) {
                Some(c) => {
                    lo = lo.min(c.span.start);
                    hi = hi.max(c.span.end);
                }
                None => debug!("annotation {}: unknown chunk ref {}", annotation.id, id),
            }
        }
        if lo >= hi {
            return None;
        }
        let region = self.window_span(
            lo.saturating_sub(self.settings.chunk_drift_tolerance),
            (hi.saturating_add(self.settings.chunk_drift_tolerance)).min(self.text.len()),
        );
        (!region.is_empty()).then_some(region)
    }

    /// Fuzzy tier over the folded text: a normalized-verbatim hit counts as
    /// similarity 1.0, otherwise the rolling trigram scan decides.
    fn trigram_tier(&self, annotation: &Annotation, region: Option<&Span>) -> Option<(Span, f64)> {
        let needle_folded = FoldedText::fold(&annotation.original_text);
        let needle = needle_folded.chars();
        if needle.len() < 3 {
            return None;
        }

        let mut ranges: SmallVec<[(usize, usize); 2]> = SmallVec::new();
        if let Some(region) = region {
            ranges.push(self.folded.char_range(region));
        }
        ranges.push((0, self.folded.char_len()));

        for (from, to) in ranges {
            if let Some(hit) = self.folded.find_within(needle, from, to) {
                return Some((self.folded.byte_span(hit, hit + needle.len()), 1.0));
            }
            let scan = trigram::scan(
                self.folded.chars(),
                from,
                to,
                needle,
                self.settings.trigram_floor,
                self.settings.max_scan_windows,
            );
            if let Some(hit) = scan {
                return Some((self.folded.byte_span(hit.start, hit.end), hit.similarity));
            }
        }
        None
    }

    /// Final gate: validate the span, then build the result. A validation
    /// failure downgrades to lost; a mismatched span is never returned.
    fn accept(
        &self,
        annotation: &Annotation,
        span: Span,
        method: RecoveryMethod,
        expect: Expectation,
    ) -> RecoveredSpan {
        let confidence = match method {
            RecoveryMethod::Exact => self.settings.tier_exact,
            RecoveryMethod::Context => self.settings.tier_context,
            RecoveryMethod::ChunkBounded => self.settings.tier_chunk_bounded,
            RecoveryMethod::Trigram => self.settings.tier_trigram,
            RecoveryMethod::Lost => 0.0,
        };
        let check = match expect {
            Expectation::Original => {
                validator::validate_slice(self.text, &span, &annotation.original_text)
            }
            Expectation::Relocated => validator::validate_bounds(self.text, &span),
        };
        match check {
            Ok(()) => {
                debug!(
                    "annotation {}: {} at {}..{}",
                    annotation.id, method, span.start, span.end
                );
                RecoveredSpan {
                    id: annotation.id.clone(),
                    span: Some(span),
                    text: Some(self.text[span.start..span.end].to_string()),
                    method,
                    confidence,
                    tier: self.scorer.tier_for_score(confidence),
                    needs_review: confidence < self.settings.review_threshold,
                }
            }
            Err(err) => {
                warn!(
                    "annotation {}: {} span rejected: {}",
                    annotation.id, method, err
                );
                RecoveredSpan::lost(&annotation.id)
            }
        }
    }

    /// All occurrences of `needle` inside `region`, including overlapping
    /// ones, as start offsets in document order.
    fn occurrences(&self, needle: &str, region: &Span) -> SmallVec<[usize; 8]> {
        let mut found: SmallVec<[usize; 8]> = SmallVec::new();
        if needle.is_empty() || region.is_empty() || region.end > self.text.len() {
            return found;
        }
        let hay = &self.text[region.start..region.end];
        let mut from = 0;
        while let Some(at) = hay.get(from..).and_then(|rest| rest.find(needle)) {
            found.push(region.start + from + at);
            from += at + 1;
        }
        found
    }

    /// Occurrence nearest the original offset, ties to the earliest.
    fn find_nearest(&self, needle: &str, origin: usize, region: &Span) -> Option<Span> {
        let occurrences = self.occurrences(needle, region);
        if occurrences.is_empty() {
            return None;
        }
        let start = nearest_offset(&occurrences, origin);
        Some(Span::new(start, start + needle.len()))
    }

    /// Char-boundary-snapped window of `tolerance` slack around an offset.
    fn window_around(&self, origin: usize, needle_len: usize, tolerance: usize) -> Span {
        let start = origin.saturating_sub(tolerance);
        let end = origin
            .saturating_add(needle_len)
            .saturating_add(tolerance)
            .min(self.text.len());
        if start >= end {
            return Span::new(0, 0);
        }
        self.window_span(start, end)
    }

    /// Snap `[start, end)` outward to character boundaries.
    fn window_span(&self, mut start: usize, mut end: usize) -> Span {
        while start > 0 && !self.text.is_char_boundary(start) {
            start -= 1;
        }
        while end < self.text.len() && !self.text.is_char_boundary(end) {
            end += 1;
        }
        Span::new(start, end.min(self.text.len()))
    }
}

/// Offset nearest to `origin`; ties break to the earlier offset. Returns 0
/// for an empty list (callers check emptiness first).
fn nearest_offset(offsets: &[usize], origin: usize) -> usize {
    offsets
        .iter()
        .copied()
        .min_by_key(|&start| (start.abs_diff(origin), start))
        .unwrap_or(0)
}
