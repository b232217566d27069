//! Core value types for span reconciliation
//!
//! All records here are immutable values produced per invocation; the core
//! holds no state between calls. Spans are byte offsets into one document's
//! UTF-8 text and always lie on character boundaries (enforced by the
//! validator before any matching or aggregation runs).

use core::fmt;
use serde::{Deserialize, Serialize};

/// A half-open byte-offset interval `[start, end)` into one document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Byte length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Two spans overlap iff each starts before the other ends
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Intersection of two spans, if any
    pub fn intersect(&self, other: &Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Span { start, end })
    }

    /// Returns true if `other` lies entirely within this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Short text fragments captured adjacent to a span at creation time.
///
/// Used only to relocate the span after the document text changes, never for
/// rendering. Both fragments are bounded by the configured anchor length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorContext {
    /// Text immediately before the span
    pub before: String,
    /// Text immediately after the span
    pub after: String,
}

impl AnchorContext {
    /// Capture up to `max_chars` characters on each side of `span`.
    ///
    /// `span` must be a valid char-boundary span into `text`; callers invoke
    /// this at annotation creation time, against the text the span indexes.
    pub fn capture(text: &str, span: &Span, max_chars: usize) -> Self {
        let before_start = text[..span.start]
            .char_indices()
            .rev()
            .take(max_chars)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(span.start);
        let after_end = text[span.end..]
            .char_indices()
            .take(max_chars + 1)
            .nth(max_chars)
            .map(|(i, _)| span.end + i)
            .unwrap_or(text.len());
        Self {
            before: text[before_start..span.start].to_string(),
            after: text[span.end..after_end].to_string(),
        }
    }

    /// Returns true if neither fragment was captured
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// A user-authored annotation to be relocated after re-segmentation.
///
/// `span` and `anchor_context` refer to the document layout the annotation
/// was created against; `original_text` is the exact text it covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Caller-assigned identifier, opaque to the core
    pub id: String,
    /// Span in the previous document layout
    pub span: Span,
    /// Exact text the span covered in the previous layout
    pub original_text: String,
    /// Context captured around the span at creation time
    #[serde(default)]
    pub anchor_context: AnchorContext,
    /// Ids of the chunks the annotation was recorded against, if any
    #[serde(default)]
    pub source_chunk_refs: Vec<String>,
}

/// Caller-supplied chunk lookup entry for the chunk-bounded tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRef {
    /// Chunk identifier matching `Annotation::source_chunk_refs`
    pub id: String,
    /// Chunk span in the revised document text
    pub span: Span,
}

/// How a span was recovered, in decreasing order of reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMethod {
    /// Verbatim text found in the revised document
    Exact,
    /// Located through the captured anchor context
    Context,
    /// Located within the region of the referenced chunks
    ChunkBounded,
    /// Best trigram-similarity window above the floor
    Trigram,
    /// No tier succeeded; position is interpolated at best
    Lost,
}

impl fmt::Display for RecoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryMethod::Exact => write!(f, "exact"),
            RecoveryMethod::Context => write!(f, "context"),
            RecoveryMethod::ChunkBounded => write!(f, "chunk_bounded"),
            RecoveryMethod::Trigram => write!(f, "trigram"),
            RecoveryMethod::Lost => write!(f, "lost"),
        }
    }
}

/// Confidence tier shared by matching and aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// Three or more corroborating signals, or one with high coverage
    High,
    /// One or two signals with moderate coverage
    Medium,
    /// Weak signals only
    Low,
    /// No signal at all; the result came from interpolation
    None,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
            ConfidenceTier::None => write!(f, "none"),
        }
    }
}

/// Page interval covered by a chunk. Absent for sources without pages (EPUB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    /// First page (1-indexed)
    pub start: u32,
    /// Last page (inclusive)
    pub end: u32,
}

/// Rectangle on a page, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// 1-indexed page number
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Which layer of the page a chunk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentLayer {
    /// Main document content
    Body,
    /// Headers, footers, page numbers
    Furniture,
}

impl ContentLayer {
    /// Aggregation preference order: body content wins over furniture.
    pub const PRIORITY: [ContentLayer; 2] = [ContentLayer::Body, ContentLayer::Furniture];
}

/// Structural label of a chunk's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentLabel {
    Paragraph,
    SectionHeader,
    ListItem,
    Caption,
    Footnote,
    Code,
    Formula,
    Table,
    Picture,
    /// Generic text; lowest aggregation priority
    Text,
}

impl ContentLabel {
    /// Aggregation preference order: specific labels win over generic text.
    pub const PRIORITY: [ContentLabel; 10] = [
        ContentLabel::Paragraph,
        ContentLabel::SectionHeader,
        ContentLabel::ListItem,
        ContentLabel::Caption,
        ContentLabel::Footnote,
        ContentLabel::Code,
        ContentLabel::Formula,
        ContentLabel::Table,
        ContentLabel::Picture,
        ContentLabel::Text,
    ];
}

/// Structural attributes carried by a source chunk.
///
/// This is a closed record: every field the extraction pipeline emits is
/// named here, and absence is an explicit `None`/empty rather than a missing
/// key in an attribute bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkAttributes {
    /// Heading trail from the document root down to the chunk
    #[serde(default)]
    pub heading_path: Vec<String>,
    /// Pages the chunk spans; `None` for page-less sources
    #[serde(default)]
    pub page_range: Option<PageRange>,
    /// Rendered rectangles covering the chunk
    #[serde(default)]
    pub bounding_boxes: Vec<BoundingBox>,
    /// Page layer the chunk belongs to
    #[serde(default)]
    pub content_layer: Option<ContentLayer>,
    /// Structural label of the content
    #[serde(default)]
    pub content_label: Option<ContentLabel>,
    /// Heading depth when the chunk is itself a section header
    #[serde(default)]
    pub section_level: Option<u8>,
    /// Leading marker when the chunk is a list item
    #[serde(default)]
    pub list_marker: Option<String>,
    /// Language tag when the chunk is a code block
    #[serde(default)]
    pub code_language: Option<String>,
    /// Link target when the chunk carries one
    #[serde(default)]
    pub hyperlink: Option<String>,
}

/// A chunk from the structural pass, with the attributes to transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceChunk {
    pub id: String,
    /// Span in the revised document text
    pub span: Span,
    #[serde(default)]
    pub attributes: ChunkAttributes,
}

/// A chunk from the receiving pass, to be enriched with attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetChunk {
    pub id: String,
    /// Span in the revised document text
    pub span: Span,
    /// Chunk text, carried through to the enriched output
    pub text: String,
}

/// One source/target overlap found by the indexer. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapRecord {
    pub source_id: String,
    pub target_id: String,
    /// Intersection of the two spans
    pub overlap: Span,
    /// Fraction of the target span covered by the intersection
    pub fraction: f64,
}

/// Relocation result for one annotation, order-preserving with the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveredSpan {
    /// Annotation id this result belongs to
    pub id: String,
    /// Relocated span in the revised text; `None` when nothing was found and
    /// no neighbor was available to interpolate from
    pub span: Option<Span>,
    /// Text at the relocated span, for reviewer display
    pub text: Option<String>,
    /// Tier that produced the span
    pub method: RecoveryMethod,
    /// Score of the producing tier (0.0 for lost)
    pub confidence: f64,
    /// Confidence band the score falls into, shared with aggregation
    pub tier: ConfidenceTier,
    /// Set whenever confidence falls below the review threshold
    pub needs_review: bool,
}

impl RecoveredSpan {
    /// Result for an annotation no tier could place.
    pub(crate) fn lost(id: &str) -> Self {
        Self {
            id: id.to_string(),
            span: None,
            text: None,
            method: RecoveryMethod::Lost,
            confidence: 0.0,
            tier: ConfidenceTier::None,
            needs_review: true,
        }
    }
}

/// A target chunk with aggregated attributes and confidence evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedChunk {
    pub id: String,
    pub span: Span,
    pub text: String,
    /// Attributes aggregated from the overlapping source chunks
    pub attributes: ChunkAttributes,
    /// Tier derived from overlap count and maximum overlap fraction
    pub confidence: ConfidenceTier,
    /// Number of source chunks that overlapped this target
    pub overlap_count: usize,
    /// Largest overlap fraction among those sources
    pub max_fraction: f64,
    /// Set when the attributes were copied from a nearest neighbor instead
    /// of an actual overlap
    pub interpolated: bool,
}
