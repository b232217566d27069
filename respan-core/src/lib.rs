//! Deterministic relocation of text-span references after a document's
//! segmentation changes.
//!
//! Two operations cover the two ways a re-segmentation breaks offsets:
//!
//! - **Annotation recovery**: user-authored spans recorded against an old
//!   text layout are relocated into the revised text through a four-tier
//!   matcher (exact, context anchors, chunk-bounded, trigram similarity),
//!   each result carrying a calibrated confidence and a review flag.
//! - **Chunk alignment**: structural metadata from one chunking pass is
//!   transferred onto an independently-boundaried chunking of the same text
//!   via interval overlap and per-field aggregation rules.
//!
//! Both are pure functions over caller-supplied text and offset lists: the
//! crate fetches nothing, persists nothing and holds no state between
//! calls. When no correspondence exists the result falls back to a
//! nearest-neighbor interpolation that is always flagged for manual review,
//! never silently dropped.
//!
//! # Example
//!
//! ```rust
//! use respan_core::{Annotation, AnchorContext, Span, SpanReconciler};
//!
//! let revised = "It was a bright cold day in April.";
//! let annotation = Annotation {
//!     id: "a1".into(),
//!     span: Span::new(9, 20),
//!     original_text: "bright cold".into(),
//!     anchor_context: AnchorContext::default(),
//!     source_chunk_refs: Vec::new(),
//! };
//!
//! let reconciler = SpanReconciler::new();
//! let output = reconciler
//!     .recover_annotations(revised, &[annotation], &[])
//!     .unwrap();
//! assert_eq!(output.spans[0].span, Some(Span::new(9, 20)));
//! assert_eq!(output.spans[0].confidence, 1.0);
//! assert!(!output.spans[0].needs_review);
//! ```

pub mod api;
pub mod domain;

pub use api::{
    default_profile, AlignmentOutput, AlignmentRequest, BatchSummary, Config, ConfigBuilder,
    Error, RecoveryOutput, RecoveryRequest, Result, ScoringProfile, SpanReconciler,
};
pub use domain::types::{
    AnchorContext, Annotation, BoundingBox, ChunkAttributes, ChunkRef, ConfidenceTier,
    ContentLabel, ContentLayer, EnrichedChunk, OverlapRecord, PageRange, RecoveredSpan,
    RecoveryMethod, SourceChunk, Span, TargetChunk,
};
pub use domain::{ConfidenceScorer, DomainError, MatchSettings, ScoringBands};
