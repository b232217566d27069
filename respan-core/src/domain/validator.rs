//! Offset validation
//!
//! Single integrity gate for every span this crate accepts or produces.
//! `validate_bounds` runs before any matching or aggregation; `validate_slice`
//! runs on every span handed back to a caller. A slice mismatch is fatal for
//! the one record involved and is never silently ignored.

use super::error::DomainError;
use super::types::Span;

/// Reject empty document text before any processing starts.
pub fn validate_document(text: &str) -> Result<(), DomainError> {
    if text.is_empty() {
        return Err(DomainError::EmptyDocument);
    }
    Ok(())
}

/// Check that a span is well-formed for the given document text.
///
/// Rejects inverted and empty spans, offsets past the end of the text, and
/// offsets that fall inside a multi-byte character.
pub fn validate_bounds(text: &str, span: &Span) -> Result<(), DomainError> {
    if span.is_empty() {
        return Err(DomainError::EmptySpan {
            start: span.start,
            end: span.end,
        });
    }
    if span.end > text.len() {
        return Err(DomainError::SpanOutOfBounds {
            start: span.start,
            end: span.end,
            len: text.len(),
        });
    }
    for offset in [span.start, span.end] {
        if !text.is_char_boundary(offset) {
            return Err(DomainError::NotCharBoundary { offset });
        }
    }
    Ok(())
}

/// Check that a span is well-formed in shape only (no document at hand).
///
/// Annotation spans reference the previous layout, so only their shape can
/// be checked against the revised text.
pub fn validate_shape(span: &Span) -> Result<(), DomainError> {
    if span.is_empty() {
        return Err(DomainError::EmptySpan {
            start: span.start,
            end: span.end,
        });
    }
    Ok(())
}

/// Re-slice `text[span]` and compare byte-for-byte against `expected`.
pub fn validate_slice(text: &str, span: &Span, expected: &str) -> Result<(), DomainError> {
    validate_bounds(text, span)?;
    if &text[span.start..span.end] != expected {
        return Err(DomainError::SliceMismatch {
            start: span.start,
            end: span.end,
        });
    }
    Ok(())
}
