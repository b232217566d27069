//! Domain-specific errors

use thiserror::Error;

/// Errors raised by the pure reconciliation algorithms
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Document text was empty
    #[error("document text is empty")]
    EmptyDocument,

    /// Span is inverted or zero-length
    #[error("span {start}..{end} is empty or inverted")]
    EmptySpan { start: usize, end: usize },

    /// Span extends past the end of the document
    #[error("span {start}..{end} is out of bounds for a document of {len} bytes")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    /// Span offset falls inside a multi-byte character
    #[error("offset {offset} is not a character boundary")]
    NotCharBoundary { offset: usize },

    /// The text at a produced span does not match the text it claims to hold
    #[error("slice at {start}..{end} does not match the expected text")]
    SliceMismatch { start: usize, end: usize },

    /// Annotation carries no text to search for
    #[error("annotation {0} has empty original text")]
    EmptyOriginalText(String),
}
