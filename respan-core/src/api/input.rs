//! Request types for multi-document batches
//!
//! One request bundles everything the core needs for one document: the
//! revised text and the offset lists that reference it. Requests for
//! different documents share no state and may be processed in parallel.

use serde::{Deserialize, Serialize};

use crate::domain::types::{Annotation, ChunkRef, SourceChunk, TargetChunk};

/// Annotation recovery request for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryRequest {
    /// Caller-assigned document identifier, echoed in logs only
    pub document_id: String,
    /// Revised document text the annotations must be relocated into
    pub text: String,
    /// Annotations recorded against the previous layout
    pub annotations: Vec<Annotation>,
    /// Chunk lookup list for the chunk-bounded tier; may be empty
    #[serde(default)]
    pub chunks: Vec<ChunkRef>,
}

/// Chunk alignment request for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentRequest {
    /// Caller-assigned document identifier, echoed in logs only
    pub document_id: String,
    /// Document text both chunkings segment
    pub text: String,
    /// Structural chunks carrying the attributes to transfer
    pub sources: Vec<SourceChunk>,
    /// Chunks receiving the transferred attributes
    pub targets: Vec<TargetChunk>,
}
