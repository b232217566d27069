//! Public API for span reconciliation
//!
//! This module provides the validated entry points around the pure domain
//! algorithms: configuration, request/response types and the reconciler
//! itself.

mod config;
mod error;
mod input;
mod output;
mod processor;

pub use config::{
    default_profile, defaults, BatchSection, Config, ConfigBuilder, MatchingSection,
    ProfileMetadata, ScoringProfile, SearchSection,
};
pub use error::{Error, Result};
pub use input::{AlignmentRequest, RecoveryRequest};
pub use output::{AlignmentOutput, BatchSummary, RecoveryOutput};
pub use processor::SpanReconciler;
