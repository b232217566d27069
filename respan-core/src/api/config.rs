//! Configuration for span reconciliation
//!
//! Every threshold the matcher and scorer consult lives here: the tier
//! bands, the per-tier confidence scores, the review cutoff, the trigram
//! floor and the search windows. The numbers are corpus-dependent, so they
//! are configuration, via the builder or a TOML scoring profile, rather
//! than literals in the algorithms.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::api::Error;
use crate::domain::{MatchSettings, ScoringBands};

/// Default configuration constants
pub mod defaults {
    /// Characters captured on each side of a span for anchor context
    pub const ANCHOR_MAX_LEN: usize = 50;

    /// Batch success rate below which a low-coverage warning is raised
    pub const LOW_COVERAGE_THRESHOLD: f64 = 0.7;
}

/// Processing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub(crate) bands: ScoringBands,
    pub(crate) matching: MatchSettings,
    pub(crate) anchor_max_len: usize,
    pub(crate) low_coverage_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bands: ScoringBands::default(),
            matching: MatchSettings::default(),
            anchor_max_len: defaults::ANCHOR_MAX_LEN,
            low_coverage_threshold: defaults::LOW_COVERAGE_THRESHOLD,
        }
    }
}

impl Config {
    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a configuration from a parsed scoring profile
    pub fn from_profile(profile: &ScoringProfile) -> Result<Self, Error> {
        let config = Self {
            bands: profile.bands,
            matching: MatchSettings {
                tier_exact: profile.matching.exact,
                tier_context: profile.matching.context,
                tier_chunk_bounded: profile.matching.chunk_bounded,
                tier_trigram: profile.matching.trigram,
                review_threshold: profile.matching.review_threshold,
                trigram_floor: profile.matching.trigram_floor,
                position_tolerance: profile.search.position_tolerance,
                chunk_drift_tolerance: profile.search.chunk_drift_tolerance,
                max_scan_windows: profile.search.max_scan_windows,
            },
            anchor_max_len: profile.search.anchor_max_len,
            low_coverage_threshold: profile.batch.low_coverage_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML scoring profile and build a configuration from it
    pub fn from_profile_str(toml_str: &str) -> Result<Self, Error> {
        let profile: ScoringProfile = toml::from_str(toml_str)
            .map_err(|e| Error::Configuration(format!("failed to parse scoring profile: {e}")))?;
        Self::from_profile(&profile)
    }

    /// Read and parse a TOML scoring profile from disk
    pub fn from_profile_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_profile_str(&contents)
    }

    /// Confidence band boundaries in use
    pub fn bands(&self) -> &ScoringBands {
        &self.bands
    }

    /// Matcher settings in use
    pub fn matching(&self) -> &MatchSettings {
        &self.matching
    }

    /// Anchor capture length for `AnchorContext::capture`
    pub fn anchor_max_len(&self) -> usize {
        self.anchor_max_len
    }

    /// Validate the configuration
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::Configuration(format!(
                    "{name} must lie in [0, 1], got {value}"
                )))
            }
        };
        unit("bands.high", self.bands.high)?;
        unit("bands.medium", self.bands.medium)?;
        unit("bands.high_coverage", self.bands.high_coverage)?;
        unit("bands.medium_coverage", self.bands.medium_coverage)?;
        unit("matching.exact", self.matching.tier_exact)?;
        unit("matching.context", self.matching.tier_context)?;
        unit("matching.chunk_bounded", self.matching.tier_chunk_bounded)?;
        unit("matching.trigram", self.matching.tier_trigram)?;
        unit("matching.review_threshold", self.matching.review_threshold)?;
        unit("matching.trigram_floor", self.matching.trigram_floor)?;
        unit("batch.low_coverage_threshold", self.low_coverage_threshold)?;

        if self.bands.high < self.bands.medium {
            return Err(Error::Configuration(
                "bands.high must not be below bands.medium".into(),
            ));
        }
        if self.bands.corroboration == 0 {
            return Err(Error::Configuration(
                "bands.corroboration must be at least 1".into(),
            ));
        }
        if self.matching.max_scan_windows == 0 {
            return Err(Error::Configuration(
                "search.max_scan_windows must be greater than 0".into(),
            ));
        }
        if self.anchor_max_len == 0 {
            return Err(Error::Configuration(
                "search.anchor_max_len must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    bands: Option<ScoringBands>,
    matching: Option<MatchSettings>,
    review_threshold: Option<f64>,
    trigram_floor: Option<f64>,
    anchor_max_len: Option<usize>,
    low_coverage_threshold: Option<f64>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the confidence band boundaries
    pub fn bands(mut self, bands: ScoringBands) -> Self {
        self.bands = Some(bands);
        self
    }

    /// Replace the matcher settings wholesale
    pub fn matching(mut self, matching: MatchSettings) -> Self {
        self.matching = Some(matching);
        self
    }

    /// Set the confidence below which results are flagged for review
    pub fn review_threshold(mut self, threshold: f64) -> Self {
        self.review_threshold = Some(threshold);
        self
    }

    /// Set the minimum trigram similarity the fuzzy tier accepts
    pub fn trigram_floor(mut self, floor: f64) -> Self {
        self.trigram_floor = Some(floor);
        self
    }

    /// Set the anchor capture length
    pub fn anchor_max_len(mut self, chars: usize) -> Self {
        self.anchor_max_len = Some(chars);
        self
    }

    /// Set the batch success rate below which a warning is raised
    pub fn low_coverage_threshold(mut self, threshold: f64) -> Self {
        self.low_coverage_threshold = Some(threshold);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config, Error> {
        let mut config = Config::default();
        if let Some(bands) = self.bands {
            config.bands = bands;
        }
        if let Some(matching) = self.matching {
            config.matching = matching;
        }
        if let Some(threshold) = self.review_threshold {
            config.matching.review_threshold = threshold;
        }
        if let Some(floor) = self.trigram_floor {
            config.matching.trigram_floor = floor;
        }
        if let Some(chars) = self.anchor_max_len {
            config.anchor_max_len = chars;
        }
        if let Some(threshold) = self.low_coverage_threshold {
            config.low_coverage_threshold = threshold;
        }
        config.validate()?;
        Ok(config)
    }
}

/// A scoring profile as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub metadata: ProfileMetadata,
    pub bands: ScoringBands,
    pub matching: MatchingSection,
    pub search: SearchSection,
    pub batch: BatchSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingSection {
    pub exact: f64,
    pub context: f64,
    pub chunk_bounded: f64,
    pub trigram: f64,
    pub review_threshold: f64,
    pub trigram_floor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    pub position_tolerance: usize,
    pub chunk_drift_tolerance: usize,
    pub max_scan_windows: usize,
    pub anchor_max_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSection {
    pub low_coverage_threshold: f64,
}

static DEFAULT_PROFILE: OnceLock<ScoringProfile> = OnceLock::new();

/// The profile embedded in the crate, matching `Config::default()`.
pub fn default_profile() -> &'static ScoringProfile {
    DEFAULT_PROFILE.get_or_init(|| {
        toml::from_str(include_str!("../../configs/scoring/default.toml"))
            .expect("embedded default scoring profile must parse")
    })
}
