//! Quality assessment configuration.
//!
//! Thresholds, result caps, and scoring weights are policy values. They live
//! here so that retuning them never touches detector logic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Descriptions shorter than this many characters are "short".
pub const SHORT_DESCRIPTION_CHARS: usize = 100;
/// Boilerplate phrases only count against descriptions under this length.
pub const BOILERPLATE_MAX_CHARS: usize = 300;
/// Classification confidence below this value is reported.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 40.0;
/// Confidence assumed when the categorizer left no value.
pub const DEFAULT_CLASSIFICATION_CONFIDENCE: f64 = 50.0;
/// Same title/agency/station postings closer than this are duplicates.
pub const DUPLICATE_WINDOW_DAYS: i64 = 30;

/// Score deductions and field weights used by the quality scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Accuracy deduction per critical issue
    pub critical: f64,
    /// Accuracy deduction per warning issue
    pub warning: f64,
    /// Accuracy deduction per info issue
    pub info: f64,
    /// Completeness deduction for a missing title
    pub title: f64,
    /// Completeness deduction for a missing or short description
    pub description: f64,
    pub duty_station: f64,
    pub duty_country: f64,
    pub up_grade: f64,
    pub job_labels: f64,
    pub posting_date: f64,
    pub apply_until: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            critical: 15.0,
            warning: 8.0,
            info: 3.0,
            title: 25.0,
            description: 20.0,
            duty_station: 15.0,
            duty_country: 10.0,
            up_grade: 10.0,
            job_labels: 10.0,
            posting_date: 5.0,
            apply_until: 5.0,
        }
    }
}

impl ScoreWeights {
    fn all(&self) -> [(&'static str, f64); 11] {
        [
            ("critical", self.critical),
            ("warning", self.warning),
            ("info", self.info),
            ("title", self.title),
            ("description", self.description),
            ("duty_station", self.duty_station),
            ("duty_country", self.duty_country),
            ("up_grade", self.up_grade),
            ("job_labels", self.job_labels),
            ("posting_date", self.posting_date),
            ("apply_until", self.apply_until),
        ]
    }
}

/// Upper bounds on the lists emitted in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultLimits {
    pub duplicate_groups: usize,
    pub unmapped_locations: usize,
    pub unrecognized_grades: usize,
    pub date_anomalies: usize,
    /// Sample entries kept per rollup (language, content, scraper/extractor)
    pub samples: usize,
    /// Sample job ids kept per unmapped location or grade
    pub sample_job_ids: usize,
}

impl Default for ResultLimits {
    fn default() -> Self {
        Self {
            duplicate_groups: 50,
            unmapped_locations: 30,
            unrecognized_grades: 20,
            date_anomalies: 100,
            samples: 10,
            sample_job_ids: 5,
        }
    }
}

/// Quality assessment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Minimum description length (characters) before it is "short"
    pub short_description_chars: usize,
    /// Maximum description length at which boilerplate is flagged
    pub boilerplate_max_chars: usize,
    /// Classification confidence (0-100) below which an issue is raised
    pub low_confidence_threshold: f64,
    /// Window for same title/agency/station duplicates
    pub duplicate_window_days: i64,
    /// Result list caps
    pub limits: ResultLimits,
    /// Scoring weights
    pub weights: ScoreWeights,
}

/// Validation errors for quality configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("low_confidence_threshold must be between 0 and 100, got {0}")]
    InvalidConfidenceThreshold(f64),
    #[error("duplicate_window_days must be at least 1, got {0}")]
    InvalidDuplicateWindow(i64),
    #[error("short_description_chars must be at least 1, got {0}")]
    InvalidShortDescription(usize),
    #[error("boilerplate_max_chars must be at least 1, got {0}")]
    InvalidBoilerplateMax(usize),
    #[error("score weight '{name}' must be a finite value between 0 and 100, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            short_description_chars: SHORT_DESCRIPTION_CHARS,
            boilerplate_max_chars: BOILERPLATE_MAX_CHARS,
            low_confidence_threshold: LOW_CONFIDENCE_THRESHOLD,
            duplicate_window_days: DUPLICATE_WINDOW_DAYS,
            limits: ResultLimits::default(),
            weights: ScoreWeights::default(),
        }
    }
}

impl QualityConfig {
    /// Creates a new quality config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the low classification confidence threshold.
    pub fn with_low_confidence_threshold(mut self, threshold: f64) -> Self {
        if !(0.0..=100.0).contains(&threshold) {
            tracing::warn!(
                "low_confidence_threshold {} clamped to valid range [0, 100]",
                threshold
            );
        }
        self.low_confidence_threshold = threshold.clamp(0.0, 100.0);
        self
    }

    /// Builder method to set the duplicate posting window in days.
    pub fn with_duplicate_window_days(mut self, days: i64) -> Self {
        if days < 1 {
            tracing::warn!("duplicate_window_days {} raised to 1", days);
        }
        self.duplicate_window_days = days.max(1);
        self
    }

    /// Builder method to set the short description threshold.
    pub fn with_short_description_chars(mut self, chars: usize) -> Self {
        if chars < 1 {
            tracing::warn!("short_description_chars {} raised to 1", chars);
        }
        self.short_description_chars = chars.max(1);
        self
    }

    /// Builder method to set the boilerplate length ceiling.
    pub fn with_boilerplate_max_chars(mut self, chars: usize) -> Self {
        if chars < 1 {
            tracing::warn!("boilerplate_max_chars {} raised to 1", chars);
        }
        self.boilerplate_max_chars = chars.max(1);
        self
    }

    /// Builder method to set result caps.
    pub fn with_limits(mut self, limits: ResultLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builder method to set scoring weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error if any threshold or weight is outside its valid range.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=100.0).contains(&self.low_confidence_threshold) {
            return Err(ConfigValidationError::InvalidConfidenceThreshold(
                self.low_confidence_threshold,
            ));
        }
        if self.duplicate_window_days < 1 {
            return Err(ConfigValidationError::InvalidDuplicateWindow(
                self.duplicate_window_days,
            ));
        }
        if self.short_description_chars == 0 {
            return Err(ConfigValidationError::InvalidShortDescription(
                self.short_description_chars,
            ));
        }
        if self.boilerplate_max_chars == 0 {
            return Err(ConfigValidationError::InvalidBoilerplateMax(
                self.boilerplate_max_chars,
            ));
        }
        for (name, value) in self.weights.all() {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ConfigValidationError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}
