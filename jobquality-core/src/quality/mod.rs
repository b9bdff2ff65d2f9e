//! Data quality assessment module.
//!
//! This module turns a batch of job records into a quality report:
//! - **Language**: Heuristic detection of the posting language
//! - **Detectors**: Per-record issues attributed to a pipeline stage
//! - **Scoring**: Completeness, accuracy, consistency, and classification
//! - **Duplicates**: Shared codes and re-posted titles
//! - **Anomalies**: Unmapped locations, unknown grades, bad dates
//! - **Failure patterns**: Likely causes of labeling failures
//!
//! Dirty input is reported as findings; analysis itself never fails.
//!
//! # Example
//! ```rust,ignore
//! use jobquality_core::quality::{QualityAnalyzer, QualityConfig};
//!
//! let analyzer = QualityAnalyzer::new(QualityConfig::default());
//! let summary = analyzer.summarize(&records);
//! println!("{} of {} jobs are clean", summary.clean_jobs, summary.total_jobs);
//! ```

mod aggregate;
mod analyzer;
mod anomaly;
mod config;
mod detectors;
mod duplicates;
mod language;
mod models;
mod patterns;
mod scorer;

// Re-export public API
pub use analyzer::QualityAnalyzer;
pub use anomaly::{
    LOCATION_ALIASES, find_date_anomalies, find_unmapped_locations, find_unrecognized_grades, interpret_grade,
    is_recognized_grade, suggest_location,
};
pub use config::{
    BOILERPLATE_MAX_CHARS, ConfigValidationError, DEFAULT_CLASSIFICATION_CONFIDENCE,
    DUPLICATE_WINDOW_DAYS, LOW_CONFIDENCE_THRESHOLD, QualityConfig, ResultLimits,
    SHORT_DESCRIPTION_CHARS, ScoreWeights,
};
pub use detectors::{BOILERPLATE_PHRASES, DETECTORS, DetectionContext, Detector, run_detectors};
pub use duplicates::{
    find_duplicates, find_title_agency_location_duplicates, find_uniquecode_duplicates,
};
pub use language::{
    LANGUAGE_FALLBACK_CONFIDENCE, LANGUAGE_FALLBACK_THRESHOLD, Language, LanguageDetection,
    detect_language,
};
pub use models::{
    AgencyCount, AgencyPipelineHealth, AgencyQualityStats, ContentIssues, DataQualityIssue,
    DataQualityScore, DataQualitySummary, DateAnomaly, DateAnomalyType, DuplicateGroup,
    DuplicateJob, DuplicateType, FailurePatternType, IssueSample, IssueType, JobQualityAssessment,
    LanguageIssues, LocationSuggestion, OpenAiFailurePattern, PipelineStep,
    ScraperExtractorIssues, Severity, Trend, UnmappedLocation, UnrecognizedGrade,
};
pub use patterns::analyze_failure_patterns;
pub use scorer::{CONSISTENCY_BASELINE, calculate_overall, score_record};
