//! Quality analyzer facade.
//!
//! This module provides the main `QualityAnalyzer` that runs the per-record
//! detectors and scorer over a batch and assembles the summary report.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::models::JobRecord;

use super::aggregate::{
    agency_pipeline_health, agency_stats, content_issues, count_by_issue_type,
    count_by_pipeline_step, count_by_severity, language_issues, overall_score,
    scraper_extractor_issues,
};
use super::anomaly::{find_date_anomalies, find_unmapped_locations, find_unrecognized_grades};
use super::config::QualityConfig;
use super::detectors::{DetectionContext, run_detectors};
use super::duplicates::find_duplicates;
use super::language::detect_language;
use super::models::{DataQualitySummary, JobQualityAssessment, Severity, Trend};
use super::patterns::analyze_failure_patterns;
use super::scorer::score_record;

/// Quality analyzer for job posting batches.
///
/// The analyzer assesses each `JobRecord` independently, then reduces the
/// assessments into a `DataQualitySummary` with rollups, duplicate groups,
/// anomalies, and failure patterns.
///
/// # Example
///
/// ```rust,ignore
/// use jobquality_core::quality::{QualityAnalyzer, QualityConfig};
///
/// let analyzer = QualityAnalyzer::new(QualityConfig::default());
/// let summary = analyzer.summarize(&records);
/// println!("Overall score: {:.1}", summary.overall_score);
/// ```
#[derive(Debug, Clone)]
pub struct QualityAnalyzer {
    config: QualityConfig,
}

impl QualityAnalyzer {
    /// Creates a new quality analyzer with the given configuration.
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Creates a new quality analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(QualityConfig::default())
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Assesses a single record.
    ///
    /// `index` is the record's position in its batch and names the record
    /// when it has no `id`. `now` stamps the issues and is the reference
    /// point for future-date checks.
    pub fn assess(&self, index: usize, record: &JobRecord, now: DateTime<Utc>) -> JobQualityAssessment {
        let job_id = record.record_id(index);
        let language = detect_language(record.title_text(), record.description_text());

        let ctx = DetectionContext {
            job_id: &job_id,
            language,
            today: now.date_naive(),
            detected_at: now,
            config: &self.config,
        };
        let issues = run_detectors(record, &ctx);
        let quality_score = score_record(record, &issues, &self.config);

        JobQualityAssessment {
            agency: record.agency().to_string(),
            title: record.title_text().to_string(),
            issues,
            quality_score,
            detected_language: language.language,
            language_confidence: language.confidence,
            description_length: record.description_length(),
            job_id,
        }
    }

    /// Assesses every record in parallel.
    ///
    /// The result is in input order.
    pub fn assess_all(&self, records: &[JobRecord], now: DateTime<Utc>) -> Vec<JobQualityAssessment> {
        records
            .par_iter()
            .enumerate()
            .map(|(index, record)| self.assess(index, record, now))
            .collect()
    }

    /// Produces the summary report, stamped with the current time.
    pub fn summarize(&self, records: &[JobRecord]) -> DataQualitySummary {
        self.summarize_at(records, Utc::now())
    }

    /// Produces the summary report against a fixed reference time.
    ///
    /// Identical inputs and `now` produce identical summaries.
    pub fn summarize_at(&self, records: &[JobRecord], now: DateTime<Utc>) -> DataQualitySummary {
        tracing::debug!("Assessing {} job records", records.len());
        let assessments = self.assess_all(records, now);

        let clean_jobs = assessments.iter().filter(|a| a.issues.is_empty()).count();
        let by_severity = count_by_severity(&assessments);
        let severity_count = |severity: Severity| by_severity.get(&severity).copied().unwrap_or(0);
        let (critical_issues, warning_issues, info_issues) = (
            severity_count(Severity::Critical),
            severity_count(Severity::Warning),
            severity_count(Severity::Info),
        );

        let limits = &self.config.limits;
        tracing::debug!("Aggregating rollups for {} assessments", assessments.len());
        let by_agency = agency_stats(&assessments);
        let agency_pipeline_health = agency_pipeline_health(&assessments);
        let language_issues = language_issues(&assessments, limits.samples);
        let content_issues = content_issues(&assessments, limits.samples);
        let scraper_extractor_issues = scraper_extractor_issues(&assessments, limits.samples);

        tracing::debug!("Running cross-record analyses");
        let duplicate_groups = find_duplicates(records, &self.config);
        let unmapped_locations = find_unmapped_locations(records, limits);
        let unrecognized_grades = find_unrecognized_grades(records, limits);
        let date_anomalies = find_date_anomalies(records, now.date_naive(), limits.date_anomalies);
        let openai_failure_patterns =
            analyze_failure_patterns(&assessments, self.config.short_description_chars);

        let summary = DataQualitySummary {
            total_jobs: assessments.len(),
            clean_jobs,
            jobs_with_issues: assessments.len() - clean_jobs,
            critical_issues,
            warning_issues,
            info_issues,
            overall_score: overall_score(&assessments),
            trend: Trend::Stable,
            by_issue_type: count_by_issue_type(&assessments),
            by_pipeline_step: count_by_pipeline_step(&assessments),
            by_severity,
            by_agency,
            agency_pipeline_health,
            language_issues,
            content_issues,
            scraper_extractor_issues,
            duplicate_groups,
            unmapped_locations,
            unrecognized_grades,
            date_anomalies,
            openai_failure_patterns,
            last_refreshed: now,
        };

        tracing::info!(
            "Assessed {} job records: {} clean, {} critical issues, overall score {:.1}",
            summary.total_jobs,
            summary.clean_jobs,
            summary.critical_issues,
            summary.overall_score
        );
        if !summary.duplicate_groups.is_empty() {
            tracing::warn!("Found {} duplicate groups", summary.duplicate_groups.len());
        }

        summary
    }
}
