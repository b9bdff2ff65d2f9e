//! Composite quality scoring for a single record.
//!
//! Four dimensions, each clamped to `[0, 100]`, and an overall score equal
//! to their mean rounded to one decimal.

use crate::models::{JobRecord, present};

use super::config::{DEFAULT_CLASSIFICATION_CONFIDENCE, QualityConfig, ScoreWeights};
use super::models::{DataQualityIssue, DataQualityScore, Severity, round1};

/// Score given to the consistency dimension.
///
/// No cross-field consistency rules exist yet; this is the extension point
/// where they would deduct.
pub const CONSISTENCY_BASELINE: f64 = 100.0;

/// Scores one record given the issues its detectors produced.
pub fn score_record(
    record: &JobRecord,
    issues: &[DataQualityIssue],
    config: &QualityConfig,
) -> DataQualityScore {
    let completeness = completeness_score(record, config);
    let accuracy = accuracy_score(issues, &config.weights);
    let consistency = CONSISTENCY_BASELINE;
    let classification = record
        .classification_confidence
        .unwrap_or(DEFAULT_CLASSIFICATION_CONFIDENCE)
        .clamp(0.0, 100.0);

    DataQualityScore {
        overall: calculate_overall(completeness, accuracy, consistency, classification),
        completeness,
        accuracy,
        consistency,
        classification,
    }
}

/// Mean of the four dimensions, rounded to one decimal and floored at 0.
pub fn calculate_overall(
    completeness: f64,
    accuracy: f64,
    consistency: f64,
    classification: f64,
) -> f64 {
    round1((completeness + accuracy + consistency + classification) / 4.0).max(0.0)
}

fn completeness_score(record: &JobRecord, config: &QualityConfig) -> f64 {
    let weights = &config.weights;
    let deductions = [
        (present(&record.title).is_none(), weights.title),
        (
            record.description_length() < config.short_description_chars,
            weights.description,
        ),
        (present(&record.duty_station).is_none(), weights.duty_station),
        (present(&record.duty_country).is_none(), weights.duty_country),
        (present(&record.up_grade).is_none(), weights.up_grade),
        (present(&record.job_labels).is_none(), weights.job_labels),
        (present(&record.posting_date).is_none(), weights.posting_date),
        (present(&record.apply_until).is_none(), weights.apply_until),
    ];

    let missing: f64 = deductions
        .iter()
        .filter(|(is_missing, _)| *is_missing)
        .map(|(_, weight)| weight)
        .sum();

    (100.0 - missing).clamp(0.0, 100.0)
}

fn accuracy_score(issues: &[DataQualityIssue], weights: &ScoreWeights) -> f64 {
    let deducted: f64 = issues
        .iter()
        .map(|issue| match issue.severity {
            Severity::Critical => weights.critical,
            Severity::Warning => weights.warning,
            Severity::Info => weights.info,
        })
        .sum();

    (100.0 - deducted).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::models::IssueType;
    use chrono::{DateTime, Utc};

    fn issue(issue_type: IssueType) -> DataQualityIssue {
        DataQualityIssue::new(
            "job-1",
            issue_type,
            "field",
            None,
            "",
            "",
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    fn complete_record() -> JobRecord {
        JobRecord {
            title: Some("Programme Officer".to_string()),
            description: Some("d".repeat(150)),
            duty_station: Some("Nairobi".to_string()),
            duty_country: Some("Kenya".to_string()),
            up_grade: Some("P-3".to_string()),
            job_labels: Some("coordination".to_string()),
            posting_date: Some("2025-06-01".to_string()),
            apply_until: Some("2025-06-30".to_string()),
            classification_confidence: Some(90.0),
            ..JobRecord::default()
        }
    }

    #[test]
    fn test_clean_record_scores() {
        let score = score_record(&complete_record(), &[], &QualityConfig::default());

        assert_eq!(score.completeness, 100.0);
        assert_eq!(score.accuracy, 100.0);
        assert_eq!(score.consistency, 100.0);
        assert_eq!(score.classification, 90.0);
        assert_eq!(score.overall, 97.5);
    }

    #[test]
    fn test_empty_record_completeness_floor() {
        let score = score_record(&JobRecord::default(), &[], &QualityConfig::default());

        assert_eq!(score.completeness, 0.0);
        assert_eq!(score.classification, DEFAULT_CLASSIFICATION_CONFIDENCE);
        assert_eq!(score.overall, 62.5);
    }

    #[test]
    fn test_short_description_costs_completeness() {
        let record = JobRecord {
            description: Some("Too short".to_string()),
            up_grade: None,
            ..complete_record()
        };
        let score = score_record(&record, &[], &QualityConfig::default());
        assert_eq!(score.completeness, 70.0);
    }

    #[test]
    fn test_accuracy_weights_by_severity() {
        let issues = vec![
            issue(IssueType::MissingTitle),
            issue(IssueType::ShortDescription),
            issue(IssueType::MissingContinent),
        ];
        let score = score_record(&complete_record(), &issues, &QualityConfig::default());
        assert_eq!(score.accuracy, 100.0 - 15.0 - 8.0 - 3.0);
    }

    #[test]
    fn test_accuracy_clamped_at_zero() {
        let issues: Vec<_> = (0..13).map(|_| issue(IssueType::EmptyLabels)).collect();
        let score = score_record(&complete_record(), &issues, &QualityConfig::default());
        assert_eq!(score.accuracy, 0.0);
    }

    #[test]
    fn test_classification_clamped() {
        let record = JobRecord {
            classification_confidence: Some(250.0),
            ..complete_record()
        };
        let score = score_record(&record, &[], &QualityConfig::default());
        assert_eq!(score.classification, 100.0);

        let record = JobRecord {
            classification_confidence: Some(-20.0),
            ..complete_record()
        };
        let score = score_record(&record, &[], &QualityConfig::default());
        assert_eq!(score.classification, 0.0);
    }

    #[test]
    fn test_overall_rounding() {
        assert_eq!(calculate_overall(100.0, 77.0, 100.0, 50.0), 81.8);
        assert_eq!(calculate_overall(0.0, 0.0, 0.0, 0.0), 0.0);
    }
}
