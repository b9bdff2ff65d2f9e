//! Root-cause analysis for labeling failures.
//!
//! Records whose labeling or categorization failed form the failure
//! population. Each pattern here is a hypothesis about why a subset of that
//! population failed, with the affected agencies ranked so the fix can be
//! targeted.

use super::aggregate::rank_agencies;
use super::language::Language;
use super::models::{
    FailurePatternType, IssueType, JobQualityAssessment, OpenAiFailurePattern, round1,
};

/// Issue types whose co-occurrence points at throttled enrichment calls.
const RATE_LIMIT_SIGNALS: [IssueType; 4] = [
    IssueType::EmptyLabels,
    IssueType::NullSectoralCategory,
    IssueType::NullExperienceFields,
    IssueType::EmptyLanguages,
];

/// Minimum number of [`RATE_LIMIT_SIGNALS`] a record must carry.
const RATE_LIMIT_MIN_SIGNALS: usize = 3;

/// Whether an assessment looks like a throttled enrichment call.
fn is_rate_limited(assessment: &JobQualityAssessment) -> bool {
    RATE_LIMIT_SIGNALS
        .iter()
        .filter(|issue_type| assessment.has_issue(**issue_type))
        .count()
        >= RATE_LIMIT_MIN_SIGNALS
}

/// Infers systemic causes behind labeling and categorization failures.
///
/// Patterns that match no record are omitted. Percentages are relative to
/// the failure population. `short_description_chars` is the same threshold
/// the detectors use for short descriptions.
pub fn analyze_failure_patterns(
    assessments: &[JobQualityAssessment],
    short_description_chars: usize,
) -> Vec<OpenAiFailurePattern> {
    let failures: Vec<&JobQualityAssessment> = assessments
        .iter()
        .filter(|a| a.has_labeling_failure())
        .collect();
    let population = failures.len().max(1) as f64;

    let non_english: Vec<_> = failures
        .iter()
        .copied()
        .filter(|a| a.detected_language != Language::En)
        .collect();
    let rate_limited: Vec<_> = failures
        .iter()
        .copied()
        .filter(|a| is_rate_limited(a))
        .collect();
    let short_input: Vec<_> = failures
        .iter()
        .copied()
        .filter(|a| a.description_length < short_description_chars)
        .collect();

    let candidates = [
        (
            FailurePatternType::NonEnglish,
            non_english,
            "Labeling failed on postings not detected as English",
            "Translate descriptions before labeling or use a multilingual labeling prompt",
        ),
        (
            FailurePatternType::RateLimit,
            rate_limited,
            "Labels, category, experience, and languages are all empty together, which points at throttled or dropped enrichment calls",
            "Add retry with backoff around the enrichment calls and re-run the affected batch",
        ),
        (
            FailurePatternType::ShortInput,
            short_input,
            "Labeling failed on descriptions too short to classify",
            "Fix the scraper so the full description is captured before labeling",
        ),
    ];

    candidates
        .into_iter()
        .filter(|(_, matches, _, _)| !matches.is_empty())
        .map(|(pattern_type, matches, description, suggested_fix)| OpenAiFailurePattern {
            pattern_type,
            count: matches.len(),
            percentage: round1(matches.len() as f64 / population * 100.0),
            affected_agencies: rank_agencies(matches.iter().map(|a| a.agency.as_str())),
            description: description.to_string(),
            suggested_fix: suggested_fix.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::config::SHORT_DESCRIPTION_CHARS;
    use crate::quality::models::{AgencyCount, DataQualityIssue, DataQualityScore};
    use chrono::{DateTime, Utc};

    fn assessment(
        job_id: &str,
        agency: &str,
        language: Language,
        description_length: usize,
        issue_types: &[IssueType],
    ) -> JobQualityAssessment {
        JobQualityAssessment {
            job_id: job_id.to_string(),
            agency: agency.to_string(),
            title: String::new(),
            issues: issue_types
                .iter()
                .map(|t| DataQualityIssue::new(job_id, *t, "", None, "", "", DateTime::<Utc>::UNIX_EPOCH))
                .collect(),
            quality_score: DataQualityScore {
                overall: 0.0,
                completeness: 0.0,
                accuracy: 0.0,
                consistency: 0.0,
                classification: 0.0,
            },
            detected_language: language,
            language_confidence: 1.0,
            description_length,
        }
    }

    #[test]
    fn test_no_failures_no_patterns() {
        let assessments = vec![assessment("a", "WHO", Language::Fr, 10, &[])];
        assert!(analyze_failure_patterns(&assessments, SHORT_DESCRIPTION_CHARS).is_empty());
    }

    #[test]
    fn test_non_english_pattern() {
        let assessments = vec![
            assessment("a", "WHO", Language::Fr, 500, &[IssueType::EmptyLabels]),
            assessment("b", "UNDP", Language::Es, 500, &[IssueType::NullSectoralCategory]),
            assessment("c", "WHO", Language::Fr, 500, &[IssueType::EmptyLabels]),
            assessment("d", "WHO", Language::En, 500, &[IssueType::EmptyLabels]),
        ];

        let patterns = analyze_failure_patterns(&assessments, SHORT_DESCRIPTION_CHARS);

        assert_eq!(patterns.len(), 1);
        let pattern = &patterns[0];
        assert_eq!(pattern.pattern_type, FailurePatternType::NonEnglish);
        assert_eq!(pattern.count, 3);
        assert_eq!(pattern.percentage, 75.0);
        assert_eq!(
            pattern.affected_agencies,
            vec![
                AgencyCount { agency: "WHO".to_string(), count: 2 },
                AgencyCount { agency: "UNDP".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_rate_limit_needs_three_signals() {
        let assessments = vec![
            assessment(
                "a",
                "WFP",
                Language::En,
                500,
                &[IssueType::EmptyLabels, IssueType::NullSectoralCategory, IssueType::EmptyLanguages],
            ),
            assessment(
                "b",
                "WFP",
                Language::En,
                500,
                &[IssueType::EmptyLabels, IssueType::NullSectoralCategory],
            ),
        ];

        let patterns = analyze_failure_patterns(&assessments, SHORT_DESCRIPTION_CHARS);

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern_type, FailurePatternType::RateLimit);
        assert_eq!(patterns[0].count, 1);
        assert_eq!(patterns[0].percentage, 50.0);
    }

    #[test]
    fn test_short_input_pattern_and_ordering() {
        let assessments = vec![
            assessment("a", "ILO", Language::Fr, 40, &[IssueType::EmptyLabels]),
            assessment("b", "ILO", Language::En, 99, &[IssueType::EmptyLabels]),
            assessment("c", "ILO", Language::En, 100, &[IssueType::EmptyLabels]),
        ];

        let patterns = analyze_failure_patterns(&assessments, SHORT_DESCRIPTION_CHARS);
        let types: Vec<_> = patterns.iter().map(|p| p.pattern_type).collect();

        assert_eq!(
            types,
            vec![FailurePatternType::NonEnglish, FailurePatternType::ShortInput]
        );
        assert_eq!(patterns[1].count, 2);
        assert_eq!(patterns[1].percentage, 66.7);
    }

    #[test]
    fn test_short_input_follows_configured_threshold() {
        let assessments = vec![
            assessment("a", "ILO", Language::En, 81, &[IssueType::EmptyLabels]),
            assessment("b", "ILO", Language::En, 49, &[IssueType::EmptyLabels]),
        ];

        let patterns = analyze_failure_patterns(&assessments, 50);

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern_type, FailurePatternType::ShortInput);
        assert_eq!(patterns[0].count, 1);
        assert_eq!(patterns[0].percentage, 50.0);
    }
}
