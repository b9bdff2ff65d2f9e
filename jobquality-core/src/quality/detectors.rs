//! Per-stage issue detectors.
//!
//! Each detector inspects one record and attributes what it finds to the
//! pipeline stage whose failure would explain it. Detectors are independent
//! pure functions: none of them looks at another detector's output, so any
//! subset can run without changing what the others report.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{JobRecord, parse_date, present};

use super::config::{DEFAULT_CLASSIFICATION_CONFIDENCE, QualityConfig};
use super::language::{Language, LanguageDetection};
use super::models::{DataQualityIssue, IssueType};

/// Phrases that mark a description as placeholder text.
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "click here to apply",
    "apply now",
    "apply online",
    "see attached",
    "please see the attached",
    "see the attached",
    "see job description",
    "job description not available",
    "no description available",
    "description not available",
    "for more information, please visit",
    "for more details visit",
    "visit our website",
    "lorem ipsum",
    "to be determined",
    "to be confirmed",
];

/// Shared inputs for a single record's detectors.
#[derive(Debug, Clone, Copy)]
pub struct DetectionContext<'a> {
    pub job_id: &'a str,
    pub language: LanguageDetection,
    /// Date used for "in the future" checks
    pub today: NaiveDate,
    pub detected_at: DateTime<Utc>,
    pub config: &'a QualityConfig,
}

impl DetectionContext<'_> {
    fn issue(
        &self,
        issue_type: IssueType,
        field: &str,
        current_value: Option<&str>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> DataQualityIssue {
        DataQualityIssue::new(
            self.job_id,
            issue_type,
            field,
            current_value,
            message,
            recommendation,
            self.detected_at,
        )
    }
}

/// Signature shared by every stage detector.
pub type Detector = fn(&JobRecord, &DetectionContext<'_>) -> Vec<DataQualityIssue>;

/// Registered detectors, in the order their issues appear on an assessment.
pub const DETECTORS: [(&str, Detector); 7] = [
    ("content", detect_content_issues),
    ("extraction", detect_extraction_issues),
    ("geo", detect_geo_issues),
    ("enrichment", detect_enrichment_issues),
    ("labels", detect_label_issues),
    ("classification", detect_classification_issues),
    ("dates", detect_date_issues),
];

/// Runs every registered detector and concatenates their issues.
pub fn run_detectors(record: &JobRecord, ctx: &DetectionContext<'_>) -> Vec<DataQualityIssue> {
    DETECTORS
        .iter()
        .flat_map(|(_, detector)| detector(record, ctx))
        .collect()
}

/// Scraper stage: empty, short, boilerplate, or truncated descriptions.
pub fn detect_content_issues(
    record: &JobRecord,
    ctx: &DetectionContext<'_>,
) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();
    let description = record.description_text();
    let length = record.description_length();

    if length == 0 {
        issues.push(ctx.issue(
            IssueType::EmptyDescription,
            "description",
            None,
            "Job description is empty",
            "Check the scraper selectors for this agency; the detail page may have changed layout or require JavaScript rendering",
        ));
        return issues;
    }

    if length < ctx.config.short_description_chars {
        issues.push(ctx.issue(
            IssueType::ShortDescription,
            "description",
            Some(description),
            format!(
                "Job description is only {} characters (minimum {})",
                length, ctx.config.short_description_chars
            ),
            "Verify the scraper follows the link to the full posting instead of capturing a listing snippet",
        ));
    }

    let lower = description.to_lowercase();
    if length < ctx.config.boilerplate_max_chars
        && let Some(phrase) = BOILERPLATE_PHRASES.iter().find(|p| lower.contains(*p))
    {
        issues.push(ctx.issue(
            IssueType::BoilerplateContent,
            "description",
            Some(description),
            format!("Description looks like placeholder text (contains \"{}\")", phrase),
            "Scrape the linked posting or attachment instead of the listing teaser",
        ));
    }

    if looks_truncated(description) {
        issues.push(ctx.issue(
            IssueType::TruncatedContent,
            "description",
            Some(tail(description, 40).as_str()),
            "Description appears to be cut off mid-sentence",
            "Check for length limits or pagination in the scraper and the extractor",
        ));
    }

    issues
}

/// Extractor stage: title and duty station.
pub fn detect_extraction_issues(
    record: &JobRecord,
    ctx: &DetectionContext<'_>,
) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();

    if present(&record.title).is_none() {
        issues.push(ctx.issue(
            IssueType::MissingTitle,
            "title",
            None,
            "Job title is missing",
            "Review the extractor's title selector for this agency",
        ));
    }

    if present(&record.duty_station).is_none() {
        issues.push(ctx.issue(
            IssueType::MissingDutyStation,
            "duty_station",
            None,
            "Duty station is missing",
            "Review the extractor's location selector for this agency",
        ));
    }

    issues
}

/// Geo stage: country and continent resolution.
pub fn detect_geo_issues(record: &JobRecord, ctx: &DetectionContext<'_>) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();

    if let Some(station) = present(&record.duty_station)
        && present(&record.duty_country).is_none()
    {
        issues.push(ctx.issue(
            IssueType::MissingCountry,
            "duty_country",
            Some(station),
            format!("Duty station \"{}\" was not mapped to a country", station),
            "Add the station spelling to the geo lookup table",
        ));
    }

    if let Some(country) = present(&record.duty_country)
        && present(&record.duty_continent).is_none()
    {
        issues.push(ctx.issue(
            IssueType::MissingContinent,
            "duty_continent",
            Some(country),
            format!("Country \"{}\" was not mapped to a continent", country),
            "Add the country to the continent lookup table",
        ));
    }

    issues
}

/// Experience and language-tagging stages.
pub fn detect_enrichment_issues(
    record: &JobRecord,
    ctx: &DetectionContext<'_>,
) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();

    if record.experience_missing() {
        issues.push(ctx.issue(
            IssueType::NullExperienceFields,
            "hs_min_exp, bachelor_min_exp, master_min_exp",
            None,
            "No minimum experience could be inferred for any education level",
            "Check the experience extraction patterns against this description format",
        ));
    }

    if present(&record.languages).is_none() {
        issues.push(ctx.issue(
            IssueType::EmptyLanguages,
            "languages",
            None,
            "No required languages were tagged",
            "Check the language tagger's keyword list against this description",
        ));
    }

    issues
}

/// Labeling and vectorization stages.
pub fn detect_label_issues(
    record: &JobRecord,
    ctx: &DetectionContext<'_>,
) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();

    match present(&record.job_labels) {
        None => {
            let message = if matches!(ctx.language.language, Language::En | Language::Unknown) {
                "Job labels are empty".to_string()
            } else {
                format!(
                    "Job labels are empty (description detected as {})",
                    ctx.language.language.name()
                )
            };
            issues.push(ctx.issue(
                IssueType::EmptyLabels,
                "job_labels",
                None,
                message,
                "Re-run the labeling step; check for API errors, rate limiting, or unsupported languages",
            ));
        }
        Some(_) if present(&record.job_labels_vectorized).is_none() => {
            issues.push(ctx.issue(
                IssueType::EmptyVectorized,
                "job_labels_vectorized",
                None,
                "Job labels were produced but never vectorized",
                "Re-run the vectorization step for this record",
            ));
        }
        Some(_) => {}
    }

    issues
}

/// Categorizer stage: sector assignment and its confidence.
pub fn detect_classification_issues(
    record: &JobRecord,
    ctx: &DetectionContext<'_>,
) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();

    if present(&record.sectoral_category).is_none() {
        issues.push(ctx.issue(
            IssueType::NullSectoralCategory,
            "sectoral_category",
            None,
            "No sectoral category was assigned",
            "Re-run categorization; an empty category usually follows missing labels",
        ));
    }

    let confidence = record
        .classification_confidence
        .unwrap_or(DEFAULT_CLASSIFICATION_CONFIDENCE);
    if confidence < ctx.config.low_confidence_threshold {
        issues.push(ctx.issue(
            IssueType::LowClassificationConfidence,
            "classification_confidence",
            Some(confidence.to_string().as_str()),
            format!(
                "Classification confidence {} is below {}",
                confidence, ctx.config.low_confidence_threshold
            ),
            "Review the category assignment manually or enrich the description before reclassifying",
        ));
    }

    issues
}

/// Cleaning stage: posting date and deadline sanity.
pub fn detect_date_issues(record: &JobRecord, ctx: &DetectionContext<'_>) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();

    let posting_raw = present(&record.posting_date);
    let deadline_raw = present(&record.apply_until);
    let posting = posting_raw.and_then(parse_date);
    let deadline = deadline_raw.and_then(parse_date);

    if posting_raw.is_none() {
        issues.push(ctx.issue(
            IssueType::MissingPostingDate,
            "posting_date",
            None,
            "Posting date is missing",
            "Check date extraction and normalization in the cleaning step",
        ));
    }

    let malformed: Vec<(&str, &str)> = [
        ("posting_date", posting_raw, posting),
        ("apply_until", deadline_raw, deadline),
    ]
    .into_iter()
    .filter_map(|(field, raw, parsed)| match (raw, parsed) {
        (Some(raw), None) => Some((field, raw)),
        _ => None,
    })
    .collect();
    if let Some((field, raw)) = malformed.first() {
        let fields: Vec<&str> = malformed.iter().map(|(f, _)| *f).collect();
        issues.push(ctx.issue(
            IssueType::InvalidDateFormat,
            field,
            Some(*raw),
            format!("Unparsable date in {}", fields.join(", ")),
            "Normalize dates to ISO 8601 (YYYY-MM-DD) in the cleaning step",
        ));
    }

    if let Some(posted) = posting
        && posted > ctx.today
    {
        issues.push(ctx.issue(
            IssueType::FuturePostingDate,
            "posting_date",
            posting_raw,
            format!("Posting date {} is in the future", posted),
            "Check for day/month swaps or timezone errors when parsing the posting date",
        ));
    }

    if let (Some(posted), Some(due)) = (posting, deadline)
        && due < posted
    {
        issues.push(ctx.issue(
            IssueType::DeadlineBeforePosting,
            "apply_until",
            deadline_raw,
            format!("Deadline {} is before the posting date {}", due, posted),
            "Check whether the posting and deadline fields were swapped during extraction",
        ));
    }

    issues
}

/// Heuristic for descriptions cut off by a length limit.
fn looks_truncated(description: &str) -> bool {
    if description.ends_with("...") || description.ends_with('…') || description.ends_with(',') {
        return true;
    }
    description
        .chars()
        .last()
        .is_some_and(|c| c.is_alphabetic() && c.is_lowercase())
}

fn tail(text: &str, chars: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(chars)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::models::Severity;
    use serde_json::json;

    const FULL_DESCRIPTION: &str = "The Programme Officer will coordinate humanitarian programmes across the region, manage partner relations, and report on results to the country director.";

    fn config() -> &'static QualityConfig {
        static CONFIG: std::sync::OnceLock<QualityConfig> = std::sync::OnceLock::new();
        CONFIG.get_or_init(QualityConfig::default)
    }

    fn context(language: Language) -> DetectionContext<'static> {
        DetectionContext {
            job_id: "job-1",
            language: LanguageDetection {
                language,
                confidence: 0.9,
            },
            today: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            detected_at: DateTime::parse_from_rfc3339("2025-07-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            config: config(),
        }
    }

    fn clean_record() -> JobRecord {
        JobRecord::from_value(json!({
            "id": "job-1",
            "title": "Programme Officer",
            "description": FULL_DESCRIPTION,
            "duty_station": "Nairobi",
            "duty_country": "Kenya",
            "duty_continent": "Africa",
            "up_grade": "P-3",
            "languages": "English, French",
            "job_labels": "programme management, coordination",
            "job_labels_vectorized": "[0.1, 0.2]",
            "sectoral_category": "Humanitarian",
            "bachelor_min_exp": 5,
            "posting_date": "2025-06-01",
            "apply_until": "2025-06-30",
            "classification_confidence": 85,
            "short_agency": "UNICEF",
            "uniquecode": "UNICEF-1"
        }))
    }

    fn types(issues: &[DataQualityIssue]) -> Vec<IssueType> {
        issues.iter().map(|i| i.issue_type).collect()
    }

    #[test]
    fn test_clean_record_has_no_issues() {
        let issues = run_detectors(&clean_record(), &context(Language::En));
        assert!(issues.is_empty(), "unexpected issues: {:?}", types(&issues));
    }

    #[test]
    fn test_empty_description_is_single_critical_issue() {
        let record = JobRecord {
            description: Some("   ".to_string()),
            ..clean_record()
        };
        let issues = detect_content_issues(&record, &context(Language::En));

        assert_eq!(types(&issues), vec![IssueType::EmptyDescription]);
        assert_eq!(issues[0].severity, Severity::Critical);
    }

    #[test]
    fn test_short_boilerplate_description() {
        let record = JobRecord {
            description: Some("Please see the attached terms of reference. Apply now.".to_string()),
            ..clean_record()
        };
        let issues = detect_content_issues(&record, &context(Language::En));

        assert_eq!(
            types(&issues),
            vec![IssueType::ShortDescription, IssueType::BoilerplateContent]
        );
    }

    #[test]
    fn test_boilerplate_ignored_in_long_description() {
        let description = format!(
            "{} {} {} Apply now.",
            FULL_DESCRIPTION, FULL_DESCRIPTION, FULL_DESCRIPTION
        );
        let record = JobRecord {
            description: Some(description),
            ..clean_record()
        };
        let issues = detect_content_issues(&record, &context(Language::En));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_truncated_description() {
        for ending in ["...", "…", ",", " and the"] {
            let record = JobRecord {
                description: Some(format!("{}{}", FULL_DESCRIPTION, ending)),
                ..clean_record()
            };
            let issues = detect_content_issues(&record, &context(Language::En));
            assert_eq!(
                types(&issues),
                vec![IssueType::TruncatedContent],
                "ending {:?}",
                ending
            );
        }
    }

    #[test]
    fn test_missing_title_and_station() {
        let record = JobRecord {
            title: None,
            duty_station: Some(String::new()),
            ..clean_record()
        };
        let issues = detect_extraction_issues(&record, &context(Language::En));
        assert_eq!(
            types(&issues),
            vec![IssueType::MissingTitle, IssueType::MissingDutyStation]
        );
        assert!(issues.iter().all(|i| i.severity == Severity::Critical));
    }

    #[test]
    fn test_geo_issues_depend_on_parent_field() {
        let record = JobRecord {
            duty_country: None,
            duty_continent: None,
            ..clean_record()
        };
        let issues = detect_geo_issues(&record, &context(Language::En));
        assert_eq!(types(&issues), vec![IssueType::MissingCountry]);

        let record = JobRecord {
            duty_continent: None,
            ..clean_record()
        };
        let issues = detect_geo_issues(&record, &context(Language::En));
        assert_eq!(types(&issues), vec![IssueType::MissingContinent]);
        assert_eq!(issues[0].severity, Severity::Info);

        let record = JobRecord {
            duty_station: None,
            duty_country: None,
            duty_continent: None,
            ..clean_record()
        };
        assert!(detect_geo_issues(&record, &context(Language::En)).is_empty());
    }

    #[test]
    fn test_enrichment_issues() {
        let record = JobRecord {
            bachelor_min_exp: None,
            languages: None,
            ..clean_record()
        };
        let issues = detect_enrichment_issues(&record, &context(Language::En));
        assert_eq!(
            types(&issues),
            vec![IssueType::NullExperienceFields, IssueType::EmptyLanguages]
        );
    }

    #[test]
    fn test_empty_labels_mentions_non_english_language() {
        let record = JobRecord {
            job_labels: None,
            ..clean_record()
        };

        let issues = detect_label_issues(&record, &context(Language::Fr));
        assert_eq!(types(&issues), vec![IssueType::EmptyLabels]);
        assert!(issues[0].message.contains("French"));

        let issues = detect_label_issues(&record, &context(Language::En));
        assert_eq!(issues[0].message, "Job labels are empty");
    }

    #[test]
    fn test_empty_vectorized_requires_labels() {
        let record = JobRecord {
            job_labels_vectorized: None,
            ..clean_record()
        };
        let issues = detect_label_issues(&record, &context(Language::En));
        assert_eq!(types(&issues), vec![IssueType::EmptyVectorized]);
    }

    #[test]
    fn test_classification_confidence_threshold() {
        let at = |confidence: Option<f64>| {
            let record = JobRecord {
                classification_confidence: confidence,
                ..clean_record()
            };
            types(&detect_classification_issues(&record, &context(Language::En)))
        };

        assert_eq!(at(Some(39.9)), vec![IssueType::LowClassificationConfidence]);
        assert!(at(Some(40.0)).is_empty());
        // Absent confidence defaults to 50
        assert!(at(None).is_empty());
    }

    #[test]
    fn test_null_sectoral_category() {
        let record = JobRecord {
            sectoral_category: Some(" ".to_string()),
            ..clean_record()
        };
        let issues = detect_classification_issues(&record, &context(Language::En));
        assert_eq!(types(&issues), vec![IssueType::NullSectoralCategory]);
    }

    #[test]
    fn test_deadline_before_posting() {
        let record = JobRecord {
            posting_date: Some("2025-06-01".to_string()),
            apply_until: Some("2025-05-01".to_string()),
            ..clean_record()
        };
        let issues = detect_date_issues(&record, &context(Language::En));
        assert_eq!(types(&issues), vec![IssueType::DeadlineBeforePosting]);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(
            issues[0].likely_step,
            crate::quality::models::PipelineStep::Clean
        );
    }

    #[test]
    fn test_future_and_missing_posting_dates() {
        let record = JobRecord {
            posting_date: Some("2025-08-01".to_string()),
            apply_until: Some("2025-09-01".to_string()),
            ..clean_record()
        };
        let issues = detect_date_issues(&record, &context(Language::En));
        assert_eq!(types(&issues), vec![IssueType::FuturePostingDate]);

        let record = JobRecord {
            posting_date: None,
            ..clean_record()
        };
        let issues = detect_date_issues(&record, &context(Language::En));
        assert_eq!(types(&issues), vec![IssueType::MissingPostingDate]);
    }

    #[test]
    fn test_unparsable_dates_become_issues() {
        let record = JobRecord {
            posting_date: Some("sometime in June".to_string()),
            apply_until: Some("31/06/2025".to_string()),
            ..clean_record()
        };
        let issues = detect_date_issues(&record, &context(Language::En));

        assert_eq!(types(&issues), vec![IssueType::InvalidDateFormat]);
        assert!(issues[0].message.contains("posting_date, apply_until"));
    }

    #[test]
    fn test_detectors_are_independent() {
        let record = JobRecord::default();
        let ctx = context(Language::Unknown);

        let all = run_detectors(&record, &ctx);
        let subset: Vec<DataQualityIssue> = [detect_date_issues as Detector, detect_geo_issues]
            .iter()
            .flat_map(|d| d(&record, &ctx))
            .collect();

        for issue in &subset {
            assert!(all.contains(issue));
        }
        assert_eq!(
            detect_date_issues(&record, &ctx),
            all.iter()
                .filter(|i| i.likely_step == crate::quality::models::PipelineStep::Clean)
                .cloned()
                .collect::<Vec<_>>()
        );
    }
}
