//! Data quality assessment models.
//!
//! This module defines the issue taxonomy, per-record assessments, and the
//! summary payload consumed by dashboards. Everything here is built once and
//! never mutated afterwards. Output types serialize with camelCase keys.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::language::Language;

/// Longest `current_value` kept on an issue, in characters.
const CURRENT_VALUE_MAX_CHARS: usize = 120;

/// Severity level of a quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks usefulness of the record
    Critical,
    /// Degrades usefulness of the record
    Warning,
    /// Cosmetic or minor
    Info,
}

impl Severity {
    /// Every severity, most severe first.
    pub const ALL: [Self; 3] = [Self::Critical, Self::Warning, Self::Info];
}

/// Upstream pipeline stage an issue is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStep {
    Scraper,
    Extractor,
    Geo,
    Jobexp,
    Lang,
    Clean,
    Labelor,
    Bertizer,
    Categorizer,
    Import,
}

impl PipelineStep {
    /// Every stage in pipeline order.
    pub const ALL: [Self; 10] = [
        Self::Scraper,
        Self::Extractor,
        Self::Geo,
        Self::Jobexp,
        Self::Lang,
        Self::Clean,
        Self::Labelor,
        Self::Bertizer,
        Self::Categorizer,
        Self::Import,
    ];

    /// Stage name as it appears in pipeline logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scraper => "scraper",
            Self::Extractor => "extractor",
            Self::Geo => "geo",
            Self::Jobexp => "jobexp",
            Self::Lang => "lang",
            Self::Clean => "clean",
            Self::Labelor => "labelor",
            Self::Bertizer => "bertizer",
            Self::Categorizer => "categorizer",
            Self::Import => "import",
        }
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of defect found on a record.
///
/// Each kind has a fixed severity and a fixed pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    EmptyDescription,
    ShortDescription,
    BoilerplateContent,
    TruncatedContent,
    MissingTitle,
    MissingDutyStation,
    MissingCountry,
    MissingContinent,
    NullExperienceFields,
    EmptyLanguages,
    EmptyLabels,
    NullSectoralCategory,
    MissingPostingDate,
    InvalidDateFormat,
    FuturePostingDate,
    DeadlineBeforePosting,
    EmptyVectorized,
    LowClassificationConfidence,
}

impl IssueType {
    /// Every issue type.
    pub const ALL: [Self; 18] = [
        Self::EmptyDescription,
        Self::ShortDescription,
        Self::BoilerplateContent,
        Self::TruncatedContent,
        Self::MissingTitle,
        Self::MissingDutyStation,
        Self::MissingCountry,
        Self::MissingContinent,
        Self::NullExperienceFields,
        Self::EmptyLanguages,
        Self::EmptyLabels,
        Self::NullSectoralCategory,
        Self::MissingPostingDate,
        Self::InvalidDateFormat,
        Self::FuturePostingDate,
        Self::DeadlineBeforePosting,
        Self::EmptyVectorized,
        Self::LowClassificationConfidence,
    ];

    /// Serialized name of the issue type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "empty_description",
            Self::ShortDescription => "short_description",
            Self::BoilerplateContent => "boilerplate_content",
            Self::TruncatedContent => "truncated_content",
            Self::MissingTitle => "missing_title",
            Self::MissingDutyStation => "missing_duty_station",
            Self::MissingCountry => "missing_country",
            Self::MissingContinent => "missing_continent",
            Self::NullExperienceFields => "null_experience_fields",
            Self::EmptyLanguages => "empty_languages",
            Self::EmptyLabels => "empty_labels",
            Self::NullSectoralCategory => "null_sectoral_category",
            Self::MissingPostingDate => "missing_posting_date",
            Self::InvalidDateFormat => "invalid_date_format",
            Self::FuturePostingDate => "future_posting_date",
            Self::DeadlineBeforePosting => "deadline_before_posting",
            Self::EmptyVectorized => "empty_vectorized",
            Self::LowClassificationConfidence => "low_classification_confidence",
        }
    }

    /// Severity assigned to this issue type.
    pub fn severity(&self) -> Severity {
        match self {
            Self::EmptyDescription | Self::MissingTitle | Self::MissingDutyStation => {
                Severity::Critical
            }
            Self::MissingContinent
            | Self::EmptyLanguages
            | Self::EmptyVectorized
            | Self::LowClassificationConfidence => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Pipeline stage whose failure best explains this issue type.
    pub fn likely_step(&self) -> PipelineStep {
        match self {
            Self::EmptyDescription
            | Self::ShortDescription
            | Self::BoilerplateContent
            | Self::TruncatedContent => PipelineStep::Scraper,
            Self::MissingTitle | Self::MissingDutyStation => PipelineStep::Extractor,
            Self::MissingCountry | Self::MissingContinent => PipelineStep::Geo,
            Self::NullExperienceFields => PipelineStep::Jobexp,
            Self::EmptyLanguages => PipelineStep::Lang,
            Self::EmptyLabels => PipelineStep::Labelor,
            Self::EmptyVectorized => PipelineStep::Bertizer,
            Self::NullSectoralCategory | Self::LowClassificationConfidence => {
                PipelineStep::Categorizer
            }
            Self::MissingPostingDate
            | Self::InvalidDateFormat
            | Self::FuturePostingDate
            | Self::DeadlineBeforePosting => PipelineStep::Clean,
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single defect found on a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityIssue {
    /// Deterministic identifier: `<job id>-<issue type>`
    pub id: String,
    pub job_id: String,
    pub issue_type: IssueType,
    pub severity: Severity,
    /// Record field the issue is about
    pub field: String,
    /// Offending value, truncated for long text
    pub current_value: Option<String>,
    pub message: String,
    pub likely_step: PipelineStep,
    pub recommendation: String,
    pub detected_at: DateTime<Utc>,
}

impl DataQualityIssue {
    /// Creates an issue; severity and stage follow from `issue_type`.
    pub fn new(
        job_id: &str,
        issue_type: IssueType,
        field: &str,
        current_value: Option<&str>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("{}-{}", job_id, issue_type),
            job_id: job_id.to_string(),
            issue_type,
            severity: issue_type.severity(),
            field: field.to_string(),
            current_value: current_value.map(truncate_value),
            message: message.into(),
            likely_step: issue_type.likely_step(),
            recommendation: recommendation.into(),
            detected_at,
        }
    }
}

fn truncate_value(value: &str) -> String {
    if value.chars().count() <= CURRENT_VALUE_MAX_CHARS {
        value.to_string()
    } else {
        let head: String = value.chars().take(CURRENT_VALUE_MAX_CHARS).collect();
        format!("{}...", head)
    }
}

/// Four-dimension quality score, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityScore {
    /// Mean of the four dimensions, one decimal
    pub overall: f64,
    pub completeness: f64,
    pub accuracy: f64,
    /// Constant 100 until cross-field consistency rules exist
    pub consistency: f64,
    pub classification: f64,
}

/// All findings and scores for one input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQualityAssessment {
    pub job_id: String,
    pub agency: String,
    pub title: String,
    /// Detector output in registration order
    pub issues: Vec<DataQualityIssue>,
    pub quality_score: DataQualityScore,
    pub detected_language: Language,
    pub language_confidence: f64,
    /// Character count of the trimmed description
    pub description_length: usize,
}

impl JobQualityAssessment {
    /// Whether the assessment carries an issue of the given type.
    pub fn has_issue(&self, issue_type: IssueType) -> bool {
        self.issues.iter().any(|i| i.issue_type == issue_type)
    }

    /// Whether labeling or categorization failed for this record.
    pub fn has_labeling_failure(&self) -> bool {
        self.has_issue(IssueType::EmptyLabels) || self.has_issue(IssueType::NullSectoralCategory)
    }
}

/// Strategy that produced a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateType {
    SameUniquecode,
    SameTitleAgencyLocation,
    /// Reserved for fuzzy matching; no strategy in this engine emits it
    HighSimilarity,
}

/// A record referenced from a duplicate group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateJob {
    pub id: String,
    pub title: String,
    pub agency: String,
    pub duty_station: Option<String>,
    pub posting_date: Option<String>,
}

/// Two or more records judged to be the same posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    #[serde(rename = "type")]
    pub group_type: DuplicateType,
    pub jobs: Vec<DuplicateJob>,
    pub recommendation: String,
}

/// Kind of date defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateAnomalyType {
    MissingPosting,
    MissingDeadline,
    InvalidFormat,
    FuturePosting,
    DeadlineBeforePosted,
}

/// A record with a missing, malformed, or contradictory date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateAnomaly {
    pub job_id: String,
    pub agency: String,
    pub title: String,
    pub anomaly_type: DateAnomalyType,
    pub posting_date: Option<String>,
    pub apply_until: Option<String>,
    pub details: String,
    pub suggested_fix: String,
}

/// Best-effort resolution for a duty station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSuggestion {
    pub city: String,
    pub country: String,
}

/// A duty station that geo-resolution could not map to a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedLocation {
    pub duty_station: String,
    pub count: usize,
    pub agencies: Vec<String>,
    pub sample_job_ids: Vec<String>,
    pub suggested: Option<LocationSuggestion>,
}

/// A grade string that matches no recognized grade format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnrecognizedGrade {
    pub grade: String,
    pub count: usize,
    pub agencies: Vec<String>,
    pub sample_job_ids: Vec<String>,
    pub interpretation: Option<String>,
}

/// Systemic cause inferred behind labeling/categorization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePatternType {
    NonEnglish,
    RateLimit,
    ShortInput,
}

/// An agency and how many matching records it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyCount {
    pub agency: String,
    pub count: usize,
}

/// Cross-record explanation for a cluster of labeling failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiFailurePattern {
    pub pattern_type: FailurePatternType,
    pub count: usize,
    /// Share of the labeling-failure population, one decimal
    pub percentage: f64,
    pub affected_agencies: Vec<AgencyCount>,
    pub description: String,
    pub suggested_fix: String,
}

/// Quality statistics for one agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyQualityStats {
    pub agency: String,
    pub job_count: usize,
    pub clean_jobs: usize,
    pub issue_count: usize,
    pub average_score: f64,
    pub by_issue_type: BTreeMap<IssueType, usize>,
    pub by_pipeline_step: BTreeMap<PipelineStep, usize>,
    pub by_language: BTreeMap<Language, usize>,
}

/// Per-agency pipeline health row; lower scores are worse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyPipelineHealth {
    pub agency: String,
    pub job_count: usize,
    /// Mean overall score of the agency's records, one decimal
    pub health_score: f64,
    pub critical_issues: usize,
    pub step_issues: BTreeMap<PipelineStep, usize>,
    /// Stage with the most issues, if any
    pub worst_step: Option<PipelineStep>,
}

/// A record surfaced as an example in a rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSample {
    pub job_id: String,
    pub agency: String,
    pub title: String,
    pub detail: String,
}

/// Language detection rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageIssues {
    pub by_language: BTreeMap<Language, usize>,
    pub non_english_jobs: usize,
    /// Non-English records that also failed labeling or categorization
    pub non_english_with_labeling_failures: usize,
    pub samples: Vec<IssueSample>,
}

/// Description content rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIssues {
    pub empty_descriptions: usize,
    pub short_descriptions: usize,
    pub boilerplate: usize,
    pub truncated: usize,
    pub average_description_length: f64,
    pub samples: Vec<IssueSample>,
}

/// Scraper and extractor failure rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperExtractorIssues {
    pub scraper_issues: usize,
    pub extractor_issues: usize,
    pub by_agency: Vec<AgencyCount>,
    pub samples: Vec<IssueSample>,
}

/// Direction of quality over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    /// Always reported until prior summaries are supplied from outside
    #[default]
    Stable,
}

/// The terminal report produced for one batch of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualitySummary {
    pub total_jobs: usize,
    pub clean_jobs: usize,
    pub jobs_with_issues: usize,
    pub critical_issues: usize,
    pub warning_issues: usize,
    pub info_issues: usize,
    pub overall_score: f64,
    pub trend: Trend,
    pub by_issue_type: BTreeMap<IssueType, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_pipeline_step: BTreeMap<PipelineStep, usize>,
    pub by_agency: Vec<AgencyQualityStats>,
    pub agency_pipeline_health: Vec<AgencyPipelineHealth>,
    pub language_issues: LanguageIssues,
    pub content_issues: ContentIssues,
    pub scraper_extractor_issues: ScraperExtractorIssues,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub unmapped_locations: Vec<UnmappedLocation>,
    pub unrecognized_grades: Vec<UnrecognizedGrade>,
    pub date_anomalies: Vec<DateAnomaly>,
    #[serde(rename = "openAIFailurePatterns")]
    pub openai_failure_patterns: Vec<OpenAiFailurePattern>,
    pub last_refreshed: DateTime<Utc>,
}

/// Rounds to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
