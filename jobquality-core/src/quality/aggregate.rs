//! Batch-level reductions over per-record assessments.
//!
//! Every function here is a sequential fold over assessments in input order,
//! so the output is deterministic regardless of how the assessments were
//! produced.

use std::collections::{BTreeMap, HashMap};

use super::language::Language;
use super::models::{
    AgencyCount, AgencyPipelineHealth, AgencyQualityStats, ContentIssues, IssueSample, IssueType,
    JobQualityAssessment, LanguageIssues, PipelineStep, ScraperExtractorIssues, Severity, round1,
};

/// Counts occurrences per agency, ranked by count descending, ties by name.
pub(crate) fn rank_agencies<'a>(agencies: impl IntoIterator<Item = &'a str>) -> Vec<AgencyCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for agency in agencies {
        *counts.entry(agency).or_insert(0) += 1;
    }

    let mut ranked: Vec<AgencyCount> = counts
        .into_iter()
        .map(|(agency, count)| AgencyCount {
            agency: agency.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.agency.cmp(&b.agency)));
    ranked
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn sample(assessment: &JobQualityAssessment, detail: String) -> IssueSample {
    IssueSample {
        job_id: assessment.job_id.clone(),
        agency: assessment.agency.clone(),
        title: assessment.title.clone(),
        detail,
    }
}

/// Mean overall score, one decimal; 0 for an empty batch.
pub fn overall_score(assessments: &[JobQualityAssessment]) -> f64 {
    round1(mean(assessments.iter().map(|a| a.quality_score.overall)))
}

/// Issue counts per severity, zero-filled.
pub fn count_by_severity(assessments: &[JobQualityAssessment]) -> BTreeMap<Severity, usize> {
    let mut counts: BTreeMap<Severity, usize> = Severity::ALL.iter().map(|s| (*s, 0)).collect();
    for issue in assessments.iter().flat_map(|a| &a.issues) {
        *counts.entry(issue.severity).or_insert(0) += 1;
    }
    counts
}

/// Issue counts per issue type, zero-filled.
pub fn count_by_issue_type(assessments: &[JobQualityAssessment]) -> BTreeMap<IssueType, usize> {
    let mut counts: BTreeMap<IssueType, usize> = IssueType::ALL.iter().map(|t| (*t, 0)).collect();
    for issue in assessments.iter().flat_map(|a| &a.issues) {
        *counts.entry(issue.issue_type).or_insert(0) += 1;
    }
    counts
}

/// Issue counts per pipeline stage, zero-filled.
pub fn count_by_pipeline_step(
    assessments: &[JobQualityAssessment],
) -> BTreeMap<PipelineStep, usize> {
    let mut counts: BTreeMap<PipelineStep, usize> =
        PipelineStep::ALL.iter().map(|s| (*s, 0)).collect();
    for issue in assessments.iter().flat_map(|a| &a.issues) {
        *counts.entry(issue.likely_step).or_insert(0) += 1;
    }
    counts
}

/// Groups assessments by agency name, name-ordered.
fn group_by_agency(
    assessments: &[JobQualityAssessment],
) -> BTreeMap<&str, Vec<&JobQualityAssessment>> {
    let mut groups: BTreeMap<&str, Vec<&JobQualityAssessment>> = BTreeMap::new();
    for assessment in assessments {
        groups
            .entry(assessment.agency.as_str())
            .or_default()
            .push(assessment);
    }
    groups
}

/// Per-agency statistics, sorted by job count descending, ties by name.
///
/// Breakdown maps only carry keys that occurred for the agency.
pub fn agency_stats(assessments: &[JobQualityAssessment]) -> Vec<AgencyQualityStats> {
    let mut stats: Vec<AgencyQualityStats> = group_by_agency(assessments)
        .into_iter()
        .map(|(agency, members)| {
            let mut by_issue_type = BTreeMap::new();
            let mut by_pipeline_step = BTreeMap::new();
            let mut by_language = BTreeMap::new();
            for member in &members {
                *by_language.entry(member.detected_language).or_insert(0) += 1;
                for issue in &member.issues {
                    *by_issue_type.entry(issue.issue_type).or_insert(0) += 1;
                    *by_pipeline_step.entry(issue.likely_step).or_insert(0) += 1;
                }
            }

            AgencyQualityStats {
                agency: agency.to_string(),
                job_count: members.len(),
                clean_jobs: members.iter().filter(|m| m.issues.is_empty()).count(),
                issue_count: members.iter().map(|m| m.issues.len()).sum(),
                average_score: round1(mean(members.iter().map(|m| m.quality_score.overall))),
                by_issue_type,
                by_pipeline_step,
                by_language,
            }
        })
        .collect();

    // Stable sort keeps the name order from the BTreeMap for ties
    stats.sort_by(|a, b| b.job_count.cmp(&a.job_count));
    stats
}

/// Per-agency pipeline health, worst health first, ties by name.
pub fn agency_pipeline_health(assessments: &[JobQualityAssessment]) -> Vec<AgencyPipelineHealth> {
    let mut health: Vec<AgencyPipelineHealth> = group_by_agency(assessments)
        .into_iter()
        .map(|(agency, members)| {
            let mut step_issues: BTreeMap<PipelineStep, usize> =
                PipelineStep::ALL.iter().map(|s| (*s, 0)).collect();
            let mut critical_issues = 0;
            for issue in members.iter().flat_map(|m| &m.issues) {
                *step_issues.entry(issue.likely_step).or_insert(0) += 1;
                if issue.severity == Severity::Critical {
                    critical_issues += 1;
                }
            }

            // Earliest stage wins ties
            let worst_step = step_issues
                .iter()
                .filter(|(_, count)| **count > 0)
                .fold(None, |worst: Option<(PipelineStep, usize)>, (step, count)| match worst {
                    Some((_, best)) if best >= *count => worst,
                    _ => Some((*step, *count)),
                })
                .map(|(step, _)| step);

            AgencyPipelineHealth {
                agency: agency.to_string(),
                job_count: members.len(),
                health_score: round1(mean(members.iter().map(|m| m.quality_score.overall))),
                critical_issues,
                step_issues,
                worst_step,
            }
        })
        .collect();

    // Stable sort keeps the name order for ties
    health.sort_by(|a, b| a.health_score.total_cmp(&b.health_score));
    health
}

/// Language detection rollup.
///
/// `unknown` (no detectable text) is tallied but not counted as non-English.
pub fn language_issues(assessments: &[JobQualityAssessment], max_samples: usize) -> LanguageIssues {
    let mut rollup = LanguageIssues {
        by_language: Language::ALL.iter().map(|l| (*l, 0)).collect(),
        ..LanguageIssues::default()
    };

    for assessment in assessments {
        *rollup
            .by_language
            .entry(assessment.detected_language)
            .or_insert(0) += 1;

        if matches!(assessment.detected_language, Language::En | Language::Unknown) {
            continue;
        }
        rollup.non_english_jobs += 1;
        let failed = assessment.has_labeling_failure();
        if failed {
            rollup.non_english_with_labeling_failures += 1;
        }

        if rollup.samples.len() < max_samples {
            let mut detail = format!(
                "Detected {} ({:.2})",
                assessment.detected_language.name(),
                assessment.language_confidence
            );
            if failed {
                detail.push_str("; labeling failed");
            }
            rollup.samples.push(sample(assessment, detail));
        }
    }

    rollup
}

/// Description content rollup.
pub fn content_issues(assessments: &[JobQualityAssessment], max_samples: usize) -> ContentIssues {
    let mut rollup = ContentIssues {
        average_description_length: round1(mean(
            assessments.iter().map(|a| a.description_length as f64),
        )),
        ..ContentIssues::default()
    };

    for assessment in assessments {
        let mut first_message = None;
        for issue in &assessment.issues {
            let counter = match issue.issue_type {
                IssueType::EmptyDescription => &mut rollup.empty_descriptions,
                IssueType::ShortDescription => &mut rollup.short_descriptions,
                IssueType::BoilerplateContent => &mut rollup.boilerplate,
                IssueType::TruncatedContent => &mut rollup.truncated,
                _ => continue,
            };
            *counter += 1;
            first_message.get_or_insert(issue.message.as_str());
        }

        if let Some(message) = first_message
            && rollup.samples.len() < max_samples
        {
            rollup.samples.push(sample(assessment, message.to_string()));
        }
    }

    rollup
}

/// Scraper and extractor failure rollup.
pub fn scraper_extractor_issues(
    assessments: &[JobQualityAssessment],
    max_samples: usize,
) -> ScraperExtractorIssues {
    let mut rollup = ScraperExtractorIssues::default();
    let mut agencies = Vec::new();

    for assessment in assessments {
        let mut failed: Vec<&str> = Vec::new();
        for issue in &assessment.issues {
            match issue.likely_step {
                PipelineStep::Scraper => rollup.scraper_issues += 1,
                PipelineStep::Extractor => rollup.extractor_issues += 1,
                _ => continue,
            }
            failed.push(issue.issue_type.as_str());
        }
        if failed.is_empty() {
            continue;
        }

        agencies.extend(std::iter::repeat_n(assessment.agency.as_str(), failed.len()));
        if rollup.samples.len() < max_samples {
            rollup.samples.push(sample(assessment, failed.join(", ")));
        }
    }

    rollup.by_agency = rank_agencies(agencies);
    rollup
}
