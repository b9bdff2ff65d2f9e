//! Cross-record anomaly detection.
//!
//! This module reports values the pipeline could not resolve: duty stations
//! without a country, grade strings that match no known scheme, and records
//! with missing or contradictory dates. Each finding carries a best-effort
//! suggestion for fixing it.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{JobRecord, parse_date, present};

use super::config::ResultLimits;
use super::models::{
    DateAnomaly, DateAnomalyType, LocationSuggestion, UnmappedLocation, UnrecognizedGrade,
};

/// Known duty station spellings geo-resolution misses: `(alias, city, country)`.
pub const LOCATION_ALIASES: &[(&str, &str, &str)] = &[
    ("genève", "Geneva", "Switzerland"),
    ("geneve", "Geneva", "Switzerland"),
    ("genf", "Geneva", "Switzerland"),
    ("bruxelles", "Brussels", "Belgium"),
    ("le caire", "Cairo", "Egypt"),
    ("alger", "Algiers", "Algeria"),
    ("addis abeba", "Addis Ababa", "Ethiopia"),
    ("nouvelle-delhi", "New Delhi", "India"),
    ("ciudad de méxico", "Mexico City", "Mexico"),
    ("home based", "Home-based", "Remote"),
    ("home-based", "Home-based", "Remote"),
    ("homebased", "Home-based", "Remote"),
    ("remote", "Home-based", "Remote"),
    ("multiple", "Multiple", "Multiple"),
    ("multiple locations", "Multiple", "Multiple"),
    ("various", "Multiple", "Multiple"),
];

/// Grade formats used across the UN system.
const GRADE_PATTERN_SOURCES: &[&str] = &[
    r"(?i)^P-?[1-7]$",
    r"(?i)^D-?[12]$",
    r"(?i)^G-?[1-7]$",
    r"(?i)^NO-?[A-E]$",
    r"(?i)^SB-?[1-5]$",
    r"(?i)^(?:LICA|IPSA|SC)-?\d{1,2}$",
    r"(?i)^(?:UNV|CONSULTANT|INTERN|JPO|ASG|USG)",
];

/// Keyword heuristics for unrecognized grades, checked in order.
const GRADE_KEYWORDS: &[(&str, &str)] = &[
    ("senior", "Senior level"),
    ("junior", "Junior level"),
    ("director", "Director level"),
    ("consult", "Consultancy"),
    ("volunt", "Volunteer"),
    ("intern", "Internship"),
    ("officer", "Professional (officer) level"),
    ("assistant", "General Service (assistant) level"),
];

/// Pre-compiled grade patterns.
///
/// Uses `OnceLock` for thread-safe lazy initialization.
struct GradePatterns {
    recognized: Vec<Regex>,
    /// Professional or General Service grade written with a stray separator
    loose_digit: Regex,
}

impl GradePatterns {
    fn instance() -> &'static Self {
        static PATTERNS: OnceLock<GradePatterns> = OnceLock::new();
        PATTERNS.get_or_init(|| GradePatterns {
            recognized: GRADE_PATTERN_SOURCES
                .iter()
                .map(|source| Regex::new(source).expect("Invalid grade pattern"))
                .collect(),
            loose_digit: Regex::new(r"(?i)^([pgd])[\s._/]*(\d)$")
                .expect("Invalid loose grade pattern"),
        })
    }
}

/// Whether a grade string matches a recognized grade format.
pub fn is_recognized_grade(grade: &str) -> bool {
    let grade = grade.trim();
    GradePatterns::instance()
        .recognized
        .iter()
        .any(|re| re.is_match(grade))
}

/// Best-effort reading of an unrecognized grade string.
pub fn interpret_grade(grade: &str) -> Option<String> {
    let grade = grade.trim();
    if let Some(caps) = GradePatterns::instance().loose_digit.captures(grade) {
        return Some(format!(
            "Likely {}-{}",
            caps[1].to_uppercase(),
            &caps[2]
        ));
    }

    let lowered = grade.to_lowercase();
    GRADE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, interpretation)| interpretation.to_string())
}

/// Suggests a city and country for a duty station via the alias table.
///
/// The whole station is tried first, then its first comma-separated segment.
pub fn suggest_location(station: &str) -> Option<LocationSuggestion> {
    let lowered = station.trim().to_lowercase();
    let first_segment = lowered.split(',').next().unwrap_or_default().trim();

    [lowered.as_str(), first_segment].iter().find_map(|candidate| {
        LOCATION_ALIASES
            .iter()
            .find(|(alias, _, _)| alias == candidate)
            .map(|(_, city, country)| LocationSuggestion {
                city: city.to_string(),
                country: country.to_string(),
            })
    })
}

/// Running tally for one distinct value across records.
#[derive(Default)]
struct Tally {
    count: usize,
    agencies: BTreeSet<String>,
    sample_job_ids: Vec<String>,
}

/// Tallies records by value and returns `(value, tally)` sorted by count
/// descending, ties by value ascending.
fn tally_by<F>(records: &[JobRecord], max_samples: usize, value: F) -> Vec<(String, Tally)>
where
    F: Fn(&JobRecord) -> Option<String>,
{
    let mut tallies: HashMap<String, Tally> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        let Some(value) = value(record) else {
            continue;
        };
        let tally = tallies.entry(value).or_default();
        tally.count += 1;
        tally.agencies.insert(record.agency().to_string());
        if tally.sample_job_ids.len() < max_samples {
            tally.sample_job_ids.push(record.record_id(index));
        }
    }

    let mut sorted: Vec<_> = tallies.into_iter().collect();
    sorted.sort_by(|(a_value, a), (b_value, b)| {
        b.count.cmp(&a.count).then_with(|| a_value.cmp(b_value))
    });
    sorted
}

/// Finds duty stations present on records that have no country.
pub fn find_unmapped_locations(
    records: &[JobRecord],
    limits: &ResultLimits,
) -> Vec<UnmappedLocation> {
    tally_by(records, limits.sample_job_ids, |record| {
        let station = present(&record.duty_station)?;
        present(&record.duty_country)
            .is_none()
            .then(|| station.to_string())
    })
    .into_iter()
    .take(limits.unmapped_locations)
    .map(|(station, tally)| UnmappedLocation {
        suggested: suggest_location(&station),
        duty_station: station,
        count: tally.count,
        agencies: tally.agencies.into_iter().collect(),
        sample_job_ids: tally.sample_job_ids,
    })
    .collect()
}

/// Finds grade strings that match no recognized grade format.
pub fn find_unrecognized_grades(
    records: &[JobRecord],
    limits: &ResultLimits,
) -> Vec<UnrecognizedGrade> {
    tally_by(records, limits.sample_job_ids, |record| {
        let grade = present(&record.up_grade)?;
        (!is_recognized_grade(grade)).then(|| grade.to_string())
    })
    .into_iter()
    .take(limits.unrecognized_grades)
    .map(|(grade, tally)| UnrecognizedGrade {
        interpretation: interpret_grade(&grade),
        grade,
        count: tally.count,
        agencies: tally.agencies.into_iter().collect(),
        sample_job_ids: tally.sample_job_ids,
    })
    .collect()
}

/// Finds missing, malformed, and contradictory dates.
///
/// A record yields at most one of `missing_posting`, `missing_deadline`, or
/// `invalid_format`, in that priority. Only a record with two valid dates is
/// checked for `future_posting` and `deadline_before_posted`, and it may
/// yield both. `today` is the reference date for "future".
pub fn find_date_anomalies(
    records: &[JobRecord],
    today: NaiveDate,
    limit: usize,
) -> Vec<DateAnomaly> {
    let mut anomalies = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if anomalies.len() >= limit {
            break;
        }
        for (anomaly_type, details, suggested_fix) in classify_dates(record, today) {
            anomalies.push(DateAnomaly {
                job_id: record.record_id(index),
                agency: record.agency().to_string(),
                title: record.title_text().to_string(),
                anomaly_type,
                posting_date: present(&record.posting_date).map(str::to_string),
                apply_until: present(&record.apply_until).map(str::to_string),
                details,
                suggested_fix: suggested_fix.to_string(),
            });
        }
    }

    anomalies.truncate(limit);
    anomalies
}

fn classify_dates(
    record: &JobRecord,
    today: NaiveDate,
) -> Vec<(DateAnomalyType, String, &'static str)> {
    let Some(posting_raw) = present(&record.posting_date) else {
        return vec![(
            DateAnomalyType::MissingPosting,
            "Record has no posting date".to_string(),
            "Re-run the cleaning step so the posting date is extracted from the source page",
        )];
    };
    let Some(deadline_raw) = present(&record.apply_until) else {
        return vec![(
            DateAnomalyType::MissingDeadline,
            "Record has no application deadline".to_string(),
            "Check the extractor selector for the closing date; open-ended postings should carry an explicit sentinel",
        )];
    };

    let (Some(posted), Some(due)) = (parse_date(posting_raw), parse_date(deadline_raw)) else {
        return vec![(
            DateAnomalyType::InvalidFormat,
            format!(
                "Could not parse posting date \"{}\" or deadline \"{}\"",
                posting_raw, deadline_raw
            ),
            "Normalize both dates to ISO 8601 (YYYY-MM-DD) in the cleaning step",
        )];
    };

    let mut found = Vec::new();
    if posted > today {
        found.push((
            DateAnomalyType::FuturePosting,
            format!("Posting date {} is after {}", posted, today),
            "Check for day/month swaps or timezone offsets in the posting date parser",
        ));
    }
    if due < posted {
        found.push((
            DateAnomalyType::DeadlineBeforePosted,
            format!("Deadline {} is {} days before posting date {}", due, (posted - due).num_days(), posted),
            "Check whether the extractor swapped the posting and deadline fields",
        ));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> JobRecord {
        JobRecord::from_value(value)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn test_recognized_grades() {
        for grade in [
            "P-3", "p3", "D-1", "G-7", "NO-B", "SB-4", "LICA-9", "IPSA10", "SC-3", "UNV",
            "Consultant", "Consultancy", "Internship", "JPO P-2", "USG",
        ] {
            assert!(is_recognized_grade(grade), "{} should be recognized", grade);
        }
        for grade in ["P-8", "Senior Officer", "G 5", "NOA-1", "Level 3", "Junior Intern"] {
            assert!(!is_recognized_grade(grade), "{} should not be recognized", grade);
        }
    }

    #[test]
    fn test_grade_interpretation() {
        assert_eq!(interpret_grade("G 5").as_deref(), Some("Likely G-5"));
        assert_eq!(interpret_grade("p.4").as_deref(), Some("Likely P-4"));
        assert_eq!(interpret_grade("Senior Officer").as_deref(), Some("Senior level"));
        assert_eq!(interpret_grade("Internship").as_deref(), Some("Internship"));
        assert_eq!(interpret_grade("Level 3"), None);
    }

    #[test]
    fn test_unrecognized_grades_tally() {
        let records = vec![
            record(json!({"id": "a", "up_grade": "Senior", "short_agency": "WHO"})),
            record(json!({"id": "b", "up_grade": "Senior", "short_agency": "UNDP"})),
            record(json!({"id": "c", "up_grade": "Senior", "short_agency": "WHO"})),
            record(json!({"id": "d", "up_grade": "P-3"})),
            record(json!({"id": "e", "up_grade": "Level 3"})),
            record(json!({"id": "f", "up_grade": ""})),
        ];

        let grades = find_unrecognized_grades(&records, &ResultLimits::default());

        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].grade, "Senior");
        assert_eq!(grades[0].count, 3);
        assert_eq!(grades[0].agencies, vec!["UNDP", "WHO"]);
        assert_eq!(grades[0].sample_job_ids, vec!["a", "b", "c"]);
        assert_eq!(grades[1].grade, "Level 3");
        assert_eq!(grades[1].interpretation, None);
    }

    #[test]
    fn test_location_suggestions() {
        let geneva = suggest_location("Genève").unwrap();
        assert_eq!(geneva.city, "Geneva");
        assert_eq!(geneva.country, "Switzerland");

        let cairo = suggest_location("Le Caire, Égypte").unwrap();
        assert_eq!(cairo.city, "Cairo");

        assert_eq!(suggest_location("Home Based").unwrap().country, "Remote");
        assert!(suggest_location("Atlantis").is_none());
    }

    #[test]
    fn test_unmapped_locations_sorted() {
        let records = vec![
            record(json!({"id": "a", "duty_station": "Bruxelles"})),
            record(json!({"id": "b", "duty_station": "Genève", "short_agency": "ILO"})),
            record(json!({"id": "c", "duty_station": "Genève", "long_agency": "World Health Organization"})),
            record(json!({"id": "d", "duty_station": "Alger"})),
            record(json!({"id": "e", "duty_station": "Genève", "duty_country": "Switzerland"})),
            record(json!({"id": "f", "duty_country": "Kenya"})),
        ];

        let locations = find_unmapped_locations(&records, &ResultLimits::default());

        let stations: Vec<_> = locations.iter().map(|l| l.duty_station.as_str()).collect();
        assert_eq!(stations, vec!["Genève", "Alger", "Bruxelles"]);
        assert_eq!(locations[0].count, 2);
        assert_eq!(locations[0].agencies, vec!["ILO", "World Health Organization"]);
        assert_eq!(locations[0].sample_job_ids, vec!["b", "c"]);
        assert_eq!(locations[1].suggested.as_ref().unwrap().city, "Algiers");
    }

    #[test]
    fn test_unmapped_locations_caps() {
        let records: Vec<JobRecord> = (0..40)
            .flat_map(|station| {
                (0..8).map(move |i| {
                    record(json!({"id": format!("{}-{}", station, i), "duty_station": format!("Station {:02}", station)}))
                })
            })
            .collect();

        let locations = find_unmapped_locations(&records, &ResultLimits::default());
        assert_eq!(locations.len(), 30);
        assert!(locations.iter().all(|l| l.count == 8));
        assert!(locations.iter().all(|l| l.sample_job_ids.len() == 5));
        assert_eq!(locations[0].duty_station, "Station 00");
    }

    #[test]
    fn test_date_anomaly_priority() {
        let records = vec![
            record(json!({"id": "a"})),
            record(json!({"id": "b", "posting_date": "2025-06-01"})),
            record(json!({"id": "c", "posting_date": "01/06/2025", "apply_until": "2025-06-30"})),
            record(json!({"id": "d", "posting_date": "2025-06-01", "apply_until": "2025-06-30"})),
        ];

        let anomalies = find_date_anomalies(&records, today(), 100);
        let types: Vec<_> = anomalies.iter().map(|a| (a.job_id.as_str(), a.anomaly_type)).collect();
        assert_eq!(
            types,
            vec![
                ("a", DateAnomalyType::MissingPosting),
                ("b", DateAnomalyType::MissingDeadline),
                ("c", DateAnomalyType::InvalidFormat),
            ]
        );
    }

    #[test]
    fn test_deadline_before_posted() {
        let records = vec![record(
            json!({"id": "x", "posting_date": "2025-06-01", "apply_until": "2025-05-01"}),
        )];

        let anomalies = find_date_anomalies(&records, today(), 100);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].anomaly_type, DateAnomalyType::DeadlineBeforePosted);
        assert_eq!(anomalies[0].apply_until.as_deref(), Some("2025-05-01"));
        assert!(!anomalies[0].suggested_fix.is_empty());
    }

    #[test]
    fn test_future_and_deadline_before_both_reported() {
        let records = vec![record(
            json!({"id": "x", "posting_date": "2025-09-01", "apply_until": "2025-08-01"}),
        )];

        let anomalies = find_date_anomalies(&records, today(), 100);
        let types: Vec<_> = anomalies.iter().map(|a| a.anomaly_type).collect();
        assert_eq!(
            types,
            vec![
                DateAnomalyType::FuturePosting,
                DateAnomalyType::DeadlineBeforePosted
            ]
        );
    }

    #[test]
    fn test_date_anomaly_cap() {
        let records: Vec<JobRecord> = (0..150).map(|i| record(json!({"id": i}))).collect();
        let anomalies = find_date_anomalies(&records, today(), 100);
        assert_eq!(anomalies.len(), 100);
        assert_eq!(anomalies[99].job_id, "99");
    }
}
