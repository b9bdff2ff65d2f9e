//! Duplicate posting detection.
//!
//! Two strategies run independently and their groups are concatenated:
//! records sharing a `uniquecode`, and records sharing title, agency, and
//! duty station whose posting dates fall inside the duplicate window.

use std::collections::HashMap;

use crate::models::{JobRecord, parse_date, present};

use super::config::QualityConfig;
use super::models::{DuplicateGroup, DuplicateJob, DuplicateType};

/// Groups record indices by key, preserving first-seen key order.
fn group_by_key<F>(records: &[JobRecord], key: F) -> Vec<Vec<usize>>
where
    F: Fn(&JobRecord) -> Option<String>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Some(key) = key(record) else {
            continue;
        };
        match positions.get(&key) {
            Some(&position) => groups[position].push(index),
            None => {
                positions.insert(key, groups.len());
                groups.push(vec![index]);
            }
        }
    }

    groups
}

fn duplicate_job(records: &[JobRecord], index: usize) -> DuplicateJob {
    let record = &records[index];
    DuplicateJob {
        id: record.record_id(index),
        title: record.title_text().to_string(),
        agency: record.agency().to_string(),
        duty_station: present(&record.duty_station).map(str::to_string),
        posting_date: present(&record.posting_date).map(str::to_string),
    }
}

/// Finds records that share a non-empty `uniquecode`.
pub fn find_uniquecode_duplicates(records: &[JobRecord]) -> Vec<DuplicateGroup> {
    group_by_key(records, |record| present(&record.uniquecode).map(str::to_string))
        .into_iter()
        .filter(|members| members.len() >= 2)
        .map(|members| DuplicateGroup {
            group_type: DuplicateType::SameUniquecode,
            recommendation: format!(
                "{} records share uniquecode \"{}\"; the importer likely ran twice or the scraper re-ingested the posting without an upsert",
                members.len(),
                present(&records[members[0]].uniquecode).unwrap_or_default()
            ),
            jobs: members.iter().map(|&i| duplicate_job(records, i)).collect(),
        })
        .collect()
}

/// Finds same title/agency/station records posted within `window_days`.
///
/// Groups with fewer than two parseable posting dates are skipped: without
/// two dates the window cannot be verified.
pub fn find_title_agency_location_duplicates(
    records: &[JobRecord],
    window_days: i64,
) -> Vec<DuplicateGroup> {
    let key = |record: &JobRecord| {
        let title = present(&record.title)?;
        Some(format!(
            "{}|{}|{}",
            title.to_lowercase(),
            present(&record.short_agency).unwrap_or_default().to_lowercase(),
            present(&record.duty_station).unwrap_or_default().to_lowercase()
        ))
    };

    group_by_key(records, key)
        .into_iter()
        .filter(|members| members.len() >= 2)
        .filter_map(|members| {
            let dates: Vec<_> = members
                .iter()
                .filter_map(|&i| present(&records[i].posting_date).and_then(parse_date))
                .collect();
            if dates.len() < 2 {
                return None;
            }

            let earliest = dates.iter().min()?;
            let latest = dates.iter().max()?;
            let span = (*latest - *earliest).num_days();
            if span >= window_days {
                return None;
            }

            let first = &records[members[0]];
            Some(DuplicateGroup {
                group_type: DuplicateType::SameTitleAgencyLocation,
                recommendation: format!(
                    "{} postings of \"{}\" at {} by {} within {} days; likely a re-post or a scraper pagination overlap with a changed uniquecode",
                    members.len(),
                    first.title_text(),
                    present(&first.duty_station).unwrap_or("an unspecified station"),
                    first.agency(),
                    span
                ),
                jobs: members.iter().map(|&i| duplicate_job(records, i)).collect(),
            })
        })
        .collect()
}

/// Runs both strategies and caps the combined list.
pub fn find_duplicates(records: &[JobRecord], config: &QualityConfig) -> Vec<DuplicateGroup> {
    let mut groups = find_uniquecode_duplicates(records);
    groups.extend(find_title_agency_location_duplicates(
        records,
        config.duplicate_window_days,
    ));
    groups.truncate(config.limits.duplicate_groups);
    groups
}
