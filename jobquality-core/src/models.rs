//! Input record model for the quality engine.
//!
//! Job records are produced by the upstream ingestion pipeline and are
//! treated as read-only. Decoding is deliberately tolerant: wrongly typed
//! fields become absent values, and the detectors turn those absences into
//! quality findings instead of decode failures.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{JobQualityError, Result};

/// Agency label used when a record names neither a short nor a long agency.
pub const UNKNOWN_AGENCY: &str = "Unknown";

/// A job posting record as emitted by the ingestion pipeline.
///
/// Every field is optional. `None`, a missing key, and an empty or
/// whitespace-only string are all treated as "absent" by the accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duty_station: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duty_country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duty_continent: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub up_grade: Option<String>,
    /// Comma-separated language list
    #[serde(default, deserialize_with = "lenient_string")]
    pub languages: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_labels: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_labels_vectorized: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sectoral_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hs_min_exp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bachelor_min_exp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub master_min_exp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub posting_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub apply_until: Option<String>,
    /// Confidence of the upstream categorizer, 0-100
    #[serde(default, deserialize_with = "lenient_number")]
    pub classification_confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_agency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub long_agency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uniquecode: Option<String>,
}

/// Returns the trimmed value of a text field, or `None` when it is absent.
pub fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl JobRecord {
    /// Decodes a single record from an arbitrary JSON value.
    ///
    /// Non-object values decode as an all-absent record.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            tracing::warn!(
                "Job record is not a JSON object ({}); analyzing it as an empty record",
                json_kind(&value)
            );
            return Self::default();
        }

        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("Job record could not be decoded: {}", e);
            Self::default()
        })
    }

    /// Record identifier, falling back to a positional placeholder.
    pub fn record_id(&self, index: usize) -> String {
        present(&self.id).map_or_else(|| format!("unknown-{}", index), str::to_string)
    }

    /// Agency label: short name, then long name, then [`UNKNOWN_AGENCY`].
    pub fn agency(&self) -> &str {
        present(&self.short_agency)
            .or_else(|| present(&self.long_agency))
            .unwrap_or(UNKNOWN_AGENCY)
    }

    /// Trimmed title, empty when absent.
    pub fn title_text(&self) -> &str {
        present(&self.title).unwrap_or_default()
    }

    /// Trimmed description, empty when absent.
    pub fn description_text(&self) -> &str {
        present(&self.description).unwrap_or_default()
    }

    /// Character count of the trimmed description.
    pub fn description_length(&self) -> usize {
        self.description_text().chars().count()
    }

    /// Whether every experience requirement is missing.
    pub fn experience_missing(&self) -> bool {
        self.hs_min_exp.is_none() && self.bachelor_min_exp.is_none() && self.master_min_exp.is_none()
    }
}

/// Parses a pipeline date string into a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, and naive timestamps with
/// either a `T` or a space separator. Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|timestamp| timestamp.date())
}

/// Decodes a JSON array of job records.
///
/// Individual elements never fail: anything that is not an object becomes an
/// empty record so the rest of the batch is still analyzed.
///
/// # Errors
/// Returns a serialization error when the payload is not valid JSON or is
/// not an array.
pub fn parse_records(json: &str) -> Result<Vec<JobRecord>> {
    let values: Vec<Value> = serde_json::from_str(json)
        .map_err(|e| JobQualityError::serialization("Failed to decode job record array", e))?;

    Ok(values.into_iter().map(JobRecord::from_value).collect())
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(numeric.filter(|v| v.is_finite()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
