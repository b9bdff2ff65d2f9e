//! Data quality assessment for job posting pipelines.
//!
//! This crate inspects job records produced by a scraping and enrichment
//! pipeline, attributes each defect to the pipeline stage most likely to
//! have caused it, and rolls the findings up into a single report.
//!
//! # Guarantees
//! - Records are never modified; the engine only reads them
//! - Malformed records become findings, never errors
//! - The same batch and reference time always produce the same report
//!
//! # Architecture
//! - `models`: the input record and its lenient decoding
//! - `quality`: detectors, scoring, and batch analyses
//! - `logging`: tracing subscriber setup for binaries

pub mod error;
pub mod logging;
pub mod models;
pub mod quality;

// Re-export commonly used types
pub use error::{JobQualityError, Result};
pub use logging::init_logging;
pub use models::{JobRecord, UNKNOWN_AGENCY, parse_date, parse_records};
pub use quality::{DataQualitySummary, QualityAnalyzer, QualityConfig};
