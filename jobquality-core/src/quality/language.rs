//! Heuristic language detection for job postings.
//!
//! Each supported language has a table of regex patterns: common function
//! words, characteristic diacritics, or Unicode block ranges. The text is
//! scored by counting matches per language and normalizing by the total.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Winning confidence below this value triggers the English fallback.
pub const LANGUAGE_FALLBACK_THRESHOLD: f64 = 0.3;
/// Confidence reported by the English fallback.
pub const LANGUAGE_FALLBACK_CONFIDENCE: f64 = 0.5;

/// Languages the detector can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
    Es,
    Ar,
    Pt,
    Zh,
    Ru,
    Other,
    Unknown,
}

impl Language {
    /// Declaration order; earlier languages win score ties.
    pub const ALL: [Self; 9] = [
        Self::En,
        Self::Fr,
        Self::Es,
        Self::Ar,
        Self::Pt,
        Self::Zh,
        Self::Ru,
        Self::Other,
        Self::Unknown,
    ];

    /// ISO-style code used in summaries.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Es => "es",
            Self::Ar => "ar",
            Self::Pt => "pt",
            Self::Zh => "zh",
            Self::Ru => "ru",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable language name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Fr => "French",
            Self::Es => "Spanish",
            Self::Ar => "Arabic",
            Self::Pt => "Portuguese",
            Self::Zh => "Chinese",
            Self::Ru => "Russian",
            Self::Other => "Other",
            Self::Unknown => "Unknown",
        }
    }

    /// Regex sources for this language.
    fn pattern_sources(&self) -> &'static [&'static str] {
        match self {
            Self::En => &[
                r"\b(?:the|and|of|to|for|with|is|are|will|you|our|this|be|responsibilities|experience|skills)\b",
            ],
            Self::Fr => &[
                r"\b(?:le|la|les|des|du|et|pour|avec|une|dans|est|sont|vous|nous|au|aux)\b",
                r"[àâçéèêëîïôûùœ]",
            ],
            Self::Es => &[
                r"\b(?:el|los|las|del|y|para|con|una|por|que|como|está|experiencia|funciones)\b",
                r"[ñáíóú¿¡]",
            ],
            Self::Ar => &[r"[\x{0600}-\x{06FF}\x{0750}-\x{077F}]"],
            Self::Pt => &[
                r"\b(?:o|os|da|do|das|dos|em|não|você|são|uma|experiência|funções)\b",
                r"[ãõáíóúâêôç]",
            ],
            Self::Zh => &[r"[\x{4E00}-\x{9FFF}\x{3400}-\x{4DBF}]"],
            Self::Ru => &[r"[\x{0400}-\x{04FF}]"],
            Self::Other => &[
                r"[\x{0900}-\x{097F}\x{0E00}-\x{0E7F}\x{3040}-\x{30FF}\x{AC00}-\x{D7AF}\x{0590}-\x{05FF}\x{0370}-\x{03FF}]",
            ],
            Self::Unknown => &[],
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of language detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanguageDetection {
    pub language: Language,
    /// Normalized score of the winning language, two decimals
    pub confidence: f64,
}

impl LanguageDetection {
    const fn new(language: Language, confidence: f64) -> Self {
        Self {
            language,
            confidence,
        }
    }
}

/// Pre-compiled language pattern tables.
///
/// Uses `OnceLock` for thread-safe lazy initialization.
struct LanguagePatterns {
    tables: Vec<(Language, Vec<Regex>)>,
}

impl LanguagePatterns {
    fn instance() -> &'static Self {
        static PATTERNS: OnceLock<LanguagePatterns> = OnceLock::new();
        PATTERNS.get_or_init(Self::compile)
    }

    fn compile() -> Self {
        let tables = Language::ALL
            .iter()
            .map(|language| {
                let regexes = language
                    .pattern_sources()
                    .iter()
                    .map(|source| Regex::new(source).expect("Invalid language pattern"))
                    .collect();
                (*language, regexes)
            })
            .collect();
        Self { tables }
    }
}

/// Detects the dominant language of a job posting.
///
/// `title` and `description` are joined and lower-cased before scoring.
///
/// - Empty text, or text matching no pattern, is `{unknown, 0}`.
/// - A winner below [`LANGUAGE_FALLBACK_THRESHOLD`] is replaced with
///   `{en, LANGUAGE_FALLBACK_CONFIDENCE}` so ambiguous short strings are not
///   reported as unknown.
pub fn detect_language(title: &str, description: &str) -> LanguageDetection {
    let text = format!("{} {}", title, description).trim().to_lowercase();
    if text.is_empty() {
        return LanguageDetection::new(Language::Unknown, 0.0);
    }

    let scores: Vec<(Language, usize)> = LanguagePatterns::instance()
        .tables
        .iter()
        .map(|(language, regexes)| {
            let score = regexes.iter().map(|re| re.find_iter(&text).count()).sum();
            (*language, score)
        })
        .collect();

    let total: usize = scores.iter().map(|(_, score)| score).sum();
    if total == 0 {
        return LanguageDetection::new(Language::Unknown, 0.0);
    }

    let mut best = (Language::Unknown, 0usize);
    for (language, score) in scores {
        if score > best.1 {
            best = (language, score);
        }
    }

    let confidence = best.1 as f64 / total as f64;
    if confidence < LANGUAGE_FALLBACK_THRESHOLD {
        return LanguageDetection::new(Language::En, LANGUAGE_FALLBACK_CONFIDENCE);
    }

    LanguageDetection::new(best.0, (confidence * 100.0).round() / 100.0)
}
