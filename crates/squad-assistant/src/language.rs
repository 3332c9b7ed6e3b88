//! Language detection for incoming chat messages.
//!
//! Script/keyword heuristics run before the statistical detector: short Uzbek
//! and Russian phrases are frequently misclassified by generic detectors, so
//! the cheap shortcuts must win when they fire.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The three languages the assistant replies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    En,
    Uz,
    Ru,
}

impl SupportedLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedLanguage::En => "en",
            SupportedLanguage::Uz => "uz",
            SupportedLanguage::Ru => "ru",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SupportedLanguage::En => "English",
            SupportedLanguage::Uz => "Uzbek",
            SupportedLanguage::Ru => "Russian",
        }
    }
}

impl std::fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running the detector once per request. Immutable afterwards;
/// every localized reply downstream keys off `code`.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageDetection {
    pub code: SupportedLanguage,
    /// Raw code reported by whichever detector fired, if any.
    pub raw: Option<String>,
    pub confidence: f32,
}

lazy_static! {
    static ref UZ_KEYWORDS: Regex = Regex::new(
        r"(?i)(salom|assalomu|rahmat|bo['’`]?yicha|qanday|maqsadim|o'qish|o‘qish|ishlayman|reja)"
    )
    .unwrap();
    static ref UZ_APOSTROPHE: Regex = Regex::new(r"(?i)o['’`]?z").unwrap();
}

/// ISO/label aliases mapped onto the supported set.
fn normalize_language_code(code: &str) -> SupportedLanguage {
    match code.to_lowercase().as_str() {
        "uz" | "uzb" | "uz-latn" | "uz-uz" | "uzbek" => SupportedLanguage::Uz,
        "ru" | "rus" | "ru-ru" | "russian" => SupportedLanguage::Ru,
        // "en", "en-us", "en-gb", "eng", "english" and anything unknown
        _ => SupportedLanguage::En,
    }
}

fn guess_by_script(value: &str) -> Option<SupportedLanguage> {
    let cyrillic = value
        .chars()
        .filter(|c| matches!(c, 'А'..='я' | 'Ё' | 'ё'))
        .count();
    if cyrillic >= 4 {
        return Some(SupportedLanguage::Ru);
    }
    if UZ_KEYWORDS.is_match(value) || UZ_APOSTROPHE.is_match(value) {
        return Some(SupportedLanguage::Uz);
    }
    None
}

/// Classify `input` into en/uz/ru.
///
/// Order matters: Cyrillic count, then the Uzbek keyword set, then the
/// statistical fallback with its alias table, then the Uzbek override for an
/// `en` verdict, then `en` at low confidence.
pub fn detect_language(input: &str) -> LanguageDetection {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return LanguageDetection {
            code: SupportedLanguage::En,
            raw: None,
            confidence: 0.0,
        };
    }

    if let Some(code) = guess_by_script(trimmed) {
        return LanguageDetection {
            code,
            raw: Some(code.as_str().to_string()),
            confidence: 0.92,
        };
    }

    let raw = whatlang::detect_lang(trimmed).map(|lang| lang.code().to_string());
    let normalized = raw
        .as_deref()
        .map(normalize_language_code)
        .unwrap_or(SupportedLanguage::En);

    if normalized != SupportedLanguage::En {
        return LanguageDetection {
            code: normalized,
            raw,
            confidence: 0.65,
        };
    }

    if UZ_KEYWORDS.is_match(trimmed) {
        return LanguageDetection {
            code: SupportedLanguage::Uz,
            raw: Some("uz".to_string()),
            confidence: 0.6,
        };
    }

    LanguageDetection {
        code: SupportedLanguage::En,
        raw,
        confidence: 0.5,
    }
}
