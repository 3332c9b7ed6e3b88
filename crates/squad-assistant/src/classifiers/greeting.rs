//! Greeting detection and reply rotation.

use std::sync::Mutex;

use lazy_static::lazy_static;
use rand::Rng;

use crate::classifiers::patterns::PatternSet;
use crate::language::SupportedLanguage;

lazy_static! {
    static ref GREETING_MATCHERS: PatternSet<SupportedLanguage> = PatternSet::new(
        "greetings",
        vec![
            (r"(?i)\b(hi|hello|hey|yo|what's up)\b", SupportedLanguage::En),
            (
                r"(?i)\b(salom|assalomu(?:\s+alaykum)?)\b",
                SupportedLanguage::Uz,
            ),
            (
                r"(?i)\b(привет|здравствуй|добрый\s+день)\b",
                SupportedLanguage::Ru,
            ),
        ],
    );
}

const GREETINGS_EN: &[&str] = &[
    "Hey! Glad you're here—what part of the site are we leveling up today?",
    "Welcome back, superstar! Point me at any feature you want to explore ✨",
    "Hi friend! Ask me anything about this site and I'll cheer you on.",
    "Yo! Let's make some progress—what site detail should we dive into?",
];

const GREETINGS_UZ: &[&str] = &[
    "Salom! Saytning qaysi bo‘limini birga kuchaytiramiz? 💪",
    "Xush kelibsiz! Shu yerdagi funksiyalar bo‘yicha savollaringizni kutaman ✨",
    "Hey! Sayt haqida nimani aniqligini istaysiz? Men doim yordamga tayyorman.",
    "Assalomu alaykum! Sahifalar va imkoniyatlar bo‘yicha savollar bormi?",
];

const GREETINGS_RU: &[&str] = &[
    "Привет! Что из возможностей сайта прокачаем прямо сейчас? ✨",
    "Рада тебя видеть! Спрашивай про любые разделы сайта — я на связи.",
    "Хей! Подскажешь, какую часть сайта разобрать? Погнали! 💪",
    "Добро пожаловать! Спроси про функции или страницы — поддержу тебя.",
];

/// The reply pool backing a language's greetings.
pub fn reply_pool(language: SupportedLanguage) -> &'static [&'static str] {
    match language {
        SupportedLanguage::En => GREETINGS_EN,
        SupportedLanguage::Uz => GREETINGS_UZ,
        SupportedLanguage::Ru => GREETINGS_RU,
    }
}

/// First matching greeting pattern wins and returns its language tag.
pub fn detect_greeting(input: &str) -> Option<SupportedLanguage> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    GREETING_MATCHERS.first_match(trimmed)
}

/// Per-language cursor tracking the previously served greeting.
///
/// Best-effort dedup only: a race between two concurrent greetings can
/// occasionally repeat a reply, which is acceptable. Held in shared state
/// rather than a module-level global so tests can reset it.
pub struct GreetingRotation {
    last_index: Mutex<[Option<usize>; 3]>,
}

impl GreetingRotation {
    pub fn new() -> Self {
        Self {
            last_index: Mutex::new([None; 3]),
        }
    }

    /// Pick a random reply from the language's pool, never repeating the
    /// immediately previous reply for that language.
    pub fn next_reply(&self, language: SupportedLanguage) -> String {
        let responses = reply_pool(language);
        let mut index = rand::thread_rng().gen_range(0..responses.len());

        let slot = match language {
            SupportedLanguage::En => 0,
            SupportedLanguage::Uz => 1,
            SupportedLanguage::Ru => 2,
        };
        if let Ok(mut last) = self.last_index.lock() {
            if last[slot] == Some(index) {
                index = (index + 1) % responses.len();
            }
            last[slot] = Some(index);
        }

        responses[index].to_string()
    }
}

impl Default for GreetingRotation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Detection Tests =====

    #[test]
    fn test_english_greeting() {
        assert_eq!(detect_greeting("hey there"), Some(SupportedLanguage::En));
        assert_eq!(detect_greeting("Hello!"), Some(SupportedLanguage::En));
    }

    #[test]
    fn test_uzbek_greeting() {
        assert_eq!(
            detect_greeting("Assalomu alaykum"),
            Some(SupportedLanguage::Uz)
        );
        assert_eq!(detect_greeting("salom"), Some(SupportedLanguage::Uz));
    }

    #[test]
    fn test_russian_greeting() {
        assert_eq!(detect_greeting("привет"), Some(SupportedLanguage::Ru));
        assert_eq!(detect_greeting("добрый день"), Some(SupportedLanguage::Ru));
    }

    #[test]
    fn test_non_greeting_falls_through() {
        assert_eq!(detect_greeting("how do streaks work?"), None);
        assert_eq!(detect_greeting(""), None);
    }

    #[test]
    fn test_first_pattern_wins_for_mixed_input() {
        // "hi" (en) is declared before "salom" (uz)
        assert_eq!(detect_greeting("hi salom"), Some(SupportedLanguage::En));
    }

    // ===== Rotation Tests =====

    #[test]
    fn test_reply_comes_from_language_pool() {
        let rotation = GreetingRotation::new();
        let reply = rotation.next_reply(SupportedLanguage::Ru);
        assert!(GREETINGS_RU.contains(&reply.as_str()));
    }

    #[test]
    fn test_no_immediate_repeat_per_language() {
        let rotation = GreetingRotation::new();
        let mut previous = rotation.next_reply(SupportedLanguage::En);
        for _ in 0..50 {
            let next = rotation.next_reply(SupportedLanguage::En);
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn test_languages_rotate_independently() {
        let rotation = GreetingRotation::new();
        // Exhausting one language's cursor must not affect another's pool.
        for _ in 0..10 {
            rotation.next_reply(SupportedLanguage::En);
        }
        let reply = rotation.next_reply(SupportedLanguage::Uz);
        assert!(GREETINGS_UZ.contains(&reply.as_str()));
    }
}
