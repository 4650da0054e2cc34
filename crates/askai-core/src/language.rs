use serde::{Deserialize, Serialize};

/// Language used for the prompt hint, speech synthesis and recognition.
///
/// Chosen per message by looking for Devanagari script; everything else is
/// treated as English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
}

const DEVANAGARI: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';

impl Language {
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| DEVANAGARI.contains(&c)) {
            Language::Hindi
        } else {
            Language::English
        }
    }

    /// BCP 47 tag
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
        }
    }

    /// Primary subtag, e.g. "hi" for "hi-IN"
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }

    /// Prompt sent upstream, asking for a reply in this language when it
    /// isn't the default.
    pub fn prompt_for(&self, query: &str) -> String {
        match self {
            Language::English => query.to_string(),
            Language::Hindi => format!("Respond in Hindi: {}", query),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }
}
