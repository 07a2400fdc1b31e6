use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::stemmer;
use crate::analysis::stop_words;

/// Corpus language used for stop words and stemming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Spanish => write!(f, "spanish"),
            Language::English => write!(f, "english"),
        }
    }
}

/// A normalized term and its word position in the source text.
///
/// Positions count every word, stop words included, so phrase distances in
/// queries and documents line up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub position: u32,
}

/// Turns raw text into normalized, stemmed terms.
pub trait Analyzer: Send + Sync + fmt::Debug {
    fn analyze(&self, text: &str) -> Vec<Token>;

    /// Name of the analyzer, used in logs and snapshots.
    fn name(&self) -> &str;
}

/// Strip diacritics (`á` → `a`, `ñ` → `n`) by decomposing and dropping combining marks.
pub fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Diacritic-folding analyzer with per-language stop words and Snowball stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageAnalyzer {
    language: Language,
}

impl LanguageAnalyzer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Normalize a single word. Returns `None` for stop words.
    pub fn normalize_word(&self, word: &str) -> Option<String> {
        let folded = fold_diacritics(word).to_lowercase();
        if folded.is_empty() || stop_words::is_stop_word(self.language, &folded) {
            return None;
        }
        Some(stemmer::stem(self.language, &folded))
    }
}

impl Analyzer for LanguageAnalyzer {
    fn analyze(&self, text: &str) -> Vec<Token> {
        text.unicode_words()
            .enumerate()
            .filter_map(|(position, word)| {
                self.normalize_word(word).map(|term| Token {
                    term,
                    position: position as u32,
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        match self.language {
            Language::Spanish => "spanish",
            Language::English => "english",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(analyzer: &LanguageAnalyzer, text: &str) -> Vec<String> {
        analyzer.analyze(text).into_iter().map(|t| t.term).collect()
    }

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("Educación pública"), "Educacion publica");
        assert_eq!(fold_diacritics("niño"), "nino");
    }

    #[test]
    fn test_spanish_accent_and_inflection_insensitive() {
        let analyzer = LanguageAnalyzer::new(Language::Spanish);
        assert_eq!(
            terms(&analyzer, "Delitos informáticos"),
            terms(&analyzer, "delito informatico")
        );
        assert_eq!(
            terms(&analyzer, "educación"),
            terms(&analyzer, "EDUCACION")
        );
    }

    #[test]
    fn test_spanish_derived_forms_match() {
        let analyzer = LanguageAnalyzer::new(Language::Spanish);
        assert_eq!(
            terms(&analyzer, "reforma educativa"),
            terms(&analyzer, "Reforma de la educación")
        );
        assert_eq!(
            terms(&analyzer, "transparente"),
            terms(&analyzer, "transparencia")
        );
    }

    #[test]
    fn test_positions_count_stop_words() {
        let analyzer = LanguageAnalyzer::new(Language::Spanish);
        let tokens = analyzer.analyze("transparencia y corrupción");

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 2);
    }

    #[test]
    fn test_only_stop_words_yields_nothing() {
        let analyzer = LanguageAnalyzer::new(Language::Spanish);
        assert!(analyzer.analyze("de la y el").is_empty());
    }

    #[test]
    fn test_english_analyzer() {
        let analyzer = LanguageAnalyzer::new(Language::English);
        assert_eq!(terms(&analyzer, "The policies of the city"), vec!["polici", "citi"]);
    }
}
