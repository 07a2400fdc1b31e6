//! Snowball stemmers (Spanish, and Porter2 for English).
//!
//! Input must already be folded and lowercased. Snowball's Spanish suffix
//! rules are keyed on accented endings (`-ación`, `-ución`, `-logía`), so those
//! endings get their accent back before stemming. Unaccented and accented
//! spellings of a word therefore share one stem.

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};

use crate::analysis::analyzer::{Language, fold_diacritics};

lazy_static! {
    static ref SPANISH: Stemmer = Stemmer::create(Algorithm::Spanish);
    static ref ENGLISH: Stemmer = Stemmer::create(Algorithm::English);
}

/// Folded endings and the accented spelling the Spanish stemmer matches.
const SPANISH_ACCENTED_ENDINGS: &[(&str, &str)] = &[
    ("acion", "ación"),
    ("ucion", "ución"),
    ("logias", "logías"),
    ("logia", "logía"),
];

pub fn stem(language: Language, word: &str) -> String {
    match language {
        Language::Spanish => {
            let accented = restore_spanish_ending(word);
            fold_diacritics(&SPANISH.stem(&accented))
        }
        Language::English => ENGLISH.stem(word).into_owned(),
    }
}

fn restore_spanish_ending(word: &str) -> String {
    for (folded, accented) in SPANISH_ACCENTED_ENDINGS {
        if let Some(stripped) = word.strip_suffix(folded) {
            return format!("{stripped}{accented}");
        }
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn es(word: &str) -> String {
        stem(Language::Spanish, word)
    }

    #[test]
    fn test_spanish_derivations_share_a_stem() {
        assert_eq!(es("educacion"), "educ");
        assert_eq!(es("educativa"), "educ");
        assert_eq!(es("transparencia"), "transparent");
        assert_eq!(es("transparente"), "transparent");
    }

    #[test]
    fn test_spanish_inflections() {
        assert_eq!(es("delitos"), es("delito"));
        assert_eq!(es("publicas"), es("publico"));
        assert_eq!(es("leyes"), "ley");
        assert_eq!(es("informaticos"), "informat");
    }

    #[test]
    fn test_accented_endings_restored() {
        assert_eq!(restore_spanish_ending("formacion"), "formación");
        assert_eq!(restore_spanish_ending("tecnologia"), "tecnología");
        assert_eq!(restore_spanish_ending("corrupcion"), "corrupcion");
        assert_eq!(es("tecnologia"), "tecnolog");
    }

    #[test]
    fn test_short_words_untouched() {
        assert_eq!(es("ley"), "ley");
        assert_eq!(stem(Language::English, "bus"), "bus");
    }

    #[test]
    fn test_english_porter2() {
        assert_eq!(stem(Language::English, "policies"), "polici");
        assert_eq!(stem(Language::English, "laws"), "law");
        assert_eq!(stem(Language::English, "running"), "run");
    }
}
