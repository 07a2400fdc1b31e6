//! Stop word lists, stored diacritic-folded and lowercased.

use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::analysis::analyzer::Language;

lazy_static! {
    static ref SPANISH_STOP_WORDS: HashSet<&'static str> = [
        "a", "al", "algo", "algunas", "algunos", "ante", "antes", "como", "con", "contra",
        "cual", "cuando", "de", "del", "desde", "donde", "durante", "e", "el", "ella",
        "ellas", "ellos", "en", "entre", "era", "es", "esa", "esas", "ese", "eso", "esos",
        "esta", "estan", "estas", "este", "esto", "estos", "fue", "fueron", "ha", "han",
        "hasta", "hay", "la", "las", "le", "les", "lo", "los", "mas", "me", "mi", "mis",
        "mucho", "muy", "nada", "ni", "no", "nos", "o", "os", "otra", "otras", "otro",
        "otros", "para", "pero", "poco", "por", "porque", "que", "quien", "se", "sea", "ser",
        "si", "sin", "sino", "sobre", "son", "su", "sus", "tambien", "te", "tiene", "todo",
        "todos", "tu", "tus", "u", "un", "una", "unas", "uno", "unos", "y", "ya", "yo",
    ]
    .into_iter()
    .collect();

    static ref ENGLISH_STOP_WORDS: HashSet<&'static str> = [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into",
        "is", "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then",
        "there", "these", "they", "this", "to", "was", "will", "with",
    ]
    .into_iter()
    .collect();
}

/// Returns true if `word` (already folded and lowercased) is a stop word.
pub fn is_stop_word(language: Language, word: &str) -> bool {
    match language {
        Language::Spanish => SPANISH_STOP_WORDS.contains(word),
        Language::English => ENGLISH_STOP_WORDS.contains(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_per_language() {
        assert!(is_stop_word(Language::Spanish, "y"));
        assert!(is_stop_word(Language::Spanish, "tambien"));
        assert!(!is_stop_word(Language::Spanish, "the"));
        assert!(is_stop_word(Language::English, "the"));
        assert!(!is_stop_word(Language::English, "ley"));
    }
}
