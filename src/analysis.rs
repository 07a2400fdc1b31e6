//! Language-aware text analysis.
//!
//! Both the lexical index and the lexical query parser run text through the
//! same [`Analyzer`], so matching is diacritic-insensitive and tolerant of
//! inflections and derivations:
//!
//! ```text
//! Text → NFD + strip combining marks → lowercase → words → stop words → stemmer
//! ```
//!
//! # Examples
//!
//! ```
//! use legisearch::analysis::{Analyzer, Language, LanguageAnalyzer};
//!
//! let analyzer = LanguageAnalyzer::new(Language::Spanish);
//! let terms: Vec<String> = analyzer
//!     .analyze("Transparencia y Corrupción")
//!     .into_iter()
//!     .map(|t| t.term)
//!     .collect();
//! assert_eq!(terms, vec!["transparent", "corrupcion"]);
//! ```

pub mod analyzer;
pub mod stemmer;
pub mod stop_words;

pub use analyzer::{Analyzer, Language, LanguageAnalyzer, Token, fold_diacritics};
