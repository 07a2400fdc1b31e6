//! Lexical query expressions and the web-search style parser.
//!
//! Supported syntax:
//!
//! - `a b` : both terms must match (implicit AND)
//! - `"a b"` : phrase, terms at the same relative positions as in the query
//! - `a or b` : either term
//! - `-a` : exclude documents containing `a`
//!
//! Every word goes through the corpus analyzer, so stop words vanish and
//! accents/inflections are normalized the same way as at index time.

use crate::analysis::{Analyzer, Token};

/// One term of a phrase with its offset from the first phrase term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTerm {
    pub term: String,
    pub offset: u32,
}

/// Parsed lexical query over analyzed terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexicalQuery {
    Term(String),
    Phrase(Vec<PhraseTerm>),
    And(Vec<LexicalQuery>),
    Or(Vec<LexicalQuery>),
    Not(Box<LexicalQuery>),
}

impl LexicalQuery {
    /// Returns true if the query can match on something other than absence of terms.
    pub fn has_positive(&self) -> bool {
        match self {
            LexicalQuery::Term(_) | LexicalQuery::Phrase(_) => true,
            LexicalQuery::And(children) | LexicalQuery::Or(children) => {
                children.iter().any(LexicalQuery::has_positive)
            }
            LexicalQuery::Not(_) => false,
        }
    }

    /// Distinct terms outside negations, in query order. These drive ranking.
    pub fn positive_terms(&self) -> Vec<&str> {
        let mut terms = Vec::new();
        self.collect_positive(&mut terms);
        terms
    }

    fn collect_positive<'a>(&'a self, terms: &mut Vec<&'a str>) {
        fn push_unique<'a>(terms: &mut Vec<&'a str>, term: &'a str) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }

        match self {
            LexicalQuery::Term(term) => push_unique(terms, term),
            LexicalQuery::Phrase(parts) => {
                for part in parts {
                    push_unique(terms, &part.term);
                }
            }
            LexicalQuery::And(children) | LexicalQuery::Or(children) => {
                for child in children {
                    child.collect_positive(terms);
                }
            }
            LexicalQuery::Not(_) => {}
        }
    }
}

#[derive(Debug, PartialEq)]
enum Item {
    Text { negated: bool, text: String },
    Or,
}

fn scan(input: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut negated = false;
        if c == '-' {
            chars.next();
            negated = true;
        }

        let mut text = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                text.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '"' {
                    break;
                }
                text.push(c);
                chars.next();
            }
            if !negated && text.eq_ignore_ascii_case("or") {
                items.push(Item::Or);
                continue;
            }
        }

        if !text.is_empty() {
            items.push(Item::Text { negated, text });
        }
    }

    items
}

fn clause_from_tokens(tokens: Vec<Token>) -> Option<LexicalQuery> {
    match tokens.len() {
        0 => None,
        1 => tokens.into_iter().next().map(|t| LexicalQuery::Term(t.term)),
        _ => {
            let base = tokens[0].position;
            Some(LexicalQuery::Phrase(
                tokens
                    .into_iter()
                    .map(|t| PhraseTerm {
                        offset: t.position - base,
                        term: t.term,
                    })
                    .collect(),
            ))
        }
    }
}

/// Parse web-search syntax into a [`LexicalQuery`].
///
/// Returns `None` when nothing searchable remains, e.g. the query consists of
/// stop words only.
pub fn parse_websearch(input: &str, analyzer: &dyn Analyzer) -> Option<LexicalQuery> {
    let mut groups: Vec<Vec<LexicalQuery>> = Vec::new();
    let mut pending_or = false;

    for item in scan(input) {
        let (negated, text) = match item {
            Item::Or => {
                pending_or = !groups.is_empty();
                continue;
            }
            Item::Text { negated, text } => (negated, text),
        };

        let Some(clause) = clause_from_tokens(analyzer.analyze(&text)) else {
            continue;
        };
        let clause = if negated {
            LexicalQuery::Not(Box::new(clause))
        } else {
            clause
        };

        match groups.last_mut() {
            Some(group) if pending_or => group.push(clause),
            _ => groups.push(vec![clause]),
        }
        pending_or = false;
    }

    let mut conjuncts: Vec<LexicalQuery> = groups
        .into_iter()
        .filter_map(|mut group| match group.len() {
            0 => None,
            1 => group.pop(),
            _ => Some(LexicalQuery::Or(group)),
        })
        .collect();

    match conjuncts.len() {
        0 => None,
        1 => conjuncts.pop(),
        _ => Some(LexicalQuery::And(conjuncts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Language, LanguageAnalyzer};

    fn parse(input: &str) -> Option<LexicalQuery> {
        parse_websearch(input, &LanguageAnalyzer::new(Language::Spanish))
    }

    fn term(t: &str) -> LexicalQuery {
        LexicalQuery::Term(t.to_string())
    }

    #[test]
    fn test_implicit_and_drops_stop_words() {
        assert_eq!(
            parse("transparencia y corrupción"),
            Some(LexicalQuery::And(vec![
                term("transparent"),
                term("corrupcion")
            ]))
        );
    }

    #[test]
    fn test_single_term() {
        assert_eq!(parse("Salud"), Some(term("salud")));
    }

    #[test]
    fn test_phrase_keeps_stop_word_gaps() {
        assert_eq!(
            parse("\"medio del ambiente\""),
            Some(LexicalQuery::Phrase(vec![
                PhraseTerm {
                    term: "medi".to_string(),
                    offset: 0
                },
                PhraseTerm {
                    term: "ambient".to_string(),
                    offset: 2
                },
            ]))
        );
    }

    #[test]
    fn test_or_binds_adjacent_terms() {
        assert_eq!(
            parse("ley salud or educación"),
            Some(LexicalQuery::And(vec![
                term("ley"),
                LexicalQuery::Or(vec![term("salud"), term("educ")]),
            ]))
        );
    }

    #[test]
    fn test_negation() {
        assert_eq!(
            parse("salud -mental"),
            Some(LexicalQuery::And(vec![
                term("salud"),
                LexicalQuery::Not(Box::new(term("mental"))),
            ]))
        );
    }

    #[test]
    fn test_stop_words_only_is_none() {
        assert_eq!(parse("de la y"), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("or"), None);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(
            parse("\"delitos informáticos"),
            Some(LexicalQuery::Phrase(vec![
                PhraseTerm {
                    term: "delit".to_string(),
                    offset: 0
                },
                PhraseTerm {
                    term: "informat".to_string(),
                    offset: 1
                },
            ]))
        );
    }

    #[test]
    fn test_positive_terms_skip_negations() {
        let query = parse("salud \"salud mental\" -delito").unwrap();
        assert_eq!(query.positive_terms(), vec!["salud", "mental"]);
        assert!(query.has_positive());

        let negative_only = parse("-salud").unwrap();
        assert!(!negative_only.has_positive());
    }
}
