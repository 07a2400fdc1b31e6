//! Full-text search: query expressions and the positional inverted index.
//!
//! Queries use web-search syntax (see [`query::parse_websearch`]) and are
//! matched against a field-weighted positional index ranked by cover density.

pub mod index;
pub mod query;

pub use index::LexicalIndex;
pub use query::{LexicalQuery, PhraseTerm, parse_websearch};
