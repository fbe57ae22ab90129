//! esgsearch-text
//!
//! In-memory inverted index with IDF-weighted, field-boosted scoring. See
//! `index` for the scoring rules and `tokenize` for term extraction.

pub mod index;
pub mod tokenize;

pub use index::{LexicalIndex, Posting, DEFAULT_BOOST, TITLE_BOOST};
pub use tokenize::{term_set, tokenize};
