//! sqlveil — reversible SQL query anonymization.
//!
//! This library turns a raw SQL statement into two artifacts: a
//! canonicalized rendering (consistent casing and spacing, keywords and
//! functions distinguished from identifiers) and an anonymized rendering in
//! which every table name, identifier, and literal is replaced by a stable
//! placeholder (`table_N`, `identifier_N`, `literal_N`) while keywords,
//! functions, operators, and punctuation survive verbatim. The placeholder
//! mapping is bidirectional, so the original text can be reconstructed from
//! the anonymized one.
//!
//! # Architecture
//!
//! The pipeline has four stages:
//! 1. **Normalizer** — casing and whitespace canonicalization
//! 2. **Tokenizer** — total, infallible lexical classification
//! 3. **Disambiguator** — contextual reclassification (tables, aliases,
//!    qualified references)
//! 4. **Mapping engine** — get-or-create placeholder assignment with a
//!    reverse index for decoding
//!
//! # Example
//!
//! ```
//! use sqlveil::Anonymizer;
//!
//! let mut anonymizer = Anonymizer::new();
//! let canonical = anonymizer.canonicalize(
//!     "SELECT name, salary FROM employees WHERE salary > 50000;",
//! );
//! let anonymized = anonymizer.anonymize(&canonical).unwrap();
//!
//! assert_eq!(
//!     anonymized.text,
//!     "SELECT identifier_1 , identifier_2 FROM table_1 WHERE identifier_2 > literal_1 ;"
//! );
//! assert_eq!(anonymizer.de_anonymize(&anonymized.text), canonical);
//! ```

pub mod anonymizer;
pub mod context;
pub mod error;
pub mod normalize;
pub mod persist;
pub mod tokens;
pub mod trie;
pub mod vocab;

pub use anonymizer::{compact_qualified, Anonymized, Anonymizer, MappingState, ANONYMIZABLE};
pub use error::{Error, Result};
pub use normalize::Normalizer;
pub use persist::{load_mappings, save_mappings};
pub use tokens::{Token, TokenCategory, Tokenizer};
pub use trie::Trie;
pub use vocab::Vocabulary;

/// Canonicalize one statement with the default vocabulary.
///
/// ```
/// assert_eq!(
///     sqlveil::canonicalize("  select *    from customers  where 1 = 1;"),
///     "SELECT * FROM customers WHERE 1 = 1 ;"
/// );
/// ```
pub fn canonicalize(sql: &str) -> String {
    Anonymizer::new().canonicalize(sql)
}

/// Tokenize one statement with the default vocabulary, without the
/// contextual passes.
pub fn tokenize(sql: &str) -> Vec<Token> {
    Tokenizer::default().tokenize(sql)
}

/// Tokenize and disambiguate one statement with the default vocabulary.
pub fn classify(sql: &str) -> Vec<Token> {
    let tokenizer = Tokenizer::default();
    context::disambiguate(tokenizer.vocabulary(), tokenizer.tokenize(sql))
}
