//! The anonymization mapping engine and the end-to-end pipeline.
//!
//! [`MappingState`] is the bidirectional store: per anonymizable category a
//! forward map (original → placeholder), a reverse map (placeholder →
//! original), and a monotonic counter. The same original always yields the
//! same placeholder within one state's lifetime, two originals never share
//! one, and `counter == forward.len()` holds after every operation.
//!
//! [`Anonymizer`] wires the pieces together: tokenize, disambiguate,
//! substitute, re-join with single spaces. De-anonymization re-tokenizes the
//! placeholder text and resolves each token against the reverse maps — the
//! fresh lexical category is irrelevant, because `table_1` in isolation
//! carries no positional cue that would let the disambiguator re-derive
//! `Table`.

use crate::context;
use crate::error::{Error, Result};
use crate::normalize::Normalizer;
use crate::tokens::{Token, TokenCategory, Tokenizer};
use crate::vocab::Vocabulary;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three categories that receive placeholders.
pub const ANONYMIZABLE: [TokenCategory; 3] = [
    TokenCategory::Table,
    TokenCategory::Identifier,
    TokenCategory::Literal,
];

/// One category's slice of the mapping store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct CategoryMapping {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    counter: u64,
}

impl CategoryMapping {
    fn get_or_assign(&mut self, prefix: &str, value: &str) -> String {
        if let Some(existing) = self.forward.get(value) {
            return existing.clone();
        }
        self.counter += 1;
        let placeholder = format!("{prefix}_{}", self.counter);
        self.forward.insert(value.to_string(), placeholder.clone());
        self.reverse.insert(placeholder.clone(), value.to_string());
        tracing::debug!(%placeholder, "minted placeholder");
        placeholder
    }

    fn validate(&self, prefix: &str) -> std::result::Result<(), String> {
        if self.counter as usize != self.forward.len() {
            return Err(format!(
                "{prefix} counter is {} but {} entries exist",
                self.counter,
                self.forward.len()
            ));
        }
        if self.reverse.len() != self.forward.len() {
            return Err(format!(
                "{prefix} reverse map has {} entries, forward has {}",
                self.reverse.len(),
                self.forward.len()
            ));
        }
        for (original, placeholder) in &self.forward {
            let index = placeholder
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('_'))
                .and_then(|digits| digits.parse::<u64>().ok());
            match index {
                Some(n) if (1..=self.counter).contains(&n) => {}
                _ => return Err(format!("malformed placeholder {placeholder:?}")),
            }
            if self.reverse.get(placeholder).map(String::as_str) != Some(original.as_str()) {
                return Err(format!("reverse map does not invert {placeholder:?}"));
            }
        }
        Ok(())
    }
}

/// The bidirectional placeholder store shared across anonymization calls.
///
/// Owned and explicitly passed by the caller; persistence location and
/// timing are the caller's decision. Grows monotonically until [`clear`]
/// wipes every category at once.
///
/// [`clear`]: MappingState::clear
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingState {
    tables: CategoryMapping,
    identifiers: CategoryMapping,
    literals: CategoryMapping,
}

impl MappingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The placeholder prefix of an anonymizable category. Any other
    /// category is a contract violation by the caller, not a data problem.
    pub fn placeholder_prefix(category: TokenCategory) -> Result<&'static str> {
        match category {
            TokenCategory::Table => Ok("table"),
            TokenCategory::Identifier => Ok("identifier"),
            TokenCategory::Literal => Ok("literal"),
            other => Err(Error::unsupported_category(other)),
        }
    }

    fn slot(&self, category: TokenCategory) -> Result<&CategoryMapping> {
        match category {
            TokenCategory::Table => Ok(&self.tables),
            TokenCategory::Identifier => Ok(&self.identifiers),
            TokenCategory::Literal => Ok(&self.literals),
            other => Err(Error::unsupported_category(other)),
        }
    }

    fn slot_mut(&mut self, category: TokenCategory) -> Result<&mut CategoryMapping> {
        match category {
            TokenCategory::Table => Ok(&mut self.tables),
            TokenCategory::Identifier => Ok(&mut self.identifiers),
            TokenCategory::Literal => Ok(&mut self.literals),
            other => Err(Error::unsupported_category(other)),
        }
    }

    /// Get-or-create the placeholder for `value` under `category`.
    ///
    /// `TableAlias` values are returned unchanged: aliases are short-lived
    /// scoped names, and passing them through keeps `alias.column` patterns
    /// stable across runs. Everything outside the anonymizable set plus
    /// `TableAlias` is an error.
    pub fn assign(&mut self, category: TokenCategory, value: &str) -> Result<String> {
        if category == TokenCategory::TableAlias {
            if self.alias_shadows_table(value) {
                tracing::trace!(alias = value, "alias matches a mapped table name segment");
            }
            return Ok(value.to_string());
        }
        let prefix = Self::placeholder_prefix(category)?;
        Ok(self.slot_mut(category)?.get_or_assign(prefix, value))
    }

    /// Whether an alias spelling coincides with the first `_`-separated
    /// segment of an already-mapped table name. Display-level distinction
    /// only; the alias text is returned as-is either way.
    fn alias_shadows_table(&self, alias: &str) -> bool {
        let lowered = alias.to_lowercase();
        self.tables
            .forward
            .keys()
            .any(|original| original.split('_').next() == Some(lowered.as_str()))
    }

    /// Look a placeholder up across every category's reverse map.
    pub fn resolve(&self, placeholder: &str) -> Option<(TokenCategory, &str)> {
        let slots = [
            (TokenCategory::Table, &self.tables),
            (TokenCategory::Identifier, &self.identifiers),
            (TokenCategory::Literal, &self.literals),
        ];
        for (category, slot) in slots {
            if let Some(original) = slot.reverse.get(placeholder) {
                return Some((category, original.as_str()));
            }
        }
        None
    }

    /// The minted-entry count for one anonymizable category.
    pub fn counter(&self, category: TokenCategory) -> Result<u64> {
        Ok(self.slot(category)?.counter)
    }

    /// `(placeholder, original)` pairs for one category, ordered by
    /// placeholder index (first-seen order).
    pub fn entries(&self, category: TokenCategory) -> Result<Vec<(String, String)>> {
        let slot = self.slot(category)?;
        let mut rows: Vec<(String, String)> = slot
            .reverse
            .iter()
            .map(|(placeholder, original)| (placeholder.clone(), original.clone()))
            .collect();
        rows.sort_by_key(|(placeholder, _)| {
            placeholder
                .rsplit('_')
                .next()
                .and_then(|digits| digits.parse::<u64>().ok())
                .unwrap_or(0)
        });
        Ok(rows)
    }

    pub fn total_entries(&self) -> usize {
        self.tables.forward.len() + self.identifiers.forward.len() + self.literals.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }

    /// Reset every category: maps and counters, all at once.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check the structural invariants. Used when hydrating persisted data,
    /// so a corrupt file surfaces as an error instead of a quietly wrong
    /// store.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.tables.validate("table")?;
        self.identifiers.validate("identifier")?;
        self.literals.validate("literal")?;
        Ok(())
    }
}

/// The result of one anonymization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anonymized {
    /// Placeholder rendering, token texts joined with single spaces.
    pub text: String,
    /// How many mappings this call minted. Zero means the shared state is
    /// unchanged and need not be re-persisted.
    pub new_mappings: usize,
}

/// Literals inside the parenthesized row groups of a `VALUES` clause are
/// left verbatim; elsewhere (comparisons, `IN` lists, `LIMIT`) they are
/// anonymized. See DESIGN.md for the rationale behind this boundary.
#[derive(Default)]
struct ValuesGuard {
    armed: bool,
    depth: usize,
}

impl ValuesGuard {
    fn shields(&mut self, token: &Token) -> bool {
        match token.category {
            TokenCategory::Keyword => {
                self.armed = token.text.eq_ignore_ascii_case("VALUES");
                self.depth = 0;
                false
            }
            TokenCategory::Symbol if self.armed => {
                match token.text.as_str() {
                    "(" => self.depth += 1,
                    ")" => self.depth = self.depth.saturating_sub(1),
                    "," => {}
                    _ if self.depth == 0 => self.armed = false,
                    _ => {}
                }
                false
            }
            TokenCategory::Literal => self.armed && self.depth > 0,
            _ => {
                if self.armed && self.depth == 0 {
                    self.armed = false;
                }
                false
            }
        }
    }
}

/// The end-to-end engine: canonicalization, anonymization, and the reverse
/// rendering, sharing one [`MappingState`].
pub struct Anonymizer {
    normalizer: Normalizer,
    tokenizer: Tokenizer,
    state: MappingState,
}

impl Anonymizer {
    /// A fresh engine with an empty mapping state.
    pub fn new() -> Self {
        Self::with_state(MappingState::new())
    }

    /// An engine resuming a previously persisted state.
    pub fn with_state(state: MappingState) -> Self {
        let vocab = Vocabulary::new();
        Self {
            normalizer: Normalizer::new(vocab.clone()),
            tokenizer: Tokenizer::new(vocab),
            state,
        }
    }

    pub fn state(&self) -> &MappingState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MappingState {
        &mut self.state
    }

    pub fn into_state(self) -> MappingState {
        self.state
    }

    /// Normalize and re-join: the canonical single-spaced rendering with
    /// keywords and functions upper-cased. No mapping is touched.
    pub fn canonicalize(&self, query: &str) -> String {
        let normalized = self.normalizer.normalize(query);
        let tokens = self.tokenizer.tokenize(&normalized);
        join(tokens.iter().map(|t| t.text.as_str()))
    }

    /// Tokenize and run the contextual passes. Exposed for inspection and
    /// tests; `anonymize` uses the same stream.
    pub fn classify(&self, query: &str) -> Vec<Token> {
        context::disambiguate(self.tokenizer.vocabulary(), self.tokenizer.tokenize(query))
    }

    /// Replace every table, identifier, and literal with its placeholder,
    /// minting new ones as needed. Keywords, functions, symbols, comments,
    /// and both alias categories pass through byte-identical.
    pub fn anonymize(&mut self, query: &str) -> Result<Anonymized> {
        let tokens = self.classify(query);
        let before = self.state.total_entries();
        let mut guard = ValuesGuard::default();
        let mut rendered: Vec<String> = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let shielded = guard.shields(token);
            let replaces = token.category == TokenCategory::TableAlias
                || (token.category.is_anonymizable() && !shielded);
            if replaces {
                rendered.push(self.state.assign(token.category, &token.text)?);
            } else {
                rendered.push(token.text.clone());
            }
        }
        let new_mappings = self.state.total_entries() - before;
        tracing::debug!(tokens = tokens.len(), new_mappings, "anonymized query");
        Ok(Anonymized {
            text: join(rendered.iter().map(String::as_str)),
            new_mappings,
        })
    }

    /// Reconstruct original values from a placeholder rendering. Tokens
    /// without a reverse-map hit pass through unchanged — the text may have
    /// been anonymized under a different, superseded state, and that is not
    /// an error.
    pub fn de_anonymize(&self, text: &str) -> String {
        let tokens = self.tokenizer.tokenize(text);
        join(tokens.iter().map(|token| {
            match self.state.resolve(&token.text) {
                Some((_, original)) => original,
                None => token.text.as_str(),
            }
        }))
    }
}

impl Default for Anonymizer {
    fn default() -> Self {
        Self::new()
    }
}

fn join<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.collect::<Vec<_>>().join(" ")
}

/// Collapse the spacing around `.` so qualified references read as
/// `alias.column` again in display output.
pub fn compact_qualified(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains(" . ") {
        out = out.replace(" . ", ".");
    }
    out
}
