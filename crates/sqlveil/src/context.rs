//! Contextual disambiguation of the raw token stream.
//!
//! The tokenizer classifies by lexical shape alone, so `employees` in
//! `FROM employees e` and `salary` in `SELECT salary` both come out as
//! [`Identifier`]. This module refines those classifications with positional
//! passes over the token array. The passes run in a fixed order, each one
//! rewrites categories by index (never inserting or removing tokens), and a
//! token reclassified by an earlier pass is not reconsidered by a later one.
//! The ordering is load-bearing: alias declarations must be collected across
//! the whole stream before qualified references are resolved, so that
//! `c.status` is protected even when `FROM customers c` appears later in the
//! text.
//!
//! [`Identifier`]: TokenCategory::Identifier

use crate::tokens::{Token, TokenCategory};
use crate::vocab::Vocabulary;
use std::collections::HashSet;

/// Run all passes and return the refined stream (same length, same texts).
pub fn disambiguate(vocab: &Vocabulary, mut tokens: Vec<Token>) -> Vec<Token> {
    mark_tables(&mut tokens);
    let aliases = mark_table_aliases(vocab, &mut tokens);
    mark_explicit_aliases(vocab, &mut tokens);
    mark_implicit_aliases(vocab, &mut tokens);
    mark_qualified_references(&aliases, &mut tokens);
    tokens
}

/// Keywords that introduce a table name. `INTO` is deliberately absent:
/// `INSERT INTO tbl` leaves `tbl` an identifier, so insert targets are
/// anonymized under the identifier prefix rather than the table prefix.
fn introduces_table(keyword: &str) -> bool {
    let upper = keyword.to_ascii_uppercase();
    upper == "FROM" || upper == "JOIN" || upper.ends_with(" JOIN")
}

/// Pass 1: an identifier directly after `FROM` or a `JOIN`-family keyword is
/// a table name.
fn mark_tables(tokens: &mut [Token]) {
    for i in 1..tokens.len() {
        if tokens[i].category == TokenCategory::Identifier
            && tokens[i - 1].category == TokenCategory::Keyword
            && introduces_table(&tokens[i - 1].text)
        {
            tokens[i] = tokens[i].recategorized(TokenCategory::Table);
        }
    }
}

/// Pass 2: an identifier directly after a table is that table's alias.
/// Returns the lower-cased alias texts for the qualified-reference pass.
fn mark_table_aliases(vocab: &Vocabulary, tokens: &mut [Token]) -> HashSet<String> {
    let mut aliases = HashSet::new();
    for i in 0..tokens.len().saturating_sub(1) {
        if tokens[i].category != TokenCategory::Table {
            continue;
        }
        let next = &tokens[i + 1];
        if next.category == TokenCategory::Identifier && !vocab.is_reserved(&next.text) {
            aliases.insert(next.text.to_lowercase());
            tokens[i + 1] = tokens[i + 1].recategorized(TokenCategory::TableAlias);
        }
    }
    tracing::trace!(aliases = aliases.len(), "collected table aliases");
    aliases
}

/// Pass 3: an identifier directly after the keyword `AS` is a column alias.
fn mark_explicit_aliases(vocab: &Vocabulary, tokens: &mut [Token]) {
    for i in 0..tokens.len().saturating_sub(1) {
        let is_as = tokens[i].category == TokenCategory::Keyword
            && tokens[i].text.eq_ignore_ascii_case("AS");
        if !is_as {
            continue;
        }
        let next = &tokens[i + 1];
        if next.category == TokenCategory::Identifier && !vocab.is_reserved(&next.text) {
            tokens[i + 1] = tokens[i + 1].recategorized(TokenCategory::IdentifierAlias);
        }
    }
}

/// Pass 4: the implicit-alias heuristic. `SELECT col total FROM ...` names
/// `total` without `AS`; an identifier squeezed between another identifier
/// (or function) and a comma or `FROM` is treated as that alias.
fn mark_implicit_aliases(vocab: &Vocabulary, tokens: &mut [Token]) {
    for i in 1..tokens.len().saturating_sub(1) {
        if tokens[i].category != TokenCategory::Identifier {
            continue;
        }
        let prev_names_value = matches!(
            tokens[i - 1].category,
            TokenCategory::Identifier | TokenCategory::Function
        );
        let next = &tokens[i + 1];
        let next_ends_item = (next.category == TokenCategory::Symbol && next.text == ",")
            || (next.category == TokenCategory::Keyword
                && next.text.eq_ignore_ascii_case("FROM"));
        if prev_names_value && next_ends_item && !vocab.is_reserved(&tokens[i].text) {
            tokens[i] = tokens[i].recategorized(TokenCategory::IdentifierAlias);
        }
    }
}

/// Pass 5: an identifier right before a `.` whose text was declared as a
/// table alias is a qualified-reference head (`c` in `c.name`). Only
/// declared aliases qualify; an undeclared name before a dot stays an
/// identifier and is anonymized like any other.
fn mark_qualified_references(aliases: &HashSet<String>, tokens: &mut [Token]) {
    for i in 0..tokens.len().saturating_sub(1) {
        if tokens[i].category != TokenCategory::Identifier {
            continue;
        }
        let next = &tokens[i + 1];
        if next.category == TokenCategory::Symbol
            && next.text == "."
            && aliases.contains(&tokens[i].text.to_lowercase())
        {
            tokens[i] = tokens[i].recategorized(TokenCategory::TableAlias);
        }
    }
}
