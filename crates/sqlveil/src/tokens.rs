//! Token types and the tokenizer.
//!
//! The tokenizer converts SQL text into an ordered sequence of classified
//! tokens. It is total and infallible: every character of the input is
//! covered by exactly one token (whitespace is recognized and discarded), and
//! anything the scanner cannot interpret becomes a one-character [`Unknown`]
//! token instead of an error — anonymization must degrade on malformed input,
//! never abort.
//!
//! Match policy, left to right: function names, then keywords (both matched
//! longest-phrase-first against the vocabulary, bounded at identifier-
//! character edges), then raw lexical shape (identifier / literal / symbol),
//! then the one-character fallback.
//!
//! [`Unknown`]: TokenCategory::Unknown

use crate::vocab::{is_ident_char, is_ident_start, is_symbol_char, Vocabulary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The classification of a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenCategory {
    /// A built-in function name (`COUNT`, `UPPER`, `GETDATE`).
    Function,
    /// A reserved word, possibly multi-word (`SELECT`, `GROUP BY`).
    Keyword,
    /// A table name, as detected from context (`FROM customers`).
    Table,
    /// A declared table alias (`FROM customers c`) or its later uses.
    TableAlias,
    /// Any other bare name: column, target of `INSERT INTO`, and so on.
    Identifier,
    /// A column alias (`AS total`, or the implicit `SELECT col total`).
    IdentifierAlias,
    /// A quoted string or a number.
    Literal,
    /// Operator or punctuation.
    Symbol,
    /// A `--` or `/* */` comment, best effort.
    Comment,
    /// The single-character fallback that keeps tokenization total.
    Unknown,
}

impl TokenCategory {
    /// Categories that are replaced by placeholders during anonymization.
    pub fn is_anonymizable(self) -> bool {
        matches!(self, Self::Table | Self::Identifier | Self::Literal)
    }
}

/// A classified span of source text.
///
/// Tokens are immutable; the contextual passes never edit one in place but
/// produce a replacement carrying the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub category: TokenCategory,
    pub text: String,
}

impl Token {
    pub fn new(category: TokenCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    /// The same text under a different category.
    pub fn recategorized(&self, category: TokenCategory) -> Self {
        Self::new(category, self.text.clone())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.category, self.text)
    }
}

/// Converts SQL text into a token stream.
pub struct Tokenizer {
    vocab: Vocabulary,
}

impl Tokenizer {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Tokenize `sql`. Whitespace separates tokens and is dropped; every
    /// other character lands in exactly one token.
    pub fn tokenize(&self, sql: &str) -> Vec<Token> {
        Scanner::new(sql, &self.vocab).run()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(Vocabulary::new())
    }
}

struct Scanner<'a> {
    chars: Vec<char>,
    size: usize,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    vocab: &'a Vocabulary,
}

impl<'a> Scanner<'a> {
    fn new(sql: &str, vocab: &'a Vocabulary) -> Self {
        let chars: Vec<char> = sql.chars().collect();
        let size = chars.len();
        Self {
            chars,
            size,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            vocab,
        }
    }

    fn run(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            self.start = self.current;
            self.scan_token();
        }
        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.size
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.size {
            '\0'
        } else {
            self.chars[self.current + 1]
        }
    }

    fn advance(&mut self) {
        self.current += 1;
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn add_token(&mut self, category: TokenCategory) {
        let text: String = self.chars[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(category, text));
    }

    fn scan_token(&mut self) {
        let c = self.peek();

        if c == '\'' || c == '"' {
            return self.scan_quoted(c);
        }
        if c.is_ascii_digit() {
            return self.scan_number();
        }
        if c == '-' && self.peek_next() == '-' {
            return self.scan_line_comment();
        }
        if c == '/' && self.peek_next() == '*' {
            return self.scan_block_comment();
        }
        if is_ident_start(c) {
            return self.scan_word();
        }
        if self.scan_symbol() {
            return;
        }

        // Nothing matched: one character of Unknown keeps the scan total.
        self.advance();
        self.add_token(TokenCategory::Unknown);
    }

    /// A quoted string literal. The body is opaque — no internal
    /// tokenization, no escape handling. An unterminated quote degrades to a
    /// one-character token and the scan resumes after it.
    fn scan_quoted(&mut self, quote: char) {
        self.advance();
        while !self.is_at_end() && self.peek() != quote {
            self.advance();
        }
        if self.is_at_end() {
            self.current = self.start + 1;
            self.add_token(TokenCategory::Unknown);
        } else {
            self.advance();
            self.add_token(TokenCategory::Literal);
        }
    }

    /// A numeric literal with at most one decimal point.
    fn scan_number(&mut self) {
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        self.add_token(TokenCategory::Literal);
    }

    fn scan_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
        self.add_token(TokenCategory::Comment);
    }

    /// `/* ... */`. When the terminator is missing the opening `/` falls
    /// back to a symbol and the scan resumes, mirroring the quote case.
    fn scan_block_comment(&mut self) {
        let mut i = self.current + 2;
        while i + 1 < self.size {
            if self.chars[i] == '*' && self.chars[i + 1] == '/' {
                self.current = i + 2;
                self.add_token(TokenCategory::Comment);
                return;
            }
            i += 1;
        }
        self.current = self.start + 1;
        self.add_token(TokenCategory::Symbol);
    }

    /// A vocabulary phrase (function or keyword, longest first) or an
    /// identifier.
    fn scan_word(&mut self) {
        if let Some(len) = self.vocab.longest_phrase(&self.chars, self.start) {
            self.current = self.start + len;
            let text: String = self.chars[self.start..self.current].iter().collect();
            let category = if self.vocab.is_function(&text) {
                TokenCategory::Function
            } else {
                TokenCategory::Keyword
            };
            self.tokens.push(Token::new(category, text));
            return;
        }
        while !self.is_at_end() && is_ident_char(self.peek()) {
            self.advance();
        }
        self.add_token(TokenCategory::Identifier);
    }

    fn scan_symbol(&mut self) -> bool {
        let c = self.peek();
        if (c == '<' || c == '>') && self.peek_next() == '=' {
            self.advance();
            self.advance();
            self.add_token(TokenCategory::Symbol);
            return true;
        }
        if is_symbol_char(c) {
            self.advance();
            self.add_token(TokenCategory::Symbol);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(sql: &str) -> Vec<Token> {
        Tokenizer::default().tokenize(sql)
    }

    #[test]
    fn test_simple_select() {
        let tokens = tokenize("SELECT 1");

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].category, TokenCategory::Keyword);
        assert_eq!(tokens[1].category, TokenCategory::Literal);
        assert_eq!(tokens[1].text, "1");
    }

    #[test]
    fn test_function_beats_keyword() {
        // REPLACE is in both vocabularies; the function class wins.
        let tokens = tokenize("replace(name)");
        assert_eq!(tokens[0].category, TokenCategory::Function);
        assert_eq!(tokens[0].text, "replace");
    }

    #[test]
    fn test_multi_word_keyword_is_one_token() {
        let tokens = tokenize("group by x order by y");

        assert_eq!(tokens[0], Token::new(TokenCategory::Keyword, "group by"));
        assert_eq!(tokens[1], Token::new(TokenCategory::Identifier, "x"));
        assert_eq!(tokens[2], Token::new(TokenCategory::Keyword, "order by"));
    }

    #[test]
    fn test_keyword_prefix_of_identifier() {
        let tokens = tokenize("selector");
        assert_eq!(tokens[0], Token::new(TokenCategory::Identifier, "selector"));
    }

    #[test]
    fn test_two_char_operators() {
        let tokens = tokenize("a <= b >= 2");
        assert_eq!(tokens[1], Token::new(TokenCategory::Symbol, "<="));
        assert_eq!(tokens[3], Token::new(TokenCategory::Symbol, ">="));
    }

    #[test]
    fn test_decimal_literal() {
        let tokens = tokenize("price = 19.99");
        assert_eq!(tokens[2], Token::new(TokenCategory::Literal, "19.99"));
    }

    #[test]
    fn test_quoted_literal_is_opaque() {
        let tokens = tokenize("name = ' John  from accounting '");
        assert_eq!(
            tokens[2],
            Token::new(TokenCategory::Literal, "' John  from accounting '")
        );
    }

    #[test]
    fn test_unterminated_quote_degrades() {
        let tokens = tokenize("select 'abc");

        assert_eq!(tokens[0].category, TokenCategory::Keyword);
        assert_eq!(tokens[1], Token::new(TokenCategory::Unknown, "'"));
        assert_eq!(tokens[2], Token::new(TokenCategory::Identifier, "abc"));
    }

    #[test]
    fn test_unrecognized_char_becomes_unknown() {
        let tokens = tokenize("select €");
        assert_eq!(tokens[1], Token::new(TokenCategory::Unknown, "€"));
    }

    #[test]
    fn test_comments() {
        let tokens = tokenize("-- note\nselect /* x */ 1");

        assert_eq!(tokens[0], Token::new(TokenCategory::Comment, "-- note"));
        assert_eq!(tokens[2], Token::new(TokenCategory::Comment, "/* x */"));
    }

    #[test]
    fn test_dotted_reference_splits() {
        let tokens = tokenize("c.name");

        assert_eq!(tokens[0], Token::new(TokenCategory::Identifier, "c"));
        assert_eq!(tokens[1], Token::new(TokenCategory::Symbol, "."));
        assert_eq!(tokens[2], Token::new(TokenCategory::Identifier, "name"));
    }
}
