//! Casing and whitespace normalization.
//!
//! Normalization runs three stages in order: lower-case everything outside
//! quoted regions, collapse whitespace runs to single spaces, then raise
//! vocabulary words back to upper case (longest phrase first, whole-word
//! bounded). Quoted regions pass through character for character — a string
//! literal that happens to spell a keyword is never altered.
//!
//! The composition is idempotent: `normalize(normalize(x)) == normalize(x)`.

use crate::vocab::{is_ident_char, is_ident_start, Vocabulary};

/// Lower-case all text outside single- or double-quoted regions.
/// Backslash-escaped quotes do not open or close a region.
pub fn lowercase_unquoted(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            out.push(c);
            if i + 1 < chars.len() {
                out.extend(chars[i + 1].to_lowercase());
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }
        if c == '\'' || c == '"' {
            i = copy_quoted(&chars, i, &mut out);
            continue;
        }
        out.extend(c.to_lowercase());
        i += 1;
    }
    out
}

/// Collapse every whitespace run to a single ASCII space and trim the ends.
pub fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Copy a quoted region starting at `chars[open]` verbatim into `out`,
/// honoring backslash escapes, and return the index just past it.
fn copy_quoted(chars: &[char], open: usize, out: &mut String) -> usize {
    let quote = chars[open];
    out.push(quote);
    let mut i = open + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        if c == '\\' && i + 1 < chars.len() {
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        i += 1;
        if c == quote {
            break;
        }
    }
    i
}

/// Applies the normalization pipeline against a fixed vocabulary.
pub struct Normalizer {
    vocab: Vocabulary,
}

impl Normalizer {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// The full pipeline: casing fold, whitespace collapse, keyword raise.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = lowercase_unquoted(text);
        let collapsed = collapse_spaces(&lowered);
        self.uppercase_vocabulary(&collapsed)
    }

    /// Upper-case every maximal vocabulary phrase outside quoted regions.
    /// Longer entries win (`GROUP BY` is never half-matched as `GROUP`), and
    /// matches are bounded at identifier-character edges.
    pub fn uppercase_vocabulary(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '\\' {
                out.push(c);
                if i + 1 < chars.len() {
                    out.push(chars[i + 1]);
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }
            if c == '\'' || c == '"' {
                i = copy_quoted(&chars, i, &mut out);
                continue;
            }
            if is_ident_char(c) {
                // A word run. Only a run opening with a letter or underscore
                // can be a vocabulary phrase; a leading digit glues the rest
                // of the word to it ("0from" contains no keyword).
                if is_ident_start(c) {
                    if let Some(len) = self.vocab.longest_phrase(&chars, i) {
                        out.extend(chars[i..i + len].iter().map(|ch| ch.to_ascii_uppercase()));
                        i += len;
                        continue;
                    }
                }
                while i < chars.len() && is_ident_char(chars[i]) {
                    out.push(chars[i]);
                    i += 1;
                }
                continue;
            }
            out.push(c);
            i += 1;
        }
        out
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Vocabulary::new())
    }
}
