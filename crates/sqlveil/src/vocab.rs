//! The lexical grammar registry: reserved keywords, built-in function names,
//! and operator/punctuation symbols.
//!
//! Multi-word keywords (`GROUP BY`, `PRIMARY KEY`, `FULL OUTER JOIN`) are
//! stored with a single internal space and matched as a unit; the embedded
//! trie lets callers find the longest vocabulary phrase starting at a given
//! position without trying every entry.

use crate::trie::Trie;
use std::collections::HashSet;

const KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "DISTINCT", "UNIQUE", "AS", "FROM",
    "JOIN", "INNER JOIN", "OUTER JOIN", "LEFT JOIN", "RIGHT JOIN", "FULL JOIN",
    "FULL OUTER JOIN", "CROSS JOIN",
    "ON", "WHERE", "LIKE", "AND", "OR", "IN", "NOT", "BETWEEN", "IS", "NULL",
    "CASE", "WHEN", "THEN", "ELSE", "END", "UNION", "ALL",
    "GROUP BY", "ORDER BY", "IF", "EXISTS", "ELSEIF", "WITH", "HAVING",
    "LIMIT", "OFFSET", "CAST",
    "TRUE", "FALSE", "NULLIF", "COALESCE",
    "CREATE", "ALTER", "DROP", "INDEX", "VIEW", "TRIGGER", "TABLE", "COLUMN",
    "PRIMARY KEY", "FOREIGN KEY", "UNIQUE KEY", "CHECK",
    "DEFAULT", "REFERENCES", "EXCEPT", "INTERSECT", "RECURSIVE",
    "INTO", "VALUES",
    "GRANT", "REVOKE",
    "COMMIT", "ROLLBACK", "SAVEPOINT", "TRANSACTION", "LOCK",
    "BEGIN", "DECLARE", "CURSOR", "FETCH", "OPEN", "CLOSE",
    "SET", "SHOW", "DESCRIBE", "USE", "RETURNS",
    "DATABASE", "SCHEMA", "FUNCTION", "PROCEDURE",
    "TRUNCATE", "REPLACE", "MERGE", "UPSERT",
    "ASSERT", "RAISE", "THROW",
    "LOOP", "EXIT", "CONTINUE", "FOR", "WHILE", "DO",
];

const AGGREGATE_FUNCTIONS: &[&str] = &[
    "GROUP_CONCAT", "STRING_AGG", "ARRAY_AGG", "FIRST", "LAST", "BIT_AND",
    "BIT_OR", "BIT_XOR", "CORR", "COVAR_POP", "COVAR_SAMP", "JSON_AGG",
    "JSONB_AGG", "XMLAGG", "LISTAGG",
];

const STRING_FUNCTIONS: &[&str] = &[
    "UPPER", "LOWER", "SUBSTRING", "SUBSTR", "TRIM", "LENGTH", "LEN", "CONCAT",
    "REPLACE", "LEFT", "RIGHT", "LPAD", "RPAD", "SPLIT_PART", "CHAR_LENGTH",
    "CHARINDEX", "POSITION", "INITCAP", "TO_CHAR", "FORMAT", "REGEXP_REPLACE",
    "REGEXP_MATCHES", "REGEXP_SUBSTR", "TRANSLATE", "STRPOS", "OVERLAY",
    "BTRIM", "LTRIM", "RTRIM", "ASCII", "CHR", "SOUNDEX", "DIFFERENCE",
    "CONCAT_WS",
];

const DATE_FUNCTIONS: &[&str] = &[
    "NOW", "GETDATE", "DATEADD", "DATEDIFF", "DATEPART", "CURRENT_DATE",
    "CURRENT_TIME", "CURRENT_TIMESTAMP", "EXTRACT", "TO_DATE", "TO_TIMESTAMP",
    "AGE", "TIMESTAMPDIFF", "TIMESTAMPADD", "DAY", "MONTH", "YEAR", "HOUR",
    "MINUTE", "SECOND", "WEEK", "QUARTER", "TIMEZONE", "TIMEZONE_HOUR",
    "TIMEZONE_MINUTE", "ISODOW", "ISOWEEK", "JULIANDAY", "STRFTIME",
    "TO_UNIXTIME", "FROM_UNIXTIME", "SYSDATE", "SYSTIMESTAMP",
    "LOCALTIMESTAMP", "CURRENT_TIMEZONE", "LOCALTIME",
];

const NUMERIC_FUNCTIONS: &[&str] = &[
    "COUNT", "SUM", "AVG", "MIN", "MAX", "ROUND", "CEIL", "FLOOR", "ABS",
    "POWER", "SQRT", "EXP", "LN", "LOG", "LOG10", "MOD", "RANDOM", "TRUNC",
    "SIGN", "GREATEST", "LEAST", "DIV", "BIT_LENGTH", "OCTET_LENGTH",
    "WIDTH_BUCKET", "CUME_DIST", "DENSE_RANK", "PERCENT_RANK", "RANK",
    "ROW_NUMBER", "NTILE", "CORR", "COVAR_POP", "COVAR_SAMP", "VARIANCE",
    "STDDEV", "MEDIAN", "MODE",
];

/// Whether `c` can begin an identifier.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether `c` can continue an identifier.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `c` is one of the recognized operator/punctuation characters.
pub fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        '*' | ',' | '(' | ')' | '[' | ']' | ';' | '=' | '<' | '>' | '!' | '%'
            | '+' | '-' | '/' | '^' | '&' | '|' | '~' | '.'
    )
}

/// The vocabulary a tokenizer or normalizer matches against.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    keywords: HashSet<String>,
    functions: HashSet<String>,
    phrases: Trie,
}

impl Vocabulary {
    pub fn new() -> Self {
        let keywords: HashSet<String> = KEYWORDS.iter().map(|k| k.to_string()).collect();
        let functions: HashSet<String> = AGGREGATE_FUNCTIONS
            .iter()
            .chain(STRING_FUNCTIONS.iter())
            .chain(DATE_FUNCTIONS.iter())
            .chain(NUMERIC_FUNCTIONS.iter())
            .map(|f| f.to_string())
            .collect();
        let phrases = Trie::from_keys(keywords.iter().chain(functions.iter()));
        Self {
            keywords,
            functions,
            phrases,
        }
    }

    /// Case-insensitive reserved-keyword check for a whole word or phrase.
    pub fn is_keyword(&self, text: &str) -> bool {
        self.keywords.contains(&text.to_ascii_uppercase())
    }

    /// Case-insensitive built-in-function check.
    pub fn is_function(&self, text: &str) -> bool {
        self.functions.contains(&text.to_ascii_uppercase())
    }

    /// Either a keyword or a function spelling.
    pub fn is_reserved(&self, text: &str) -> bool {
        self.is_keyword(text) || self.is_function(text)
    }

    /// Length in chars of the longest vocabulary phrase starting at
    /// `chars[start]`, bounded at identifier-character edges so `GROUP BYE`
    /// never matches `GROUP BY`. Returns `None` when no entry matches.
    pub fn longest_phrase(&self, chars: &[char], start: usize) -> Option<usize> {
        let mut node = &self.phrases;
        let mut best = None;
        let mut i = start;
        while i < chars.len() {
            match node.child(chars[i].to_ascii_uppercase()) {
                Some(child) => node = child,
                None => break,
            }
            i += 1;
            if node.is_terminal() && (i == chars.len() || !is_ident_char(chars[i])) {
                best = Some(i - start);
            }
        }
        best
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}
