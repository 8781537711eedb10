//! Identifier validation and quoting.
//!
//! Every table and column name that reaches generated SQL is checked by
//! [`validate_identifier`] and rendered by [`quote_identifier`] (or by
//! [`quote_literal`] when it appears in a value position, as in catalog
//! queries). No other code in the crate interpolates names into SQL.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SyncError, SyncResult};

static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

/// Postgres silently truncates identifiers longer than this (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Check a name against the identifier pattern.
pub fn is_valid_identifier(name: &str) -> bool {
    name.len() <= MAX_IDENTIFIER_LEN && IDENTIFIER_PATTERN.is_match(name)
}

/// Validate an untrusted name, returning it unchanged on success.
pub fn validate_identifier(name: &str) -> SyncResult<&str> {
    if is_valid_identifier(name) {
        Ok(name)
    } else {
        Err(SyncError::InvalidIdentifier(name.to_string()))
    }
}

/// Quote an identifier with double quotes, doubling embedded quotes.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a string literal with single quotes, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Validate a literal SQL default expression such as `now()` or `'{}'`.
///
/// Defaults are emitted verbatim, so statement separators, comments and
/// unbalanced quotes or parentheses are rejected.
pub fn validate_default_expr(expr: &str) -> SyncResult<&str> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(SyncError::InvalidModel("default value is empty".into()));
    }
    let separator = || {
        SyncError::InvalidModel(format!(
            "default value {trimmed:?} contains a statement separator or comment"
        ))
    };

    // Separators and comment openers only count outside string literals.
    let mut depth: i32 = 0;
    let mut in_quote = false;
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => in_quote = !in_quote,
            _ if in_quote => {}
            ';' => return Err(separator()),
            '-' if chars.peek() == Some(&'-') => return Err(separator()),
            '/' if chars.peek() == Some(&'*') => return Err(separator()),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    if in_quote || depth != 0 {
        return Err(SyncError::InvalidModel(format!(
            "default value {trimmed:?} has unbalanced quotes or parentheses"
        )));
    }

    Ok(trimmed)
}
