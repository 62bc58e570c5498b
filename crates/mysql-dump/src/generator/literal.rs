//! Row values as SQL literals.

use crate::core::schema::{Column, TypeCategory};
use crate::core::value::SqlValue;

/// Literal text for SQL NULL.
pub const NULL_LITERAL: &str = "NULL";

/// Escape a string for use inside single quotes.
///
/// Backslashes are doubled and single quotes get a preceding backslash, so
/// `O'Brien` becomes `O\'Brien` and `C:\tmp` becomes `C:\\tmp`.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}

/// Single-quoted, escaped literal.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", escape_string(value))
}

/// Format one value for a column.
///
/// - NULL is written as `NULL`
/// - integer-family columns are written as bare digits
/// - everything else is single-quoted and escaped; binary data that is not
///   valid UTF-8 is written as a `0x...` hex literal
pub fn format_value(column: &Column, value: &SqlValue<'_>) -> String {
    if value.is_null() {
        return NULL_LITERAL.to_string();
    }

    if column.category == TypeCategory::Integer {
        if let Some(digits) = value.as_integer_text() {
            return digits;
        }
    }

    match value {
        SqlValue::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => quote_string(text),
            Err(_) => hex_literal(bytes),
        },
        other => quote_string(&other.to_string()),
    }
}

/// Format a full row as a parenthesized tuple: `(1, NULL, 'x')`.
pub fn format_row(columns: &[Column], row: &[SqlValue<'_>]) -> String {
    let values: Vec<String> = columns
        .iter()
        .zip(row.iter())
        .map(|(col, value)| format_value(col, value))
        .collect();
    format!("({})", values.join(", "))
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{:02X}", b));
    }
    out
}
