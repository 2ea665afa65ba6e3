//! Identifier validation for SQL column references.
//!
//! Sort descriptors and scope filters only ever name columns that come
//! from code, never from clients. These checks catch typos and unsafe
//! names once, when a registry or query is built.

/// Maximum length for SQL identifiers (`PostgreSQL` limit is 63).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validate that a string is a safe SQL identifier.
///
/// A valid SQL identifier:
/// - Starts with a letter (a-z, A-Z) or underscore
/// - Contains only letters, digits (0-9), and underscores
/// - Is not empty and not longer than 63 characters
///
/// # Examples
///
/// ```
/// use crumb_sql::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("reviews"));
/// assert!(is_valid_sql_identifier("like_count"));
/// assert!(!is_valid_sql_identifier("123abc"));
/// assert!(!is_valid_sql_identifier("r.id"));
/// assert!(!is_valid_sql_identifier("id; DROP"));
/// ```
#[inline]
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a column reference: an identifier, optionally qualified by a
/// table alias (`r.like_count`).
///
/// ```
/// use crumb_sql::is_valid_column_ref;
///
/// assert!(is_valid_column_ref("like_count"));
/// assert!(is_valid_column_ref("r.like_count"));
/// assert!(!is_valid_column_ref("a.b.c"));
/// assert!(!is_valid_column_ref(".id"));
/// ```
#[must_use]
pub fn is_valid_column_ref(s: &str) -> bool {
    match s.split_once('.') {
        Some((table, column)) => {
            is_valid_sql_identifier(table) && is_valid_sql_identifier(column)
        },
        None => is_valid_sql_identifier(s),
    }
}

/// Assert that a string is a valid SQL identifier.
///
/// # Panics
///
/// Panics if the identifier is invalid.
#[inline]
pub fn assert_valid_sql_identifier(s: &str, context: &str) {
    assert!(
        is_valid_sql_identifier(s),
        "Invalid SQL {context} '{s}': must start with letter/underscore, \
             contain only ASCII alphanumeric/underscore, and be 1-63 chars"
    );
}

/// Assert that a string is a valid column reference.
///
/// # Panics
///
/// Panics with a descriptive error if the reference is invalid. This is
/// for programmer errors in static descriptors, not for user input.
#[inline]
pub fn assert_valid_column_ref(s: &str, context: &str) {
    assert!(
        is_valid_column_ref(s),
        "Invalid SQL {context} '{s}': must be an identifier or alias.identifier, \
             each starting with letter/underscore, ASCII alphanumeric/underscore, 1-63 chars"
    );
}
