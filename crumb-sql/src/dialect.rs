//! SQL dialect implementations for Postgres and `SQLite`.
//!
//! Each dialect handles the specific syntax differences between databases.

use crate::builder::OrderTerm;

/// SQL dialect trait for database-specific syntax.
pub trait Dialect: Clone + Copy {
    /// Dialect name, for logs and tooling.
    fn name(&self) -> &'static str;

    /// Format a parameter placeholder (e.g., `$1` for Postgres, `?1` for `SQLite`).
    fn param(&self, idx: usize) -> String;

    /// Format one `ORDER BY` term, including its explicit NULL placement.
    ///
    /// Both supported dialects accept `NULLS FIRST` / `NULLS LAST`, so the
    /// engine never depends on a database's default NULL ordering.
    fn order_term(&self, term: &OrderTerm) -> String {
        match term.nulls {
            Some(nulls) => format!(
                "{} {} {}",
                term.column,
                term.direction.as_sql(),
                nulls.as_sql()
            ),
            None => format!("{} {}", term.column, term.direction.as_sql()),
        }
    }
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::exhaustive_structs)] // Unit marker, constructed by callers
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }
}

/// `SQLite` dialect (3.30+ for `NULLS FIRST` / `NULLS LAST`).
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::exhaustive_structs)] // Unit marker, constructed by callers
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{Direction, NullsPlacement};

    #[test]
    fn test_postgres_params() {
        let pg = Postgres;
        assert_eq!(pg.param(1), "$1");
        assert_eq!(pg.param(10), "$10");
    }

    #[test]
    fn test_sqlite_params() {
        let sqlite = Sqlite;
        assert_eq!(sqlite.param(1), "?1");
        assert_eq!(sqlite.param(10), "?10");
    }

    #[test]
    fn test_order_term_without_nulls() {
        let term = OrderTerm::new("like_count", Direction::Descending);
        assert_eq!(Postgres.order_term(&term), "like_count DESC");
        assert_eq!(Sqlite.order_term(&term), "like_count DESC");
    }

    #[test]
    fn test_order_term_with_explicit_nulls() {
        let term = OrderTerm::new("avg_rating", Direction::Ascending)
            .nulls(Some(NullsPlacement::First));
        assert_eq!(Postgres.order_term(&term), "avg_rating ASC NULLS FIRST");

        let term = OrderTerm::new("avg_rating", Direction::Descending)
            .nulls(Some(NullsPlacement::Last));
        assert_eq!(Sqlite.order_term(&term), "avg_rating DESC NULLS LAST");
    }

    #[test]
    fn test_dialect_names() {
        assert_eq!(Postgres.name(), "postgres");
        assert_eq!(Sqlite.name(), "sqlite");
    }
}
