//! SELECT builder for one keyset page.

use crate::dialect::Dialect;
use crate::pagination::{KeysetPlan, ScanRequest};
use crate::validate::{assert_valid_column_ref, assert_valid_sql_identifier};

use super::filter::{build_condition_impl, build_filter_expr_impl};
use super::types::{Filter, FilterExpr, Operator, OrderTerm, QueryResult};
use crate::value::Value;

/// A rendered inner query used as the row source of a page.
///
/// Its placeholders are numbered from 1; the outer query numbers its own
/// parameters after them.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Subquery {
    /// Rendered SQL, without surrounding parentheses.
    pub sql: String,
    /// Bind parameters of `sql`.
    pub params: Vec<Value>,
    /// Alias of the derived table.
    pub alias: String,
}

impl Subquery {
    /// Wrap rendered SQL as a derived table.
    ///
    /// # Panics
    ///
    /// Panics if the alias is not a valid SQL identifier.
    pub fn new(sql: impl Into<String>, params: Vec<Value>, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        assert_valid_sql_identifier(&alias, "subquery alias");
        Self {
            sql: sql.into(),
            params,
            alias,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Table(String),
    Subquery(Subquery),
}

/// Builds `SELECT ... WHERE <scope> AND <keyset> ORDER BY ... LIMIT n`.
///
/// Scope filters (`user_id = ?`, soft-delete flags, ...) are the caller's;
/// the keyset part comes from a [`KeysetPlan`] or a [`ScanRequest`].
///
/// ```
/// use crumb_sql::{ColumnType, Direction, Operator, PredicateBuilder, SortDescriptor, Value, sqlite};
///
/// let likes = SortDescriptor::new("LIKE_COUNT", "like_count", ColumnType::Integer);
/// let plan = PredicateBuilder::build(&likes, Direction::Descending, None);
///
/// let query = sqlite("reviews")
///     .fields(&["id", "like_count"])
///     .filter("bakery_id", Operator::Eq, Value::Int(3))
///     .keyset(&plan)
///     .limit(21)
///     .build();
///
/// assert_eq!(
///     query.sql,
///     "SELECT id, like_count FROM reviews WHERE bakery_id = ?1 \
///      ORDER BY like_count DESC, id DESC LIMIT 21"
/// );
/// ```
#[derive(Debug)]
pub struct PageQuery<D: Dialect> {
    dialect: D,
    source: Source,
    fields: Vec<String>,
    filters: Vec<Filter>,
    keyset: Option<FilterExpr>,
    order_by: Vec<OrderTerm>,
    limit: Option<usize>,
}

impl<D: Dialect> PageQuery<D> {
    /// Page over a table.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(dialect: D, table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self::with_source(dialect, Source::Table(table))
    }

    /// Page over a derived table, e.g. [`LatestPerGroup`](crate::LatestPerGroup).
    pub fn from_subquery(dialect: D, subquery: Subquery) -> Self {
        Self::with_source(dialect, Source::Subquery(subquery))
    }

    const fn with_source(dialect: D, source: Source) -> Self {
        Self {
            dialect,
            source,
            fields: Vec::new(),
            filters: Vec::new(),
            keyset: None,
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Set the columns to SELECT (default `*`).
    ///
    /// # Panics
    ///
    /// Panics if any field is not a valid column reference.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for field in fields {
            assert_valid_column_ref(field, "field");
        }
        self.fields = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Add a scope filter.
    ///
    /// # Panics
    ///
    /// Panics if the column is not a valid column reference.
    pub fn filter(mut self, column: impl Into<String>, op: Operator, value: Value) -> Self {
        let column = column.into();
        assert_valid_column_ref(&column, "filter column");
        self.filters.push(Filter { column, op, value });
        self
    }

    /// Apply a keyset plan: predicate and ordering.
    pub fn keyset(mut self, plan: &KeysetPlan) -> Self {
        self.keyset.clone_from(&plan.predicate);
        self.order_by.clone_from(&plan.order_by);
        self
    }

    /// Apply a range-scan request: predicate, ordering and limit.
    pub fn scan(mut self, request: &ScanRequest<'_>) -> Self {
        self.keyset = request.predicate.cloned();
        self.order_by = request.order_by.to_vec();
        self.limit = Some(request.limit);
        self
    }

    /// Set the row limit.
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the SQL query and parameters.
    pub fn build(self) -> QueryResult {
        let mut params = Vec::new();
        let mut param_idx = 1usize;

        let from = match &self.source {
            Source::Table(table) => table.clone(),
            Source::Subquery(sub) => {
                params.extend(sub.params.iter().cloned());
                param_idx += sub.params.len();
                format!("({}) AS {}", sub.sql, sub.alias)
            },
        };

        let select = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        };

        let mut sql = format!("SELECT {select} FROM {from}");

        // WHERE clause - scope filters first, keyset last
        let mut conditions = Vec::new();
        for filter in &self.filters {
            let (condition, new_params, new_idx) =
                build_condition_impl(&self.dialect, filter, param_idx);
            conditions.push(condition);
            params.extend(new_params);
            param_idx = new_idx;
        }
        if let Some(ref expr) = self.keyset {
            let (condition, new_params, _new_idx) =
                build_filter_expr_impl(&self.dialect, expr, param_idx);
            conditions.push(condition);
            params.extend(new_params);
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|term| self.dialect.order_term(term))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        QueryResult { sql, params }
    }
}

/// Start a Postgres page query.
pub fn postgres(table: impl Into<String>) -> PageQuery<crate::dialect::Postgres> {
    PageQuery::new(crate::dialect::Postgres, table)
}

/// Start a `SQLite` page query.
pub fn sqlite(table: impl Into<String>) -> PageQuery<crate::dialect::Sqlite> {
    PageQuery::new(crate::dialect::Sqlite, table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, Sqlite};
    use crate::pagination::{Cursor, PredicateBuilder};
    use crate::sort::{Direction, NullsPolicy, SortDescriptor};
    use crate::value::ColumnType;

    const LIKES: SortDescriptor =
        SortDescriptor::new("LIKE_COUNT", "like_count", ColumnType::Integer);

    #[test]
    fn test_first_page_sql() {
        let plan = PredicateBuilder::build(&LIKES, Direction::Descending, None);
        let query = postgres("reviews").keyset(&plan).limit(3).build();
        assert_eq!(
            query.sql,
            "SELECT * FROM reviews ORDER BY like_count DESC, id DESC LIMIT 3"
        );
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_scope_filter_then_keyset() {
        let cursor = Cursor::new(Value::Int(5), 1);
        let plan = PredicateBuilder::build(&LIKES, Direction::Descending, Some(&cursor));
        let query = postgres("reviews")
            .filter("bakery_id", Operator::Eq, Value::Int(9))
            .keyset(&plan)
            .limit(3)
            .build();
        assert_eq!(
            query.sql,
            "SELECT * FROM reviews WHERE bakery_id = $1 AND \
             (like_count < $2 OR (like_count = $3 AND id <= $4)) \
             ORDER BY like_count DESC, id DESC LIMIT 3"
        );
        assert_eq!(
            query.params,
            vec![Value::Int(9), Value::Int(5), Value::Int(5), Value::Int(1)]
        );
    }

    #[test]
    fn test_scan_request_sets_limit() {
        let plan = PredicateBuilder::build(&LIKES, Direction::Ascending, None);
        let request = ScanRequest {
            descriptor: &LIKES,
            predicate: plan.predicate.as_ref(),
            order_by: &plan.order_by,
            limit: 11,
        };
        let query = sqlite("reviews").fields(&["id"]).scan(&request).build();
        assert_eq!(
            query.sql,
            "SELECT id FROM reviews ORDER BY like_count ASC, id ASC LIMIT 11"
        );
    }

    #[test]
    fn test_subquery_params_come_first() {
        let rating = SortDescriptor::new("AVG_RATING", "avg_rating", ColumnType::Float)
            .tiebreak("BAKERY_ID", "bakery_id")
            .nullable(NullsPolicy::NullsLast);
        let cursor = Cursor::new(Value::Float(4.5), 2);
        let plan = PredicateBuilder::build(&rating, Direction::Descending, Some(&cursor));

        let inner = Subquery::new(
            "SELECT bakery_id, avg_rating FROM stats WHERE user_id = ?1",
            vec![Value::Int(7)],
            "s",
        );
        let query = PageQuery::from_subquery(Sqlite, inner)
            .keyset(&plan)
            .limit(5)
            .build();

        assert_eq!(
            query.sql,
            "SELECT * FROM (SELECT bakery_id, avg_rating FROM stats WHERE user_id = ?1) AS s \
             WHERE (avg_rating < ?2 OR (avg_rating = ?3 AND bakery_id <= ?4) OR avg_rating IS NULL) \
             ORDER BY avg_rating DESC NULLS LAST, bakery_id DESC LIMIT 5"
        );
        assert_eq!(query.params[0], Value::Int(7));
        assert_eq!(query.params.len(), 4);
    }

    #[test]
    #[should_panic(expected = "Invalid SQL table")]
    fn test_invalid_table_panics() {
        let _ = postgres("reviews; DROP TABLE users");
    }

    #[test]
    #[should_panic(expected = "Invalid SQL filter column")]
    fn test_invalid_filter_column_panics() {
        let _ = sqlite("reviews").filter("1=1 OR id", Operator::Eq, Value::Int(1));
    }
}
