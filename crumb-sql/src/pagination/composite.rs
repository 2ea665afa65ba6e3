//! Pagination over derived keys: "latest interaction per entity".
//!
//! Listings such as "bakeries I reviewed, most recently reviewed first" sort
//! by a value that is not a column of the listed entity but an aggregate
//! over another table (`MAX(reviews.created_at)` per bakery). The aggregate
//! is materialized by a grouping subquery first; the keyset predicate is
//! then applied to its output alias, keyed by `(scope, entity_id)`.

use crate::builder::{Filter, Operator, Subquery, build_condition_impl};
use crate::dialect::Dialect;
use crate::error::InvalidSortParameter;
use crate::pagination::codec::{CursorCodec, encode_composite};
use crate::pagination::{Cursor, KeysetRow};
use crate::sort::SortDescriptor;
use crate::validate::assert_valid_sql_identifier;
use crate::value::Value;

/// The `(scope, entity_id)` boundary of a derived-key listing.
///
/// Encodes to the same composite format as any other cursor.
///
/// ```
/// use crumb_sql::{CompositeCursor, Value};
///
/// let cursor = CompositeCursor::new(Value::Int(1_700_000_000), 42);
/// assert_eq!(cursor.encode(), "1700000000||42");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct CompositeCursor {
    /// The derived sort value (e.g. last review time).
    pub scope: Value,
    /// The listed entity's id.
    pub entity_id: i64,
}

impl CompositeCursor {
    /// Create a cursor.
    pub fn new(scope: impl Into<Value>, entity_id: i64) -> Self {
        Self {
            scope: scope.into(),
            entity_id,
        }
    }

    /// Boundary of a row of a derived-key listing.
    pub fn from_row<R: KeysetRow>(row: &R, descriptor: &SortDescriptor) -> Self {
        Self::new(row.sort_value(descriptor), row.tiebreak_value())
    }

    /// Encode as `"<scope>||<entity_id>"`.
    #[must_use]
    pub fn encode(&self) -> String {
        encode_composite(&self.scope, self.entity_id)
    }

    /// Decode a token for `descriptor`. `Ok(None)` means "first page".
    pub fn decode(
        token: &str,
        descriptor: &SortDescriptor,
    ) -> Result<Option<Self>, InvalidSortParameter> {
        let codec = CursorCodec::composite(descriptor.column_type(), descriptor.is_nullable());
        Ok(codec.decode(token)?.map(Self::from))
    }
}

impl From<Cursor> for CompositeCursor {
    fn from(cursor: Cursor) -> Self {
        Self {
            scope: cursor.sort_value,
            entity_id: cursor.tiebreak_value,
        }
    }
}

impl From<CompositeCursor> for Cursor {
    fn from(cursor: CompositeCursor) -> Self {
        Self {
            sort_value: cursor.scope,
            tiebreak_value: cursor.entity_id,
        }
    }
}

#[derive(Debug, Clone)]
struct Join {
    table: String,
    key: String,
    columns: Vec<String>,
}

/// Grouping subquery producing one row per entity with its latest
/// interaction time.
///
/// ```
/// use crumb_sql::{LatestPerGroup, Operator, Sqlite, Value};
///
/// let visited = LatestPerGroup::new("reviews", "bakery_id", "created_at", "last_reviewed_at")
///     .filter("user_id", Operator::Eq, Value::Int(7))
///     .build(Sqlite);
///
/// assert_eq!(
///     visited.sql,
///     "SELECT bakery_id, MAX(created_at) AS last_reviewed_at FROM reviews \
///      WHERE user_id = ?1 GROUP BY bakery_id"
/// );
/// assert_eq!(visited.params, vec![Value::Int(7)]);
/// ```
#[derive(Debug, Clone)]
pub struct LatestPerGroup {
    table: String,
    group_column: String,
    timestamp_column: String,
    column_alias: String,
    table_alias: String,
    filters: Vec<Filter>,
    join: Option<Join>,
}

impl LatestPerGroup {
    /// Latest `timestamp_column` of `table` per `group_column`, exposed as
    /// `column_alias`.
    ///
    /// # Panics
    ///
    /// Panics if any name is not a valid SQL identifier.
    pub fn new(
        table: impl Into<String>,
        group_column: impl Into<String>,
        timestamp_column: impl Into<String>,
        column_alias: impl Into<String>,
    ) -> Self {
        let table = table.into();
        let group_column = group_column.into();
        let timestamp_column = timestamp_column.into();
        let column_alias = column_alias.into();
        assert_valid_sql_identifier(&table, "table");
        assert_valid_sql_identifier(&group_column, "group column");
        assert_valid_sql_identifier(&timestamp_column, "timestamp column");
        assert_valid_sql_identifier(&column_alias, "derived column alias");
        Self {
            table,
            group_column,
            timestamp_column,
            column_alias,
            table_alias: "grouped".to_string(),
            filters: Vec::new(),
            join: None,
        }
    }

    /// Restrict the grouped rows (typically to one user).
    ///
    /// # Panics
    ///
    /// Panics if the column is not a valid SQL identifier.
    pub fn filter(mut self, column: impl Into<String>, op: Operator, value: Value) -> Self {
        let column = column.into();
        assert_valid_sql_identifier(&column, "filter column");
        self.filters.push(Filter { column, op, value });
        self
    }

    /// Attach columns of the listed entity, joined on `entity_table.key =
    /// group_column`.
    ///
    /// # Panics
    ///
    /// Panics if any name is not a valid SQL identifier.
    pub fn join(
        mut self,
        entity_table: impl Into<String>,
        key: impl Into<String>,
        columns: &[&str],
    ) -> Self {
        let table = entity_table.into();
        let key = key.into();
        assert_valid_sql_identifier(&table, "table");
        assert_valid_sql_identifier(&key, "join key");
        for column in columns {
            assert_valid_sql_identifier(column, "joined column");
        }
        self.join = Some(Join {
            table,
            key,
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        });
        self
    }

    /// Alias of the derived table in the page query (default `grouped`).
    ///
    /// # Panics
    ///
    /// Panics if the alias is not a valid SQL identifier.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        assert_valid_sql_identifier(&alias, "subquery alias");
        self.table_alias = alias;
        self
    }

    /// Render the subquery for `dialect`.
    pub fn build<D: Dialect>(&self, dialect: D) -> Subquery {
        let mut params = Vec::new();
        let mut param_idx = 1usize;
        let mut conditions = Vec::new();
        for filter in &self.filters {
            let (condition, new_params, new_idx) =
                build_condition_impl(&dialect, filter, param_idx);
            conditions.push(condition);
            params.extend(new_params);
            param_idx = new_idx;
        }

        let mut grouped = format!(
            "SELECT {group}, MAX({ts}) AS {alias} FROM {table}",
            group = self.group_column,
            ts = self.timestamp_column,
            alias = self.column_alias,
            table = self.table,
        );
        if !conditions.is_empty() {
            grouped.push_str(" WHERE ");
            grouped.push_str(&conditions.join(" AND "));
        }
        grouped.push_str(&format!(" GROUP BY {}", self.group_column));

        let sql = match &self.join {
            None => grouped,
            Some(join) => {
                let mut select = vec![
                    format!("g.{}", self.group_column),
                    format!("g.{}", self.column_alias),
                ];
                select.extend(join.columns.iter().map(|c| format!("e.{c}")));
                format!(
                    "SELECT {} FROM ({grouped}) AS g JOIN {} AS e ON e.{} = g.{}",
                    select.join(", "),
                    join.table,
                    join.key,
                    self.group_column,
                )
            },
        };

        Subquery::new(sql, params, self.table_alias.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::sort::NullsPolicy;
    use crate::value::ColumnType;

    const LAST_REVIEWED: SortDescriptor =
        SortDescriptor::derived("CREATED_AT", "last_reviewed_at", ColumnType::Integer)
            .tiebreak("BAKERY_ID", "bakery_id");

    #[test]
    fn test_composite_cursor_roundtrip() {
        let cursor = CompositeCursor::new(Value::Int(1_700_000_000), 42);
        let decoded = CompositeCursor::decode(&cursor.encode(), &LAST_REVIEWED)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, cursor);
        assert!(CompositeCursor::decode("0||0", &LAST_REVIEWED).unwrap().is_none());
        assert!(CompositeCursor::decode("42", &LAST_REVIEWED).is_err());
    }

    #[test]
    fn test_composite_cursor_zero_is_escaped() {
        let cursor = CompositeCursor::new(Value::Int(0), 0);
        assert_eq!(cursor.encode(), "0||+0");
    }

    #[test]
    fn test_composite_cursor_null_scope() {
        let nullable = LAST_REVIEWED.nullable(NullsPolicy::NullsLast);
        let cursor = CompositeCursor::new(Value::Null, 3);
        assert_eq!(cursor.encode(), "null||3");
        let decoded = CompositeCursor::decode("null||3", &nullable).unwrap().unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_cursor_conversions() {
        let cursor: Cursor = CompositeCursor::new(5, 1).into();
        assert_eq!(cursor, Cursor::new(Value::Int(5), 1));
        let back = CompositeCursor::from(cursor);
        assert_eq!(back.entity_id, 1);
    }

    #[test]
    fn test_latest_per_group_with_join() {
        let sub = LatestPerGroup::new("reviews", "bakery_id", "created_at", "last_reviewed_at")
            .filter("user_id", Operator::Eq, Value::Int(7))
            .join("bakeries", "id", &["name", "review_count"])
            .alias("visited")
            .build(Postgres);
        assert_eq!(
            sub.sql,
            "SELECT g.bakery_id, g.last_reviewed_at, e.name, e.review_count FROM \
             (SELECT bakery_id, MAX(created_at) AS last_reviewed_at FROM reviews \
             WHERE user_id = $1 GROUP BY bakery_id) AS g \
             JOIN bakeries AS e ON e.id = g.bakery_id"
        );
        assert_eq!(sub.alias, "visited");
        assert_eq!(sub.params, vec![Value::Int(7)]);
    }

    #[test]
    fn test_latest_per_group_without_filters() {
        let sub = LatestPerGroup::new("bakery_likes", "bakery_id", "created_at", "liked_at")
            .build(Postgres);
        assert_eq!(
            sub.sql,
            "SELECT bakery_id, MAX(created_at) AS liked_at FROM bakery_likes GROUP BY bakery_id"
        );
        assert!(sub.params.is_empty());
        assert_eq!(sub.alias, "grouped");
    }

    #[test]
    #[should_panic(expected = "Invalid SQL group column")]
    fn test_invalid_group_column_panics() {
        let _ = LatestPerGroup::new("reviews", "r.bakery_id", "created_at", "last_reviewed_at");
    }
}
