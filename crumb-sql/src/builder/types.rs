//! Core types for predicates, ordering and rendered queries.

use crate::sort::{Direction, NullsPlacement};
use crate::validate::assert_valid_column_ref;
use crate::value::Value;

/// SQL comparison operators.
///
/// Comparing with [`Value::Null`] through `Eq` / `Ne` means `IS NULL` /
/// `IS NOT NULL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Operator {
    /// Equal: `=`
    Eq,
    /// Not equal: `!=`
    Ne,
    /// Greater than: `>`
    Gt,
    /// Greater than or equal: `>=`
    Gte,
    /// Less than: `<`
    Lt,
    /// Less than or equal: `<=`
    Lte,
}

impl Operator {
    /// SQL spelling of the operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Logical operators for compound filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LogicalOp {
    /// All conditions must match: `AND`
    And,
    /// At least one condition must match: `OR`
    Or,
    /// Negate the condition: `NOT`
    Not,
}

/// A single column comparison.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Filter {
    /// Column reference.
    pub column: String,
    /// Comparison operator.
    pub op: Operator,
    /// Right-hand value, bound as a parameter.
    pub value: Value,
}

/// A filter expression that can be simple or compound.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FilterExpr {
    /// A simple column comparison.
    Simple(Filter),
    /// A compound filter with logical operator.
    Compound(CompoundFilter),
}

/// A compound filter combining multiple expressions with a logical operator.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct CompoundFilter {
    /// How the children combine.
    pub op: LogicalOp,
    /// Child expressions.
    pub filters: Vec<FilterExpr>,
}

impl CompoundFilter {
    /// Create an AND compound filter.
    #[must_use]
    pub const fn and(filters: Vec<FilterExpr>) -> Self {
        Self {
            op: LogicalOp::And,
            filters,
        }
    }

    /// Create an OR compound filter.
    #[must_use]
    pub const fn or(filters: Vec<FilterExpr>) -> Self {
        Self {
            op: LogicalOp::Or,
            filters,
        }
    }

    /// Create a NOT compound filter (wraps a single filter).
    #[must_use]
    pub fn not(filter: FilterExpr) -> Self {
        Self {
            op: LogicalOp::Not,
            filters: vec![filter],
        }
    }
}

/// One term of an `ORDER BY` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct OrderTerm {
    /// Column reference.
    pub column: String,
    /// Sort direction.
    pub direction: Direction,
    /// Explicit NULL placement, emitted for nullable columns only.
    pub nulls: Option<NullsPlacement>,
}

impl OrderTerm {
    /// Create an order term without a NULL clause.
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
            nulls: None,
        }
    }

    /// Attach an explicit NULL placement.
    #[must_use]
    pub const fn nulls(mut self, nulls: Option<NullsPlacement>) -> Self {
        self.nulls = nulls;
        self
    }
}

/// Query result with SQL string and parameters.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
#[must_use = "QueryResult must be used to execute the query"]
pub struct QueryResult {
    /// Rendered SQL.
    pub sql: String,
    /// Bind parameters, in placeholder order.
    pub params: Vec<Value>,
}

/// Helper function to create a simple filter expression.
///
/// # Panics
///
/// Panics if the column is not a valid column reference.
pub fn simple(column: impl Into<String>, op: Operator, value: Value) -> FilterExpr {
    let column = column.into();
    assert_valid_column_ref(&column, "filter column");
    FilterExpr::Simple(Filter { column, op, value })
}

/// Helper function to create an AND compound filter.
#[must_use]
pub const fn and(filters: Vec<FilterExpr>) -> FilterExpr {
    FilterExpr::Compound(CompoundFilter::and(filters))
}

/// Helper function to create an OR compound filter.
#[must_use]
pub const fn or(filters: Vec<FilterExpr>) -> FilterExpr {
    FilterExpr::Compound(CompoundFilter::or(filters))
}

/// Helper function to create a NOT filter.
#[must_use]
pub fn not(filter: FilterExpr) -> FilterExpr {
    FilterExpr::Compound(CompoundFilter::not(filter))
}
