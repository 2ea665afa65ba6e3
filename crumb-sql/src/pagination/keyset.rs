//! Keyset predicate and ordering for one sort field.

use crate::builder::{Filter, FilterExpr, Operator, OrderTerm, and, or};
use crate::pagination::codec::Cursor;
use crate::sort::{Direction, NullsPlacement, SortDescriptor};
use crate::value::Value;

/// Everything a range scan needs besides the limit: the "at or after the
/// cursor" predicate and the total order it is defined against.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct KeysetPlan {
    /// `None` on the first page.
    pub predicate: Option<FilterExpr>,
    /// Sort column first, tiebreak second (omitted when they coincide).
    pub order_by: Vec<OrderTerm>,
}

/// Builds keyset predicates.
///
/// The tiebreak comparison is inclusive: the cursor names the first row of
/// the next page (the extra row a page fetch read past its end), so that row
/// must be returned again.
///
/// | direction | predicate                                    |
/// |-----------|----------------------------------------------|
/// | DESC      | `col < v OR (col = v AND id <= t)`           |
/// | ASC       | `col > v OR (col = v AND id >= t)`           |
///
/// Nullable columns get an extra `OR col IS NULL` branch when NULLs sort
/// after non-NULL values, and a NULL cursor stays inside the NULL block.
///
/// ```
/// use crumb_sql::{ColumnType, Cursor, Direction, PredicateBuilder, SortDescriptor, Value};
///
/// let likes = SortDescriptor::new("LIKE_COUNT", "like_count", ColumnType::Integer);
/// let cursor = Cursor::new(Value::Int(5), 1);
/// let plan = PredicateBuilder::build(&likes, Direction::Descending, Some(&cursor));
///
/// assert!(plan.predicate.is_some());
/// assert_eq!(plan.order_by.len(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct PredicateBuilder;

impl PredicateBuilder {
    /// Build the plan for a page starting at `cursor` (`None` = first page).
    #[must_use]
    pub fn build(
        descriptor: &SortDescriptor,
        direction: Direction,
        cursor: Option<&Cursor>,
    ) -> KeysetPlan {
        KeysetPlan {
            predicate: cursor.map(|c| Self::predicate(descriptor, direction, c)),
            order_by: Self::order_by(descriptor, direction),
        }
    }

    /// The total order of a listing.
    #[must_use]
    pub fn order_by(descriptor: &SortDescriptor, direction: Direction) -> Vec<OrderTerm> {
        let sort = OrderTerm::new(descriptor.column(), direction)
            .nulls(descriptor.nulls_placement(direction));
        if descriptor.is_own_tiebreak() {
            vec![sort]
        } else {
            vec![sort, OrderTerm::new(descriptor.tiebreak_column(), direction)]
        }
    }

    /// The "at or after the cursor" predicate.
    #[must_use]
    pub fn predicate(
        descriptor: &SortDescriptor,
        direction: Direction,
        cursor: &Cursor,
    ) -> FilterExpr {
        let (strict, inclusive) = match direction {
            Direction::Descending => (Operator::Lt, Operator::Lte),
            Direction::Ascending => (Operator::Gt, Operator::Gte),
        };
        let column = descriptor.column();
        let tiebreak = compare(
            descriptor.tiebreak_column(),
            inclusive,
            Value::Int(cursor.tiebreak_value),
        );

        if descriptor.is_own_tiebreak() {
            return tiebreak;
        }

        let nulls = descriptor.nulls_placement(direction);
        match &cursor.sort_value {
            Value::Null => {
                let rest_of_null_block =
                    and(vec![compare(column, Operator::Eq, Value::Null), tiebreak]);
                if nulls == Some(NullsPlacement::First) {
                    or(vec![rest_of_null_block, compare(column, Operator::Ne, Value::Null)])
                } else {
                    rest_of_null_block
                }
            },
            value => {
                let mut branches = vec![
                    compare(column, strict, value.clone()),
                    and(vec![compare(column, Operator::Eq, value.clone()), tiebreak]),
                ];
                if nulls == Some(NullsPlacement::Last) {
                    branches.push(compare(column, Operator::Eq, Value::Null));
                }
                or(branches)
            },
        }
    }
}

// Columns come from a validated registry, no per-request check needed.
fn compare(column: &str, op: Operator, value: Value) -> FilterExpr {
    FilterExpr::Simple(Filter {
        column: column.to_string(),
        op,
        value,
    })
}
