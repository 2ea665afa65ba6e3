//! In-process range scans over a `Vec` of rows.
//!
//! Evaluates the same [`ScanRequest`] a SQL backend would render, with SQL
//! semantics: three-valued predicate logic and explicit NULL placement.
//! Useful for tests and for small fixed collections.

use std::cmp::Ordering;
use std::convert::Infallible;

use crate::builder::{OrderTerm, evaluate};
use crate::pagination::{KeysetRow, RangeScan, ScanRequest};
use crate::sort::{Direction, NullsPlacement, SortDescriptor};
use crate::value::Value;

/// A table held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable<T> {
    rows: Vec<T>,
}

impl<T> MemoryTable<T> {
    /// Table holding `rows`, in any order.
    #[must_use]
    pub const fn new(rows: Vec<T>) -> Self {
        Self { rows }
    }

    /// Add a row.
    pub fn insert(&mut self, row: T) {
        self.rows.push(row);
    }

    /// Remove every row matching `pred`.
    pub fn remove_where<F: FnMut(&T) -> bool>(&mut self, mut pred: F) {
        self.rows.retain(|row| !pred(row));
    }

    /// All rows, in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: KeysetRow + Clone> RangeScan for MemoryTable<T> {
    type Row = T;
    type Error = Infallible;

    fn scan(&mut self, request: &ScanRequest<'_>) -> Result<Vec<T>, Infallible> {
        let descriptor = request.descriptor;
        let mut matched: Vec<&T> = self
            .rows
            .iter()
            .filter(|row| {
                request.predicate.is_none_or(|predicate| {
                    evaluate(predicate, &|column: &str| column_value(*row, descriptor, column))
                        == Some(true)
                })
            })
            .collect();

        matched.sort_by(|a, b| compare_rows(*a, *b, descriptor, request.order_by));

        Ok(matched.into_iter().take(request.limit).cloned().collect())
    }
}

fn column_value<T: KeysetRow>(
    row: &T,
    descriptor: &SortDescriptor,
    column: &str,
) -> Option<Value> {
    if column == descriptor.column() {
        Some(row.sort_value(descriptor))
    } else if column == descriptor.tiebreak_column() {
        Some(Value::Int(row.tiebreak_value()))
    } else {
        None
    }
}

fn compare_rows<T: KeysetRow>(
    a: &T,
    b: &T,
    descriptor: &SortDescriptor,
    order_by: &[OrderTerm],
) -> Ordering {
    for term in order_by {
        let ord = match (
            column_value(a, descriptor, &term.column),
            column_value(b, descriptor, &term.column),
        ) {
            (Some(va), Some(vb)) => compare_values(&va, &vb, term),
            _ => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Position of `a` relative to `b` in the output sequence.
fn compare_values(a: &Value, b: &Value, term: &OrderTerm) -> Ordering {
    // Without an explicit clause NULL is the smallest value (SQLite default).
    let nulls = term.nulls.unwrap_or(match term.direction {
        Direction::Ascending => NullsPlacement::First,
        Direction::Descending => NullsPlacement::Last,
    });
    let null_first = nulls == NullsPlacement::First;

    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) if null_first => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, true) if null_first => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.sql_cmp(b).unwrap_or(Ordering::Equal);
            match term.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{Cursor, PredicateBuilder};
    use crate::sort::NullsPolicy;
    use crate::value::ColumnType;

    #[derive(Debug, Clone, PartialEq)]
    struct Bakery {
        id: i64,
        avg_rating: Option<f64>,
    }

    impl KeysetRow for Bakery {
        fn sort_value(&self, _: &SortDescriptor) -> Value {
            self.avg_rating.into()
        }

        fn tiebreak_value(&self) -> i64 {
            self.id
        }
    }

    const AVG_RATING: SortDescriptor =
        SortDescriptor::new("AVG_RATING", "avg_rating", ColumnType::Float)
            .nullable(NullsPolicy::NullsLast);

    fn table() -> MemoryTable<Bakery> {
        MemoryTable::new(vec![
            Bakery { id: 1, avg_rating: None },
            Bakery { id: 2, avg_rating: Some(4.5) },
            Bakery { id: 3, avg_rating: Some(3.0) },
            Bakery { id: 4, avg_rating: None },
            Bakery { id: 5, avg_rating: Some(4.5) },
        ])
    }

    fn scan(
        table: &mut MemoryTable<Bakery>,
        direction: Direction,
        cursor: Option<Cursor>,
    ) -> Vec<i64> {
        let plan = PredicateBuilder::build(&AVG_RATING, direction, cursor.as_ref());
        let request = ScanRequest {
            descriptor: &AVG_RATING,
            predicate: plan.predicate.as_ref(),
            order_by: &plan.order_by,
            limit: usize::MAX,
        };
        let Ok(rows) = table.scan(&request);
        rows.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_descending_nulls_last() {
        let mut table = table();
        assert_eq!(scan(&mut table, Direction::Descending, None), [5, 2, 3, 4, 1]);
    }

    #[test]
    fn test_ascending_nulls_first() {
        let mut table = table();
        assert_eq!(scan(&mut table, Direction::Ascending, None), [1, 4, 3, 2, 5]);
    }

    #[test]
    fn test_predicate_is_inclusive_of_cursor_row() {
        let mut table = table();
        let from_2 = scan(
            &mut table,
            Direction::Descending,
            Some(Cursor::new(Value::Float(4.5), 2)),
        );
        assert_eq!(from_2, [2, 3, 4, 1]);

        let null_cursor = Some(Cursor::new(Value::Null, 4));
        let from_null = scan(&mut table, Direction::Descending, null_cursor.clone());
        assert_eq!(from_null, [4, 1]);

        let from_null = scan(&mut table, Direction::Ascending, null_cursor);
        assert_eq!(from_null, [4, 3, 2, 5]);
    }

    #[test]
    fn test_limit_and_mutation() {
        let mut table = table();
        table.insert(Bakery { id: 6, avg_rating: Some(5.0) });
        table.remove_where(|b| b.avg_rating.is_none());
        assert_eq!(table.len(), 4);

        let plan = PredicateBuilder::build(&AVG_RATING, Direction::Descending, None);
        let request = ScanRequest {
            descriptor: &AVG_RATING,
            predicate: None,
            order_by: &plan.order_by,
            limit: 2,
        };
        let Ok(rows) = table.scan(&request);
        assert_eq!(rows.iter().map(|b| b.id).collect::<Vec<_>>(), [6, 5]);
    }
}
