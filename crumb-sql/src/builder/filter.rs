//! Rendering and in-process evaluation of filter expressions.

use std::cmp::Ordering;

use super::types::{CompoundFilter, Filter, FilterExpr, LogicalOp, Operator};
use crate::dialect::Dialect;
use crate::value::Value;

/// Build a filter expression (simple or compound).
pub(crate) fn build_filter_expr_impl<D: Dialect>(
    dialect: &D,
    expr: &FilterExpr,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    match expr {
        FilterExpr::Simple(filter) => build_condition_impl(dialect, filter, start_idx),
        FilterExpr::Compound(compound) => build_compound_filter_impl(dialect, compound, start_idx),
    }
}

/// Build a compound filter (AND, OR, NOT).
fn build_compound_filter_impl<D: Dialect>(
    dialect: &D,
    compound: &CompoundFilter,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    let mut idx = start_idx;
    let mut all_params = Vec::new();
    let mut conditions = Vec::new();

    for filter_expr in &compound.filters {
        let (condition, params, new_idx) = build_filter_expr_impl(dialect, filter_expr, idx);
        conditions.push(condition);
        all_params.extend(params);
        idx = new_idx;
    }

    let sql = match compound.op {
        LogicalOp::And | LogicalOp::Or if conditions.len() == 1 => {
            conditions.into_iter().next().unwrap_or_default()
        },
        LogicalOp::And => format!("({})", conditions.join(" AND ")),
        LogicalOp::Or => format!("({})", conditions.join(" OR ")),
        LogicalOp::Not => {
            let inner = conditions.into_iter().next().unwrap_or_default();
            format!("NOT ({inner})")
        },
    };

    (sql, all_params, idx)
}

/// Build a single filter condition.
pub(crate) fn build_condition_impl<D: Dialect>(
    dialect: &D,
    filter: &Filter,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    let column = &filter.column;
    let idx = start_idx;

    match (filter.op, &filter.value) {
        // NULL handling
        (Operator::Eq, Value::Null) => (format!("{column} IS NULL"), vec![], idx),
        (Operator::Ne, Value::Null) => (format!("{column} IS NOT NULL"), vec![], idx),

        (op, value) => {
            let sql = format!("{} {} {}", column, op.as_sql(), dialect.param(idx));
            (sql, vec![value.clone()], idx + 1)
        },
    }
}

/// Evaluate an expression against one row with SQL three-valued logic.
///
/// `lookup` returns the row's value for a column, or `None` for a column
/// the row does not have. `None` means UNKNOWN, which a `WHERE` clause
/// treats as false.
pub(crate) fn evaluate<F>(expr: &FilterExpr, lookup: &F) -> Option<bool>
where
    F: Fn(&str) -> Option<Value>,
{
    match expr {
        FilterExpr::Simple(filter) => evaluate_condition(filter, lookup),
        FilterExpr::Compound(compound) => {
            let results = compound.filters.iter().map(|f| evaluate(f, lookup));
            match compound.op {
                LogicalOp::And => {
                    let mut unknown = false;
                    for result in results {
                        match result {
                            Some(false) => return Some(false),
                            None => unknown = true,
                            Some(true) => {},
                        }
                    }
                    if unknown { None } else { Some(true) }
                },
                LogicalOp::Or => {
                    let mut unknown = false;
                    for result in results {
                        match result {
                            Some(true) => return Some(true),
                            None => unknown = true,
                            Some(false) => {},
                        }
                    }
                    if unknown { None } else { Some(false) }
                },
                LogicalOp::Not => compound
                    .filters
                    .first()
                    .and_then(|f| evaluate(f, lookup))
                    .map(|b| !b),
            }
        },
    }
}

fn evaluate_condition<F>(filter: &Filter, lookup: &F) -> Option<bool>
where
    F: Fn(&str) -> Option<Value>,
{
    let actual = lookup(&filter.column)?;

    match (filter.op, &filter.value) {
        (Operator::Eq, Value::Null) => Some(actual.is_null()),
        (Operator::Ne, Value::Null) => Some(!actual.is_null()),
        (op, expected) => {
            let ord = actual.sql_cmp(expected)?;
            Some(match op {
                Operator::Eq => ord == Ordering::Equal,
                Operator::Ne => ord != Ordering::Equal,
                Operator::Gt => ord == Ordering::Greater,
                Operator::Gte => ord != Ordering::Less,
                Operator::Lt => ord == Ordering::Less,
                Operator::Lte => ord != Ordering::Greater,
            })
        },
    }
}
