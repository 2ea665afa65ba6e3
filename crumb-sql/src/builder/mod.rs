//! SQL rendering of keyset pages.
//!
//! Predicates are trees of [`FilterExpr`]; [`PageQuery`] renders them with
//! numbered placeholders for a [`Dialect`](crate::Dialect), so no value
//! ever reaches the SQL text.

mod filter;
mod select;
mod types;

pub(crate) use filter::{build_condition_impl, build_filter_expr_impl, evaluate};
pub use select::{PageQuery, Subquery, postgres, sqlite};
pub use types::{
    CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, OrderTerm, QueryResult, and, not,
    or, simple,
};
