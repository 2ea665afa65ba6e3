// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::match_same_arms)] // Kept separate where each arm reads as its own rule
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::cast_possible_truncation)] // u32 page sizes widen to usize
#![allow(clippy::cast_precision_loss)] // SQL compares integers with floats as doubles
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::indexing_slicing))] // Tests unwrap and index known-good inputs

//! # crumb-sql - Keyset Pagination
//!
//! Cursor-based pagination for SQL-backed listings: stable under
//! concurrent inserts and deletes, with cost independent of page depth.
//!
//! A listing is ordered by one client-chosen field from a per-entity
//! whitelist plus a unique integer tiebreak. Clients send a sort clause
//! (`"LIKE_COUNT.DESC"`) and an opaque cursor (`"0||0"` for the first page)
//! and get back a [`Page`] with `items`, `next_cursor` and `has_next`.
//!
//! ## Quick Start
//!
//! ```
//! # use crumb_sql::prelude::*;
//! use crumb_sql::entities::REVIEWS;
//!
//! // Resolve the client's sort clause and cursor into a keyset plan...
//! let (sort, plan) = Paginator::new(&REVIEWS).plan("LIKE_COUNT.DESC", "5||1").unwrap();
//! assert_eq!(sort.direction, Direction::Descending);
//!
//! // ...and render one page fetch (page size 20 + 1 lookahead row).
//! let query = postgres("reviews")
//!     .filter("bakery_id", Operator::Eq, Value::Int(3))
//!     .keyset(&plan)
//!     .limit(21)
//!     .build();
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT * FROM reviews WHERE bakery_id = $1 AND \
//!      (like_count < $2 OR (like_count = $3 AND id <= $4)) \
//!      ORDER BY like_count DESC, id DESC LIMIT 21"
//! );
//! ```
//!
//! ## Storage
//!
//! [`Paginator::paginate`] drives any [`RangeScan`] implementation: a SQL
//! backend rendering [`PageQuery::scan`], or the in-process [`MemoryTable`].
//!
//! ## Errors
//!
//! Every client mistake (unknown field, bad direction, corrupt cursor) is
//! one [`InvalidSortParameter`], code `1005`, HTTP 400. Storage failures
//! pass through [`PaginationError::Storage`] unchanged.

mod builder;
mod config;
mod dialect;
mod error;
mod memory;
mod pagination;
mod sort;
mod validate;
mod value;

pub mod entities;

pub use builder::{
    CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, OrderTerm, PageQuery, QueryResult,
    Subquery, and, not, or, postgres, simple, sqlite,
};
pub use config::{ConfigError, PagingConfig};
pub use dialect::{Dialect, Postgres, Sqlite};
pub use error::{InvalidSortParameter, PaginationError};
pub use memory::MemoryTable;
pub use pagination::{
    COMPOSITE_SENTINEL, CompositeCursor, Cursor, CursorCodec, CursorFormat, DELIMITER, KeysetPlan,
    KeysetRow, LatestPerGroup, NULL_TOKEN, Page, PageExecutor, Paginator, PredicateBuilder,
    RangeScan, SIMPLE_SENTINEL, ScanRequest, decode_value, encode_value,
};
pub use sort::{
    ColumnSource, Direction, NullsPlacement, NullsPolicy, ResolvedSort, SortDescriptor, SortKey,
    SortKeyRegistry,
};
pub use validate::{is_valid_column_ref, is_valid_sql_identifier};
pub use value::{ColumnType, Value};

/// Prelude module for convenient imports.
///
/// ```
/// use crumb_sql::prelude::*;
/// let query = sqlite("bakeries").fields(&["id"]).build();
/// assert_eq!(query.sql, "SELECT id FROM bakeries");
/// ```
pub mod prelude {
    pub use crate::{
        ColumnType, CompositeCursor, Cursor, CursorCodec, Dialect, Direction, FilterExpr,
        InvalidSortParameter, KeysetPlan, KeysetRow, LatestPerGroup, MemoryTable, NullsPolicy,
        Operator, Page, PageExecutor, PageQuery, PaginationError, Paginator, PagingConfig,
        Postgres, PredicateBuilder, QueryResult, RangeScan, ScanRequest, SortDescriptor, SortKey,
        SortKeyRegistry, Sqlite, Value, postgres, sqlite,
    };
}


// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
