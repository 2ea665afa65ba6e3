//! Keyset (cursor-based) pagination.
//!
//! A listing is ordered by one whitelisted sort column plus a unique integer
//! tiebreak, both in the same direction. Each page reads `page_size + 1`
//! rows; the extra row is dropped and its `(sort_value, id)` becomes the
//! opaque cursor of the next page.
//!
//! # Cursor format
//!
//! | listing sorted by        | token                  | first page |
//! |--------------------------|------------------------|------------|
//! | its own integer key      | `"<id>"`               | `"0"`      |
//! | any other field          | `"<sort_value>\|\|<id>"` | `"0\|\|0"`   |
//!
//! Sort values are encoded by column type: decimal integers, shortest
//! round-trip floats, RFC 3339 timestamps with offset, verbatim text, and
//! `null` for NULL.
//!
//! # Pipeline
//!
//! 1. [`SortKeyRegistry::resolve`](crate::SortKeyRegistry::resolve) turns
//!    `"LIKE_COUNT.DESC"` into a descriptor and direction.
//! 2. [`CursorCodec::decode`] turns the token into a [`Cursor`].
//! 3. [`PredicateBuilder::build`] produces the seek predicate and ordering.
//! 4. [`PageExecutor::fetch`] runs the scan and assembles the [`Page`].
//!
//! [`Paginator`] chains all four.

mod codec;
mod composite;
mod executor;
mod keyset;
mod page;
mod paginator;

pub use codec::{
    COMPOSITE_SENTINEL, Cursor, CursorCodec, CursorFormat, DELIMITER, NULL_TOKEN,
    SIMPLE_SENTINEL, decode_value, encode_value,
};
pub use composite::{CompositeCursor, LatestPerGroup};
pub use executor::{KeysetRow, PageExecutor, RangeScan, ScanRequest};
pub use keyset::{KeysetPlan, PredicateBuilder};
pub use page::Page;
pub use paginator::Paginator;
