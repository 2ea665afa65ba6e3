//! One-call pagination: resolve, decode, plan, fetch.

use tracing::{debug, trace};

use crate::error::{InvalidSortParameter, PaginationError};
use crate::pagination::codec::CursorCodec;
use crate::pagination::executor::{KeysetRow, PageExecutor, RangeScan};
use crate::pagination::keyset::{KeysetPlan, PredicateBuilder};
use crate::pagination::page::Page;
use crate::sort::{ResolvedSort, SortKey, SortKeyRegistry};

/// Paginates the listings of one entity.
///
/// Client errors (unknown sort field, malformed cursor) all surface as
/// [`InvalidSortParameter`]; storage errors are passed through untouched.
///
/// ```
/// use crumb_sql::entities::{REVIEWS, ReviewSort};
/// use crumb_sql::{KeysetRow, MemoryTable, Paginator, SortDescriptor, Value};
///
/// #[derive(Debug, Clone)]
/// struct Review {
///     id: i64,
///     like_count: i64,
/// }
///
/// impl KeysetRow for Review {
///     fn sort_value(&self, _: &SortDescriptor) -> Value {
///         Value::Int(self.like_count)
///     }
///     fn tiebreak_value(&self) -> i64 {
///         self.id
///     }
/// }
///
/// let mut table = MemoryTable::new(vec![
///     Review { id: 1, like_count: 5 },
///     Review { id: 2, like_count: 5 },
///     Review { id: 3, like_count: 3 },
///     Review { id: 4, like_count: 8 },
/// ]);
///
/// let paginator = Paginator::new(&REVIEWS);
/// let page = paginator.paginate("LIKE_COUNT.DESC", "0||0", 2, &mut table).unwrap();
/// let ids: Vec<i64> = page.items().iter().map(|r| r.id).collect();
/// assert_eq!(ids, [4, 2]);
/// assert_eq!(page.next_cursor(), Some("5||1"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'r, K: SortKey> {
    registry: &'r SortKeyRegistry<K>,
}

impl<'r, K: SortKey> Paginator<'r, K> {
    /// Paginator over `registry`'s fields.
    #[must_use]
    pub const fn new(registry: &'r SortKeyRegistry<K>) -> Self {
        Self { registry }
    }

    /// Resolve a sort clause and decode a cursor into a keyset plan.
    ///
    /// SQL callers use this directly with [`PageQuery`](crate::PageQuery).
    pub fn plan(
        &self,
        sort_clause: &str,
        cursor: &str,
    ) -> Result<(ResolvedSort<K>, KeysetPlan), InvalidSortParameter> {
        let sort = self.registry.resolve(sort_clause)?;
        let decoded = CursorCodec::for_descriptor(&sort.descriptor).decode(cursor)?;
        let plan = PredicateBuilder::build(&sort.descriptor, sort.direction, decoded.as_ref());
        trace!(entity = K::ENTITY, ?plan, "keyset plan");
        Ok((sort, plan))
    }

    /// Fetch one page of `storage` sorted by `sort_clause`, starting at `cursor`.
    pub fn paginate<S>(
        &self,
        sort_clause: &str,
        cursor: &str,
        page_size: usize,
        storage: &mut S,
    ) -> Result<Page<S::Row>, PaginationError<S::Error>>
    where
        S: RangeScan + ?Sized,
        S::Row: KeysetRow,
    {
        let (sort, plan) = self.plan(sort_clause, cursor)?;
        let page = PageExecutor::new(&sort.descriptor)
            .fetch(storage, &plan, page_size)
            .map_err(PaginationError::Storage)?;

        debug!(
            entity = K::ENTITY,
            field = sort.descriptor.field_name(),
            direction = %sort.direction,
            page_size,
            rows = page.len(),
            has_next = page.has_next(),
            "fetched page"
        );
        Ok(page)
    }
}
