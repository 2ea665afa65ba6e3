//! Page fetching over an abstract range-scan storage.

use crate::builder::{FilterExpr, OrderTerm};
use crate::pagination::codec::CursorCodec;
use crate::pagination::keyset::KeysetPlan;
use crate::pagination::page::Page;
use crate::sort::SortDescriptor;
use crate::value::Value;

/// A row that can produce the keys it is paginated by.
pub trait KeysetRow {
    /// Value of the sort column described by `descriptor`.
    fn sort_value(&self, descriptor: &SortDescriptor) -> Value;

    /// Value of the unique tiebreak column.
    fn tiebreak_value(&self) -> i64;
}

/// One range scan: rows matching `predicate`, in `order_by` order, at most
/// `limit` of them.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct ScanRequest<'a> {
    /// The field being paginated.
    pub descriptor: &'a SortDescriptor,
    /// Keyset predicate, `None` on the first page.
    pub predicate: Option<&'a FilterExpr>,
    /// Total order of the listing.
    pub order_by: &'a [OrderTerm],
    /// Maximum number of rows to return.
    pub limit: usize,
}

/// Storage able to answer a [`ScanRequest`].
///
/// SQL-backed implementations render the request with
/// [`PageQuery::scan`](crate::PageQuery::scan) and run it;
/// [`MemoryTable`](crate::MemoryTable) evaluates it in process. Storage
/// errors are returned unchanged to the caller.
pub trait RangeScan {
    /// Row type returned by the scan.
    type Row;
    /// Storage failure.
    type Error;

    /// Return the first `request.limit` rows matching the predicate, in order.
    fn scan(&mut self, request: &ScanRequest<'_>) -> Result<Vec<Self::Row>, Self::Error>;
}

impl<S: RangeScan + ?Sized> RangeScan for &mut S {
    type Row = S::Row;
    type Error = S::Error;

    fn scan(&mut self, request: &ScanRequest<'_>) -> Result<Vec<Self::Row>, Self::Error> {
        (**self).scan(request)
    }
}

/// Fetches one page by reading one row past its end.
///
/// The extra row is not returned; it only proves that another page exists
/// and becomes that page's cursor.
#[derive(Debug, Clone, Copy)]
pub struct PageExecutor<'a> {
    descriptor: &'a SortDescriptor,
    codec: CursorCodec,
}

impl<'a> PageExecutor<'a> {
    /// Executor for listings sorted by `descriptor`.
    #[must_use]
    pub fn new(descriptor: &'a SortDescriptor) -> Self {
        Self {
            descriptor,
            codec: CursorCodec::for_descriptor(descriptor),
        }
    }

    /// Fetch the page described by `plan`.
    ///
    /// `page_size` is taken as given; bounding it is the caller's policy
    /// (see [`PagingConfig::page_size`](crate::PagingConfig::page_size)).
    pub fn fetch<S>(
        &self,
        storage: &mut S,
        plan: &KeysetPlan,
        page_size: usize,
    ) -> Result<Page<S::Row>, S::Error>
    where
        S: RangeScan + ?Sized,
        S::Row: KeysetRow,
    {
        let request = ScanRequest {
            descriptor: self.descriptor,
            predicate: plan.predicate.as_ref(),
            order_by: &plan.order_by,
            limit: page_size.saturating_add(1),
        };

        let mut rows = storage.scan(&request)?;
        if rows.len() <= page_size {
            return Ok(Page::last(rows));
        }

        // Storage may over-deliver; the row right after the page is the boundary.
        rows.truncate(page_size + 1);
        match rows.pop() {
            Some(boundary) => {
                let cursor = self.codec.encode(
                    &boundary.sort_value(self.descriptor),
                    boundary.tiebreak_value(),
                );
                Ok(Page::with_next(rows, cursor))
            },
            None => Ok(Page::last(rows)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PredicateBuilder;
    use crate::sort::Direction;
    use crate::value::ColumnType;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        likes: i64,
    }

    impl KeysetRow for Row {
        fn sort_value(&self, _: &SortDescriptor) -> Value {
            Value::Int(self.likes)
        }

        fn tiebreak_value(&self) -> i64 {
            self.id
        }
    }

    /// Returns canned rows and records the requested limit.
    struct Canned {
        rows: Vec<Row>,
        limits: Vec<usize>,
    }

    impl RangeScan for Canned {
        type Row = Row;
        type Error = String;

        fn scan(&mut self, request: &ScanRequest<'_>) -> Result<Vec<Row>, String> {
            self.limits.push(request.limit);
            Ok(self.rows.clone())
        }
    }

    struct Broken;

    impl RangeScan for Broken {
        type Row = Row;
        type Error = String;

        fn scan(&mut self, _: &ScanRequest<'_>) -> Result<Vec<Row>, String> {
            Err("connection reset".to_string())
        }
    }

    fn rows(n: i64) -> Vec<Row> {
        (1..=n).map(|id| Row { id, likes: 10 - id }).collect()
    }

    const LIKES: SortDescriptor =
        SortDescriptor::new("LIKE_COUNT", "like_count", ColumnType::Integer);

    fn plan() -> KeysetPlan {
        PredicateBuilder::build(&LIKES, Direction::Descending, None)
    }

    #[test]
    fn test_reads_one_past_the_page() {
        let mut storage = Canned { rows: rows(3), limits: vec![] };
        let page = PageExecutor::new(&LIKES).fetch(&mut storage, &plan(), 2).unwrap();

        assert_eq!(storage.limits, vec![3]);
        assert_eq!(page.items(), &rows(2)[..]);
        assert!(page.has_next());
        // Boundary is the excluded third row: likes 7, id 3.
        assert_eq!(page.next_cursor(), Some("7||3"));
    }

    #[test]
    fn test_exact_fit_is_last_page() {
        let mut storage = Canned { rows: rows(2), limits: vec![] };
        let page = PageExecutor::new(&LIKES).fetch(&mut storage, &plan(), 2).unwrap();
        assert_eq!(page.len(), 2);
        assert!(!page.has_next());
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn test_over_delivery_is_truncated() {
        let mut storage = Canned { rows: rows(6), limits: vec![] };
        let page = PageExecutor::new(&LIKES).fetch(&mut storage, &plan(), 2).unwrap();
        assert_eq!(page.items(), &rows(2)[..]);
        assert_eq!(page.next_cursor(), Some("7||3"));
    }

    #[test]
    fn test_zero_page_size_still_reports_next() {
        let mut storage = Canned { rows: rows(1), limits: vec![] };
        let page = PageExecutor::new(&LIKES).fetch(&mut storage, &plan(), 0).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.next_cursor(), Some("9||1"));
    }

    #[test]
    fn test_huge_page_size_does_not_overflow() {
        let mut storage = Canned { rows: rows(2), limits: vec![] };
        let page = PageExecutor::new(&LIKES)
            .fetch(&mut storage, &plan(), usize::MAX)
            .unwrap();
        assert_eq!(storage.limits, vec![usize::MAX]);
        assert!(!page.has_next());
    }

    #[test]
    fn test_storage_error_is_propagated() {
        let err = PageExecutor::new(&LIKES).fetch(&mut Broken, &plan(), 2).unwrap_err();
        assert_eq!(err, "connection reset");
    }

    #[test]
    fn test_simple_format_for_own_tiebreak() {
        const ID: SortDescriptor = SortDescriptor::primary_key("ID", "id");
        let mut storage = Canned { rows: rows(3), limits: vec![] };
        let plan = PredicateBuilder::build(&ID, Direction::Descending, None);
        let page = PageExecutor::new(&ID).fetch(&mut storage, &plan, 2).unwrap();
        assert_eq!(page.next_cursor(), Some("3"));
    }
}
