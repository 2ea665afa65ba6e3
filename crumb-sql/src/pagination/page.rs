//! One page of a keyset listing.

use serde::Serialize;

/// A page of results and the token for the next one.
///
/// `next_cursor` is present exactly when `has_next` is `true`; the
/// constructors are the only way to build a page.
///
/// ```
/// use crumb_sql::Page;
///
/// let page = Page::with_next(vec![4, 2], "5||1".to_string());
/// assert!(page.has_next());
/// assert_eq!(page.next_cursor(), Some("5||1"));
///
/// let last = Page::last(vec![1, 3]);
/// assert!(!last.has_next());
/// assert_eq!(last.next_cursor(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    next_cursor: Option<String>,
    has_next: bool,
}

impl<T> Page<T> {
    /// A page followed by more rows.
    #[must_use]
    pub const fn with_next(items: Vec<T>, next_cursor: String) -> Self {
        Self {
            items,
            next_cursor: Some(next_cursor),
            has_next: true,
        }
    }

    /// The final page of a listing.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
            has_next: false,
        }
    }

    /// Rows of this page, in listing order.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Token for the next page, if any.
    #[inline]
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// Whether another page follows.
    #[inline]
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    /// Number of rows on this page.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the page has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the rows.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Split into rows and next cursor.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self.items, self.next_cursor)
    }

    /// Convert each row, keeping the cursor (e.g. storage rows to DTOs).
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_next: self.has_next,
        }
    }
}
