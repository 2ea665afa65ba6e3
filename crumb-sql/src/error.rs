//! Error types for pagination input and page fetches.

use thiserror::Error;

/// The client sent pagination input the engine cannot interpret.
///
/// A single error covers every client-input failure: a malformed sort
/// clause, an unknown sort field or direction, a malformed cursor token, or
/// a cursor value of the wrong type. There is no variant to match on; the
/// client re-issues the request with corrected parameters.
///
/// The [`detail`](Self::detail) string is meant for logs, not for branching.
///
/// # Example
///
/// ```
/// use crumb_sql::InvalidSortParameter;
///
/// let err = InvalidSortParameter::new("sort clause `RATING` has no direction");
/// assert_eq!(err.code(), 1005);
/// assert!(err.to_string().starts_with("invalid sort parameter"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort parameter: {detail}")]
#[non_exhaustive]
pub struct InvalidSortParameter {
    detail: String,
}

impl InvalidSortParameter {
    /// Application error code reported to clients.
    pub const CODE: u16 = 1005;

    /// HTTP status the boundary layer should answer with.
    pub const HTTP_STATUS: u16 = 400;

    /// Create an error with a diagnostic detail.
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Diagnostic detail, for logging only.
    #[inline]
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Application error code (always [`Self::CODE`]).
    #[inline]
    #[must_use]
    pub const fn code(&self) -> u16 {
        Self::CODE
    }
}

/// Error returned by [`Paginator::paginate`](crate::Paginator::paginate).
///
/// Storage failures are passed through untouched; the engine never retries
/// or rewraps them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PaginationError<E> {
    /// The sort clause or cursor could not be interpreted.
    #[error(transparent)]
    InvalidSortParameter(#[from] InvalidSortParameter),
    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(#[source] E),
}

impl<E> PaginationError<E> {
    /// Returns `true` if this error was caused by client input.
    #[inline]
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidSortParameter(_))
    }

    /// Returns the storage error, if that is what failed.
    #[must_use]
    pub fn into_storage(self) -> Option<E> {
        match self {
            Self::Storage(e) => Some(e),
            Self::InvalidSortParameter(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sort_parameter_display() {
        let err = InvalidSortParameter::new("unknown field `FOO`");
        assert_eq!(err.to_string(), "invalid sort parameter: unknown field `FOO`");
        assert_eq!(err.detail(), "unknown field `FOO`");
        assert_eq!(err.code(), InvalidSortParameter::CODE);
    }

    #[test]
    fn test_pagination_error_from_invalid_input() {
        let err: PaginationError<std::io::Error> = InvalidSortParameter::new("bad").into();
        assert!(err.is_client_error());
        assert!(err.into_storage().is_none());
    }

    #[test]
    fn test_pagination_error_keeps_storage_error() {
        let err: PaginationError<std::io::Error> =
            PaginationError::Storage(std::io::Error::other("connection reset"));
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "storage error: connection reset");
        let inner = err.into_storage().unwrap();
        assert_eq!(inner.to_string(), "connection reset");
    }
}
