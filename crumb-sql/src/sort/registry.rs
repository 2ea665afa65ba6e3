//! Sort clause resolution against a per-entity whitelist.

use tracing::debug;

use super::{Direction, SortDescriptor, SortKey};
use crate::error::InvalidSortParameter;
use crate::validate::assert_valid_column_ref;
use crate::value::ColumnType;

/// A sort clause resolved against a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResolvedSort<K> {
    /// The whitelisted field.
    pub key: K,
    /// Its descriptor.
    pub descriptor: SortDescriptor,
    /// Requested direction.
    pub direction: Direction,
}

/// Process-wide, read-only whitelist of the sort fields of one entity.
///
/// Build it once at startup and share it freely; resolution has no side
/// effects.
///
/// ```
/// use std::sync::LazyLock;
/// use crumb_sql::entities::ReviewSort;
/// use crumb_sql::{Direction, SortKeyRegistry};
///
/// static REVIEWS: LazyLock<SortKeyRegistry<ReviewSort>> = LazyLock::new(SortKeyRegistry::new);
///
/// let sort = REVIEWS.resolve("like_count.desc").unwrap();
/// assert_eq!(sort.key, ReviewSort::LikeCount);
/// assert_eq!(sort.direction, Direction::Descending);
/// assert!(REVIEWS.resolve("password.desc").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SortKeyRegistry<K: SortKey> {
    entries: Vec<(K, SortDescriptor)>,
}

impl<K: SortKey> SortKeyRegistry<K> {
    /// Build the registry from `K::ALL`.
    ///
    /// # Panics
    ///
    /// Panics if the descriptors break an invariant: no fields, duplicate
    /// field names, invalid column references, a nullable text field, a
    /// field name containing `.`, or fields disagreeing on the tiebreak.
    pub fn new() -> Self {
        let entries: Vec<(K, SortDescriptor)> =
            K::ALL.iter().map(|key| (*key, key.descriptor())).collect();
        let entity = K::ENTITY;

        let Some((_, first)) = entries.first() else {
            panic!("{entity}: sort registry has no fields");
        };
        let tiebreak = first.tiebreak_column();
        for (i, (key, d)) in entries.iter().enumerate() {
            let name = d.field_name();
            assert!(
                !name.is_empty() && !name.contains('.'),
                "{entity}: sort field name {name:?} must be non-empty and contain no '.'"
            );
            assert_valid_column_ref(d.column(), "sort column");
            assert_valid_column_ref(d.tiebreak_column(), "tiebreak column");
            assert!(
                !(d.is_nullable() && d.column_type() == ColumnType::Text),
                "{entity}: text sort field {name} must not be nullable"
            );
            assert!(
                !d.is_own_tiebreak() || d.column_type() == ColumnType::Integer,
                "{entity}: {name} is its own tiebreak and must be an integer"
            );
            assert!(
                !(d.is_own_tiebreak() && d.is_nullable()),
                "{entity}: {name} is its own tiebreak and must not be nullable"
            );
            assert_eq!(
                d.tiebreak_column(),
                tiebreak,
                "{entity}: {key:?} uses a different tiebreak column"
            );
            let duplicate = entries
                .iter()
                .take(i)
                .any(|(_, other)| other.field_name().eq_ignore_ascii_case(name));
            assert!(!duplicate, "{entity}: duplicate sort field {name}");
        }

        Self { entries }
    }

    /// Entity name of this registry.
    #[inline]
    #[must_use]
    pub const fn entity(&self) -> &'static str {
        K::ENTITY
    }

    /// Resolve a `"<FIELD>.<DIRECTION>"` clause, case-insensitively.
    pub fn resolve(&self, sort_clause: &str) -> Result<ResolvedSort<K>, InvalidSortParameter> {
        let result = self.resolve_inner(sort_clause);
        if let Err(err) = &result {
            debug!(
                entity = K::ENTITY,
                sort_clause,
                reason = err.detail(),
                "rejected sort clause"
            );
        }
        result
    }

    fn resolve_inner(&self, sort_clause: &str) -> Result<ResolvedSort<K>, InvalidSortParameter> {
        let mut parts = sort_clause.trim().split('.');
        let (field, dir) = match (parts.next(), parts.next(), parts.next()) {
            (Some(field), Some(dir), None) if !field.is_empty() && !dir.is_empty() => {
                (field, dir)
            },
            _ => {
                return Err(InvalidSortParameter::new(format!(
                    "sort clause {sort_clause:?} must be <FIELD>.<DIRECTION>"
                )));
            },
        };

        let (key, descriptor) = self
            .entries
            .iter()
            .find(|(_, d)| d.field_name().eq_ignore_ascii_case(field))
            .copied()
            .ok_or_else(|| {
                InvalidSortParameter::new(format!(
                    "{} cannot be sorted by {field:?}",
                    K::ENTITY
                ))
            })?;

        let direction = Direction::parse(dir).ok_or_else(|| {
            InvalidSortParameter::new(format!("unknown sort direction {dir:?}"))
        })?;

        Ok(ResolvedSort {
            key,
            descriptor,
            direction,
        })
    }

    /// Descriptor of a key.
    #[must_use]
    pub fn descriptor(&self, key: K) -> SortDescriptor {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map_or_else(|| key.descriptor(), |(_, d)| *d)
    }

    /// Client-facing names of all whitelisted fields.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(_, d)| d.field_name())
    }
}

impl<K: SortKey> Default for SortKeyRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::NullsPolicy;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum ReviewKey {
        CreatedAt,
        Rating,
        LikeCount,
    }

    impl SortKey for ReviewKey {
        const ENTITY: &'static str = "reviews";
        const ALL: &'static [Self] = &[Self::CreatedAt, Self::Rating, Self::LikeCount];

        fn descriptor(self) -> SortDescriptor {
            match self {
                Self::CreatedAt => {
                    SortDescriptor::new("CREATED_AT", "created_at", ColumnType::Timestamp)
                },
                Self::Rating => SortDescriptor::new("RATING", "rating", ColumnType::Float),
                Self::LikeCount => {
                    SortDescriptor::new("LIKE_COUNT", "like_count", ColumnType::Integer)
                },
            }
        }
    }

    #[test]
    fn test_resolve_valid_clause() {
        let registry = SortKeyRegistry::<ReviewKey>::new();
        let sort = registry.resolve("LIKE_COUNT.DESC").unwrap();
        assert_eq!(sort.key, ReviewKey::LikeCount);
        assert_eq!(sort.descriptor.column(), "like_count");
        assert_eq!(sort.direction, Direction::Descending);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = SortKeyRegistry::<ReviewKey>::new();
        let sort = registry.resolve("rating.asc").unwrap();
        assert_eq!(sort.key, ReviewKey::Rating);
        assert_eq!(sort.direction, Direction::Ascending);

        let sort = registry.resolve("Created_At.Desc").unwrap();
        assert_eq!(sort.key, ReviewKey::CreatedAt);
    }

    #[test]
    fn test_resolve_rejects_malformed_clauses() {
        let registry = SortKeyRegistry::<ReviewKey>::new();
        for clause in [
            "RATING",
            "RATING.",
            ".DESC",
            "",
            ".",
            "RATING.DESC.EXTRA",
            "RATING..DESC",
        ] {
            assert!(registry.resolve(clause).is_err(), "accepted {clause:?}");
        }
    }

    #[test]
    fn test_resolve_rejects_unknown_field_and_direction() {
        let registry = SortKeyRegistry::<ReviewKey>::new();
        let err = registry.resolve("PASSWORD.DESC").unwrap_err();
        assert!(err.detail().contains("PASSWORD"));

        let err = registry.resolve("RATING.SIDEWAYS").unwrap_err();
        assert!(err.detail().contains("SIDEWAYS"));
    }

    #[test]
    fn test_resolve_does_not_pass_columns_through() {
        // The column name is not a valid field name, only the client-facing one is.
        let registry = SortKeyRegistry::<ReviewKey>::new();
        assert!(registry.resolve("like_count.desc").is_ok());
        assert!(registry.resolve("id.desc").is_err());
    }

    #[test]
    fn test_field_names() {
        let registry = SortKeyRegistry::<ReviewKey>::new();
        let names: Vec<_> = registry.field_names().collect();
        assert_eq!(names, ["CREATED_AT", "RATING", "LIKE_COUNT"]);
        assert_eq!(registry.entity(), "reviews");
        assert_eq!(registry.descriptor(ReviewKey::Rating).field_name(), "RATING");
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum NullableName {
        Name,
    }

    impl SortKey for NullableName {
        const ENTITY: &'static str = "broken";
        const ALL: &'static [Self] = &[Self::Name];

        fn descriptor(self) -> SortDescriptor {
            SortDescriptor::new("NAME", "name", ColumnType::Text).nullable(NullsPolicy::NullsLast)
        }
    }

    #[test]
    #[should_panic(expected = "must not be nullable")]
    fn test_nullable_text_is_rejected() {
        let _ = SortKeyRegistry::<NullableName>::new();
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Duplicated {
        A,
        B,
    }

    impl SortKey for Duplicated {
        const ENTITY: &'static str = "broken";
        const ALL: &'static [Self] = &[Self::A, Self::B];

        fn descriptor(self) -> SortDescriptor {
            match self {
                Self::A => SortDescriptor::new("NAME", "name", ColumnType::Text),
                Self::B => SortDescriptor::new("name", "title", ColumnType::Text),
            }
        }
    }

    #[test]
    #[should_panic(expected = "duplicate sort field")]
    fn test_duplicate_field_is_rejected() {
        let _ = SortKeyRegistry::<Duplicated>::new();
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum NoFields {}

    impl SortKey for NoFields {
        const ENTITY: &'static str = "empty";
        const ALL: &'static [Self] = &[];

        fn descriptor(self) -> SortDescriptor {
            match self {}
        }
    }

    #[test]
    #[should_panic(expected = "empty: sort registry has no fields")]
    fn test_empty_registry_is_rejected() {
        let _ = SortKeyRegistry::<NoFields>::new();
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SplitTiebreak {
        Likes,
        Rating,
    }

    impl SortKey for SplitTiebreak {
        const ENTITY: &'static str = "broken";
        const ALL: &'static [Self] = &[Self::Likes, Self::Rating];

        fn descriptor(self) -> SortDescriptor {
            match self {
                Self::Likes => SortDescriptor::new("LIKES", "like_count", ColumnType::Integer),
                Self::Rating => SortDescriptor::new("RATING", "rating", ColumnType::Float)
                    .tiebreak("REVIEW_ID", "review_id"),
            }
        }
    }

    #[test]
    #[should_panic(expected = "uses a different tiebreak column")]
    fn test_tiebreak_must_match_first_field() {
        let _ = SortKeyRegistry::<SplitTiebreak>::new();
    }
}
