//! Sort descriptors, directions and the per-entity sort-key whitelist.
//!
//! Every paginated entity declares a closed enum of the fields a client may
//! sort by. Each variant maps to a [`SortDescriptor`] that binds the
//! client-facing name to a column, its type, its NULL ordering and the
//! entity's unique tiebreak column.
//!
//! ```
//! use crumb_sql::{ColumnType, SortDescriptor, SortKey};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum BadgeSort {
//!     AcquiredAt,
//! }
//!
//! impl SortKey for BadgeSort {
//!     const ENTITY: &'static str = "badges";
//!     const ALL: &'static [Self] = &[Self::AcquiredAt];
//!
//!     fn descriptor(self) -> SortDescriptor {
//!         SortDescriptor::new("ACQUIRED_AT", "acquired_at", ColumnType::Timestamp)
//!     }
//! }
//! ```

mod registry;

use std::fmt;

use crate::value::ColumnType;

pub use registry::{ResolvedSort, SortKeyRegistry};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl Direction {
    /// Parse `ASC` / `DESC`, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Self::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Self::Descending)
        } else {
            None
        }
    }

    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Where NULLs go when the field is sorted **descending**.
///
/// Ascending order mirrors it: NULL behaves as an extreme value of the
/// domain, so reversing the direction moves NULLs to the other end. The
/// default, `NullsLast`, gives "highest rating first, unrated last" for
/// descending lists and puts unrated entries first when ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum NullsPolicy {
    /// NULLs first in descending order (NULL is the largest value).
    NullsFirst,
    /// NULLs last in descending order (NULL is the smallest value).
    #[default]
    NullsLast,
}

impl NullsPolicy {
    /// Effective NULL placement in the result sequence for `direction`.
    #[must_use]
    pub const fn placement(self, direction: Direction) -> NullsPlacement {
        match (self, direction) {
            (Self::NullsLast, Direction::Descending) | (Self::NullsFirst, Direction::Ascending) => {
                NullsPlacement::Last
            },
            (Self::NullsFirst, Direction::Descending) | (Self::NullsLast, Direction::Ascending) => {
                NullsPlacement::First
            },
        }
    }
}

/// NULL position in an emitted `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NullsPlacement {
    /// `NULLS FIRST`
    First,
    /// `NULLS LAST`
    Last,
}

impl NullsPlacement {
    /// SQL clause for this placement.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// Where a sort column lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ColumnSource {
    /// A column of the base table.
    Base,
    /// An alias materialized by a grouping step (e.g. "latest interaction
    /// per entity") before the keyset predicate is applied.
    Derived,
}

/// Static description of one sortable field of an entity.
///
/// Descriptors are built in `const` context and never per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct SortDescriptor {
    field_name: &'static str,
    column: &'static str,
    column_type: ColumnType,
    nullable: bool,
    nulls_policy: NullsPolicy,
    tiebreak_field: &'static str,
    tiebreak_column: &'static str,
    source: ColumnSource,
}

impl SortDescriptor {
    /// A non-nullable base-table sort field, tiebroken by `ID` / `id`.
    #[must_use]
    pub const fn new(
        field_name: &'static str,
        column: &'static str,
        column_type: ColumnType,
    ) -> Self {
        Self {
            field_name,
            column,
            column_type,
            nullable: false,
            nulls_policy: NullsPolicy::NullsLast,
            tiebreak_field: "ID",
            tiebreak_column: "id",
            source: ColumnSource::Base,
        }
    }

    /// A sort field read from a derived (grouped) column alias.
    #[must_use]
    pub const fn derived(
        field_name: &'static str,
        alias: &'static str,
        column_type: ColumnType,
    ) -> Self {
        let mut descriptor = Self::new(field_name, alias, column_type);
        descriptor.source = ColumnSource::Derived;
        descriptor
    }

    /// An integer primary key that is its own tiebreak.
    ///
    /// Listings sorted this way use the simple cursor format.
    #[must_use]
    pub const fn primary_key(field_name: &'static str, column: &'static str) -> Self {
        let mut descriptor = Self::new(field_name, column, ColumnType::Integer);
        descriptor.tiebreak_field = field_name;
        descriptor.tiebreak_column = column;
        descriptor
    }

    /// Set the tiebreak field and column.
    #[must_use]
    pub const fn tiebreak(mut self, field_name: &'static str, column: &'static str) -> Self {
        self.tiebreak_field = field_name;
        self.tiebreak_column = column;
        self
    }

    /// Mark the column nullable with the given NULL ordering.
    #[must_use]
    pub const fn nullable(mut self, policy: NullsPolicy) -> Self {
        self.nullable = true;
        self.nulls_policy = policy;
        self
    }

    /// Client-facing field name (e.g. `LIKE_COUNT`).
    #[inline]
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        self.field_name
    }

    /// SQL column or derived alias.
    #[inline]
    #[must_use]
    pub const fn column(&self) -> &'static str {
        self.column
    }

    /// Semantic type of the column.
    #[inline]
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Whether the column may hold NULL.
    #[inline]
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// NULL ordering policy.
    #[inline]
    #[must_use]
    pub const fn nulls_policy(&self) -> NullsPolicy {
        self.nulls_policy
    }

    /// Client-facing name of the tiebreak field.
    #[inline]
    #[must_use]
    pub const fn tiebreak_field(&self) -> &'static str {
        self.tiebreak_field
    }

    /// SQL column of the tiebreak field.
    #[inline]
    #[must_use]
    pub const fn tiebreak_column(&self) -> &'static str {
        self.tiebreak_column
    }

    /// Where the column lives.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> ColumnSource {
        self.source
    }

    /// Whether the sort column is the tiebreak column itself.
    #[must_use]
    pub fn is_own_tiebreak(&self) -> bool {
        self.column == self.tiebreak_column
    }

    /// NULL placement to emit for `direction`, `None` for non-nullable columns.
    #[must_use]
    pub const fn nulls_placement(&self, direction: Direction) -> Option<NullsPlacement> {
        if self.nullable {
            Some(self.nulls_policy.placement(direction))
        } else {
            None
        }
    }
}

/// A closed set of sort fields for one entity.
///
/// Implemented by a fieldless enum, one variant per whitelisted field.
pub trait SortKey: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Entity name, used in diagnostics and logs.
    const ENTITY: &'static str;

    /// Every variant, in the order they should be listed.
    const ALL: &'static [Self];

    /// Descriptor of this field.
    fn descriptor(self) -> SortDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_case_insensitive() {
        assert_eq!(Direction::parse("DESC"), Some(Direction::Descending));
        assert_eq!(Direction::parse("desc"), Some(Direction::Descending));
        assert_eq!(Direction::parse("Asc"), Some(Direction::Ascending));
        assert_eq!(Direction::parse("ascending"), None);
        assert_eq!(Direction::parse(""), None);
    }

    #[test]
    fn test_nulls_policy_mirrors_with_direction() {
        let last = NullsPolicy::NullsLast;
        assert_eq!(last.placement(Direction::Descending), NullsPlacement::Last);
        assert_eq!(last.placement(Direction::Ascending), NullsPlacement::First);

        let first = NullsPolicy::NullsFirst;
        assert_eq!(first.placement(Direction::Descending), NullsPlacement::First);
        assert_eq!(first.placement(Direction::Ascending), NullsPlacement::Last);
    }

    #[test]
    fn test_descriptor_defaults() {
        const RATING: SortDescriptor = SortDescriptor::new("RATING", "rating", ColumnType::Float);
        assert_eq!(RATING.tiebreak_column(), "id");
        assert_eq!(RATING.source(), ColumnSource::Base);
        assert!(!RATING.is_nullable());
        assert!(!RATING.is_own_tiebreak());
        assert_eq!(RATING.nulls_placement(Direction::Descending), None);
    }

    #[test]
    fn test_primary_key_descriptor_is_own_tiebreak() {
        let id = SortDescriptor::primary_key("ID", "id");
        assert!(id.is_own_tiebreak());
        assert_eq!(id.column_type(), ColumnType::Integer);
        assert_eq!(id.tiebreak_field(), "ID");
    }

    #[test]
    fn test_derived_nullable_descriptor() {
        let d = SortDescriptor::derived("CREATED_AT", "last_reviewed_at", ColumnType::Timestamp)
            .tiebreak("BAKERY_ID", "bakery_id")
            .nullable(NullsPolicy::NullsFirst);
        assert_eq!(d.source(), ColumnSource::Derived);
        assert_eq!(d.column(), "last_reviewed_at");
        assert_eq!(d.tiebreak_column(), "bakery_id");
        assert_eq!(
            d.nulls_placement(Direction::Descending),
            Some(NullsPlacement::First)
        );
    }
}
