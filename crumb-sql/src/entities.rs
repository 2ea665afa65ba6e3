//! Sort-key whitelists of the bakery application.
//!
//! One closed enum per paginated listing, plus a process-wide registry for
//! each, built on first use.
//!
//! | listing              | fields                                       | tiebreak    |
//! |----------------------|----------------------------------------------|-------------|
//! | reviews of a bakery  | `CREATED_AT`, `RATING`, `LIKE_COUNT`         | `id`        |
//! | my reviews           | `ID`                                         | `id`        |
//! | bakeries             | `ID`                                         | `id`        |
//! | search results       | `ID`                                         | `id`        |
//! | visited bakeries     | `CREATED_AT`, `REVIEW_COUNT`, `AVG_RATING`, `NAME` | `bakery_id` |
//! | liked bakeries       | `CREATED_AT`, `REVIEW_COUNT`, `AVG_RATING`, `NAME` | `bakery_id` |
//!
//! `CREATED_AT` of the visited and liked listings is derived: the time of
//! the user's latest review of (or like on) each bakery, materialized by
//! [`LatestPerGroup`](crate::LatestPerGroup) as `last_reviewed_at` /
//! `liked_at`.

use std::sync::LazyLock;

use crate::sort::{NullsPolicy, SortDescriptor, SortKey, SortKeyRegistry};
use crate::value::ColumnType;

/// Sort fields of the reviews of one bakery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ReviewSort {
    /// Review creation time.
    CreatedAt,
    /// Star rating.
    Rating,
    /// Number of likes.
    LikeCount,
}

impl SortKey for ReviewSort {
    const ENTITY: &'static str = "reviews";
    const ALL: &'static [Self] = &[Self::CreatedAt, Self::Rating, Self::LikeCount];

    fn descriptor(self) -> SortDescriptor {
        match self {
            Self::CreatedAt => {
                SortDescriptor::new("CREATED_AT", "created_at", ColumnType::Timestamp)
            },
            Self::Rating => SortDescriptor::new("RATING", "rating", ColumnType::Float),
            Self::LikeCount => SortDescriptor::new("LIKE_COUNT", "like_count", ColumnType::Integer),
        }
    }
}

/// Sort fields of the current user's own reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MyReviewSort {
    /// Review id.
    Id,
}

impl SortKey for MyReviewSort {
    const ENTITY: &'static str = "my_reviews";
    const ALL: &'static [Self] = &[Self::Id];

    fn descriptor(self) -> SortDescriptor {
        SortDescriptor::primary_key("ID", "id")
    }
}

/// Sort fields of bakery listings by area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BakerySort {
    /// Bakery id.
    Id,
}

impl SortKey for BakerySort {
    const ENTITY: &'static str = "bakeries";
    const ALL: &'static [Self] = &[Self::Id];

    fn descriptor(self) -> SortDescriptor {
        SortDescriptor::primary_key("ID", "id")
    }
}

/// Sort fields of bakery search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SearchSort {
    /// Bakery id.
    Id,
}

impl SortKey for SearchSort {
    const ENTITY: &'static str = "search_results";
    const ALL: &'static [Self] = &[Self::Id];

    fn descriptor(self) -> SortDescriptor {
        SortDescriptor::primary_key("ID", "id")
    }
}

/// Sort fields of the bakeries the user has reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum VisitedBakerySort {
    /// Time of the user's latest review of the bakery.
    CreatedAt,
    /// Total reviews of the bakery.
    ReviewCount,
    /// Average rating; NULL while unrated.
    AvgRating,
    /// Bakery name.
    Name,
}

impl SortKey for VisitedBakerySort {
    const ENTITY: &'static str = "visited_bakeries";
    const ALL: &'static [Self] = &[
        Self::CreatedAt,
        Self::ReviewCount,
        Self::AvgRating,
        Self::Name,
    ];

    fn descriptor(self) -> SortDescriptor {
        bakery_descriptor(self.into(), "last_reviewed_at")
    }
}

/// Sort fields of the bakeries the user has liked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum LikedBakerySort {
    /// Time the user liked the bakery.
    CreatedAt,
    /// Total reviews of the bakery.
    ReviewCount,
    /// Average rating; NULL while unrated.
    AvgRating,
    /// Bakery name.
    Name,
}

impl SortKey for LikedBakerySort {
    const ENTITY: &'static str = "liked_bakeries";
    const ALL: &'static [Self] = &[
        Self::CreatedAt,
        Self::ReviewCount,
        Self::AvgRating,
        Self::Name,
    ];

    fn descriptor(self) -> SortDescriptor {
        bakery_descriptor(self.into(), "liked_at")
    }
}

#[derive(Clone, Copy)]
enum BakeryField {
    CreatedAt,
    ReviewCount,
    AvgRating,
    Name,
}

impl From<VisitedBakerySort> for BakeryField {
    fn from(key: VisitedBakerySort) -> Self {
        match key {
            VisitedBakerySort::CreatedAt => Self::CreatedAt,
            VisitedBakerySort::ReviewCount => Self::ReviewCount,
            VisitedBakerySort::AvgRating => Self::AvgRating,
            VisitedBakerySort::Name => Self::Name,
        }
    }
}

impl From<LikedBakerySort> for BakeryField {
    fn from(key: LikedBakerySort) -> Self {
        match key {
            LikedBakerySort::CreatedAt => Self::CreatedAt,
            LikedBakerySort::ReviewCount => Self::ReviewCount,
            LikedBakerySort::AvgRating => Self::AvgRating,
            LikedBakerySort::Name => Self::Name,
        }
    }
}

// Visited and liked listings share their fields; only the derived
// interaction-time alias differs.
const fn bakery_descriptor(field: BakeryField, created_at_alias: &'static str) -> SortDescriptor {
    let descriptor = match field {
        BakeryField::CreatedAt => {
            SortDescriptor::derived("CREATED_AT", created_at_alias, ColumnType::Timestamp)
        },
        BakeryField::ReviewCount => {
            SortDescriptor::new("REVIEW_COUNT", "review_count", ColumnType::Integer)
        },
        BakeryField::AvgRating => SortDescriptor::new("AVG_RATING", "avg_rating", ColumnType::Float)
            .nullable(NullsPolicy::NullsLast),
        BakeryField::Name => SortDescriptor::new("NAME", "name", ColumnType::Text),
    };
    descriptor.tiebreak("BAKERY_ID", "bakery_id")
}

/// Registry of [`ReviewSort`].
pub static REVIEWS: LazyLock<SortKeyRegistry<ReviewSort>> = LazyLock::new(SortKeyRegistry::new);

/// Registry of [`MyReviewSort`].
pub static MY_REVIEWS: LazyLock<SortKeyRegistry<MyReviewSort>> =
    LazyLock::new(SortKeyRegistry::new);

/// Registry of [`BakerySort`].
pub static BAKERIES: LazyLock<SortKeyRegistry<BakerySort>> = LazyLock::new(SortKeyRegistry::new);

/// Registry of [`SearchSort`].
pub static SEARCH_RESULTS: LazyLock<SortKeyRegistry<SearchSort>> =
    LazyLock::new(SortKeyRegistry::new);

/// Registry of [`VisitedBakerySort`].
pub static VISITED_BAKERIES: LazyLock<SortKeyRegistry<VisitedBakerySort>> =
    LazyLock::new(SortKeyRegistry::new);

/// Registry of [`LikedBakerySort`].
pub static LIKED_BAKERIES: LazyLock<SortKeyRegistry<LikedBakerySort>> =
    LazyLock::new(SortKeyRegistry::new);
