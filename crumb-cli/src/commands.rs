use clap::{Subcommand, ValueEnum};

#[derive(Subcommand)]
pub enum Commands {
    /// Render the SQL of one page fetch
    Explain {
        #[arg(long, value_enum, help = "Listing to paginate")]
        entity: Entity,

        #[arg(long, help = "Sort clause, e.g. LIKE_COUNT.DESC")]
        sort: String,

        #[arg(long, default_value = "0||0", help = "Cursor token from the previous page")]
        cursor: String,

        #[arg(long, help = "Requested page size (default and clamp come from the config)")]
        size: Option<u32>,

        #[arg(long, value_enum, default_value_t = DialectArg::Postgres)]
        dialect: DialectArg,

        #[arg(
            long,
            default_value_t = 1,
            help = "Scope id: the bakery for reviews, the user for my/visited/liked listings"
        )]
        scope: i64,
    },
    /// Encode a cursor token for a sort field
    Encode {
        #[arg(long, value_enum)]
        entity: Entity,

        #[arg(long, help = "Sort clause; only the field matters")]
        sort: String,

        /// Sort value as text (`null` for NULL on nullable fields)
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Tiebreak id of the row
        #[arg(long, allow_hyphen_values = true)]
        id: i64,
    },
    /// Decode a cursor token for a sort field
    Decode {
        #[arg(long, value_enum)]
        entity: Entity,

        #[arg(long, help = "Sort clause; only the field matters")]
        sort: String,

        /// Token to decode
        #[arg(allow_hyphen_values = true)]
        token: String,
    },
    /// List the sortable fields of a listing
    Fields {
        #[arg(long, value_enum)]
        entity: Entity,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Entity {
    Reviews,
    MyReviews,
    Bakeries,
    SearchResults,
    VisitedBakeries,
    LikedBakeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Postgres,
    Sqlite,
}
