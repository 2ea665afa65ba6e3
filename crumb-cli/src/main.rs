//! `crumb` - inspect keyset pagination from the command line.
//!
//! ```text
//! crumb explain --entity reviews --sort LIKE_COUNT.DESC --cursor '5||1' --size 2
//! crumb encode --entity visited-bakeries --sort AVG_RATING.DESC --value null --id 7
//! crumb decode --entity reviews --sort CREATED_AT.DESC '2024-05-01T09:00:00+09:00||12'
//! crumb fields --entity liked-bakeries
//! ```
//!
//! Set `RUST_LOG` (or pass `--verbose`) to see why a sort clause or cursor
//! was rejected.

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, DialectArg, Entity};
use crumb_sql::entities;
use crumb_sql::{
    CursorCodec, CursorFormat, Dialect, InvalidSortParameter, KeysetPlan, LatestPerGroup,
    Operator, PageQuery, PagingConfig, Paginator, Postgres, QueryResult, SortDescriptor, SortKey,
    SortKeyRegistry, Sqlite, Value, decode_value, encode_value,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "crumb", version, about = "Keyset pagination inspector")]
struct Cli {
    #[arg(long, global = true, help = "Paging config file (TOML)")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log engine decisions at debug level")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Run `$body` with `$registry` bound to the entity's sort-key registry.
macro_rules! with_registry {
    ($entity:expr, |$registry:ident| $body:expr) => {
        match $entity {
            Entity::Reviews => {
                let $registry = &*entities::REVIEWS;
                $body
            },
            Entity::MyReviews => {
                let $registry = &*entities::MY_REVIEWS;
                $body
            },
            Entity::Bakeries => {
                let $registry = &*entities::BAKERIES;
                $body
            },
            Entity::SearchResults => {
                let $registry = &*entities::SEARCH_RESULTS;
                $body
            },
            Entity::VisitedBakeries => {
                let $registry = &*entities::VISITED_BAKERIES;
                $body
            },
            Entity::LikedBakeries => {
                let $registry = &*entities::LIKED_BAKERIES;
                $body
            },
        }
    };
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Explain {
            entity,
            sort,
            cursor,
            size,
            dialect,
            scope,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let page_size = config.page_size(size)?;
            let (descriptor, plan) =
                with_registry!(entity, |registry| plan_for(registry, &sort, &cursor))?;
            debug!(?entity, field = descriptor.field_name(), page_size, "explain");

            // One row past the page decides `has_next`.
            let limit = page_size.saturating_add(1);
            let query = match dialect {
                DialectArg::Postgres => render(Postgres, entity, scope, &plan, limit),
                DialectArg::Sqlite => render(Sqlite, entity, scope, &plan, limit),
            };

            println!(
                "-- {} {}, page size {page_size}",
                descriptor.field_name(),
                plan.order_by
                    .first()
                    .map_or("", |term| term.direction.as_sql())
            );
            println!("{}", query.sql);
            for (i, param) in query.params.iter().enumerate() {
                let placeholder = match dialect {
                    DialectArg::Postgres => Postgres.param(i + 1),
                    DialectArg::Sqlite => Sqlite.param(i + 1),
                };
                println!("-- {placeholder} = {}", describe(param));
            }
        },
        Commands::Encode {
            entity,
            sort,
            value,
            id,
        } => {
            let descriptor = with_registry!(entity, |registry| descriptor_for(registry, &sort))?;
            let codec = CursorCodec::for_descriptor(&descriptor);
            let value = decode_value(&value, descriptor.column_type(), descriptor.is_nullable())
                .with_context(|| format!("invalid {} value", descriptor.column_type()))?;
            println!("{}", codec.encode(&value, id));
        },
        Commands::Decode {
            entity,
            sort,
            token,
        } => {
            let descriptor = with_registry!(entity, |registry| descriptor_for(registry, &sort))?;
            let codec = CursorCodec::for_descriptor(&descriptor);
            match codec.decode(&token)? {
                None => println!("first page"),
                Some(cursor) => {
                    if codec.format() == CursorFormat::Composite {
                        println!(
                            "{} = {}",
                            descriptor.column(),
                            describe(&cursor.sort_value)
                        );
                    }
                    println!(
                        "{} = {}",
                        descriptor.tiebreak_column(),
                        cursor.tiebreak_value
                    );
                },
            }
        },
        Commands::Fields { entity } => {
            with_registry!(entity, |registry| print_fields(registry));
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<PagingConfig> {
    let Some(path) = path else {
        return Ok(PagingConfig::default());
    };
    let config = PagingConfig::from_file(path)
        .with_context(|| format!("loading {}", path.display()))?;
    info!(
        path = %path.display(),
        default_page_size = config.default_page_size,
        max_page_size = config.max_page_size,
        "loaded paging config"
    );
    Ok(config)
}

fn plan_for<K: SortKey>(
    registry: &SortKeyRegistry<K>,
    sort: &str,
    cursor: &str,
) -> Result<(SortDescriptor, KeysetPlan), InvalidSortParameter> {
    let (resolved, plan) = Paginator::new(registry).plan(sort, cursor)?;
    Ok((resolved.descriptor, plan))
}

fn descriptor_for<K: SortKey>(
    registry: &SortKeyRegistry<K>,
    sort: &str,
) -> Result<SortDescriptor, InvalidSortParameter> {
    registry.resolve(sort).map(|resolved| resolved.descriptor)
}

fn print_fields<K: SortKey>(registry: &SortKeyRegistry<K>) {
    println!("{}:", registry.entity());
    for key in K::ALL {
        let d = registry.descriptor(*key);
        let nulls = if d.is_nullable() { ", nullable" } else { "" };
        println!(
            "  {:<14} {} ({}{nulls}), tiebreak {}",
            d.field_name(),
            d.column(),
            d.column_type(),
            d.tiebreak_column()
        );
    }
}

/// The base relation of each listing, with its scope filter applied.
fn page_query<D: Dialect>(dialect: D, entity: Entity, scope: i64) -> PageQuery<D> {
    let latest = |table: &str, alias: &str, name: &str| {
        let subquery = LatestPerGroup::new(table, "bakery_id", "created_at", alias)
            .filter("user_id", Operator::Eq, Value::Int(scope))
            .join("bakeries", "id", &["name", "review_count", "avg_rating"])
            .alias(name)
            .build(dialect);
        PageQuery::from_subquery(dialect, subquery)
    };

    match entity {
        Entity::Reviews => {
            PageQuery::new(dialect, "reviews").filter("bakery_id", Operator::Eq, Value::Int(scope))
        },
        Entity::MyReviews => {
            PageQuery::new(dialect, "reviews").filter("user_id", Operator::Eq, Value::Int(scope))
        },
        Entity::Bakeries | Entity::SearchResults => PageQuery::new(dialect, "bakeries"),
        Entity::VisitedBakeries => latest("reviews", "last_reviewed_at", "visited"),
        Entity::LikedBakeries => latest("bakery_likes", "liked_at", "liked"),
    }
}

fn render<D: Dialect>(
    dialect: D,
    entity: Entity,
    scope: i64,
    plan: &KeysetPlan,
    limit: usize,
) -> QueryResult {
    page_query(dialect, entity, scope)
        .keyset(plan)
        .limit(limit)
        .build()
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Text(s) => format!("'{s}'"),
        other => encode_value(other),
    }
}
