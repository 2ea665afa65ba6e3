//! Opaque cursor tokens: type-directed encoding and decoding.

use chrono::{DateTime, SecondsFormat};
use tracing::debug;

use crate::error::InvalidSortParameter;
use crate::sort::SortDescriptor;
use crate::value::{ColumnType, Value};

/// Separator between the sort value and the tiebreak in composite tokens.
pub const DELIMITER: &str = "||";

/// "Start of the sequence" token for simple cursors.
pub const SIMPLE_SENTINEL: &str = "0";

/// "Start of the sequence" token for composite cursors.
pub const COMPOSITE_SENTINEL: &str = "0||0";

/// Token of a NULL sort value. Only nullable (never text) columns produce it.
pub const NULL_TOKEN: &str = "null";

/// Maximum accepted token size in bytes (4KB).
const MAX_CURSOR_SIZE: usize = 4 * 1024;

/// A decoded cursor: the boundary row the next page starts from.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Cursor {
    /// Sort value of the boundary row.
    pub sort_value: Value,
    /// Tiebreak (primary key) of the boundary row.
    pub tiebreak_value: i64,
}

impl Cursor {
    /// Create a cursor from a boundary row's values.
    pub fn new(sort_value: impl Into<Value>, tiebreak_value: i64) -> Self {
        Self {
            sort_value: sort_value.into(),
            tiebreak_value,
        }
    }
}

/// Wire format of a cursor token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CursorFormat {
    /// `"<id>"`, for listings sorted by their own primary key.
    Simple,
    /// `"<sort_value>||<id>"`.
    Composite,
}

/// Encodes and decodes cursor tokens for one sort field.
///
/// The token is opaque to clients: they receive it in `next_cursor` and
/// send it back unchanged. `"0"` and `"0||0"` are reserved and always
/// decode to "first page", whatever the format.
///
/// ```
/// use crumb_sql::{ColumnType, CursorCodec, SortDescriptor, Value};
///
/// let likes = SortDescriptor::new("LIKE_COUNT", "like_count", ColumnType::Integer);
/// let codec = CursorCodec::for_descriptor(&likes);
///
/// let token = codec.encode(&Value::Int(5), 1);
/// assert_eq!(token, "5||1");
///
/// let cursor = codec.decode(&token).unwrap().unwrap();
/// assert_eq!(cursor.sort_value, Value::Int(5));
/// assert_eq!(cursor.tiebreak_value, 1);
///
/// assert!(codec.decode("0||0").unwrap().is_none());
/// assert!(codec.decode("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorCodec {
    column_type: ColumnType,
    nullable: bool,
    format: CursorFormat,
}

impl CursorCodec {
    /// Codec matching a descriptor: simple when the field is its own
    /// tiebreak, composite otherwise.
    #[must_use]
    pub fn for_descriptor(descriptor: &SortDescriptor) -> Self {
        let format = if descriptor.is_own_tiebreak() {
            CursorFormat::Simple
        } else {
            CursorFormat::Composite
        };
        Self {
            column_type: descriptor.column_type(),
            nullable: descriptor.is_nullable(),
            format,
        }
    }

    /// Composite codec for a sort value of `column_type`.
    #[must_use]
    pub const fn composite(column_type: ColumnType, nullable: bool) -> Self {
        Self {
            column_type,
            nullable,
            format: CursorFormat::Composite,
        }
    }

    /// Simple codec for integer primary keys.
    #[must_use]
    pub const fn simple() -> Self {
        Self {
            column_type: ColumnType::Integer,
            nullable: false,
            format: CursorFormat::Simple,
        }
    }

    /// Wire format of this codec.
    #[inline]
    #[must_use]
    pub const fn format(&self) -> CursorFormat {
        self.format
    }

    /// The "first page" token of this codec's format.
    #[must_use]
    pub const fn start(&self) -> &'static str {
        match self.format {
            CursorFormat::Simple => SIMPLE_SENTINEL,
            CursorFormat::Composite => COMPOSITE_SENTINEL,
        }
    }

    /// Returns `true` for either reserved "first page" token.
    #[inline]
    #[must_use]
    pub fn is_sentinel(token: &str) -> bool {
        token == SIMPLE_SENTINEL || token == COMPOSITE_SENTINEL
    }

    /// Encode a boundary row.
    ///
    /// Simple tokens carry only the tiebreak, which is the sort value.
    /// A real value that would spell a sentinel gets an explicit `+` on its
    /// trailing integer (`"+0"`, `"0||+0"`), which still decodes to zero.
    #[must_use]
    pub fn encode(&self, sort_value: &Value, tiebreak_value: i64) -> String {
        match self.format {
            CursorFormat::Simple => {
                if tiebreak_value == 0 {
                    "+0".to_string()
                } else {
                    tiebreak_value.to_string()
                }
            },
            CursorFormat::Composite => encode_composite(sort_value, tiebreak_value),
        }
    }

    /// Decode a token. `Ok(None)` means "first page".
    pub fn decode(&self, token: &str) -> Result<Option<Cursor>, InvalidSortParameter> {
        let result = self.decode_inner(token);
        if let Err(err) = &result {
            debug!(
                format = ?self.format,
                column_type = %self.column_type,
                reason = err.detail(),
                "rejected cursor"
            );
        }
        result
    }

    fn decode_inner(&self, token: &str) -> Result<Option<Cursor>, InvalidSortParameter> {
        if token.len() > MAX_CURSOR_SIZE {
            return Err(InvalidSortParameter::new(format!(
                "cursor exceeds maximum size ({}KB limit)",
                MAX_CURSOR_SIZE / 1024
            )));
        }
        if Self::is_sentinel(token) {
            return Ok(None);
        }

        match self.format {
            CursorFormat::Simple => {
                let id = decode_tiebreak(token)?;
                Ok(Some(Cursor::new(Value::Int(id), id)))
            },
            CursorFormat::Composite => {
                // The tiebreak is an integer, so the last delimiter is the split
                // point even when a text sort value contains `|`.
                let Some((sort, tiebreak)) = token.rsplit_once(DELIMITER) else {
                    return Err(InvalidSortParameter::new(format!(
                        "cursor must be <sort_value>{DELIMITER}<id>"
                    )));
                };
                let sort_value = decode_value(sort, self.column_type, self.nullable)?;
                let tiebreak_value = decode_tiebreak(tiebreak)?;
                Ok(Some(Cursor {
                    sort_value,
                    tiebreak_value,
                }))
            },
        }
    }
}

pub(crate) fn encode_composite(sort_value: &Value, tiebreak_value: i64) -> String {
    let token = format!("{}{DELIMITER}{tiebreak_value}", encode_value(sort_value));
    if token == COMPOSITE_SENTINEL {
        format!("0{DELIMITER}+0")
    } else {
        token
    }
}

/// Render one value as cursor text.
///
/// Integers and floats use canonical decimal (floats in their shortest
/// round-trip form), timestamps RFC 3339 with an explicit offset, text is
/// written verbatim.
///
/// NaN and infinities encode as `NaN`/`inf`, which [`decode_value`]
/// rejects: a float sort column must hold finite values (or NULL on a
/// nullable field) for its cursors to be usable.
#[must_use]
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::Null => NULL_TOKEN.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        Value::Text(s) => s.clone(),
    }
}

/// Parse cursor text as a value of `column_type`.
pub fn decode_value(
    s: &str,
    column_type: ColumnType,
    nullable: bool,
) -> Result<Value, InvalidSortParameter> {
    if nullable && s == NULL_TOKEN {
        return Ok(Value::Null);
    }

    match column_type {
        ColumnType::Integer => s
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| InvalidSortParameter::new(format!("{s:?} is not an integer"))),
        ColumnType::Float => match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            _ => Err(InvalidSortParameter::new(format!(
                "{s:?} is not a finite number"
            ))),
        },
        ColumnType::Timestamp => DateTime::parse_from_rfc3339(s)
            .map(Value::Timestamp)
            .map_err(|e| {
                InvalidSortParameter::new(format!("{s:?} is not an RFC 3339 timestamp: {e}"))
            }),
        ColumnType::Text => Ok(Value::Text(s.to_string())),
    }
}

fn decode_tiebreak(s: &str) -> Result<i64, InvalidSortParameter> {
    s.parse::<i64>()
        .map_err(|_| InvalidSortParameter::new(format!("cursor id {s:?} is not an integer")))
}
