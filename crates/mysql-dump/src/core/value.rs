//! SQL value types for rows read from the source database.

use std::borrow::Cow;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use super::schema::Column;

/// A single column value.
///
/// Uses `Cow` for string and byte data so a source can hand out borrowed
/// buffers; use [`SqlValue::into_owned`] before storing past the buffer.
///
/// # Example
///
/// ```rust
/// use std::borrow::Cow;
/// use mysql_dump::core::SqlValue;
///
/// let borrowed: SqlValue<'_> = SqlValue::Text(Cow::Borrowed("hello"));
/// let owned: SqlValue<'static> = borrowed.into_owned();
/// assert_eq!(owned.to_string(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue<'a> {
    /// SQL NULL.
    Null,

    /// Boolean value (TINYINT(1) / BOOLEAN / BIT(1)).
    Bool(bool),

    /// Signed integer.
    Int(i64),

    /// Unsigned integer.
    UInt(u64),

    /// Floating point (FLOAT/DOUBLE).
    Float(f64),

    /// Exact numeric (DECIMAL/NUMERIC).
    Decimal(Decimal),

    /// Text data.
    Text(Cow<'a, str>),

    /// Binary data.
    Bytes(Cow<'a, [u8]>),

    /// Date without time component.
    Date(NaiveDate),

    /// Time without date component.
    Time(NaiveTime),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),
}

impl<'a> SqlValue<'a> {
    /// Convert to a fully owned value with `'static` lifetime.
    #[must_use]
    pub fn into_owned(self) -> SqlValue<'static> {
        match self {
            SqlValue::Null => SqlValue::Null,
            SqlValue::Bool(v) => SqlValue::Bool(v),
            SqlValue::Int(v) => SqlValue::Int(v),
            SqlValue::UInt(v) => SqlValue::UInt(v),
            SqlValue::Float(v) => SqlValue::Float(v),
            SqlValue::Decimal(v) => SqlValue::Decimal(v),
            SqlValue::Text(v) => SqlValue::Text(Cow::Owned(v.into_owned())),
            SqlValue::Bytes(v) => SqlValue::Bytes(Cow::Owned(v.into_owned())),
            SqlValue::Date(v) => SqlValue::Date(v),
            SqlValue::Time(v) => SqlValue::Time(v),
            SqlValue::DateTime(v) => SqlValue::DateTime(v),
        }
    }

    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view of the value, if it has one. Booleans map to 0/1.
    #[must_use]
    pub fn as_integer_text(&self) -> Option<String> {
        match self {
            SqlValue::Bool(v) => Some(if *v { "1" } else { "0" }.to_string()),
            SqlValue::Int(v) => Some(v.to_string()),
            SqlValue::UInt(v) => Some(v.to_string()),
            _ => None,
        }
    }

    /// Create a text value from an owned String.
    #[must_use]
    pub fn text_owned(s: String) -> SqlValue<'static> {
        SqlValue::Text(Cow::Owned(s))
    }

    /// Create a bytes value from an owned Vec<u8>.
    #[must_use]
    pub fn bytes_owned(b: Vec<u8>) -> SqlValue<'static> {
        SqlValue::Bytes(Cow::Owned(b))
    }
}

/// Textual form of the value as the server would print it. Binary data is
/// shown as lossy UTF-8; the literal writer handles raw bytes separately.
impl fmt::Display for SqlValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(v) => f.write_str(if *v { "1" } else { "0" }),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::UInt(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Decimal(v) => write!(f, "{}", v),
            SqlValue::Text(v) => f.write_str(v),
            SqlValue::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
            SqlValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            SqlValue::Time(v) => write!(f, "{}", v.format("%H:%M:%S%.f")),
            SqlValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl From<bool> for SqlValue<'static> {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue<'static> {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i64> for SqlValue<'static> {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<u64> for SqlValue<'static> {
    fn from(v: u64) -> Self {
        SqlValue::UInt(v)
    }
}

impl From<f64> for SqlValue<'static> {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<String> for SqlValue<'static> {
    fn from(v: String) -> Self {
        SqlValue::Text(Cow::Owned(v))
    }
}

impl<'a> From<&'a str> for SqlValue<'a> {
    fn from(v: &'a str) -> Self {
        SqlValue::Text(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for SqlValue<'static> {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(Cow::Owned(v))
    }
}

impl From<Decimal> for SqlValue<'static> {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<NaiveDate> for SqlValue<'static> {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue<'static> {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl From<NaiveDateTime> for SqlValue<'static> {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

impl<T> From<Option<T>> for SqlValue<'static>
where
    T: Into<SqlValue<'static>>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// All rows of one table plus the column metadata of the live result.
///
/// Columns are in result order; every row has one value per column in the
/// same order.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    /// Column metadata from the result set.
    pub columns: Vec<Column>,

    /// Row values, owned.
    pub rows: Vec<Vec<SqlValue<'static>>>,
}

impl RowSet {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<SqlValue<'static>>>) -> Self {
        Self { columns, rows }
    }

    /// Get the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result had no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_into_owned() {
        let borrowed: SqlValue<'_> = SqlValue::Text(Cow::Borrowed("hello"));
        let owned: SqlValue<'static> = borrowed.into_owned();
        assert_eq!(owned, SqlValue::Text(Cow::Owned("hello".to_string())));
    }

    #[test]
    fn test_integer_text() {
        assert_eq!(SqlValue::Int(-7).as_integer_text().as_deref(), Some("-7"));
        assert_eq!(SqlValue::Bool(true).as_integer_text().as_deref(), Some("1"));
        assert_eq!(SqlValue::UInt(42).as_integer_text().as_deref(), Some("42"));
        assert!(SqlValue::from("7").as_integer_text().is_none());
    }

    #[test]
    fn test_display_temporal() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let dt = date.and_hms_opt(13, 5, 9).unwrap();
        assert_eq!(SqlValue::from(date).to_string(), "2024-02-29");
        assert_eq!(SqlValue::from(dt).to_string(), "2024-02-29 13:05:09");
    }

    #[test]
    fn test_option_into_value() {
        let v: SqlValue<'static> = Option::<i64>::None.into();
        assert!(v.is_null());
        let v: SqlValue<'static> = Some(5i64).into();
        assert_eq!(v, SqlValue::Int(5));
    }

    #[test]
    fn test_row_set_len() {
        let rows = RowSet::new(
            vec![Column::new("id", "INT", 1)],
            vec![vec![SqlValue::Int(1)], vec![SqlValue::Int(2)]],
        );
        assert_eq!(rows.len(), 2);
        assert!(!rows.is_empty());
        assert!(RowSet::default().is_empty());
    }
}
