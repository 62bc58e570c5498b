//! Row value decoding by server type name.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySql, MySqlRow};
use sqlx::{Decode, Row, Type, ValueRef};

use crate::core::value::SqlValue;
use crate::error::{DumpError, Result};

/// How a column is read off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DecodeKind {
    Signed,
    Unsigned,
    Bit,
    Float,
    Double,
    Decimal,
    Date,
    Time,
    DateTime,
    Year,
    Binary,
    Text,
}

/// Pick the decode path for a server type name (`INT UNSIGNED`, `VARCHAR`,
/// `BOOLEAN`, ...).
///
/// `BOOLEAN` is what the driver reports for every `TINYINT(1)`, which can
/// hold any tinyint value, so it is read as an integer.
pub(super) fn decode_kind(type_name: &str) -> DecodeKind {
    let upper = type_name.to_ascii_uppercase();
    let unsigned = upper.contains("UNSIGNED");
    let base = upper.split_whitespace().next().unwrap_or_default();

    match base {
        "BOOLEAN" | "BOOL" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER"
        | "BIGINT" => {
            if unsigned {
                DecodeKind::Unsigned
            } else {
                DecodeKind::Signed
            }
        }
        "BIT" => DecodeKind::Bit,
        "FLOAT" => DecodeKind::Float,
        "DOUBLE" | "REAL" => DecodeKind::Double,
        "DECIMAL" | "NUMERIC" => DecodeKind::Decimal,
        "DATE" => DecodeKind::Date,
        "TIME" => DecodeKind::Time,
        "DATETIME" | "TIMESTAMP" => DecodeKind::DateTime,
        "YEAR" => DecodeKind::Year,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "GEOMETRY" => {
            DecodeKind::Binary
        }
        _ => DecodeKind::Text,
    }
}

/// Decode column `index` of `row` according to its server type name.
pub(super) fn decode_value(row: &MySqlRow, index: usize, type_name: &str) -> Result<SqlValue<'static>> {
    let is_null = row.try_get_raw(index).map(|r| r.is_null()).unwrap_or(true);
    if is_null {
        return Ok(SqlValue::Null);
    }

    let value = match decode_kind(type_name) {
        // `BOOLEAN` carries no UNSIGNED marker in its name, only in the flags.
        DecodeKind::Signed => match get::<i64>(row, index) {
            Ok(v) => SqlValue::Int(v),
            Err(_) => get::<u64>(row, index).map(SqlValue::UInt)?,
        },
        DecodeKind::Unsigned => get::<u64>(row, index).map(SqlValue::UInt)?,
        DecodeKind::Bit => match get::<u64>(row, index) {
            Ok(v) => SqlValue::UInt(v),
            Err(_) => {
                let bytes = get::<Vec<u8>>(row, index)?;
                SqlValue::UInt(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
            }
        },
        DecodeKind::Float => get::<f32>(row, index).map(|v| SqlValue::Float(f64::from(v)))?,
        DecodeKind::Double => get::<f64>(row, index).map(SqlValue::Float)?,
        DecodeKind::Decimal => get::<Decimal>(row, index).map(SqlValue::Decimal)?,
        DecodeKind::Date => get::<NaiveDate>(row, index).map(SqlValue::Date)?,
        DecodeKind::Time => get::<NaiveTime>(row, index).map(SqlValue::Time)?,
        DecodeKind::DateTime => get::<NaiveDateTime>(row, index).map(SqlValue::DateTime)?,
        DecodeKind::Year => match get::<u16>(row, index) {
            Ok(v) => SqlValue::UInt(u64::from(v)),
            Err(_) => get::<i64>(row, index).map(SqlValue::Int)?,
        },
        DecodeKind::Binary => get::<Vec<u8>>(row, index).map(SqlValue::bytes_owned)?,
        DecodeKind::Text => match get::<String>(row, index) {
            Ok(text) => SqlValue::text_owned(text),
            Err(_) => get::<Vec<u8>>(row, index).map(SqlValue::bytes_owned)?,
        },
    };

    Ok(value)
}

fn get<'r, T>(row: &'r MySqlRow, index: usize) -> Result<T>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get::<T, _>(index).map_err(|e| {
        DumpError::metadata(format!("decoding column {}", index + 1), e)
    })
}
