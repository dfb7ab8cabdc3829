use std::fmt::{Display, LowerExp, Write as _};

use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::error::MysqlMiddlewareError;
use crate::results::RowMap;
use crate::types::RowValues;

const ZERO_DATE: &str = "0000-00-00";
const ZERO_DATETIME: &str = "0000-00-00 00:00:00";
const ZERO_TIME: &str = "00:00:00";

/// Encoding the server used for a result row.
///
/// Plain statements come back in the text protocol, where every value is already the
/// server's own rendering. Prepared statements (anything with bound parameters) come
/// back in the binary protocol and have to be rendered here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Text,
    Binary,
}

impl WireFormat {
    /// The format sqlx uses for a statement sent with `params`.
    #[must_use]
    pub fn for_params(params: &[RowValues]) -> Self {
        if params.is_empty() {
            WireFormat::Text
        } else {
            WireFormat::Binary
        }
    }
}

/// How a binary-protocol value is turned into text, picked from the server's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Double,
    Date,
    DateTime,
    Time,
    /// Character, decimal, JSON, enum/set, binary, and anything else: taken verbatim.
    Bytes,
}

impl ColumnKind {
    pub(crate) fn from_type_name(name: &str) -> Self {
        if name.ends_with(" UNSIGNED") || name == "YEAR" {
            return ColumnKind::Unsigned;
        }
        match name {
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                ColumnKind::Signed
            }
            "FLOAT" => ColumnKind::Float,
            "DOUBLE" => ColumnKind::Double,
            "DATE" => ColumnKind::Date,
            "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
            "TIME" => ColumnKind::Time,
            _ => ColumnKind::Bytes,
        }
    }
}

/// Materialize one row; NULL columns become `""`.
///
/// # Errors
/// Returns `MysqlMiddlewareError::Sqlx` if a value cannot be decoded, or
/// `MysqlMiddlewareError::Conversion` for a malformed binary temporal value.
pub fn row_to_map(row: &MySqlRow, format: WireFormat) -> Result<RowMap, MysqlMiddlewareError> {
    let columns = row.columns();
    let mut row_map = RowMap::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        let value = extract_value(row, idx, column.type_info().name(), format)?;
        row_map.insert(column.name(), value.unwrap_or_default());
    }
    Ok(row_map)
}

/// Extract a value from a row at a specific index
fn extract_value(
    row: &MySqlRow,
    idx: usize,
    type_name: &str,
    format: WireFormat,
) -> Result<Option<String>, MysqlMiddlewareError> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(None);
    }

    // Text rows already hold the server's rendering, partial-zero dates and
    // out-of-day TIME values included.
    if format == WireFormat::Text {
        let bytes = row.try_get_unchecked::<&[u8], _>(idx)?;
        return Ok(Some(String::from_utf8_lossy(bytes).into_owned()));
    }

    let text = match ColumnKind::from_type_name(type_name) {
        ColumnKind::Signed => row.try_get_unchecked::<i64, _>(idx)?.to_string(),
        ColumnKind::Unsigned => row.try_get_unchecked::<u64, _>(idx)?.to_string(),
        ColumnKind::Float => format_float(row.try_get::<f32, _>(idx)?),
        ColumnKind::Double => format_float(row.try_get::<f64, _>(idx)?),
        // Binary temporal values keep their length byte in front.
        ColumnKind::Date => format_binary_date(row.try_get_unchecked::<&[u8], _>(idx)?, false)?,
        ColumnKind::DateTime => {
            format_binary_date(row.try_get_unchecked::<&[u8], _>(idx)?, true)?
        }
        ColumnKind::Time => format_binary_time(row.try_get_unchecked::<&[u8], _>(idx)?)?,
        ColumnKind::Bytes => {
            String::from_utf8_lossy(row.try_get_unchecked::<&[u8], _>(idx)?).into_owned()
        }
    };
    Ok(Some(text))
}

/// Render a float the way the server prints it: plain notation for ordinary magnitudes,
/// exponent notation (`1e38`, `1.5e-7`) for very large or very small ones.
pub(crate) fn format_float<F>(value: F) -> String
where
    F: Copy + Into<f64> + Display + LowerExp,
{
    let magnitude = value.into().abs();
    if magnitude > 0.0 && !(1e-4..1e15).contains(&magnitude) {
        format!("{value:e}")
    } else {
        value.to_string()
    }
}

/// Render a binary DATE/DATETIME/TIMESTAMP: `[len][year u16][month][day][h][m][s][micros u32]`.
///
/// The fields are printed as stored, so `2024-00-15` stays `2024-00-15`. A zero length
/// is the all-zero value.
pub(crate) fn format_binary_date(
    buf: &[u8],
    with_time: bool,
) -> Result<String, MysqlMiddlewareError> {
    let kind = if with_time { "DATETIME" } else { "DATE" };
    let (len, body) = split_length(buf, kind)?;
    if len == 0 {
        let zero = if with_time { ZERO_DATETIME } else { ZERO_DATE };
        return Ok(zero.to_string());
    }
    if !matches!(len, 4 | 7 | 11) {
        return Err(malformed(kind, len));
    }

    let year = u16::from_le_bytes([body[0], body[1]]);
    let mut text = format!("{year:04}-{:02}-{:02}", body[2], body[3]);
    if with_time {
        let (hour, minute, second) = if len >= 7 {
            (body[4], body[5], body[6])
        } else {
            (0, 0, 0)
        };
        let _ = write!(text, " {hour:02}:{minute:02}:{second:02}");
        if len == 11 {
            push_micros(&mut text, [body[7], body[8], body[9], body[10]]);
        }
    }
    Ok(text)
}

/// Render a binary TIME: `[len][negative][days u32][h][m][s][micros u32]`.
///
/// Days fold into the hour count, so the whole `-838:59:59..=838:59:59` range survives.
pub(crate) fn format_binary_time(buf: &[u8]) -> Result<String, MysqlMiddlewareError> {
    let (len, body) = split_length(buf, "TIME")?;
    if len == 0 {
        return Ok(ZERO_TIME.to_string());
    }
    if !matches!(len, 8 | 12) {
        return Err(malformed("TIME", len));
    }

    let sign = if body[0] == 1 { "-" } else { "" };
    let days = u32::from_le_bytes([body[1], body[2], body[3], body[4]]);
    let hours = u64::from(days) * 24 + u64::from(body[5]);
    let mut text = format!("{sign}{hours:02}:{:02}:{:02}", body[6], body[7]);
    if len == 12 {
        push_micros(&mut text, [body[8], body[9], body[10], body[11]]);
    }
    Ok(text)
}

fn split_length<'a>(buf: &'a [u8], kind: &str) -> Result<(usize, &'a [u8]), MysqlMiddlewareError> {
    let Some((&len, body)) = buf.split_first() else {
        return Err(MysqlMiddlewareError::Conversion(format!(
            "empty binary {kind} value"
        )));
    };
    let len = usize::from(len);
    if body.len() < len {
        return Err(MysqlMiddlewareError::Conversion(format!(
            "binary {kind} value declares {len} bytes but holds {}",
            body.len()
        )));
    }
    Ok((len, body))
}

fn push_micros(text: &mut String, raw: [u8; 4]) {
    let micros = u32::from_le_bytes(raw);
    if micros != 0 {
        let _ = write!(text, ".{micros:06}");
    }
}

fn malformed(kind: &str, len: usize) -> MysqlMiddlewareError {
    MysqlMiddlewareError::Conversion(format!("unexpected binary {kind} length {len}"))
}
