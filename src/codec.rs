//! Conversions between flat row scalars and typed record fields.
//!
//! Reads are lenient so one odd legacy row never blocks the rest of a table:
//! absent columns decode to documented defaults, any non-zero integer reads
//! as `true`, and non-JSON text where a list is expected is kept as a single
//! element. Writes are strict: booleans are always 0/1, lists are always a
//! JSON array (or NULL when empty).

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::AppResult;

/// JSON-encode an ordered string sequence. Empty encodes as NULL so legacy
/// rows and fresh rows look identical.
pub fn encode_string_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    serde_json::to_string(items).ok()
}

/// Inverse of [`encode_string_list`]. `decode(encode(x)) == x` for every
/// well-formed input; legacy bare text decodes as a one-element list.
pub fn decode_string_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(trimmed) {
        Ok(items) => items,
        Err(_) => vec![raw.to_string()],
    }
}

/// Booleans are written strictly as 0/1.
pub fn encode_bool(value: bool) -> i64 {
    i64::from(value)
}

fn column_absent(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::ColumnNotFound(_))
}

/// Lenient boolean read: NULL and absent decode to `false`, any non-zero
/// integer to `true`. Do not assume the writer was this codec.
pub fn bool_column(row: &SqliteRow, column: &str) -> AppResult<bool> {
    match row.try_get::<Option<i64>, _>(column) {
        Ok(value) => Ok(value.map(|v| v != 0).unwrap_or(false)),
        Err(err) if column_absent(&err) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub fn string_list_column(row: &SqliteRow, column: &str) -> AppResult<Vec<String>> {
    Ok(decode_string_list(opt_text(row, column)?.as_deref()))
}

/// Optional text; a column missing from a not-yet-migrated row reads as None.
pub fn opt_text(row: &SqliteRow, column: &str) -> AppResult<Option<String>> {
    match row.try_get::<Option<String>, _>(column) {
        Ok(value) => Ok(value),
        Err(err) if column_absent(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn opt_integer(row: &SqliteRow, column: &str) -> AppResult<Option<i64>> {
    match row.try_get::<Option<i64>, _>(column) {
        Ok(value) => Ok(value),
        Err(err) if column_absent(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn text_or_empty(row: &SqliteRow, column: &str) -> AppResult<String> {
    Ok(opt_text(row, column)?.unwrap_or_default())
}

pub fn integer_or(row: &SqliteRow, column: &str, default: i64) -> AppResult<i64> {
    Ok(opt_integer(row, column)?.unwrap_or(default))
}

pub fn real_or(row: &SqliteRow, column: &str, default: f64) -> AppResult<f64> {
    match row.try_get::<Option<f64>, _>(column) {
        Ok(value) => Ok(value.unwrap_or(default)),
        Err(err) if column_absent(&err) => Ok(default),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_list_round_trips() {
        let items = vec![String::from("a.png"), String::from("b.png")];
        let encoded = encode_string_list(&items);
        assert_eq!(decode_string_list(encoded.as_deref()), items);
    }

    #[test]
    fn empty_list_encodes_to_null() {
        assert_eq!(encode_string_list(&[]), None);
        assert!(decode_string_list(None).is_empty());
        assert!(decode_string_list(Some("")).is_empty());
    }

    #[test]
    fn legacy_bare_text_decodes_as_single_element() {
        assert_eq!(
            decode_string_list(Some("file:///old.png")),
            vec![String::from("file:///old.png")]
        );
    }

    #[test]
    fn list_decode_is_idempotent() {
        let items = vec![String::from("one"), String::from("two"), String::from("")];
        let once = decode_string_list(encode_string_list(&items).as_deref());
        let twice = decode_string_list(encode_string_list(&once).as_deref());
        assert_eq!(once, twice);
    }

    #[test]
    fn bool_write_is_strict() {
        assert_eq!(encode_bool(true), 1);
        assert_eq!(encode_bool(false), 0);
    }
}
