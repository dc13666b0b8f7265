//! Change detection for rows.
//!
//! The hash is the classic `h * 31 + c` string hash over UTF-16 code units,
//! wrapped to a signed 32-bit integer. It is fast and not cryptographic:
//! two different rows can collide, in which case the second one is treated as
//! unchanged and skipped. Never use it where a security property is needed.

use crate::error::TableResult;
use crate::model::Row;

/// Hash a string the way the rendered table always has
pub fn checksum_str(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |acc, unit| {
        (acc << 5).wrapping_sub(acc).wrapping_add(i32::from(unit))
    })
}

/// Canonical serialized form of a row.
///
/// All maps in the row model are ordered, so equal rows always serialize to
/// the same string.
pub fn canonical_form(row: &Row) -> TableResult<String> {
    Ok(serde_json::to_string(row)?)
}

pub fn row_checksum(row: &Row) -> TableResult<i32> {
    Ok(checksum_str(&canonical_form(row)?))
}

/// A row is unchanged iff its checksum equals the one stored from its last render
pub fn is_unchanged(previous: Option<i32>, current: i32) -> bool {
    previous == Some(current)
}
