//! Parsing utilities for slice expressions
//!
//! A slice expression is a comma-separated list with one entry per
//! dimension. Each entry is either a half-open range `start:end` or a single
//! index, which selects a length of one along that dimension.

use alloc::vec::Vec;
use core::num::IntErrorKind;
use core::ops::Range;

use crate::slice::Slice;
use crate::StorageError;

/// Parse a slice expression such as `"0:2, 3"`
pub fn parse_slice(expr: &str) -> Result<Slice, StorageError> {
    let ranges = expr
        .split(',')
        .map(|part| parse_range(part.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    Slice::from_ranges(&ranges)
}

/// Parse a range string in the format "start:end" or a single index
pub fn parse_range(range_str: &str) -> Result<Range<usize>, StorageError> {
    if range_str.is_empty() {
        return Err(StorageError::InvalidRange);
    }

    if let Some(colon_pos) = range_str.find(':') {
        let start = parse_usize(&range_str[..colon_pos])?;
        let end = parse_usize(&range_str[colon_pos + 1..])?;

        if start >= end {
            return Err(StorageError::InvalidRange);
        }

        return Ok(start..end);
    }

    let index = parse_usize(range_str)?;
    let end = index.checked_add(1).ok_or(StorageError::Overflow)?;
    Ok(index..end)
}

/// Parse a usize, reporting values past `usize::MAX` as `Overflow`
fn parse_usize(s: &str) -> Result<usize, StorageError> {
    s.parse::<usize>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => StorageError::Overflow,
        _ => StorageError::InvalidRange,
    })
}
