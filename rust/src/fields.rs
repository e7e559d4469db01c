//! Decoding of string-encoded sub-fields.
//!
//! Comma lists and JSON arrays are decoded here once; validators and miners
//! only ever see the typed results.

use serde_json::Value;
use thiserror::Error;

/// Why a phase/slot list failed to decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhaseListError {
    #[error("not valid JSON")]
    NotJson,
    #[error("not a JSON array")]
    NotArray,
    /// Parsed as an array, but some entries are not positive integers.
    #[error("{invalid} of {len} entries are not positive integers")]
    InvalidEntries { len: usize, invalid: usize },
}

impl PhaseListError {
    /// Array length when the value was at least an array.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Self::InvalidEntries { len, .. } => Some(*len),
            Self::NotJson | Self::NotArray => None,
        }
    }
}

/// Trimmed, non-empty tokens of a comma-separated cell.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercased skill tags, de-duplicated, first occurrence order kept.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in split_list(raw) {
        let tag = tag.to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn positive_integer(value: &Value) -> Option<u32> {
    let n = value.as_u64()?;
    if n >= 1 {
        u32::try_from(n).ok()
    } else {
        None
    }
}

/// Decode a JSON array of positive integer phase numbers.
///
/// A blank cell decodes as the empty list.
pub fn decode_phase_list(raw: &str) -> Result<Vec<u32>, PhaseListError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(raw).map_err(|_| PhaseListError::NotJson)?;
    let Value::Array(items) = value else {
        return Err(PhaseListError::NotArray);
    };

    let phases: Vec<u32> = items.iter().filter_map(positive_integer).collect();
    if phases.len() != items.len() {
        return Err(PhaseListError::InvalidEntries {
            len: items.len(),
            invalid: items.len() - phases.len(),
        });
    }
    Ok(phases)
}

/// True when the cell is blank or holds any valid JSON document.
pub fn check_attributes(raw: &str) -> bool {
    raw.trim().is_empty() || serde_json::from_str::<Value>(raw).is_ok()
}
