//! Utility functions for working with A2A Part objects.

use crate::types::Part;
use serde_json::Value;

/// Extracts text content from all text Parts in a list.
///
/// # Example
///
/// ```
/// use a2a_universal::types::Part;
/// use a2a_universal::utils::get_text_parts;
///
/// let parts = vec![Part::text("Hello"), Part::text("World")];
/// assert_eq!(get_text_parts(&parts), vec!["Hello", "World"]);
/// ```
pub fn get_text_parts(parts: &[Part]) -> Vec<String> {
    parts
        .iter()
        .filter_map(|part| part.as_text().map(str::to_string))
        .collect()
}

/// Extracts data content from all data Parts in a list.
pub fn get_data_parts(parts: &[Part]) -> Vec<Value> {
    parts.iter().filter_map(|part| part.as_data().cloned()).collect()
}

/// A string field of a part's metadata.
pub fn metadata_str<'a>(part: &'a Part, key: &str) -> Option<&'a str> {
    part.metadata()?.get(key)?.as_str()
}

/// A string field of a data part's payload.
pub fn data_str<'a>(part: &'a Part, key: &str) -> Option<&'a str> {
    part.as_data()?.get(key)?.as_str()
}
