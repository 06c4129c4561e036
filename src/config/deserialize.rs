// ABOUTME: Custom serde deserializers for config layers.
// ABOUTME: Blank strings deserialize as absent so CI inputs left empty do not count as set.

use serde::Deserialize;

pub fn deserialize_non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(non_blank))
}

/// Trimmed value, or `None` when nothing is left.
pub fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
