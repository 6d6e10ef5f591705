//! Helpers for partial (PATCH style) updates sent as JSON.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be absent, `null`, or a value.
///
/// Use with `#[serde(default, deserialize_with = "crate::patch::deserialize_patch")]` on an
/// `Option<Option<T>>` field:
/// - absent gives `None` (leave unchanged),
/// - `null` gives `Some(None)` (clear the value),
/// - a value gives `Some(Some(value))`.
pub fn deserialize_patch<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
