//! Scalar-to-text coercion and lenient deserialization helpers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Renders a decoded value as text.
///
/// Strings pass through unchanged, booleans and numbers use their literal
/// form, null becomes the empty string, and collections use compact JSON.
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Treats an explicit null like an absent field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes any scalar as trimmed text.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value).trim().to_owned())
}

/// Deserializes an optional scalar as text, mapping null and blank to `None`.
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let rendered = value_to_text(&value);
    let trimmed = rendered.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
}

/// Deserializes a nullable sequence of scalars as text.
pub(crate) fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.iter().map(value_to_text).collect())
}
