use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The one option shape used past the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Accepts raw strings/numbers, `{value, label}`, and `{id, name}` objects.
    ///
    /// Catalog entries are looked up by name, so `name` outranks `id` for the value.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| Self::new(text, text))
            }
            Value::Number(number) => {
                let text = number.to_string();
                Some(Self::new(text.clone(), text))
            }
            Value::Object(fields) => {
                let value = field_text(fields, &["value", "name", "id", "key"])?;
                let label = field_text(fields, &["label", "name", "title"])
                    .unwrap_or_else(|| value.clone());
                Some(Self::new(value, label))
            }
            _ => None,
        }
    }

    /// Adapts every recognizable entry, dropping blanks and unrecognized shapes.
    pub fn from_values(values: &[Value]) -> Vec<Self> {
        values.iter().filter_map(Self::from_value).collect()
    }
}

fn field_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}
