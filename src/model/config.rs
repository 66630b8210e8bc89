use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use super::types::Attr;

// Inference fields with a typed slot, and the JSON kind each one accepts
const TYPED_FIELDS: [(&str, &str); 3] = [
    ("task", "string"),
    ("batch_size", "unsigned integer"),
    ("sequence_length", "unsigned integer"),
];

/// Errors raised while reading a model configuration record
#[derive(Debug)]
pub enum ModelConfigError {
    /// An inference field holds a value of the wrong JSON type
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: Value,
    },
}

impl fmt::Display for ModelConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelConfigError::InvalidField { field, expected, found } => write!(
                f,
                "Invalid value for config field '{}': expected {} or null, found {}",
                field, expected, found
            ),
        }
    }
}

impl Error for ModelConfigError {}

fn check_typed_fields(record: &Value) -> Result<(), ModelConfigError> {
    for (field, expected) in TYPED_FIELDS {
        let conforms = match record.get(field) {
            None | Some(Value::Null) => true,
            Some(value) if field == "task" => value.is_string(),
            Some(value) => value.as_u64().is_some_and(|n| usize::try_from(n).is_ok()),
        };
        if !conforms {
            return Err(ModelConfigError::InvalidField {
                field,
                expected,
                found: record[field].clone(),
            });
        }
    }
    Ok(())
}

/// Configuration record of a pretrained causal language model.
///
/// Mirrors a Hugging Face `config.json`: arbitrary fields are preserved in
/// `extra`, while the three inference fields this crate manages are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Task identifier the model is served for
    #[serde(default, skip_serializing_if = "Attr::is_missing")]
    pub task: Attr<String>,
    /// Static batch size used when tracing the inference graph
    #[serde(default, skip_serializing_if = "Attr::is_missing")]
    pub batch_size: Attr<usize>,
    /// Static sequence length used when tracing the inference graph
    #[serde(default, skip_serializing_if = "Attr::is_missing")]
    pub sequence_length: Attr<usize>,
    /// Every other field of the record, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelConfig {
    /// Reads a `config.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parses a record. A wrong-typed inference field is reported as
    /// [`ModelConfigError::InvalidField`] naming the field.
    pub fn from_json_str(content: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let record: Value = serde_json::from_str(content)?;
        check_typed_fields(&record)?;
        Ok(serde_json::from_value(record)?)
    }

    /// Serializes the record back to JSON, with `null` for unset inference fields.
    pub fn to_json(&self) -> Result<Value, Box<dyn Error + Send + Sync>> {
        Ok(serde_json::to_value(self)?)
    }

    /// `model_type` field, if the record carries one
    pub fn model_type(&self) -> Option<&str> {
        self.extra.get("model_type").and_then(Value::as_str)
    }

    /// Whether the record has an attribute with this name, set or not.
    pub fn has_attribute(&self, key: &str) -> bool {
        match key {
            "task" => !self.task.is_missing(),
            "batch_size" => !self.batch_size.is_missing(),
            "sequence_length" => !self.sequence_length.is_missing(),
            other => self.extra.contains_key(other),
        }
    }

    /// Applies keyword arguments that name existing fields of `extra`.
    ///
    /// # Returns
    ///
    /// The keys that did not match a field and were left unused
    pub fn update_from_kwargs(&mut self, kwargs: &Map<String, Value>) -> Vec<String> {
        let mut unused = Vec::new();
        for (key, value) in kwargs {
            match self.extra.get_mut(key) {
                Some(slot) => *slot = value.clone(),
                None => unused.push(key.clone()),
            }
        }
        unused
    }
}
