use std::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A configuration attribute that can be absent, explicitly unset, or hold a value.
///
/// In JSON, `Missing` omits the key entirely while `Unset` is written as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr<T> {
    /// The attribute does not exist on the record
    Missing,
    /// The attribute exists but carries no value
    Unset,
    /// The attribute holds a value
    Value(T),
}

impl<T> Default for Attr<T> {
    fn default() -> Self {
        Attr::Missing
    }
}

impl<T> Attr<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Attr::Missing)
    }

    /// Returns the held value, treating both `Missing` and `Unset` as nothing
    pub fn value(&self) -> Option<&T> {
        match self {
            Attr::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// `None` becomes an explicit `Unset`, never `Missing`.
impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Attr::Value(v),
            None => Attr::Unset,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Attr<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Attr::Missing => write!(f, "<missing>"),
            Attr::Unset => write!(f, "<unset>"),
            Attr::Value(v) => write!(f, "{}", v),
        }
    }
}

impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attr::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

// A present key always yields `Unset` or `Value`; `Missing` comes from `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Attr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Attr::from)
    }
}

/// Execution mode of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Training behaviors such as dropout are active
    Train,
    /// Inference: training-only stochastic behaviors are disabled
    Eval,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionMode::Train => write!(f, "train"),
            ExecutionMode::Eval => write!(f, "eval"),
        }
    }
}
