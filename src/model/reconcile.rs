use std::mem;
use serde::{Deserialize, Serialize};
use super::config::ModelConfig;
use super::types::Attr;

/// Inference settings a caller may impose on a loaded model's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceOverrides {
    pub task: Option<String>,
    pub batch_size: Option<usize>,
    pub sequence_length: Option<usize>,
}

impl InferenceOverrides {
    pub fn new(task: Option<&str>, batch_size: Option<usize>, sequence_length: Option<usize>) -> Self {
        Self {
            task: task.map(str::to_string),
            batch_size,
            sequence_length,
        }
    }
}

/// Decides the value of one configuration attribute after loading.
///
/// The override is written when it is present, or when the existing attribute
/// holds no value (missing or unset). An absent override written this way
/// leaves the attribute explicitly `Unset`. Otherwise the existing value is kept.
pub fn reconcile<T>(existing: Attr<T>, override_value: Option<T>) -> Attr<T> {
    if override_value.is_some() || existing.value().is_none() {
        Attr::from(override_value)
    } else {
        existing
    }
}

impl ModelConfig {
    /// Reconciles `task`, `batch_size` and `sequence_length` with the overrides.
    pub fn apply_overrides(&mut self, overrides: &InferenceOverrides) {
        self.task = reconcile(mem::take(&mut self.task), overrides.task.clone());
        self.batch_size = reconcile(mem::take(&mut self.batch_size), overrides.batch_size);
        self.sequence_length = reconcile(mem::take(&mut self.sequence_length), overrides.sequence_length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_existing_value() {
        assert_eq!(reconcile(Attr::Value(2), Some(4)), Attr::Value(4));
        assert_eq!(reconcile(Attr::Unset, Some(4)), Attr::Value(4));
        assert_eq!(reconcile(Attr::<usize>::Missing, Some(4)), Attr::Value(4));
    }

    #[test]
    fn test_absent_override_keeps_existing_value() {
        assert_eq!(reconcile(Attr::Value(8), None), Attr::Value(8));
    }

    #[test]
    fn test_absent_override_materializes_missing_attribute() {
        assert_eq!(reconcile(Attr::<usize>::Missing, None), Attr::Unset);
        assert_eq!(reconcile(Attr::<usize>::Unset, None), Attr::Unset);
    }

    #[test]
    fn test_apply_overrides_on_config() {
        let mut config = ModelConfig {
            task: Attr::Value("summarize".to_string()),
            sequence_length: Attr::Value(512),
            ..Default::default()
        };
        let overrides = InferenceOverrides::new(None, Some(2), None);

        config.apply_overrides(&overrides);

        assert_eq!(config.task, Attr::Value("summarize".to_string()));
        assert_eq!(config.batch_size, Attr::Value(2));
        assert_eq!(config.sequence_length, Attr::Value(512));
    }

    #[test]
    fn test_apply_empty_overrides_leaves_no_missing_field() {
        let mut config = ModelConfig::default();
        config.apply_overrides(&InferenceOverrides::default());

        assert_eq!(config.task, Attr::Unset);
        assert_eq!(config.batch_size, Attr::Unset);
        assert_eq!(config.sequence_length, Attr::Unset);
    }
}
