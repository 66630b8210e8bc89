use std::error::Error;
use std::path::Path;
use serde_json::{Map, Value};
use crate::device::Device;
use crate::model::{ExecutionMode, ModelConfig};

/// Pass-through arguments for a framework's pretrained loader.
///
/// The TPU loader forwards these verbatim and never inspects them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PretrainedArgs {
    /// Positional arguments, in order
    pub positional: Vec<Value>,
    /// Keyword arguments
    pub named: Map<String, Value>,
}

impl PretrainedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn with_kwarg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.named.insert(key.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Optional features a framework installation provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameworkCapabilities {
    /// Whether the loader accepts a device-map hint and places weights itself
    pub device_map: bool,
}

/// A model object produced by a framework.
pub trait CausalLm: Send {
    fn config(&self) -> &ModelConfig;

    fn config_mut(&mut self) -> &mut ModelConfig;

    /// Device currently hosting the parameters
    fn device(&self) -> &Device;

    /// Moves every parameter to `device`. Blocks until the transfer is done.
    fn to_device(&mut self, device: &Device) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Switches to evaluation mode
    fn eval(&mut self);

    fn mode(&self) -> ExecutionMode;
}

/// The model-loading framework the TPU loader delegates to.
pub trait PretrainedFramework: Send + Sync {
    type Model: CausalLm;

    /// Reports the optional features of this installation
    fn capabilities(&self) -> FrameworkCapabilities;

    /// Loads pretrained weights and configuration.
    ///
    /// # Arguments
    ///
    /// * `model_id` - Identifier or path of the model
    /// * `device_map` - Device that should host the parameters; only meaningful
    ///   when `capabilities().device_map` is true
    /// * `args` - Pass-through loader arguments
    fn from_pretrained(
        &self,
        model_id: &Path,
        device_map: Option<&Device>,
        args: &PretrainedArgs,
    ) -> Result<Self::Model, Box<dyn Error + Send + Sync>>;

    /// Compiles the model ahead of time with the named backend.
    fn compile(&self, model: Self::Model, backend: &str) -> Result<Self::Model, Box<dyn Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_args_builder() {
        let args = PretrainedArgs::new()
            .with_arg("positional")
            .with_kwarg("revision", "main")
            .with_kwarg("use_cache", false);

        assert!(!args.is_empty());
        assert_eq!(args.positional, vec![json!("positional")]);
        assert_eq!(args.named["revision"], json!("main"));
        assert_eq!(args.named["use_cache"], json!(false));
        assert!(PretrainedArgs::new().is_empty());
    }
}
