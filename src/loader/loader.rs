use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use crate::device::resolve_device;
use crate::environment::{declare_runtime, EnvVar, EnvironmentAccess};
use crate::framework::{CausalLm, FrameworkCapabilities, PretrainedArgs, PretrainedFramework};
use crate::model::InferenceOverrides;
use super::strategies::{DeviceMapPlacement, MoveAfterLoadPlacement};
use super::strategy::PlacementStrategy;

/// Backend used for ahead-of-time compilation on the XLA device
pub const COMPILE_BACKEND: &str = "openxla_eval";

/// Picks the placement strategy matching a framework's capabilities.
pub fn select_strategy<F: PretrainedFramework>(capabilities: FrameworkCapabilities) -> Box<dyn PlacementStrategy<F>> {
    if capabilities.device_map {
        Box::new(DeviceMapPlacement)
    } else {
        Box::new(MoveAfterLoadPlacement)
    }
}

/// Loads causal language models for inference on an XLA (TPU) device.
///
/// Exposes the same `from_pretrained` call as the wrapped framework. Around it,
/// the loader declares the PJRT runtime, resolves the target device, reconciles
/// the inference fields of the model configuration, switches the model to eval
/// mode and optionally compiles it.
pub struct TpuModelForCausalLm<F: PretrainedFramework> {
    framework: F,
    env: Arc<dyn EnvironmentAccess>,
    strategy: Box<dyn PlacementStrategy<F>>,
}

impl<F: PretrainedFramework> TpuModelForCausalLm<F> {
    /// Creates a loader, choosing the placement strategy from the framework's
    /// capabilities once, here.
    ///
    /// # Arguments
    ///
    /// * `framework` - Framework that performs the actual weight loading
    /// * `env` - Environment holding PJRT_DEVICE, DBG_DEVICE and DBG_COMPILE
    pub fn new(framework: F, env: Arc<dyn EnvironmentAccess>) -> Self {
        let strategy = select_strategy(framework.capabilities());
        Self { framework, env, strategy }
    }

    /// Replaces the placement strategy chosen from the capabilities
    pub fn with_strategy(mut self, strategy: Box<dyn PlacementStrategy<F>>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn framework(&self) -> &F {
        &self.framework
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Loads a model and prepares it for inference.
    ///
    /// # Arguments
    ///
    /// * `model_id` - Identifier or path understood by the framework
    /// * `task` - Task to record in the configuration, if any
    /// * `batch_size` - Static batch size to record, if any
    /// * `sequence_length` - Static sequence length to record, if any
    /// * `args` - Pass-through arguments for the framework loader
    ///
    /// # Returns
    ///
    /// The model in eval mode, on the resolved device, compiled when
    /// DBG_COMPILE is set and the device is xla. Framework errors are
    /// returned unchanged.
    pub fn from_pretrained<P: AsRef<Path>>(
        &self,
        model_id: P,
        task: Option<&str>,
        batch_size: Option<usize>,
        sequence_length: Option<usize>,
        args: &PretrainedArgs,
    ) -> Result<F::Model, Box<dyn Error + Send + Sync>> {
        let model_id = model_id.as_ref();

        // Must precede any device-aware call
        declare_runtime(self.env.as_ref());
        let device = resolve_device(self.env.as_ref());

        debug!(strategy = self.strategy.name(), device = %device, "Loading {}", model_id.display());
        let mut model = self.strategy.load(&self.framework, model_id, &device, args)?;

        let overrides = InferenceOverrides::new(task, batch_size, sequence_length);
        model.config_mut().apply_overrides(&overrides);

        model.eval();

        if device.is_xla() && self.env.is_set(EnvVar::DbgCompile) {
            model = self.framework.compile(model, COMPILE_BACKEND)?;
            debug!("Model compiled.");
        }

        info!(
            "Model {} ready on {} (task: {}, batch_size: {}, sequence_length: {})",
            model_id.display(),
            model.device(),
            model.config().task,
            model.config().batch_size,
            model.config().sequence_length
        );

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::HostFramework;
    use crate::environment::MemoryEnvironment;

    #[test]
    fn test_strategy_follows_capabilities() {
        let with_map = select_strategy::<HostFramework>(FrameworkCapabilities { device_map: true });
        assert_eq!(with_map.name(), "device-map");

        let without_map = select_strategy::<HostFramework>(FrameworkCapabilities { device_map: false });
        assert_eq!(without_map.name(), "move-after-load");
    }

    #[test]
    fn test_loader_picks_strategy_at_construction() {
        let env: Arc<dyn EnvironmentAccess> = Arc::new(MemoryEnvironment::new());
        let framework = HostFramework::new(Arc::clone(&env))
            .with_capabilities(FrameworkCapabilities { device_map: false });

        let loader = TpuModelForCausalLm::new(framework, env);
        assert_eq!(loader.strategy_name(), "move-after-load");

        let loader = loader.with_strategy(Box::new(DeviceMapPlacement));
        assert_eq!(loader.strategy_name(), "device-map");
    }
}
