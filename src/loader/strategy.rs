use std::error::Error;
use std::path::Path;
use crate::device::Device;
use crate::framework::{PretrainedArgs, PretrainedFramework};

/// Trait defining how weights reach the resolved device during a load
pub trait PlacementStrategy<F: PretrainedFramework>: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Loads the model through `framework` and leaves it on `device`
    fn load(
        &self,
        framework: &F,
        model_id: &Path,
        device: &Device,
        args: &PretrainedArgs,
    ) -> Result<F::Model, Box<dyn Error + Send + Sync>>;
}
