use std::error::Error;
use std::path::Path;
use crate::device::Device;
use crate::framework::{CausalLm, PretrainedArgs, PretrainedFramework};
use crate::loader::PlacementStrategy;

/// Loads without a device hint, then moves the materialized model.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveAfterLoadPlacement;

impl<F: PretrainedFramework> PlacementStrategy<F> for MoveAfterLoadPlacement {
    fn name(&self) -> &'static str {
        "move-after-load"
    }

    fn load(
        &self,
        framework: &F,
        model_id: &Path,
        device: &Device,
        args: &PretrainedArgs,
    ) -> Result<F::Model, Box<dyn Error + Send + Sync>> {
        let mut model = framework.from_pretrained(model_id, None, args)?;
        model.to_device(device)?;
        Ok(model)
    }
}
