use std::error::Error;
use std::path::Path;
use crate::device::Device;
use crate::framework::{PretrainedArgs, PretrainedFramework};
use crate::loader::PlacementStrategy;

/// Hands the device to the framework loader as a device-map hint.
///
/// Only valid when the framework has automatic placement support.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceMapPlacement;

impl<F: PretrainedFramework> PlacementStrategy<F> for DeviceMapPlacement {
    fn name(&self) -> &'static str {
        "device-map"
    }

    fn load(
        &self,
        framework: &F,
        model_id: &Path,
        device: &Device,
        args: &PretrainedArgs,
    ) -> Result<F::Model, Box<dyn Error + Send + Sync>> {
        framework.from_pretrained(model_id, Some(device), args)
    }
}
