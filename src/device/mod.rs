mod device;

pub use device::{resolve_device, Device, XLA_DEVICE};
