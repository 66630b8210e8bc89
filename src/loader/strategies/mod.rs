pub mod device_map;
pub mod move_after_load;

pub use device_map::DeviceMapPlacement;
pub use move_after_load::MoveAfterLoadPlacement;
