//! # TPU Loader Module
//!
//! Wraps a pretrained-model framework so models come out configured for
//! inference on an XLA device.
//!
//! ## Key Components
//!
//! - `TpuModelForCausalLm`: the loading entry point
//! - `PlacementStrategy`: how weights reach the device (device-map hint or
//!   move after load), chosen from the framework's capabilities

mod loader;
mod strategy;
pub mod strategies;

pub use loader::{select_strategy, TpuModelForCausalLm, COMPILE_BACKEND};
pub use strategy::PlacementStrategy;
pub use strategies::{DeviceMapPlacement, MoveAfterLoadPlacement};
