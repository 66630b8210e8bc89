//! Loads causal language models for inference on XLA (TPU) devices, behind
//! the same `from_pretrained` call as the framework it wraps.

pub mod cli;
pub mod config;
pub mod device;
pub mod environment;
pub mod framework;
pub mod loader;
pub mod model;
pub mod weights;

pub use device::Device;
pub use environment::{EnvVar, EnvironmentAccess, MemoryEnvironment, ProcessEnvironment};
pub use framework::{CausalLm, FrameworkCapabilities, PretrainedArgs, PretrainedFramework};
pub use loader::TpuModelForCausalLm;
pub use model::{Attr, ExecutionMode, InferenceOverrides, ModelConfig, ModelConfigError};
