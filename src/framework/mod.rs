mod framework;
pub mod host;

pub use framework::{CausalLm, FrameworkCapabilities, PretrainedArgs, PretrainedFramework};
pub use host::{CompiledGraph, HostCausalLm, HostError, HostFramework};
