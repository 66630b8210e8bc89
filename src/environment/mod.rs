mod environment;
mod runtime;

pub use environment::{EnvVar, EnvironmentAccess, MemoryEnvironment, ProcessEnvironment};
pub use runtime::{declare_runtime, DEFAULT_PJRT_DEVICE};
