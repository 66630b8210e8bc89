mod config;
mod reconcile;
mod types;

pub use config::{ModelConfig, ModelConfigError};
pub use reconcile::{reconcile, InferenceOverrides};
pub use types::{Attr, ExecutionMode};
