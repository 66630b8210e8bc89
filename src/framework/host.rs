//! Host framework: loads Hugging Face style model directories from local disk.
//!
//! A model directory holds a `config.json` and safetensors weights (a single
//! `model.safetensors`, an index with shards, or numbered shards). Weights are
//! memory-mapped on the host; placing a model on the XLA device binds it to the
//! PJRT runtime declared in the environment.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use crate::device::Device;
use crate::environment::{EnvVar, EnvironmentAccess};
use crate::model::{ExecutionMode, ModelConfig};
use crate::weights::{discover_shards, SafetensorsReader};
use super::framework::{CausalLm, FrameworkCapabilities, PretrainedArgs, PretrainedFramework};

/// Compilation backends the host framework accepts
pub const SUPPORTED_COMPILE_BACKENDS: &[&str] = &["openxla_eval", "openxla"];

/// Name of the configuration file in a model directory
pub const CONFIG_FILE: &str = "config.json";

/// Errors raised by the host framework
#[derive(Debug)]
pub enum HostError {
    /// The identifier does not name a model directory
    ModelNotFound(PathBuf),
    /// The model directory has no config.json
    MissingConfig(PathBuf),
    /// The model directory has no safetensors weights
    NoWeights(PathBuf),
    /// A device map was given to an installation without placement support
    DeviceMapUnsupported,
    /// Placement on XLA was requested before PJRT_DEVICE was declared
    RuntimeNotDeclared,
    /// The device token is not one the host framework can place on
    UnsupportedDevice(String),
    /// The compilation backend is unknown
    UnsupportedBackend(String),
    /// Compilation was requested for a model still in training mode
    NotInEvalMode,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HostError::ModelNotFound(path) => write!(f, "Model directory not found: {}", path.display()),
            HostError::MissingConfig(path) => write!(f, "No {} in {}", CONFIG_FILE, path.display()),
            HostError::NoWeights(path) => write!(f, "No safetensors weights in {}", path.display()),
            HostError::DeviceMapUnsupported => write!(f, "Device maps require automatic placement support"),
            HostError::RuntimeNotDeclared => write!(f, "{} must be set before placing a model on xla", EnvVar::PjrtDevice),
            HostError::UnsupportedDevice(token) => write!(f, "Unsupported device: {}", token),
            HostError::UnsupportedBackend(name) => write!(
                f, "Unsupported compilation backend: {} (expected one of: {})",
                name, SUPPORTED_COMPILE_BACKENDS.join(", ")
            ),
            HostError::NotInEvalMode => write!(f, "Model must be in eval mode before compilation"),
        }
    }
}

impl Error for HostError {}

/// Record of an ahead-of-time compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    /// Backend that compiled the graph
    pub backend: String,
    /// When compilation finished
    pub compiled_at: DateTime<Utc>,
}

/// A causal language model loaded by [`HostFramework`].
pub struct HostCausalLm {
    /// Model name, taken from the directory name
    pub name: String,
    path: PathBuf,
    config: ModelConfig,
    shards: Vec<SafetensorsReader>,
    device: Device,
    runtime: Option<String>,
    mode: ExecutionMode,
    compiled: Option<CompiledGraph>,
    loaded_at: DateTime<Utc>,
    env: Arc<dyn EnvironmentAccess>,
}

impl fmt::Debug for HostCausalLm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCausalLm")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("device", &self.device)
            .field("runtime", &self.runtime)
            .field("mode", &self.mode)
            .field("compiled", &self.compiled)
            .field("shard_count", &self.shards.len())
            .field("tensor_count", &self.tensor_count())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl HostCausalLm {
    /// Path of the model directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shards(&self) -> &[SafetensorsReader] {
        &self.shards
    }

    pub fn tensor_count(&self) -> usize {
        self.shards.iter().map(|s| s.tensor_count).sum()
    }

    /// Total bytes of tensor data across shards
    pub fn weight_bytes(&self) -> usize {
        self.shards.iter().map(|s| s.weight_bytes()).sum()
    }

    /// PJRT runtime the model is bound to, when it lives on xla
    pub fn runtime(&self) -> Option<&str> {
        self.runtime.as_deref()
    }

    pub fn compiled(&self) -> Option<&CompiledGraph> {
        self.compiled.as_ref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl CausalLm for HostCausalLm {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ModelConfig {
        &mut self.config
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn to_device(&mut self, device: &Device) -> Result<(), Box<dyn Error + Send + Sync>> {
        let runtime = match device {
            Device::Cpu => None,
            // The device library reads the runtime declaration on first use
            Device::Xla => Some(self.env.get(EnvVar::PjrtDevice).ok_or(HostError::RuntimeNotDeclared)?),
            Device::Other(token) => return Err(Box::new(HostError::UnsupportedDevice(token.clone()))),
        };

        if &self.device != device {
            info!(
                "Moving {} ({} bytes in {} tensors) from {} to {}",
                self.name, self.weight_bytes(), self.tensor_count(), self.device, device
            );
        }
        self.device = device.clone();
        self.runtime = runtime;
        Ok(())
    }

    fn eval(&mut self) {
        self.mode = ExecutionMode::Eval;
    }

    fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

/// Framework that loads model directories from local disk.
pub struct HostFramework {
    models_dir: Option<PathBuf>,
    capabilities: FrameworkCapabilities,
    env: Arc<dyn EnvironmentAccess>,
}

impl HostFramework {
    /// Creates a framework with automatic device placement enabled.
    pub fn new(env: Arc<dyn EnvironmentAccess>) -> Self {
        Self {
            models_dir: None,
            capabilities: FrameworkCapabilities { device_map: true },
            env,
        }
    }

    /// Relative identifiers are also looked up in this directory
    pub fn with_models_dir<P: Into<PathBuf>>(mut self, models_dir: P) -> Self {
        self.models_dir = Some(models_dir.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: FrameworkCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Finds the directory a model identifier refers to.
    pub fn resolve_model_dir(&self, model_id: &Path) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
        if model_id.is_dir() {
            return Ok(model_id.to_path_buf());
        }
        if let Some(models_dir) = &self.models_dir {
            if model_id.is_relative() {
                let candidate = models_dir.join(model_id);
                if candidate.is_dir() {
                    return Ok(candidate);
                }
            }
        }
        Err(Box::new(HostError::ModelNotFound(model_id.to_path_buf())))
    }

    /// Reads a model's configuration and weight headers without placing it.
    pub fn inspect(&self, model_id: &Path) -> Result<(ModelConfig, Vec<SafetensorsReader>), Box<dyn Error + Send + Sync>> {
        let dir = self.resolve_model_dir(model_id)?;

        let config_path = dir.join(CONFIG_FILE);
        if !config_path.is_file() {
            return Err(Box::new(HostError::MissingConfig(dir)));
        }
        let config = ModelConfig::from_file(&config_path)?;

        let shard_paths = discover_shards(&dir)?;
        if shard_paths.is_empty() {
            return Err(Box::new(HostError::NoWeights(dir)));
        }
        let shards = shard_paths.iter()
            .map(SafetensorsReader::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((config, shards))
    }
}

impl PretrainedFramework for HostFramework {
    type Model = HostCausalLm;

    fn capabilities(&self) -> FrameworkCapabilities {
        self.capabilities
    }

    fn from_pretrained(
        &self,
        model_id: &Path,
        device_map: Option<&Device>,
        args: &PretrainedArgs,
    ) -> Result<Self::Model, Box<dyn Error + Send + Sync>> {
        if device_map.is_some() && !self.capabilities.device_map {
            return Err(Box::new(HostError::DeviceMapUnsupported));
        }

        let dir = self.resolve_model_dir(model_id)?;
        let (mut config, shards) = self.inspect(&dir)?;

        if !args.positional.is_empty() {
            warn!("Ignoring {} positional loader argument(s)", args.positional.len());
        }
        for key in config.update_from_kwargs(&args.named) {
            warn!("Ignoring unused loader argument '{}'", key);
        }

        let name = dir.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.display().to_string());

        let mut model = HostCausalLm {
            name,
            path: dir,
            config,
            shards,
            device: Device::Cpu,
            runtime: None,
            mode: ExecutionMode::Train,
            compiled: None,
            loaded_at: Utc::now(),
            env: Arc::clone(&self.env),
        };

        info!(
            "Loaded {} from {}: {} tensors in {} shard(s)",
            model.name, model.path.display(), model.tensor_count(), model.shards.len()
        );

        if let Some(device) = device_map {
            model.to_device(device)?;
        }

        Ok(model)
    }

    fn compile(&self, mut model: Self::Model, backend: &str) -> Result<Self::Model, Box<dyn Error + Send + Sync>> {
        if !SUPPORTED_COMPILE_BACKENDS.contains(&backend) {
            return Err(Box::new(HostError::UnsupportedBackend(backend.to_string())));
        }
        if model.mode != ExecutionMode::Eval {
            return Err(Box::new(HostError::NotInEvalMode));
        }
        if !model.device.is_xla() {
            return Err(Box::new(HostError::UnsupportedDevice(model.device.to_string())));
        }

        debug!("Compiling {} with backend {}", model.name, backend);
        model.compiled = Some(CompiledGraph {
            backend: backend.to_string(),
            compiled_at: Utc::now(),
        });
        Ok(model)
    }
}
