#![allow(dead_code)]

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tpulm::{
    CausalLm, Device, EnvVar, EnvironmentAccess, ExecutionMode, FrameworkCapabilities,
    MemoryEnvironment, ModelConfig, PretrainedArgs, PretrainedFramework,
};

/// A call the recording framework received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FromPretrained {
        model_id: PathBuf,
        device_map: Option<Device>,
        args: PretrainedArgs,
        runtime: Option<String>,
    },
    Compile(String),
}

#[derive(Debug)]
pub struct FakeModel {
    pub config: ModelConfig,
    pub device: Device,
    pub mode: ExecutionMode,
    pub compiled_with: Option<String>,
    pub moves: Vec<Device>,
}

impl CausalLm for FakeModel {
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
        self.moves.push(device.clone());
        self.device = device.clone();
        Ok(())
    }

    fn eval(&mut self) {
        self.mode = ExecutionMode::Eval;
    }

    fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

#[derive(Debug)]
pub struct FakeLoadError(pub String);

impl fmt::Display for FakeLoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fake load failure: {}", self.0)
    }
}

impl Error for FakeLoadError {}

/// Framework double that hands out a fixed config and records every call.
pub struct RecordingFramework {
    pub capabilities: FrameworkCapabilities,
    pub config: ModelConfig,
    pub fail_with: Option<String>,
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub env: Arc<dyn EnvironmentAccess>,
}

impl RecordingFramework {
    pub fn new(env: Arc<dyn EnvironmentAccess>, device_map: bool, config: ModelConfig) -> Self {
        Self {
            capabilities: FrameworkCapabilities { device_map },
            config,
            fail_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            env,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl PretrainedFramework for RecordingFramework {
    type Model = FakeModel;

    fn capabilities(&self) -> FrameworkCapabilities {
        self.capabilities
    }

    fn from_pretrained(
        &self,
        model_id: &Path,
        device_map: Option<&Device>,
        args: &PretrainedArgs,
    ) -> Result<FakeModel, Box<dyn Error + Send + Sync>> {
        self.calls.lock().unwrap().push(Call::FromPretrained {
            model_id: model_id.to_path_buf(),
            device_map: device_map.cloned(),
            args: args.clone(),
            runtime: self.env.get(EnvVar::PjrtDevice),
        });

        if let Some(reason) = &self.fail_with {
            return Err(Box::new(FakeLoadError(reason.clone())));
        }

        Ok(FakeModel {
            config: self.config.clone(),
            device: device_map.cloned().unwrap_or(Device::Cpu),
            mode: ExecutionMode::Train,
            compiled_with: None,
            moves: Vec::new(),
        })
    }

    fn compile(&self, mut model: FakeModel, backend: &str) -> Result<FakeModel, Box<dyn Error + Send + Sync>> {
        self.calls.lock().unwrap().push(Call::Compile(backend.to_string()));
        model.compiled_with = Some(backend.to_string());
        Ok(model)
    }
}

/// Writes a minimal model directory: config.json plus a one-tensor checkpoint.
pub fn write_model_dir(dir: &Path, config: &str) {
    fs::write(dir.join("config.json"), config).unwrap();
    let header = r#"{"model.embed_tokens.weight":{"dtype":"BF16","shape":[4,2],"data_offsets":[0,16]}}"#;
    let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(&[0u8; 16]);
    fs::write(dir.join("model.safetensors"), bytes).unwrap();
}

/// In-memory environment that counts the writes `set_if_absent` performs.
#[derive(Debug, Default)]
pub struct CountingEnvironment {
    inner: MemoryEnvironment,
    writes: AtomicUsize,
}

impl CountingEnvironment {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl EnvironmentAccess for CountingEnvironment {
    fn get(&self, var: EnvVar) -> Option<String> {
        self.inner.get(var)
    }

    fn set_if_absent(&self, var: EnvVar, value: &str) -> bool {
        let written = self.inner.set_if_absent(var, value);
        if written {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        written
    }
}
