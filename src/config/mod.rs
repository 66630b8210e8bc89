// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File};
use crate::framework::FrameworkCapabilities;
use crate::model::InferenceOverrides;

/// Configuration for locating models
#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    /// Directory relative model identifiers are resolved against
    pub directory: PathBuf,
}

/// Default inference fields applied when the command line gives none
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InferenceConfig {
    /// Task identifier
    #[serde(default)]
    pub task: Option<String>,
    /// Static batch size
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Static sequence length
    #[serde(default)]
    pub sequence_length: Option<usize>,
}

/// Configuration for the device runtime
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Whether the framework places weights itself from a device-map hint
    #[serde(default = "default_device_map")]
    pub device_map: bool,
}

fn default_device_map() -> bool {
    true
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log directory
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Model-related settings
    pub models: ModelsConfig,
    /// Inference defaults
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Device runtime settings
    pub runtime: RuntimeConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

/// Implementation for loading and parsing configuration
impl Settings {
    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with TPULM_ (nested keys joined by `__`,
    ///    e.g. `TPULM_INFERENCE__BATCH_SIZE`)
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml)
    pub fn from_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        // Check if config directory exists
        if !config_dir.exists() {
            return Err(ConfigError::Message(
                format!("Config directory not found at: {}", config_dir.display())
            ));
        }

        // Check if default.toml exists
        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        let local_config = config_dir.join("local.toml");

        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        let settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(
                Environment::with_prefix("TPULM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Inference fields from settings, as loader overrides
    pub fn inference_overrides(&self) -> InferenceOverrides {
        InferenceOverrides {
            task: self.inference.task.clone(),
            batch_size: self.inference.batch_size,
            sequence_length: self.inference.sequence_length,
        }
    }

    /// Framework capabilities declared by settings
    pub fn capabilities(&self) -> FrameworkCapabilities {
        FrameworkCapabilities { device_map: self.runtime.device_map }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        // Create models directory if it doesn't exist
        if !self.models.directory.exists() {
            std::fs::create_dir_all(&self.models.directory).map_err(|e| {
                ConfigError::Message(format!(
                    "Failed to create models directory at {}: {}",
                    self.models.directory.display(), e
                ))
            })?;
        }

        if self.inference.batch_size == Some(0) {
            return Err(ConfigError::Message(
                "batch_size must be greater than 0".to_string()
            ));
        }

        if self.inference.sequence_length == Some(0) {
            return Err(ConfigError::Message(
                "sequence_length must be greater than 0".to_string()
            ));
        }

        if let Some(task) = &self.inference.task {
            if task.trim().is_empty() {
                return Err(ConfigError::Message("task must not be empty".to_string()));
            }
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log directory if configured and doesn't exist
        if let Some(log_dir) = &self.logging.file {
            if !log_dir.exists() {
                std::fs::create_dir_all(log_dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        log_dir.display(), e
                    ))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_default(dir: &Path, body: &str) {
        fs::write(dir.join("default.toml"), body).unwrap();
    }

    fn base_toml(root: &Path) -> String {
        format!(
            "[models]\ndirectory = \"{}\"\n\n[runtime]\ndevice_map = false\n\n[logging]\nlevel = \"debug\"\nfile = \"{}\"\n",
            root.join("models").display(),
            root.join("logs").display(),
        )
    }

    #[test]
    fn test_loads_defaults_and_creates_dirs() {
        let root = tempfile::tempdir().unwrap();
        write_default(root.path(), &base_toml(root.path()));

        let settings = Settings::from_dir(root.path()).unwrap();

        assert!(!settings.capabilities().device_map);
        assert_eq!(settings.inference_overrides(), InferenceOverrides::default());
        assert!(root.path().join("models").is_dir());
        assert!(root.path().join("logs").is_dir());
    }

    #[test]
    fn test_local_file_overrides_default() {
        let root = tempfile::tempdir().unwrap();
        write_default(root.path(), &base_toml(root.path()));
        fs::write(
            root.path().join("local.toml"),
            "[inference]\ntask = \"text-generation\"\nbatch_size = 4\nsequence_length = 128\n",
        ).unwrap();

        let settings = Settings::from_dir(root.path()).unwrap();
        let overrides = settings.inference_overrides();

        assert_eq!(overrides.task.as_deref(), Some("text-generation"));
        assert_eq!(overrides.batch_size, Some(4));
        assert_eq!(overrides.sequence_length, Some(128));
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let root = tempfile::tempdir().unwrap();
        let body = format!("{}\n[inference]\nbatch_size = 0\n", base_toml(root.path()));
        write_default(root.path(), &body);

        let err = Settings::from_dir(root.path()).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_rejects_unknown_level() {
        let root = tempfile::tempdir().unwrap();
        let body = base_toml(root.path()).replace("\"debug\"", "\"loud\"");
        write_default(root.path(), &body);

        let err = Settings::from_dir(root.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid logging level"));
    }

    #[test]
    fn test_missing_default_file() {
        let root = tempfile::tempdir().unwrap();
        let err = Settings::from_dir(root.path()).unwrap_err();
        assert!(err.to_string().contains("Default configuration file not found"));
    }
}
