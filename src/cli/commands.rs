use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::info;
use crate::config::Settings;
use crate::environment::EnvironmentAccess;
use crate::framework::{HostFramework, PretrainedArgs};
use crate::loader::TpuModelForCausalLm;
use super::display::{display_inspection, display_loaded_model};

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{prefix:.bold.dim} {spinner} {wide_msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message);
    pb
}

fn host_framework(settings: &Settings, env: Arc<dyn EnvironmentAccess>) -> HostFramework {
    HostFramework::new(env)
        .with_models_dir(&settings.models.directory)
        .with_capabilities(settings.capabilities())
}

/// Handles `tpulm load`.
///
/// Command line values win; missing ones fall back to the `[inference]` settings.
pub fn load(
    settings: &Settings,
    env: Arc<dyn EnvironmentAccess>,
    model: &Path,
    task: Option<String>,
    batch_size: Option<usize>,
    sequence_length: Option<usize>,
    kwargs: Vec<(String, Value)>,
) -> Result<()> {
    let defaults = settings.inference_overrides();
    let task = task.or(defaults.task);
    let batch_size = batch_size.or(defaults.batch_size);
    let sequence_length = sequence_length.or(defaults.sequence_length);

    let args = kwargs.into_iter()
        .fold(PretrainedArgs::new(), |args, (key, value)| args.with_kwarg(&key, value));

    let loader = TpuModelForCausalLm::new(host_framework(settings, Arc::clone(&env)), env);
    info!("Loading {} with {} placement", model.display(), loader.strategy_name());

    let pb = spinner(format!("Loading {}...", model.display()));
    let result = loader.from_pretrained(model, task.as_deref(), batch_size, sequence_length, &args);
    pb.finish_and_clear();

    let loaded = result
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to load {}", model.display()))?;

    display_loaded_model(&loaded);
    Ok(())
}

/// Handles `tpulm inspect`.
pub fn inspect(settings: &Settings, env: Arc<dyn EnvironmentAccess>, model: &Path) -> Result<()> {
    let framework = host_framework(settings, env);

    let pb = spinner(format!("Reading {}...", model.display()));
    let result = framework.inspect(model);
    pb.finish_and_clear();

    let (config, shards) = result
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to inspect {}", model.display()))?;

    display_inspection(&config, &shards);
    Ok(())
}
