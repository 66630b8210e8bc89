//! Command line interface

mod commands;
mod display;

pub use commands::{inspect, load};

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use serde_json::Value;

/// tpulm - load causal language models for inference on XLA devices
#[derive(Parser)]
#[command(name = "tpulm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and an optional local.toml
    #[arg(long, global = true, default_value = "config")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a model for inference and report how it was configured
    Load {
        /// Model directory, absolute or relative to the models directory
        model: PathBuf,

        /// Task to record in the model configuration
        #[arg(long)]
        task: Option<String>,

        /// Static batch size
        #[arg(long)]
        batch_size: Option<usize>,

        /// Static sequence length
        #[arg(long)]
        sequence_length: Option<usize>,

        /// Extra loader argument; the value is parsed as JSON, falling back to a string
        #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        args: Vec<(String, Value)>,
    },

    /// Show a model's configuration and tensors without placing it on a device
    Inspect {
        /// Model directory, absolute or relative to the models directory
        model: PathBuf,
    },
}

/// Parses a `KEY=VALUE` loader argument.
pub fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw.split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("use_cache=false").unwrap(), ("use_cache".to_string(), json!(false)));
        assert_eq!(parse_key_value("revision=main").unwrap(), ("revision".to_string(), json!("main")));
        assert_eq!(parse_key_value("rope=[1,2]").unwrap(), ("rope".to_string(), json!([1, 2])));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn test_cli_parses_load() {
        let cli = Cli::try_parse_from([
            "tpulm", "load", "gemma-2b", "--task", "text-generation",
            "--batch-size", "4", "--arg", "use_cache=false",
        ]).unwrap();

        match cli.command {
            Commands::Load { model, task, batch_size, sequence_length, args } => {
                assert_eq!(model, PathBuf::from("gemma-2b"));
                assert_eq!(task.as_deref(), Some("text-generation"));
                assert_eq!(batch_size, Some(4));
                assert_eq!(sequence_length, None);
                assert_eq!(args, vec![("use_cache".to_string(), json!(false))]);
            }
            _ => panic!("expected load command"),
        }
        assert_eq!(cli.config_dir, PathBuf::from("config"));
    }
}
