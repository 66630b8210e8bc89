use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use byteorder::{LittleEndian, ReadBytesExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use super::types::SafetensorsError;

/// Name of a single-file checkpoint
pub const SINGLE_FILE: &str = "model.safetensors";
/// Name of the index that maps tensors to shards
pub const INDEX_FILE: &str = "model.safetensors.index.json";

// Shard naming used by sharded checkpoints: model-00001-of-00004.safetensors
static SHARD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^model-(\d+)-of-(\d+)\.safetensors$").expect("valid shard pattern")
});

/// Upper bound on the JSON header, matching the format's own limit
pub const MAX_HEADER_LEN: u64 = 100_000_000;

/// Checks the 8-byte header length prefix and the opening brace of the header.
pub fn is_safetensors_file<P: AsRef<Path>>(path: P) -> bool {
    if let Ok(mut file) = File::open(path) {
        if let Ok(header_len) = file.read_u64::<LittleEndian>() {
            if header_len < 2 || header_len > MAX_HEADER_LEN {
                return false;
            }
            let mut first = [0u8; 1];
            if file.read_exact(&mut first).is_ok() {
                return first[0] == b'{';
            }
        }
    }
    false
}

/// Lists the weight shards of a model directory, in load order.
///
/// Looks for the shard index first, then a single-file checkpoint, then
/// numbered shards. Returns an empty list when the directory has no weights.
pub fn discover_shards(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error + Send + Sync>> {
    let index_path = dir.join(INDEX_FILE);
    if index_path.is_file() {
        return shards_from_index(dir, &index_path);
    }

    let single = dir.join(SINGLE_FILE);
    if single.is_file() {
        return Ok(vec![single]);
    }

    numbered_shards(dir)
}

fn shards_from_index(dir: &Path, index_path: &Path) -> Result<Vec<PathBuf>, Box<dyn Error + Send + Sync>> {
    let content = fs::read_to_string(index_path)?;
    let index: serde_json::Value = serde_json::from_str(&content)?;

    let weight_map = index.get("weight_map")
        .and_then(|v| v.as_object())
        .ok_or_else(|| SafetensorsError::InvalidFormat(
            format!("{} has no 'weight_map' object", index_path.display())
        ))?;

    let files: BTreeSet<&str> = weight_map.values()
        .filter_map(|v| v.as_str())
        .collect();

    let mut shards = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(file);
        if !path.is_file() {
            return Err(Box::new(SafetensorsError::MissingShard(file.to_string())));
        }
        shards.push(path);
    }
    Ok(shards)
}

// Shards are grouped by their `-of-N` total; exactly one group must be complete.
fn numbered_shards(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error + Send + Sync>> {
    let mut sets: BTreeMap<usize, BTreeMap<usize, PathBuf>> = BTreeMap::new();
    for entry in fs::read_dir(dir)?.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(caps) = SHARD_PATTERN.captures(&name) {
            let number = caps[1].parse::<usize>()?;
            let total = caps[2].parse::<usize>()?;
            sets.entry(total).or_default().insert(number, entry.path());
        }
    }

    if sets.is_empty() {
        return Ok(Vec::new());
    }

    let complete: Vec<usize> = sets.iter()
        .filter(|(total, shards)| (1..=**total).all(|n| shards.contains_key(&n)))
        .map(|(total, _)| *total)
        .collect();

    match complete.as_slice() {
        [total] => {
            let shards = sets.remove(total).unwrap_or_default();
            Ok(shards.into_values().collect())
        }
        [] => {
            // Report against the set with the most shards present
            let (total, shards) = sets.iter()
                .max_by_key(|(_, shards)| shards.len())
                .map(|(total, shards)| (*total, shards))
                .ok_or_else(|| SafetensorsError::InvalidFormat(dir.display().to_string()))?;
            let missing = (1..=total).find(|n| !shards.contains_key(n)).unwrap_or(total);
            Err(Box::new(SafetensorsError::MissingShard(
                format!("model-{:05}-of-{:05}.safetensors", missing, total)
            )))
        }
        totals => Err(Box::new(SafetensorsError::InvalidFormat(format!(
            "{} holds more than one complete shard set (of {})",
            dir.display(),
            totals.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
        )))),
    }
}
