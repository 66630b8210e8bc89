use std::fmt;
use std::error::Error;
use serde::{Serialize, Deserialize};

/// Custom error types for safetensors operations
#[derive(Debug)]
pub enum SafetensorsError {
    /// Wraps std::io::Error for file operations
    IoError(std::io::Error),
    /// The file is not a readable safetensors shard
    InvalidFormat(String),
    /// A shard named by the index (or the shard numbering) is not on disk
    MissingShard(String),
}

impl fmt::Display for SafetensorsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SafetensorsError::IoError(e) => write!(f, "I/O error: {}", e),
            SafetensorsError::InvalidFormat(msg) => write!(f, "Invalid safetensors format: {}", msg),
            SafetensorsError::MissingShard(name) => write!(f, "Weight shard not found: {}", name),
        }
    }
}

impl Error for SafetensorsError {}

impl From<std::io::Error> for SafetensorsError {
    fn from(err: std::io::Error) -> Self {
        SafetensorsError::IoError(err)
    }
}

/// Information about a tensor stored in a shard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorInfo {
    /// Name of the tensor
    pub name: String,
    /// Element type, as named by the safetensors header (e.g. "BF16")
    pub dtype: String,
    /// Size of each dimension
    pub shape: Vec<usize>,
    /// Length of the tensor data in bytes
    pub byte_len: usize,
}

impl TensorInfo {
    /// Number of elements in the tensor
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

impl fmt::Display for TensorInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} [{}]", self.name, self.dtype, self.shape.iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" × "))
    }
}
