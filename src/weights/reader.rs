use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use memmap2::Mmap;
use safetensors::SafeTensors;
use tracing::{debug, trace};
use super::types::{SafetensorsError, TensorInfo};
use super::utils::is_safetensors_file;

/// A memory-mapped safetensors shard and the tensors its header describes.
pub struct SafetensorsReader {
    /// Path to the shard
    pub path: PathBuf,
    /// Number of tensors in the shard
    pub tensor_count: usize,
    /// Tensors sorted by name
    pub tensors: Vec<TensorInfo>,
    /// Memory-mapped contents of the shard
    data: Mmap,
}

impl SafetensorsReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let path = path.as_ref();

        if !is_safetensors_file(path) {
            return Err(Box::new(SafetensorsError::InvalidFormat(
                format!("{} has no valid header length prefix", path.display())
            )));
        }

        let file = File::open(path).map_err(SafetensorsError::from)?;
        let data = unsafe { Mmap::map(&file).map_err(SafetensorsError::from)? };

        let mut tensors: Vec<TensorInfo> = {
            let parsed = SafeTensors::deserialize(&data)
                .map_err(|e| SafetensorsError::InvalidFormat(
                    format!("{}: {}", path.display(), e)
                ))?;
            parsed.tensors()
                .into_iter()
                .map(|(name, view)| TensorInfo {
                    name,
                    dtype: format!("{:?}", view.dtype()),
                    shape: view.shape().to_vec(),
                    byte_len: view.data().len(),
                })
                .collect()
        };
        tensors.sort_by(|a, b| a.name.cmp(&b.name));

        debug!("Read safetensors shard {}: {} tensors", path.display(), tensors.len());
        for tensor in &tensors {
            trace!("  {}", tensor);
        }

        Ok(Self {
            path: path.to_path_buf(),
            tensor_count: tensors.len(),
            tensors,
            data,
        })
    }

    /// Size of the mapped shard in bytes
    pub fn mapped_len(&self) -> usize {
        self.data.len()
    }

    /// Total bytes of tensor data in the shard
    pub fn weight_bytes(&self) -> usize {
        self.tensors.iter().map(|t| t.byte_len).sum()
    }

    pub fn get_tensor_by_name(&self, name: &str) -> Option<&TensorInfo> {
        self.tensors.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reads_tensor_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        let header = r#"{"lm_head.weight":{"dtype":"F32","shape":[2,2],"data_offsets":[0,16]},"embed.weight":{"dtype":"F32","shape":[2],"data_offsets":[16,24]}}"#;
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0u8; 24]);
        fs::write(&path, bytes).unwrap();

        let reader = SafetensorsReader::new(&path).unwrap();

        assert_eq!(reader.tensor_count, 2);
        assert_eq!(reader.tensors[0].name, "embed.weight");
        assert_eq!(reader.weight_bytes(), 24);
        let head = reader.get_tensor_by_name("lm_head.weight").unwrap();
        assert_eq!(head.dtype, "F32");
        assert_eq!(head.shape, vec![2, 2]);
        assert_eq!(head.element_count(), 4);
        assert_eq!(head.to_string(), "lm_head.weight F32 [2 × 2]");
        assert_eq!(reader.mapped_len(), 8 + header.len() + 24);
    }

    #[test]
    fn test_rejects_non_safetensors_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        fs::write(&path, b"not a checkpoint").unwrap();

        let err = SafetensorsReader::new(&path).err().unwrap();
        assert!(err.to_string().contains("Invalid safetensors format"));
    }

    #[test]
    fn test_rejects_truncated_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        let header = r#"{"w":{"dtype":"F32","shape":[4],"data_offsets":[0,16]}}"#;
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0u8; 4]);
        fs::write(&path, bytes).unwrap();

        assert!(SafetensorsReader::new(&path).is_err());
    }
}
