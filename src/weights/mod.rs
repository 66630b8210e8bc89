mod reader;
mod types;
mod utils;

pub use reader::SafetensorsReader;
pub use types::{SafetensorsError, TensorInfo};
pub use utils::{discover_shards, is_safetensors_file, INDEX_FILE, SINGLE_FILE};
