use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use crate::framework::{CausalLm, HostCausalLm};
use crate::model::{Attr, ModelConfig};
use crate::weights::SafetensorsReader;

fn header(labels: &[&str]) -> Vec<Cell> {
    labels.iter()
        .map(|l| Cell::new(l).fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

fn attr_cell<T: std::fmt::Display>(attr: &Attr<T>) -> Cell {
    match attr {
        Attr::Value(v) => Cell::new(v.to_string()).fg(comfy_table::Color::Green),
        Attr::Unset => Cell::new("unset").fg(comfy_table::Color::DarkGrey),
        Attr::Missing => Cell::new("missing").fg(comfy_table::Color::Red),
    }
}

fn inference_rows(table: &mut Table, config: &ModelConfig) {
    table.add_row(vec![Cell::new("task"), attr_cell(&config.task)]);
    table.add_row(vec![Cell::new("batch_size"), attr_cell(&config.batch_size)]);
    table.add_row(vec![Cell::new("sequence_length"), attr_cell(&config.sequence_length)]);
}

/// Displays how a loaded model was configured.
pub fn display_loaded_model(model: &HostCausalLm) {
    let mut table = Table::new();
    table
        .set_header(header(&["Property", "Value"]))
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![Cell::new("model"), Cell::new(&model.name).fg(comfy_table::Color::Yellow)]);
    table.add_row(vec![Cell::new("path"), Cell::new(model.path().display())]);
    table.add_row(vec![
        Cell::new("model_type"),
        Cell::new(model.config().model_type().unwrap_or("-")).fg(comfy_table::Color::Magenta),
    ]);
    table.add_row(vec![Cell::new("device"), Cell::new(model.device()).fg(comfy_table::Color::Blue)]);
    table.add_row(vec![Cell::new("runtime"), Cell::new(model.runtime().unwrap_or("-"))]);
    table.add_row(vec![Cell::new("mode"), Cell::new(model.mode())]);
    table.add_row(vec![
        Cell::new("compiled"),
        Cell::new(model.compiled().map(|c| c.backend.as_str()).unwrap_or("no")),
    ]);
    table.add_row(vec![
        Cell::new("tensors"),
        Cell::new(model.tensor_count()).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("weight bytes"),
        Cell::new(model.weight_bytes()).set_alignment(CellAlignment::Right),
    ]);
    inference_rows(&mut table, model.config());
    table.add_row(vec![
        Cell::new("loaded at"),
        Cell::new(model.loaded_at().format("%Y-%m-%d %H:%M:%S").to_string()).fg(comfy_table::Color::DarkGrey),
    ]);

    println!("\n{}", table);
    println!("{}", format!("Model ready on {}", model.device()).bright_green());
}

/// Displays a model's configuration and the tensors of each shard.
pub fn display_inspection(config: &ModelConfig, shards: &[SafetensorsReader]) {
    let mut fields = Table::new();
    fields
        .set_header(header(&["Field", "Value"]))
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    inference_rows(&mut fields, config);
    for (key, value) in &config.extra {
        fields.add_row(vec![Cell::new(key), Cell::new(value.to_string())]);
    }
    println!("\n{}", fields);

    let mut tensors = Table::new();
    tensors
        .set_header(header(&["Shard", "Tensor", "Dtype", "Shape", "Bytes"]))
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut total = 0;
    let mut mapped = 0;
    for shard in shards {
        mapped += shard.mapped_len();
        let shard_name = shard.path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        for tensor in &shard.tensors {
            tensors.add_row(vec![
                Cell::new(&shard_name).fg(comfy_table::Color::DarkGrey),
                Cell::new(&tensor.name).fg(comfy_table::Color::Yellow),
                Cell::new(&tensor.dtype).set_alignment(CellAlignment::Center),
                Cell::new(format!("{:?}", tensor.shape)),
                Cell::new(tensor.byte_len).set_alignment(CellAlignment::Right),
            ]);
            total += 1;
        }
    }

    println!("\n{}", tensors);
    println!("{}", "=".repeat(80).bright_black());
    println!("{}", format!("Total tensors: {} in {} shard(s), {} bytes mapped", total, shards.len(), mapped).bright_green());
}
