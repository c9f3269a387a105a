use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::dataset::{Dataset, NodeId, Tree};
use crate::mask::Shape;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset description from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `{ "label": "...", "shape": [..], "index_map": [..] }`
/// * `.csv`  – a `node` column holding one node id per element
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn default_label(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DatasetFile {
    label: Option<String>,
    shape: Option<Vec<usize>>,
    index_map: Option<Vec<NodeId>>,
}

/// `shape` may be omitted when `index_map` is present; the dataset is then
/// one-dimensional with one element per index map entry.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let file: DatasetFile = serde_json::from_str(&text).context("parsing JSON")?;

    let shape = match (&file.shape, &file.index_map) {
        (Some(dims), _) => Shape::from(dims.clone()),
        (None, Some(map)) => Shape::from(map.len()),
        (None, None) => bail!("{}: needs 'shape' or 'index_map'", path.display()),
    };
    let label = file.label.unwrap_or_else(|| default_label(path));

    let dataset = Dataset::new(label, shape);
    match file.index_map {
        Some(map) => dataset
            .with_tree(Tree::new(map))
            .context("index_map does not match shape"),
        None => Ok(dataset),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row, one row per element, node id in the `node` column.
/// Other columns are ignored.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let node_idx = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .position(|h| h.trim() == "node")
        .context("CSV missing 'node' column")?;

    let mut index_map = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = record.get(node_idx).unwrap_or("").trim();
        let node: NodeId = cell
            .parse()
            .with_context(|| format!("Row {row_no}: '{cell}' is not a node id"))?;
        index_map.push(node);
    }

    let shape = Shape::from(index_map.len());
    Ok(Dataset::new(default_label(path), shape).with_tree(Tree::new(index_map))?)
}
