use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use log::warn;
use subset_kit::data::loader::load_dataset;
use subset_kit::{NodeId, Subset};

const USAGE: &str = "usage: subset-kit <dataset.json|dataset.csv> <node-ids> <output.parquet>";

fn parse_nodes(arg: &str) -> Result<Vec<NodeId>> {
    arg.split(',')
        .filter(|tok| !tok.trim().is_empty())
        .map(|tok| {
            tok.trim()
                .parse::<NodeId>()
                .with_context(|| format!("'{tok}' is not a node id"))
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [dataset_path, nodes, output] = args.as_slice() else {
        bail!("{USAGE}");
    };

    let data = Rc::new(load_dataset(&PathBuf::from(dataset_path)).context("loading dataset")?);
    let nodes = parse_nodes(nodes)?;
    if let Some(tree) = data.tree() {
        let known = tree.nodes();
        for node in nodes.iter().filter(|n| !known.contains(*n)) {
            warn!("node {node} does not appear in the index map of '{}'", data.label());
        }
    }

    let mut subset = Subset::tree_with_nodes(&data, nodes)
        .with_context(|| format!("building tree subset on '{}'", data.label()))?;
    subset.set_label(Some(format!("{} nodes {}", data.label(), args[1])));

    let selected = subset.to_index_list(None)?.len();
    subset
        .export_mask(output, "parquet")
        .with_context(|| format!("writing {output}"))?;

    println!(
        "{}: selected {selected} of {} elements ({} colour {}) -> {output}",
        subset.label().unwrap_or_default(),
        data.len(),
        subset.kind(),
        subset.style().color,
    );
    Ok(())
}
