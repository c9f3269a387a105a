use std::collections::BTreeSet;

use log::trace;

use crate::data::dataset::{Dataset, NodeId};
use crate::error::{Result, SubsetError};
use crate::mask::{Mask, SetOp};

/// Selection of nodes from the dataset's hierarchy.
///
/// Duplicate ids and insertion order carry no meaning, so the node list is
/// kept as an ordered set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSelection {
    node_list: BTreeSet<NodeId>,
}

impl TreeSelection {
    /// Fails with `MissingStructure` before collecting `nodes` when `data`
    /// has no populated index map.
    pub(crate) fn new(data: &Dataset, nodes: impl IntoIterator<Item = NodeId>) -> Result<Self> {
        index_map(data)?;
        Ok(TreeSelection::from_nodes(nodes.into_iter().collect()))
    }

    pub(crate) fn from_nodes(node_list: BTreeSet<NodeId>) -> Self {
        TreeSelection { node_list }
    }

    pub fn node_list(&self) -> &BTreeSet<NodeId> {
        &self.node_list
    }

    /// Union over selected nodes of the elements mapped to each node.
    pub(crate) fn to_mask(&self, data: &Dataset) -> Result<Mask> {
        let map = index_map(data)?;
        trace!(
            "{}: tree mask over {} nodes, {} elements",
            data.id(),
            self.node_list.len(),
            map.len()
        );
        let values = map.iter().map(|n| self.node_list.contains(n)).collect();
        Mask::new(data.shape().clone(), values)
    }

    /// Node-set algebra; no mask is materialised.
    pub(crate) fn combine(&self, other: &TreeSelection, op: SetOp) -> TreeSelection {
        TreeSelection::from_nodes(op.apply_sets(&self.node_list, &other.node_list))
    }
}

fn index_map(data: &Dataset) -> Result<&[NodeId]> {
    data.tree()
        .ok_or(SubsetError::MissingStructure("tree"))?
        .index_map()
        .ok_or(SubsetError::MissingStructure("tree index map"))
}
