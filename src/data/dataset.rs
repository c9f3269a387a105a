use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use super::coordinates::{Coordinates, IdentityCoordinates};
use crate::error::{Result, SubsetError};
use crate::hub::Hub;
use crate::mask::Shape;
use crate::subset::SubsetId;

/// Identifier of a node in a dataset's hierarchy.
pub type NodeId = i64;

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique dataset identifier carried by subset messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(u64);

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dataset#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tree – hierarchical partitioning of the elements
// ---------------------------------------------------------------------------

/// Hierarchical partitioning of a dataset. The index map assigns every
/// element (by flat position) to one node.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    index_map: Option<Vec<NodeId>>,
}

impl Tree {
    pub fn new(index_map: Vec<NodeId>) -> Self {
        Tree {
            index_map: Some(index_map),
        }
    }

    /// A tree whose index map has not been computed yet.
    pub fn unpopulated() -> Self {
        Tree { index_map: None }
    }

    pub fn index_map(&self) -> Option<&[NodeId]> {
        self.index_map.as_deref()
    }

    /// Distinct node ids appearing in the index map.
    pub fn nodes(&self) -> BTreeSet<NodeId> {
        self.index_map
            .iter()
            .flatten()
            .copied()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The data a subset describes.
///
/// Datasets are shared as `Rc<Dataset>` and compared by identity only: two
/// datasets with equal contents are still different datasets. Subsets never
/// modify a dataset's structure; the hub slot and subset collection use
/// interior mutability so they can be updated through a shared reference.
pub struct Dataset {
    id: DatasetId,
    label: String,
    shape: Shape,
    tree: Option<Tree>,
    coordinates: Rc<dyn Coordinates>,
    hub: RefCell<Option<Rc<dyn Hub>>>,
    subsets: RefCell<Vec<SubsetId>>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Dataset {
            id: DatasetId(NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed)),
            label: label.into(),
            shape: shape.into(),
            tree: None,
            coordinates: Rc::new(IdentityCoordinates),
            hub: RefCell::new(None),
            subsets: RefCell::new(Vec::new()),
        }
    }

    /// Attach a hierarchy. A populated index map must cover every element.
    pub fn with_tree(mut self, tree: Tree) -> Result<Self> {
        if let Some(map) = tree.index_map() {
            if map.len() != self.shape.size() {
                return Err(SubsetError::ShapeMismatch {
                    expected: self.shape.clone(),
                    got: Shape::from(map.len()),
                });
            }
        }
        self.tree = Some(tree);
        Ok(self)
    }

    pub fn with_coordinates(mut self, coordinates: impl Coordinates + 'static) -> Self {
        self.coordinates = Rc::new(coordinates);
        self
    }

    pub fn with_hub(self, hub: Rc<dyn Hub>) -> Self {
        self.attach_hub(hub);
        self
    }

    /// Route future subset messages to `hub`, replacing any previous one.
    pub fn attach_hub(&self, hub: Rc<dyn Hub>) {
        debug!("{}: hub attached", self.id);
        *self.hub.borrow_mut() = Some(hub);
    }

    pub fn detach_hub(&self) -> Option<Rc<dyn Hub>> {
        self.hub.borrow_mut().take()
    }

    pub fn hub(&self) -> Option<Rc<dyn Hub>> {
        self.hub.borrow().clone()
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    pub fn coordinates(&self) -> &dyn Coordinates {
        self.coordinates.as_ref()
    }

    // -- subset collection --

    /// Attach a subset. Adding the same subset twice keeps a single entry.
    pub fn add_subset(&self, subset: SubsetId) {
        let mut subsets = self.subsets.borrow_mut();
        if !subsets.contains(&subset) {
            subsets.push(subset);
        }
    }

    /// Detach a subset, returning whether it was attached.
    pub fn remove_subset(&self, subset: SubsetId) -> bool {
        let mut subsets = self.subsets.borrow_mut();
        let before = subsets.len();
        subsets.retain(|s| *s != subset);
        subsets.len() != before
    }

    pub fn has_subset(&self, subset: SubsetId) -> bool {
        self.subsets.borrow().contains(&subset)
    }

    /// Attached subsets in attachment order.
    pub fn subsets(&self) -> Vec<SubsetId> {
        self.subsets.borrow().clone()
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.borrow().len()
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("shape", &self.shape)
            .field("tree", &self.tree)
            .field("has_hub", &self.hub.borrow().is_some())
            .field("subsets", &self.subsets.borrow())
            .finish()
    }
}
