//! Observable subsets of a dataset.
//!
//! A [`Subset`] owns a label, a [`VisualStyle`] and one [`Selection`]: an
//! explicit mask, a set of tree nodes, or a geometric region. Every write
//! goes through one hook that applies the change and then broadcasts it,
//! so views see exactly one message per mutation.
//!
//! Lifecycle:
//!
//! ```text
//!   Detached ──register()──▶ Registered ──unregister()──▶ Retired
//!   (silent)                 (broadcasting)               (silent for good)
//! ```
//!
//! Boolean algebra between two subsets of the same dataset materialises both
//! masks and yields an element subset, except tree ⊕ tree which works on the
//! node sets directly and yields a tree subset.

pub mod element;
pub mod region;
pub mod tree;

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

use self::element::{check_shape, ElementSelection};
use self::region::RegionSelection;
use self::tree::TreeSelection;
use crate::data::dataset::{Dataset, NodeId};
use crate::data::export::{write_mask, MaskFormat};
use crate::data::region::Region;
use crate::error::{Result, SubsetError};
use crate::hub::{SubsetAttribute, SubsetMessage};
use crate::mask::{Mask, SetOp};
use crate::style::{cycle_color, Color, LineStyle, Marker, VisualStyle};

static NEXT_SUBSET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique subset identifier carried by subset messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubsetId(u64);

impl SubsetId {
    pub(crate) fn next() -> Self {
        SubsetId(NEXT_SUBSET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subset#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsetKind {
    Element,
    Tree,
    Region,
}

impl fmt::Display for SubsetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubsetKind::Element => "element",
            SubsetKind::Tree => "tree",
            SubsetKind::Region => "region",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not attached to its dataset; never broadcast so far.
    Detached,
    Registered,
    /// Unregistered; will not broadcast again.
    Retired,
}

/// The kind-specific payload of a subset.
#[derive(Debug, Clone)]
pub enum Selection {
    Element(ElementSelection),
    Tree(TreeSelection),
    Region(RegionSelection),
}

impl Selection {
    pub fn kind(&self) -> SubsetKind {
        match self {
            Selection::Element(_) => SubsetKind::Element,
            Selection::Tree(_) => SubsetKind::Tree,
            Selection::Region(_) => SubsetKind::Region,
        }
    }
}

// ---------------------------------------------------------------------------
// Subset
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Subset {
    id: SubsetId,
    data: Rc<Dataset>,
    style: VisualStyle,
    label: Option<String>,
    broadcasting: bool,
    lifecycle: Lifecycle,
    selection: Selection,
}

impl Subset {
    /// New detached subset. Its colour comes from the palette position given
    /// by the number of subsets already attached to `data`.
    fn with_selection(data: &Rc<Dataset>, selection: Selection) -> Self {
        Subset {
            id: SubsetId::next(),
            data: Rc::clone(data),
            style: VisualStyle::with_color(cycle_color(data.subset_count())),
            label: None,
            broadcasting: false,
            lifecycle: Lifecycle::Detached,
            selection,
        }
    }

    /// Element subset with nothing selected.
    pub fn element(data: &Rc<Dataset>) -> Self {
        Self::with_selection(data, Selection::Element(ElementSelection::empty(data)))
    }

    pub fn element_with_mask(data: &Rc<Dataset>, mask: Mask) -> Result<Self> {
        let selection = ElementSelection::with_mask(data, mask)?;
        Ok(Self::with_selection(data, Selection::Element(selection)))
    }

    /// Tree subset with no nodes. `data` must carry a populated index map.
    pub fn tree(data: &Rc<Dataset>) -> Result<Self> {
        Self::tree_with_nodes(data, [])
    }

    pub fn tree_with_nodes(
        data: &Rc<Dataset>,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Result<Self> {
        let selection = TreeSelection::new(data, nodes)?;
        Ok(Self::with_selection(data, Selection::Tree(selection)))
    }

    /// Region subset with no region yet.
    pub fn region(data: &Rc<Dataset>) -> Self {
        Self::with_selection(data, Selection::Region(RegionSelection::default()))
    }

    pub fn region_with(data: &Rc<Dataset>, region: Rc<dyn Region>) -> Self {
        Self::with_selection(data, Selection::Region(RegionSelection::new(Some(region))))
    }

    // -- accessors --

    pub fn id(&self) -> SubsetId {
        self.id
    }

    pub fn data(&self) -> &Rc<Dataset> {
        &self.data
    }

    pub fn kind(&self) -> SubsetKind {
        self.selection.kind()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn style(&self) -> &VisualStyle {
        &self.style
    }

    pub fn is_broadcasting(&self) -> bool {
        self.broadcasting
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Stored mask of an element subset.
    pub fn mask(&self) -> Option<&Mask> {
        match &self.selection {
            Selection::Element(e) => Some(e.mask()),
            _ => None,
        }
    }

    pub fn node_list(&self) -> Option<&BTreeSet<NodeId>> {
        match &self.selection {
            Selection::Tree(t) => Some(t.node_list()),
            _ => None,
        }
    }

    pub fn region_shape(&self) -> Option<&Rc<dyn Region>> {
        match &self.selection {
            Selection::Region(r) => r.region(),
            _ => None,
        }
    }

    /// True iff `data` is this subset's own dataset (by identity).
    pub fn is_compatible(&self, data: &Dataset) -> bool {
        std::ptr::eq(data, Rc::as_ptr(&self.data))
    }

    // -- mutation --

    /// Apply `f`, then broadcast `attribute`. Every write goes through here.
    fn mutate<R>(
        &mut self,
        attribute: Option<SubsetAttribute>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let out = f(self);
        self.broadcast(attribute);
        out
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.mutate(Some(SubsetAttribute::Label), |s| s.label = label);
    }

    /// Replace an element subset's mask. A mask of the wrong shape is
    /// rejected before anything changes or is broadcast.
    pub fn set_mask(&mut self, mask: Mask) -> Result<()> {
        self.expect_kind(SubsetKind::Element)?;
        check_shape(&self.data, &mask)?;
        self.mutate(Some(SubsetAttribute::Mask), |s| {
            s.selection = Selection::Element(ElementSelection::with_mask_unchecked(mask));
        });
        Ok(())
    }

    pub fn set_node_list(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> Result<()> {
        self.expect_kind(SubsetKind::Tree)?;
        let nodes: BTreeSet<NodeId> = nodes.into_iter().collect();
        self.replace_nodes(nodes);
        Ok(())
    }

    /// Replace (or clear) a region subset's region.
    pub fn set_region(&mut self, region: Option<Rc<dyn Region>>) -> Result<()> {
        self.expect_kind(SubsetKind::Region)?;
        self.mutate(Some(SubsetAttribute::Region), |s| {
            s.selection = Selection::Region(RegionSelection::new(region));
        });
        Ok(())
    }

    /// Writable view of the style; each write broadcasts once.
    pub fn style_mut(&mut self) -> StyleEditor<'_> {
        StyleEditor { subset: self }
    }

    fn replace_nodes(&mut self, nodes: BTreeSet<NodeId>) {
        self.mutate(Some(SubsetAttribute::NodeList), |s| {
            s.selection = Selection::Tree(TreeSelection::from_nodes(nodes));
        });
    }

    fn expect_kind(&self, wanted: SubsetKind) -> Result<()> {
        if self.kind() != wanted {
            return Err(SubsetError::TypeIncompatible {
                left: self.kind(),
                right: wanted,
            });
        }
        Ok(())
    }

    // -- broadcasting --

    /// Attach to the dataset and start broadcasting.
    ///
    /// Registering twice is harmless. Registering after `unregister()` is
    /// not supported and fails with [`SubsetError::Unregistered`].
    pub fn register(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Retired {
            return Err(SubsetError::Unregistered(self.id));
        }
        self.data.add_subset(self.id);
        self.lifecycle = Lifecycle::Registered;
        self.broadcasting = true;
        debug!("{} registered on {}", self.id, self.data.id());
        Ok(())
    }

    /// Register and hand the subset to a guard that unregisters it when
    /// dropped.
    pub fn into_registration(mut self) -> Result<Registration> {
        self.register()?;
        Ok(Registration {
            subset: Some(self),
        })
    }

    /// Send one delete message (when broadcasting to a hub), detach from the
    /// dataset and stop broadcasting for good.
    pub fn unregister(&mut self) {
        if self.broadcasting {
            if let Some(hub) = self.data.hub() {
                hub.broadcast(SubsetMessage::Delete {
                    subset: self.id,
                    dataset: self.data.id(),
                });
            }
        }
        self.broadcasting = false;
        self.data.remove_subset(self.id);
        self.lifecycle = Lifecycle::Retired;
        debug!("{} unregistered from {}", self.id, self.data.id());
    }

    /// Toggle whether future mutations notify. Sends nothing itself.
    /// A retired subset stays silent.
    pub fn set_broadcasting(&mut self, enabled: bool) {
        if enabled && self.lifecycle == Lifecycle::Retired {
            warn!("{} is unregistered; broadcasting stays off", self.id);
            return;
        }
        self.broadcasting = enabled;
    }

    /// Send an update message for `attribute`, if broadcasting and the
    /// dataset has a hub. Without a hub this does nothing.
    pub fn broadcast(&self, attribute: Option<SubsetAttribute>) {
        if !self.broadcasting {
            return;
        }
        let Some(hub) = self.data.hub() else {
            return;
        };
        debug!(
            "{} update ({})",
            self.id,
            attribute.map_or("style", |a| a.as_str())
        );
        hub.broadcast(SubsetMessage::Update {
            subset: self.id,
            dataset: self.data.id(),
            attribute,
        });
    }

    // -- conversions --

    fn check_data(&self, data: Option<&Dataset>) -> Result<()> {
        match data {
            Some(d) if !self.is_compatible(d) => {
                Err(SubsetError::DataIncompatible { kind: self.kind() })
            }
            _ => Ok(()),
        }
    }

    /// Membership mask over `data` (defaults to the subset's own dataset).
    /// No kind resolves against a foreign dataset.
    pub fn to_mask(&self, data: Option<&Dataset>) -> Result<Mask> {
        self.check_data(data)?;
        match &self.selection {
            Selection::Element(e) => Ok(e.mask().clone()),
            Selection::Tree(t) => t.to_mask(&self.data),
            Selection::Region(r) => r.to_mask(&self.data),
        }
    }

    /// Ascending flat positions of the selected elements.
    pub fn to_index_list(&self, data: Option<&Dataset>) -> Result<Vec<usize>> {
        self.check_data(data)?;
        match &self.selection {
            Selection::Element(e) => Ok(e.mask().nonzero()),
            // derived from the mask; slow for small subsets of large data
            _ => Ok(self.to_mask(None)?.nonzero()),
        }
    }

    /// Write the mask as 0/1 integers to `path`. `format` must name a
    /// supported format (`"parquet"`).
    pub fn export_mask(&self, path: impl AsRef<Path>, format: &str) -> Result<()> {
        let format: MaskFormat = format.parse()?;
        let mask = self.to_mask(None)?;
        write_mask(path.as_ref(), &mask, format)
    }

    // -- set algebra --

    fn check_compatibility(&self, other: &Subset) -> Result<()> {
        if !Rc::ptr_eq(&self.data, &other.data) {
            return Err(SubsetError::DataIncompatible { kind: other.kind() });
        }
        Ok(())
    }

    fn combine(&self, other: &Subset, op: SetOp) -> Result<Subset> {
        self.check_compatibility(other)?;
        if let (Selection::Tree(a), Selection::Tree(b)) = (&self.selection, &other.selection) {
            let combined = a.combine(b, op);
            return Ok(Subset::with_selection(&self.data, Selection::Tree(combined)));
        }
        let mask = self.to_mask(None)?.combine(&other.to_mask(None)?, op)?;
        debug!("{} {op} {} -> {} elements", self.id, other.id, mask.count());
        let selection = ElementSelection::with_mask_unchecked(mask);
        Ok(Subset::with_selection(&self.data, Selection::Element(selection)))
    }

    fn combine_in_place(&mut self, other: &Subset, op: SetOp) -> Result<()> {
        self.check_compatibility(other)?;
        match (&self.selection, &other.selection) {
            (Selection::Tree(a), Selection::Tree(b)) => {
                let nodes = op.apply_sets(a.node_list(), b.node_list());
                self.replace_nodes(nodes);
                Ok(())
            }
            (Selection::Element(_), _) => {
                let mask = self.to_mask(None)?.combine(&other.to_mask(None)?, op)?;
                self.set_mask(mask)
            }
            _ => Err(SubsetError::TypeIncompatible {
                left: self.kind(),
                right: other.kind(),
            }),
        }
    }

    /// New detached subset holding the elements of either operand.
    pub fn union(&self, other: &Subset) -> Result<Subset> {
        self.combine(other, SetOp::Union)
    }

    pub fn intersect(&self, other: &Subset) -> Result<Subset> {
        self.combine(other, SetOp::Intersection)
    }

    pub fn symmetric_difference(&self, other: &Subset) -> Result<Subset> {
        self.combine(other, SetOp::SymmetricDifference)
    }

    /// In-place union. Tree subsets absorb another tree's nodes; element
    /// subsets absorb any subset's mask. Other pairings are `TypeIncompatible`.
    pub fn union_in_place(&mut self, other: &Subset) -> Result<()> {
        self.combine_in_place(other, SetOp::Union)
    }

    pub fn intersect_in_place(&mut self, other: &Subset) -> Result<()> {
        self.combine_in_place(other, SetOp::Intersection)
    }

    pub fn symmetric_difference_in_place(&mut self, other: &Subset) -> Result<()> {
        self.combine_in_place(other, SetOp::SymmetricDifference)
    }
}

// ---------------------------------------------------------------------------
// StyleEditor – notifying style writes
// ---------------------------------------------------------------------------

/// Borrowed writer for a subset's style. The style is a single observable
/// unit, so each write broadcasts without an attribute name.
pub struct StyleEditor<'a> {
    subset: &'a mut Subset,
}

impl StyleEditor<'_> {
    fn write(&mut self, f: impl FnOnce(&mut VisualStyle)) -> &mut Self {
        self.subset.mutate(None, |s| f(&mut s.style));
        self
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.write(|st| st.color = color)
    }

    pub fn set_alpha(&mut self, alpha: f32) -> &mut Self {
        self.write(|st| st.alpha = alpha.clamp(0.0, 1.0))
    }

    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        self.write(|st| st.line_width = width)
    }

    pub fn set_line_style(&mut self, line_style: LineStyle) -> &mut Self {
        self.write(|st| st.line_style = line_style)
    }

    pub fn set_marker(&mut self, marker: Marker) -> &mut Self {
        self.write(|st| st.marker = marker)
    }

    pub fn set_marker_size(&mut self, size: f32) -> &mut Self {
        self.write(|st| st.marker_size = size)
    }

    /// Replace the whole style in one write.
    pub fn replace(&mut self, style: VisualStyle) -> &mut Self {
        self.write(|st| *st = style)
    }
}

// ---------------------------------------------------------------------------
// Registration – scoped lifetime
// ---------------------------------------------------------------------------

/// A registered subset that unregisters itself when the guard goes out of
/// scope. Derefs to the subset.
pub struct Registration {
    // Some until `release` or drop
    subset: Option<Subset>,
}

impl Registration {
    /// Unregister now and take the retired subset back.
    pub fn release(mut self) -> Subset {
        match self.subset.take() {
            Some(mut subset) => {
                subset.unregister();
                subset
            }
            None => unreachable!("registration already released"),
        }
    }
}

impl Deref for Registration {
    type Target = Subset;

    fn deref(&self) -> &Subset {
        match &self.subset {
            Some(subset) => subset,
            None => unreachable!("registration already released"),
        }
    }
}

impl DerefMut for Registration {
    fn deref_mut(&mut self) -> &mut Subset {
        match &mut self.subset {
            Some(subset) => subset,
            None => unreachable!("registration already released"),
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(subset) = self.subset.as_mut() {
            subset.unregister();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::Tree;
    use crate::data::region::RectangularRegion;
    use crate::hub::MessageLog;

    fn hubbed(shape: usize) -> (Rc<Dataset>, Rc<MessageLog>) {
        let log = Rc::new(MessageLog::new());
        let data = Rc::new(Dataset::new("d", shape).with_hub(log.clone()));
        (data, log)
    }

    fn tree_data() -> Rc<Dataset> {
        Rc::new(
            Dataset::new("t", 10usize)
                .with_tree(Tree::new(vec![0, 0, 1, 1, 1, 2, 2, 3, 3, 3]))
                .unwrap(),
        )
    }

    fn update(s: &Subset, attribute: Option<SubsetAttribute>) -> SubsetMessage {
        SubsetMessage::Update {
            subset: s.id(),
            dataset: s.data().id(),
            attribute,
        }
    }

    #[test]
    fn test_silent_until_registered() {
        let (data, log) = hubbed(4);
        let mut s = Subset::element(&data);
        s.set_label(Some("a".into()));
        s.set_mask(Mask::from_indices(4usize, &[1])).unwrap();
        s.style_mut().set_alpha(0.5);
        assert!(log.is_empty());
        assert_eq!(s.lifecycle(), Lifecycle::Detached);
        assert!(!data.has_subset(s.id()));
    }

    #[test]
    fn test_each_mutation_broadcasts_once() {
        let (data, log) = hubbed(4);
        let mut s = Subset::element(&data);
        s.register().unwrap();
        assert!(data.has_subset(s.id()));
        assert!(log.is_empty());

        s.set_label(Some("a".into()));
        s.set_mask(Mask::from_indices(4usize, &[0, 2])).unwrap();
        s.style_mut().set_color(Color::GRAY).set_marker(Marker::Plus);

        assert_eq!(
            log.take(),
            vec![
                update(&s, Some(SubsetAttribute::Label)),
                update(&s, Some(SubsetAttribute::Mask)),
                update(&s, None),
                update(&s, None),
            ]
        );
        assert_eq!(s.style().marker, Marker::Plus);
    }

    #[test]
    fn test_bad_mask_is_rejected_quietly() {
        let (data, log) = hubbed(4);
        let mut s = Subset::element_with_mask(&data, Mask::from_indices(4usize, &[3])).unwrap();
        s.register().unwrap();
        let err = s.set_mask(Mask::zeros([2usize, 2])).unwrap_err();
        assert!(matches!(err, SubsetError::ShapeMismatch { .. }));
        assert_eq!(s.to_index_list(None).unwrap(), vec![3]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_setters_check_kind() {
        let data = tree_data();
        let mut s = Subset::tree(&data).unwrap();
        assert!(matches!(
            s.set_mask(Mask::zeros(10usize)),
            Err(SubsetError::TypeIncompatible { .. })
        ));
        assert!(s.set_region(None).is_err());
        s.set_node_list([2, 2, 0]).unwrap();
        assert_eq!(s.node_list(), Some(&BTreeSet::from([0, 2])));
    }

    #[test]
    fn test_unregister_sends_one_delete_then_silence() {
        let (data, log) = hubbed(4);
        let mut s = Subset::element(&data);
        s.register().unwrap();
        s.unregister();
        s.set_label(Some("late".into()));
        s.set_broadcasting(true);
        s.set_label(Some("later".into()));

        assert_eq!(
            log.take(),
            vec![SubsetMessage::Delete {
                subset: s.id(),
                dataset: data.id()
            }]
        );
        assert_eq!(s.lifecycle(), Lifecycle::Retired);
        assert!(!s.is_broadcasting());
        assert!(!data.has_subset(s.id()));
        assert!(matches!(s.register(), Err(SubsetError::Unregistered(_))));
    }

    #[test]
    fn test_unregister_without_hub_is_noop() {
        let data = Rc::new(Dataset::new("d", 3usize));
        let mut s = Subset::element(&data);
        s.register().unwrap();
        s.set_label(Some("x".into()));
        s.unregister();
        assert_eq!(s.lifecycle(), Lifecycle::Retired);
    }

    #[test]
    fn test_set_broadcasting_toggles_without_message() {
        let (data, log) = hubbed(2);
        let mut s = Subset::element(&data);
        s.set_broadcasting(true);
        assert!(log.is_empty());
        s.set_label(None);
        s.set_broadcasting(false);
        s.set_label(None);
        assert_eq!(log.take(), vec![update(&s, Some(SubsetAttribute::Label))]);
    }

    #[test]
    fn test_registration_guard_unregisters_on_drop() {
        let (data, log) = hubbed(3);
        let id = {
            let mut reg = Subset::element(&data).into_registration().unwrap();
            reg.set_label(Some("scoped".into()));
            assert_eq!(reg.lifecycle(), Lifecycle::Registered);
            assert!(data.has_subset(reg.id()));
            reg.id()
        };
        assert!(!data.has_subset(id));
        let messages = log.take();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1],
            SubsetMessage::Delete {
                subset: id,
                dataset: data.id()
            }
        );
    }

    #[test]
    fn test_registration_release_returns_retired_subset() {
        let (data, log) = hubbed(3);
        let reg = Subset::element(&data).into_registration().unwrap();
        let mut s = reg.release();
        assert_eq!(s.lifecycle(), Lifecycle::Retired);
        assert!(!data.has_subset(s.id()));
        s.set_label(Some("after".into()));
        // exactly one delete, none from the released guard's drop
        assert_eq!(
            log.take(),
            vec![SubsetMessage::Delete {
                subset: s.id(),
                dataset: data.id()
            }]
        );
    }

    #[test]
    fn test_into_registration_rejects_retired() {
        let (data, _log) = hubbed(2);
        let mut s = Subset::element(&data);
        s.register().unwrap();
        s.unregister();
        assert!(matches!(
            s.into_registration(),
            Err(SubsetError::Unregistered(_))
        ));
    }

    #[test]
    fn test_register_twice_is_harmless() {
        let (data, log) = hubbed(2);
        let mut s = Subset::element(&data);
        s.register().unwrap();
        s.register().unwrap();
        assert_eq!(data.subsets(), vec![s.id()]);
        assert!(s.is_broadcasting());
        assert_eq!(s.lifecycle(), Lifecycle::Registered);
        assert!(log.is_empty());
        s.set_label(None);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_detached_hub_silences_updates() {
        let (data, log) = hubbed(2);
        let mut s = Subset::element(&data);
        s.register().unwrap();
        assert!(data.detach_hub().is_some());
        s.set_label(Some("quiet".into()));
        s.unregister();
        assert!(log.is_empty());
        assert!(data.detach_hub().is_none());
    }

    #[test]
    fn test_foreign_dataset_rejected() {
        let data = tree_data();
        let other = Dataset::new("o", 10usize);
        let kinds = [
            Subset::element(&data),
            Subset::tree(&data).unwrap(),
            Subset::region(&data),
        ];
        for s in &kinds {
            assert!(s.is_compatible(&data));
            assert!(!s.is_compatible(&other));
            assert!(s.to_mask(Some(&data)).is_ok());
            assert!(matches!(
                s.to_mask(Some(&other)),
                Err(SubsetError::DataIncompatible { kind }) if kind == s.kind()
            ));
            assert!(s.to_index_list(Some(&other)).is_err());
        }
    }

    #[test]
    fn test_tree_algebra_stays_tree() {
        let data = tree_data();
        let a = Subset::tree_with_nodes(&data, [0, 1]).unwrap();
        let b = Subset::tree_with_nodes(&data, [1, 3]).unwrap();
        let u = a.union(&b).unwrap();
        assert_eq!(u.kind(), SubsetKind::Tree);
        assert_eq!(u.node_list(), Some(&BTreeSet::from([0, 1, 3])));
        assert_eq!(u.lifecycle(), Lifecycle::Detached);
        assert_eq!(a.intersect(&b).unwrap().node_list(), Some(&BTreeSet::from([1])));
    }

    #[test]
    fn test_mixed_algebra_falls_back_to_mask() {
        let data = tree_data();
        let t = Subset::tree_with_nodes(&data, [1]).unwrap();
        let e = Subset::element_with_mask(&data, Mask::from_indices(10usize, &[0, 2])).unwrap();
        let u = t.union(&e).unwrap();
        assert_eq!(u.kind(), SubsetKind::Element);
        assert_eq!(u.to_index_list(None).unwrap(), vec![0, 2, 3, 4]);

        let r = Subset::region(&data);
        assert_eq!(r.union(&t).unwrap().to_index_list(None).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_algebra_rejects_other_dataset() {
        let a = Subset::element(&tree_data());
        let b = Subset::element(&tree_data());
        assert!(matches!(a.union(&b), Err(SubsetError::DataIncompatible { .. })));

        let (data, log) = hubbed(10);
        let mut c = Subset::element_with_mask(&data, Mask::from_indices(10usize, &[4])).unwrap();
        c.register().unwrap();
        assert!(matches!(
            c.union_in_place(&a),
            Err(SubsetError::DataIncompatible { .. })
        ));
        assert_eq!(c.to_index_list(None).unwrap(), vec![4]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_in_place_variants() {
        let log = Rc::new(MessageLog::new());
        let data = tree_data();
        data.attach_hub(log.clone());

        let mut a = Subset::tree_with_nodes(&data, [0, 1]).unwrap();
        let b = Subset::tree_with_nodes(&data, [1, 2]).unwrap();
        a.register().unwrap();
        a.symmetric_difference_in_place(&b).unwrap();
        assert_eq!(a.node_list(), Some(&BTreeSet::from([0, 2])));
        assert_eq!(log.take(), vec![update(&a, Some(SubsetAttribute::NodeList))]);

        let mut e = Subset::element_with_mask(&data, Mask::from_indices(10usize, &[0, 9])).unwrap();
        e.register().unwrap();
        e.intersect_in_place(&a).unwrap();
        assert_eq!(e.to_index_list(None).unwrap(), vec![0]);
        assert_eq!(log.take(), vec![update(&e, Some(SubsetAttribute::Mask))]);

        let mut r = Subset::region(&data);
        assert!(matches!(
            r.union_in_place(&a),
            Err(SubsetError::TypeIncompatible { .. })
        ));
        let mut t = Subset::tree(&data).unwrap();
        assert!(t.union_in_place(&e).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_element_in_place_with_tree_broadcasts_mask_once() {
        let log = Rc::new(MessageLog::new());
        let data = tree_data();
        data.attach_hub(log.clone());

        let mut e = Subset::element_with_mask(&data, Mask::from_indices(10usize, &[0])).unwrap();
        let t = Subset::tree_with_nodes(&data, [0, 1]).unwrap();
        e.register().unwrap();
        e.union_in_place(&t).unwrap();
        assert_eq!(e.kind(), SubsetKind::Element);
        assert_eq!(e.to_index_list(None).unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(log.take(), vec![update(&e, Some(SubsetAttribute::Mask))]);
    }

    #[test]
    fn test_region_subset_broadcasts_region() {
        let (data, log) = hubbed(4);
        let mut s = Subset::region(&data);
        s.register().unwrap();
        s.set_region(Some(Rc::new(RectangularRegion::from_bounds(0.0, 1.0, 0.0, 0.0))))
            .unwrap();
        assert!(s.region_shape().is_some());
        assert_eq!(s.to_index_list(None).unwrap(), vec![0, 1]);
        assert_eq!(log.take(), vec![update(&s, Some(SubsetAttribute::Region))]);
    }

    #[test]
    fn test_new_subsets_cycle_colors() {
        let data = Rc::new(Dataset::new("d", 2usize));
        let mut first = Subset::element(&data);
        first.register().unwrap();
        let second = Subset::element(&data);
        assert_ne!(first.style().color, second.style().color);
    }

    #[test]
    fn test_export_unsupported_format() {
        let data = Rc::new(Dataset::new("d", 2usize));
        let s = Subset::element(&data);
        let err = s.export_mask("unused.fits", "fits").unwrap_err();
        assert!(matches!(err, SubsetError::UnsupportedFormat(_)));
    }
}
