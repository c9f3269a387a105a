//! Observable subsets of datasets for interactive data exploration.
//!
//! A [`Subset`] describes which elements of a [`Dataset`] are selected, as
//! an explicit [`Mask`], a set of hierarchy nodes, or a geometric
//! [`Region`](data::region::Region). Subsets combine with boolean algebra and
//! report every change to the dataset's [`Hub`].
//!
//! ```
//! use std::rc::Rc;
//! use subset_kit::{Dataset, MessageLog, Subset, Tree};
//!
//! let hub = Rc::new(MessageLog::new());
//! let data = Rc::new(
//!     Dataset::new("catalog", 10usize)
//!         .with_tree(Tree::new(vec![0, 0, 1, 1, 1, 2, 2, 3, 3, 3]))?
//!         .with_hub(hub.clone()),
//! );
//!
//! let mut subset = Subset::tree_with_nodes(&data, [1, 3])?;
//! subset.register()?;
//! subset.set_label(Some("bright".into()));
//! assert_eq!(hub.len(), 1);
//! assert_eq!(subset.to_index_list(None)?, vec![2, 3, 4, 7, 8, 9]);
//! # Ok::<(), subset_kit::SubsetError>(())
//! ```

pub mod data;
pub mod error;
pub mod hub;
pub mod mask;
pub mod style;
pub mod subset;

pub use data::dataset::{Dataset, DatasetId, NodeId, Tree};
pub use error::{Result, SubsetError};
pub use hub::{Hub, MessageLog, SubsetAttribute, SubsetMessage};
pub use mask::{Mask, SetOp, Shape};
pub use style::{Color, VisualStyle};
pub use subset::{Lifecycle, Registration, Selection, StyleEditor, Subset, SubsetId, SubsetKind};
