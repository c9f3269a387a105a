//! Change notifications emitted by subsets.
//!
//! A [`Hub`] is the sink a dataset forwards subset messages to. Fan-out to
//! views is the hub's business; subsets only ever call [`Hub::broadcast`].

use std::cell::RefCell;
use std::fmt;

use crate::data::dataset::DatasetId;
use crate::subset::SubsetId;

/// Kind-independent name of a subset attribute that changed.
///
/// Style writes carry no attribute: the style is one observable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsetAttribute {
    Label,
    Mask,
    NodeList,
    Region,
}

impl SubsetAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsetAttribute::Label => "label",
            SubsetAttribute::Mask => "mask",
            SubsetAttribute::NodeList => "node_list",
            SubsetAttribute::Region => "region",
        }
    }
}

impl fmt::Display for SubsetAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsetMessage {
    /// A subset changed; `attribute` is `None` for style changes and explicit broadcasts.
    Update {
        subset: SubsetId,
        dataset: DatasetId,
        attribute: Option<SubsetAttribute>,
    },
    /// A subset was unregistered and will not notify again.
    Delete { subset: SubsetId, dataset: DatasetId },
}

impl SubsetMessage {
    pub fn subset(&self) -> SubsetId {
        match self {
            SubsetMessage::Update { subset, .. } | SubsetMessage::Delete { subset, .. } => *subset,
        }
    }

    pub fn dataset(&self) -> DatasetId {
        match self {
            SubsetMessage::Update { dataset, .. } | SubsetMessage::Delete { dataset, .. } => {
                *dataset
            }
        }
    }
}

/// Synchronous message sink. `broadcast` must have delivered the message
/// by the time it returns.
pub trait Hub {
    fn broadcast(&self, message: SubsetMessage);
}

// ---------------------------------------------------------------------------
// MessageLog – a hub that records what it receives
// ---------------------------------------------------------------------------

/// Hub that keeps every message in arrival order.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: RefCell<Vec<SubsetMessage>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SubsetMessage> {
        self.messages.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    /// Drain the log, returning what was recorded so far.
    pub fn take(&self) -> Vec<SubsetMessage> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }
}

impl Hub for MessageLog {
    fn broadcast(&self, message: SubsetMessage) {
        self.messages.borrow_mut().push(message);
    }
}
