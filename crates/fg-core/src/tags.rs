//! Node tags and eligibility filters

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::floor::PlanNode;

bitflags! {
    /// Tags carried by plan nodes for later filtering
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct NodeTags: u16 {
        /// Must not be edited, replaced or grown from
        const IMMUTABLE = 0x0001;
        /// Placed by the special-room step
        const SPECIAL   = 0x0002;
        /// Hall added as a shortcut by the connection step
        const SHORTCUT  = 0x0004;
        /// Hall synthesized to reach a special room
        const SUPPORT   = 0x0008;
        /// Created by a branch-growth step
        const PATH      = 0x0010;
    }
}

/// Restricts which nodes a step may touch
pub trait NodeFilter {
    fn passes(&self, node: &PlanNode) -> bool;
}

/// Accepts nodes carrying all `require` tags and none of `refuse`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagFilter {
    pub require: NodeTags,
    pub refuse: NodeTags,
}

impl TagFilter {
    pub const fn refuse(tags: NodeTags) -> Self {
        Self {
            require: NodeTags::empty(),
            refuse: tags,
        }
    }

    pub const fn require(tags: NodeTags) -> Self {
        Self {
            require: tags,
            refuse: NodeTags::empty(),
        }
    }
}

impl NodeFilter for TagFilter {
    fn passes(&self, node: &PlanNode) -> bool {
        node.tags.contains(self.require) && !node.tags.intersects(self.refuse)
    }
}

impl<F: NodeFilter + ?Sized> NodeFilter for [Box<F>] {
    fn passes(&self, node: &PlanNode) -> bool {
        self.iter().all(|f| f.passes(node))
    }
}
