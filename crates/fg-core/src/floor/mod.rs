//! Fine-grained floor plan
//!
//! A [`FloorPlan`] holds two dense arrays of nodes, rooms and halls, each
//! wrapping a placed [`RoomGen`]. Nodes are addressed from the outside by a
//! [`NodeRef`] (array + index). Internally every node also has a stable
//! [`NodeId`] and adjacency is stored by id, so erasing a node only has to
//! drop it from its neighbours' lists; the dense refs seen through the API
//! shift down automatically.

mod draw;
mod plan;
mod query;

pub use plan::FloorPlan;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::room_gen::RoomGen;
use crate::tags::NodeTags;

/// Which of the two node arrays a reference points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Room,
    Hall,
}

/// Dense reference to a room or hall node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub index: usize,
}

impl NodeRef {
    pub const fn room(index: usize) -> Self {
        Self {
            kind: NodeKind::Room,
            index,
        }
    }

    pub const fn hall(index: usize) -> Self {
        Self {
            kind: NodeKind::Hall,
            index,
        }
    }

    pub const fn is_hall(&self) -> bool {
        matches!(self.kind, NodeKind::Hall)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Room => write!(f, "room#{}", self.index),
            NodeKind::Hall => write!(f, "hall#{}", self.index),
        }
    }
}

/// Stable handle that survives erasure of other nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Id of nodes that are not part of any plan
    pub const DETACHED: NodeId = NodeId(u32::MAX);
}

/// One room or hall in a floor plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    id: NodeId,
    pub shape: RoomGen,
    pub tags: NodeTags,
    adjacents: Vec<NodeId>,
}

impl PlanNode {
    /// A node outside of any plan, for filters and tests
    pub fn detached(shape: RoomGen, tags: NodeTags) -> Self {
        Self {
            id: NodeId::DETACHED,
            shape,
            tags,
            adjacents: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn degree(&self) -> usize {
        self.adjacents.len()
    }

    pub fn is_immutable(&self) -> bool {
        self.tags.contains(NodeTags::IMMUTABLE)
    }
}
