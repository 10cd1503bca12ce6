//! Node storage and validated mutation

use hashbrown::HashMap;

use super::{NodeId, NodeKind, NodeRef, PlanNode};
use crate::error::{LayoutError, Result};
use crate::geom::{Loc, Rect};
use crate::room_gen::RoomGen;
use crate::tags::NodeTags;

/// A graph of placed rooms and halls on a bounded floor
#[derive(Debug, Clone, Default)]
pub struct FloorPlan {
    size: Loc,
    pub(super) rooms: Vec<PlanNode>,
    pub(super) halls: Vec<PlanNode>,
    /// Dense position of every live node
    pub(super) refs: HashMap<NodeId, NodeRef>,
    next_id: u32,
}

impl FloorPlan {
    pub fn new(size: Loc) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn size(&self) -> Loc {
        self.size
    }

    pub fn draw_rect(&self) -> Rect {
        Rect::from_loc_size(Loc::ZERO, self.size)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn hall_count(&self) -> usize {
        self.halls.len()
    }

    pub fn node_count(&self) -> usize {
        self.rooms.len() + self.halls.len()
    }

    pub fn rooms(&self) -> &[PlanNode] {
        &self.rooms
    }

    pub fn halls(&self) -> &[PlanNode] {
        &self.halls
    }

    /// Every live ref, rooms first then halls, ascending index
    pub fn node_refs(&self) -> impl Iterator<Item = NodeRef> + '_ {
        (0..self.rooms.len())
            .map(NodeRef::room)
            .chain((0..self.halls.len()).map(NodeRef::hall))
    }

    pub fn node(&self, node: NodeRef) -> Option<&PlanNode> {
        match node.kind {
            NodeKind::Room => self.rooms.get(node.index),
            NodeKind::Hall => self.halls.get(node.index),
        }
    }

    pub(crate) fn node_mut(&mut self, node: NodeRef) -> Option<&mut PlanNode> {
        match node.kind {
            NodeKind::Room => self.rooms.get_mut(node.index),
            NodeKind::Hall => self.halls.get_mut(node.index),
        }
    }

    pub(crate) fn get(&self, node: NodeRef) -> Result<&PlanNode> {
        self.node(node).ok_or(LayoutError::MissingNode(node))
    }

    /// Placed rect of a node
    pub fn rect(&self, node: NodeRef) -> Option<Rect> {
        self.node(node).map(|n| n.shape.draw_rect())
    }

    /// Current dense ref of a stable id, `None` once erased
    pub fn resolve(&self, id: NodeId) -> Option<NodeRef> {
        self.refs.get(&id).copied()
    }

    /// Neighbours of `node` in the order their edges were added
    pub fn adjacents(&self, node: NodeRef) -> Vec<NodeRef> {
        self.node(node)
            .map(|n| n.adjacents.iter().filter_map(|id| self.resolve(*id)).collect())
            .unwrap_or_default()
    }

    pub fn degree(&self, node: NodeRef) -> usize {
        self.node(node).map_or(0, PlanNode::degree)
    }

    pub fn is_linked(&self, a: NodeRef, b: NodeRef) -> bool {
        match (self.node(a), self.node(b)) {
            (Some(na), Some(nb)) => na.adjacents.contains(&nb.id),
            _ => false,
        }
    }

    /// Checks `rect` could hold a new room
    pub fn can_add_room(&self, rect: Rect) -> Result<()> {
        self.check_bounds(rect)?;
        if let Some(index) = self.first_overlap(&self.rooms, rect) {
            return Err(LayoutError::RoomCollision { rect, index });
        }
        if let Some(index) = self.first_overlap(&self.halls, rect) {
            return Err(LayoutError::HallCollision { rect, index });
        }
        Ok(())
    }

    /// Checks `rect` could hold a new hall; halls may overlap halls
    pub fn can_add_hall(&self, rect: Rect) -> Result<()> {
        self.check_bounds(rect)?;
        if let Some(index) = self.first_overlap(&self.rooms, rect) {
            return Err(LayoutError::RoomCollision { rect, index });
        }
        Ok(())
    }

    fn check_bounds(&self, rect: Rect) -> Result<()> {
        if !rect.is_valid() || !self.draw_rect().contains_rect(&rect) {
            return Err(LayoutError::OutOfBounds {
                rect,
                size: self.size,
            });
        }
        Ok(())
    }

    fn first_overlap(&self, nodes: &[PlanNode], rect: Rect) -> Option<usize> {
        nodes
            .iter()
            .position(|n| n.shape.draw_rect().intersects(&rect))
    }

    /// Add a copy of a placed room, linked to every ref in `adjacents`
    pub fn add_room(
        &mut self,
        shape: &RoomGen,
        tags: NodeTags,
        adjacents: &[NodeRef],
    ) -> Result<NodeRef> {
        self.can_add_room(shape.draw_rect())?;
        self.push_node(NodeKind::Room, shape, tags, adjacents)
    }

    /// Add a copy of a placed hall, linked to every ref in `adjacents`
    pub fn add_hall(
        &mut self,
        shape: &RoomGen,
        tags: NodeTags,
        adjacents: &[NodeRef],
    ) -> Result<NodeRef> {
        self.can_add_hall(shape.draw_rect())?;
        self.push_node(NodeKind::Hall, shape, tags, adjacents)
    }

    fn push_node(
        &mut self,
        kind: NodeKind,
        shape: &RoomGen,
        tags: NodeTags,
        adjacents: &[NodeRef],
    ) -> Result<NodeRef> {
        let mut neighbour_ids = Vec::with_capacity(adjacents.len());
        for adj in adjacents {
            let id = self.get(*adj)?.id;
            if !neighbour_ids.contains(&id) {
                neighbour_ids.push(id);
            }
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;
        let node = PlanNode {
            id,
            shape: shape.clone(),
            tags,
            adjacents: neighbour_ids.clone(),
        };
        let new_ref = match kind {
            NodeKind::Room => {
                self.rooms.push(node);
                NodeRef::room(self.rooms.len() - 1)
            }
            NodeKind::Hall => {
                self.halls.push(node);
                NodeRef::hall(self.halls.len() - 1)
            }
        };
        self.refs.insert(id, new_ref);

        for adj_id in neighbour_ids {
            if let Some(adj) = self.resolve(adj_id).and_then(|r| self.node_mut(r)) {
                adj.adjacents.push(id);
            }
        }
        Ok(new_ref)
    }

    /// Add a reciprocal edge; linking a node to itself or twice is a no-op
    pub fn link(&mut self, a: NodeRef, b: NodeRef) -> Result<()> {
        let id_a = self.get(a)?.id;
        let id_b = self.get(b)?.id;
        if id_a == id_b || self.is_linked(a, b) {
            return Ok(());
        }
        if let Some(node) = self.node_mut(a) {
            node.adjacents.push(id_b);
        }
        if let Some(node) = self.node_mut(b) {
            node.adjacents.push(id_a);
        }
        Ok(())
    }

    /// Remove a node and every edge touching it.
    ///
    /// Refs above the erased one in the same array shift down by one.
    pub fn erase(&mut self, node: NodeRef) -> Result<PlanNode> {
        self.get(node)?;
        let mut removed = match node.kind {
            NodeKind::Room => self.rooms.remove(node.index),
            NodeKind::Hall => self.halls.remove(node.index),
        };
        self.refs.remove(&removed.id);

        for adj_id in &removed.adjacents {
            if let Some(adj) = self.resolve(*adj_id).and_then(|r| self.node_mut(r)) {
                adj.adjacents.retain(|id| *id != removed.id);
            }
        }
        removed.adjacents.clear();

        let shifted = match node.kind {
            NodeKind::Room => &self.rooms,
            NodeKind::Hall => &self.halls,
        };
        for (index, n) in shifted.iter().enumerate().skip(node.index) {
            self.refs.insert(
                n.id,
                NodeRef {
                    kind: node.kind,
                    index,
                },
            );
        }
        removed.id = NodeId::DETACHED;
        Ok(removed)
    }

    /// Replace the tags of a node
    pub fn set_tags(&mut self, node: NodeRef, tags: NodeTags) -> Result<()> {
        let n = self.node_mut(node).ok_or(LayoutError::MissingNode(node))?;
        n.tags = tags;
        Ok(())
    }
}
