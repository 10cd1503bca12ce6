//! Rasterizing a plan
//!
//! Nodes draw in ref order: rooms by index, then halls by index. Before a
//! node draws it collects doorway requests from the neighbours that have not
//! drawn yet; after drawing it pushes its opened cells onto those same
//! neighbours so their doorways line up with its own.

use super::{FloorPlan, NodeRef};
use crate::error::Result;
use crate::tile::TileTarget;

impl FloorPlan {
    /// Draw every node onto `target`
    pub fn draw_on_map(&mut self, target: &mut dyn TileTarget) -> Result<()> {
        let order: Vec<NodeRef> = self.node_refs().collect();
        for node in order {
            for adj in self.adjacents(node) {
                if adj < node {
                    continue;
                }
                let Some(dir) = self.dir_adjacent(node, adj) else {
                    log::trace!("{node} and {adj} are linked but not flush");
                    continue;
                };
                let source = self.get(adj)?.shape.clone();
                if let Some(n) = self.node_mut(node) {
                    n.shape.receive_fulfillable_border(&source, dir);
                }
            }
            if let Some(n) = self.node_mut(node) {
                n.shape.draw(target);
            }
            self.transfer_border_to_adjacents(node)?;
        }
        log::debug!(
            "drew {} rooms and {} halls",
            self.room_count(),
            self.hall_count()
        );
        Ok(())
    }

    /// Copy the opened cells of a drawn node onto every flush neighbour that
    /// draws after it
    pub fn transfer_border_to_adjacents(&mut self, node: NodeRef) -> Result<()> {
        let source = self.get(node)?.shape.clone();
        for adj in self.adjacents(node) {
            if adj < node {
                continue;
            }
            let Some(dir) = self.dir_adjacent(adj, node) else {
                continue;
            };
            if let Some(n) = self.node_mut(adj) {
                n.shape.receive_opened_border(&source, dir);
            }
        }
        Ok(())
    }
}
