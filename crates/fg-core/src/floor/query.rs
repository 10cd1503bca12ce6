//! Read-only graph and geometry queries

use std::collections::VecDeque;

use hashbrown::HashSet;

use super::{FloorPlan, NodeKind, NodeRef};
use crate::geom::{Dir4, Loc, Rect};
use crate::room_gen::RoomGen;

impl FloorPlan {
    /// Every node whose rect shares a cell with `rect`, rooms first
    pub fn check_collision(&self, rect: Rect) -> Vec<NodeRef> {
        self.node_refs()
            .filter(|r| {
                self.rect(*r)
                    .is_some_and(|node_rect| node_rect.intersects(&rect))
            })
            .collect()
    }

    /// Rooms reachable from `room_index` through zero or more halls.
    ///
    /// Never crosses another room. Neighbours are visited side by side in
    /// `Dir4::ALL` order, along each side by position, with links that are
    /// not flush last; a hall's rooms are listed before the next neighbour.
    pub fn adjacent_rooms(&self, room_index: usize) -> Vec<usize> {
        let start = NodeRef::room(room_index);
        let mut rooms = Vec::new();
        let mut seen_halls = HashSet::new();
        self.collect_rooms_through(start, room_index, &mut rooms, &mut seen_halls);
        rooms
    }

    /// Adjacents of `node` by side, then by position along the side
    fn adjacents_by_side(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut adjacents = self.adjacents(node);
        let Some(rect) = self.rect(node) else {
            return adjacents;
        };
        adjacents.sort_by_key(|adj| {
            let other = self.rect(*adj);
            match other.and_then(|other| rect.touching_dir(&other).map(|dir| (dir, other))) {
                Some((dir, other)) => (dir.index(), other.side_range(dir.reverse()).min, *adj),
                None => (Dir4::ALL.len(), 0, *adj),
            }
        });
        adjacents
    }

    fn collect_rooms_through(
        &self,
        from: NodeRef,
        origin: usize,
        rooms: &mut Vec<usize>,
        seen_halls: &mut HashSet<usize>,
    ) {
        for adj in self.adjacents_by_side(from) {
    /// Hop count between two nodes, `None` when no path exists
    pub fn distance(&self, a: NodeRef, b: NodeRef) -> Option<usize> {
        self.node(a)?;
        self.node(b)?;
        if a == b {
            return Some(0);
        }
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(a);
        queue.push_back((a, 0));
        while let Some((node, dist)) = queue.pop_front() {
            for adj in self.adjacents(node) {
                if adj == b {
                    return Some(dist + 1);
                }
                if seen.insert(adj) {
                    queue.push_back((adj, dist + 1));
                }
            }
        }
        None
    }

    /// Whether `to` can be reached from `from` without entering `avoid`
    fn reaches_avoiding(&self, from: NodeRef, to: NodeRef, avoid: NodeRef) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        seen.insert(from);
        seen.insert(avoid);
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            for adj in self.adjacents(node) {
                if seen.insert(adj) {
                    stack.push(adj);
                }
            }
        }
        false
    }

    /// A degree-2 node whose neighbours have no other path between them
    pub fn is_choke_point(&self, node: NodeRef) -> bool {
        let adjacents = self.adjacents(node);
        let [a, b] = adjacents.as_slice() else {
            return false;
        };
        !self.reaches_avoiding(*a, *b, node)
    }

    /// Whether every node can reach every other
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.node_refs().next() else {
            return true;
        };
        let mut seen = HashSet::new();
        let mut stack = vec![first];
        seen.insert(first);
        while let Some(node) = stack.pop() {
            for adj in self.adjacents(node) {
                if seen.insert(adj) {
                    stack.push(adj);
                }
            }
        }
        seen.len() == self.node_count()
    }

    /// Side of `a` that `b` sits flush against
    pub fn dir_adjacent(&self, a: NodeRef, b: NodeRef) -> Option<Dir4> {
        self.rect(a)?.touching_dir(&self.rect(b)?)
    }

    /// Cells where `from`'s side `dir` and `to`'s opposite side could both
    /// open, with `to` placed at `cand_loc`.
    ///
    /// Only the cross-axis alignment is considered; the caller places `to`
    /// flush against `from`.
    pub fn border_match(from: &RoomGen, to: &RoomGen, cand_loc: Loc, dir: Dir4) -> usize {
        let cross = dir.axis().orth();
        let offset = from.draw_rect().start().scalar(cross) - cand_loc.scalar(cross);
        let from_len = from.border_len(dir) as i32;
        let to_len = to.border_len(dir.reverse()) as i32;

        let mut count = 0;
        let mut ii = offset.max(0);
        while ii - offset < from_len && ii < to_len {
            if from.is_fulfillable(dir, (ii - offset) as usize)
                && to.is_fulfillable(dir.reverse(), ii as usize)
            {
                count += 1;
            }
            ii += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::RandRange;
    use crate::tags::NodeTags;
    use fg_rng::GameRng;

    fn room(x: i32, y: i32, w: i32, h: i32) -> RoomGen {
        RoomGen::placed_square(Rect::new(x, y, w, h))
    }

    fn hall(x: i32, y: i32, w: i32, h: i32) -> RoomGen {
        RoomGen::placed_hall(Rect::new(x, y, w, h))
    }

    /// r0 - h0 - r1 - r2, with h1 hanging off h0 to r3
    fn sample_plan() -> FloorPlan {
        let mut plan = FloorPlan::new(Loc::new(40, 20));
        let t = NodeTags::empty();
        let r0 = plan.add_room(&room(0, 0, 3, 3), t, &[]).unwrap();
        let h0 = plan.add_hall(&hall(3, 1, 3, 1), t, &[r0]).unwrap();
        let r1 = plan.add_room(&room(6, 0, 3, 3), t, &[h0]).unwrap();
        plan.add_room(&room(9, 0, 3, 3), t, &[r1]).unwrap();
        let h1 = plan.add_hall(&hall(4, 2, 1, 4), t, &[h0]).unwrap();
        plan.add_room(&room(3, 6, 3, 3), t, &[h1]).unwrap();
        plan
    }

    #[test]
    fn test_adjacent_rooms_cross_halls_only() {
        let plan = sample_plan();
        // h0 lists h1 (below) before r0 (left) and r1 (right)
        assert_eq!(plan.adjacent_rooms(0), vec![3, 1]);
        assert_eq!(plan.adjacent_rooms(1), vec![3, 0, 2]);
        // room 2 only touches room 1 directly
        assert_eq!(plan.adjacent_rooms(2), vec![1]);
    }

    #[test]
    fn test_adjacent_rooms_follow_sides() {
        let mut plan = FloorPlan::new(Loc::new(30, 30));
        let t = NodeTags::empty();
        let c = plan.add_room(&room(4, 4, 3, 3), t, &[]).unwrap();
        plan.add_room(&room(7, 4, 2, 2), t, &[c]).unwrap(); // right
        plan.add_room(&room(4, 2, 2, 2), t, &[c]).unwrap(); // up
        plan.add_room(&room(5, 7, 2, 2), t, &[c]).unwrap(); // down, x 5
        plan.add_room(&room(2, 4, 2, 2), t, &[c]).unwrap(); // left
        plan.add_room(&room(4, 7, 1, 2), t, &[c]).unwrap(); // down, x 4
        plan.add_room(&room(20, 20, 2, 2), t, &[c]).unwrap(); // not flush

        assert_eq!(plan.adjacent_rooms(c.index), vec![5, 3, 4, 2, 1, 6]);
        assert_eq!(plan.adjacent_rooms(6), vec![0]);
    }

    #[test]
    fn test_distance() {
        let plan = sample_plan();
        let r0 = NodeRef::room(0);
        let r2 = NodeRef::room(2);
        assert_eq!(plan.distance(r0, r0), Some(0));
        assert_eq!(plan.distance(r0, r2), Some(3));
        assert_eq!(plan.distance(r2, r0), Some(3));
        assert_eq!(plan.distance(r0, NodeRef::room(3)), Some(3));
        assert_eq!(plan.distance(r0, NodeRef::room(9)), None);
    }

    #[test]
    fn test_distance_unreachable() {
        let mut plan = sample_plan();
        let lonely = plan
            .add_room(&room(30, 10, 2, 2), NodeTags::empty(), &[])
            .unwrap();
        assert_eq!(plan.distance(NodeRef::room(0), lonely), None);
        assert!(!plan.is_connected());
    }

    #[test]
    fn test_choke_point() {
        let mut plan = sample_plan();
        assert!(plan.is_choke_point(NodeRef::room(1)));
        assert!(plan.is_choke_point(NodeRef::hall(1)));
        // degree 3
        assert!(!plan.is_choke_point(NodeRef::hall(0)));
        // degree 1
        assert!(!plan.is_choke_point(NodeRef::room(2)));

        // close a loop around room 1
        plan.link(NodeRef::room(0), NodeRef::room(2)).unwrap();
        assert!(!plan.is_choke_point(NodeRef::room(1)));
    }

    #[test]
    fn test_check_collision_order() {
        let plan = sample_plan();
        let hits = plan.check_collision(Rect::new(2, 1, 3, 2));
        assert_eq!(hits, vec![NodeRef::room(0), NodeRef::hall(0), NodeRef::hall(1)]);
        assert!(plan.check_collision(Rect::new(20, 10, 2, 2)).is_empty());
        assert!(plan.is_connected());
    }

    #[test]
    fn test_dir_adjacent() {
        let plan = sample_plan();
        assert_eq!(
            plan.dir_adjacent(NodeRef::room(1), NodeRef::room(2)),
            Some(Dir4::Right)
        );
        assert_eq!(
            plan.dir_adjacent(NodeRef::room(2), NodeRef::room(1)),
            Some(Dir4::Left)
        );
        assert_eq!(plan.dir_adjacent(NodeRef::room(0), NodeRef::room(2)), None);
    }

    #[test]
    fn test_border_match_square() {
        let from = room(3, 3, 6, 6);
        let to = room(0, 0, 2, 2);
        assert_eq!(FloorPlan::border_match(&from, &to, Loc::new(5, 1), Dir4::Up), 2);
        // hanging off the left corner by one cell
        assert_eq!(FloorPlan::border_match(&from, &to, Loc::new(2, 1), Dir4::Up), 1);
        assert_eq!(FloorPlan::border_match(&from, &to, Loc::new(1, 1), Dir4::Up), 0);
    }

    #[test]
    fn test_border_match_round() {
        let mut round = RoomGen::round(RandRange::fixed(6), RandRange::fixed(6));
        let mut rng = GameRng::new(3);
        round.prepare_size(&mut rng, Loc::new(6, 6));
        round.set_loc(Loc::new(0, 0));
        let wide = room(0, 0, 6, 2);
        // only the middle two cells of the round side are fulfillable
        assert_eq!(FloorPlan::border_match(&round, &wide, Loc::new(0, 6), Dir4::Down), 2);
        assert_eq!(FloorPlan::border_match(&round, &wide, Loc::new(4, 6), Dir4::Down), 0);
    }
}
