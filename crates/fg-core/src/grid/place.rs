//! Materializing a grid plan as a floor plan

use fg_rng::LayoutRng;

use super::GridPlan;
use crate::error::Result;
use crate::floor::{FloorPlan, NodeRef};
use crate::geom::{Dir4, Loc};

impl GridPlan {
    /// Choose geometry for every room and hall and build the floor graph.
    ///
    /// Room bounds are chosen in room order, then hall bounds column by
    /// column (the vertical hall of a cell before its horizontal one).
    /// Rooms flagged `prefer_hall` with a permissive shape become hall nodes.
    /// Every hall edge becomes its segments chained in series between the two
    /// rooms, or a direct link when the rooms already touch.
    pub fn place_rooms_on_floor(&mut self, rng: &mut dyn LayoutRng) -> Result<FloorPlan> {
        for index in 0..self.rooms.len() {
            self.choose_room_bounds(rng, index)?;
        }
        for x in 0..self.cols {
            for y in 0..self.rows {
                let cell = Loc::new(x, y);
                if self.has_hall(cell, Dir4::Down) {
                    self.choose_hall_bounds(rng, cell, true)?;
                }
                if self.has_hall(cell, Dir4::Right) {
                    self.choose_hall_bounds(rng, cell, false)?;
                }
            }
        }

        let mut floor = FloorPlan::new(self.floor_size());
        let mut nodes: Vec<NodeRef> = Vec::with_capacity(self.rooms.len());
        for room in &self.rooms {
            let node = if room.prefer_hall && room.shape.is_permissive() {
                floor.add_hall(&room.shape, room.tags, &[])?
            } else {
                floor.add_room(&room.shape, room.tags, &[])?
            };
            nodes.push(node);
        }

        for x in 0..self.cols {
            for y in 0..self.rows {
                let cell = Loc::new(x, y);
                for dir in [Dir4::Down, Dir4::Right] {
                    self.link_edge(&mut floor, &nodes, cell, dir)?;
                }
            }
        }

        log::debug!(
            "placed grid on floor: {} rooms, {} halls",
            floor.room_count(),
            floor.hall_count()
        );
        Ok(floor)
    }

    fn link_edge(
        &self,
        floor: &mut FloorPlan,
        nodes: &[NodeRef],
        cell: Loc,
        dir: Dir4,
    ) -> Result<()> {
        let Some(group) = self.edge(cell, dir).filter(|g| g.is_set()) else {
            return Ok(());
        };
        let (Some(start), Some(end)) = (self.room_at(cell), self.room_at(cell + dir.to_loc()))
        else {
            return Ok(());
        };
        let tags = self.rooms[start].tags & self.rooms[end].tags;
        let mut prev = nodes[start];
        for segment in group.segments() {
            prev = floor.add_hall(segment, tags, &[prev])?;
        }
        floor.link(prev, nodes[end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{RandRange, Rect};
    use crate::room_gen::{HallGen, RoomGen};
    use crate::tags::NodeTags;
    use crate::tile::{Tile, TileGrid};
    use fg_rng::{GameRng, ScriptedRng};

    fn ring() -> GridPlan {
        let mut g = GridPlan::new(2, 2, Loc::new(5, 5), 1);
        let room = RoomGen::square(RandRange::new(2, 4), RandRange::new(2, 4));
        for cell in [(0, 0), (1, 0), (1, 1), (0, 1)] {
            g.add_room(Rect::new(cell.0, cell.1, 1, 1), room.clone(), NodeTags::empty(), false)
                .unwrap();
        }
        let hall = Some(HallGen::angled(RandRange::fixed(1), RandRange::fixed(1)));
        g.set_connecting_hall(Loc::new(0, 0), Loc::new(1, 0), hall.clone()).unwrap();
        g.set_connecting_hall(Loc::new(1, 0), Loc::new(1, 1), hall.clone()).unwrap();
        g.set_connecting_hall(Loc::new(1, 1), Loc::new(0, 1), hall.clone()).unwrap();
        g.set_connecting_hall(Loc::new(0, 1), Loc::new(0, 0), hall).unwrap();
        g
    }

    fn assert_flush_and_connected(floor: &mut FloorPlan) {
        for node in floor.node_refs().collect::<Vec<_>>() {
            for other in floor.adjacents(node) {
                assert!(floor.dir_adjacent(node, other).is_some(), "{node:?} - {other:?} not flush");
            }
        }
        let size = floor.size();
        let mut grid = TileGrid::new(size.x, size.y);
        floor.draw_on_map(&mut grid).unwrap();
        let start = floor.rooms()[0].shape.draw_rect().start();
        let walkable = grid.count(Tile::Room) + grid.count(Tile::Hall);
        assert_eq!(grid.flood_count(start), walkable);
    }

    #[test]
    fn test_ring_becomes_cycle() {
        let mut g = ring();
        let mut rng = GameRng::new(42);
        let floor = g.place_rooms_on_floor(&mut rng).unwrap();
        assert_eq!(floor.room_count(), 4);
        assert_eq!(floor.hall_count(), 4);
        for i in 0..4 {
            assert_eq!(floor.degree(NodeRef::room(i)), 2);
            assert_eq!(floor.degree(NodeRef::hall(i)), 2);
            // neighbours of each room around the ring
            let mut rooms = floor.adjacent_rooms(i);
            rooms.sort_unstable();
            let mut expected = vec![(i + 1) % 4, (i + 3) % 4];
            expected.sort_unstable();
            assert_eq!(rooms, expected);
        }
        assert!(floor.is_connected());
        assert_eq!(floor.distance(NodeRef::room(0), NodeRef::room(2)), Some(4));
    }

    #[test]
    fn test_ring_draws_connected() {
        let mut g = ring();
        let mut rng = GameRng::new(7);
        let mut floor = g.place_rooms_on_floor(&mut rng).unwrap();
        let size = floor.size();
        let mut grid = TileGrid::new(size.x, size.y);
        floor.draw_on_map(&mut grid).unwrap();
        let start = floor.rooms()[0].shape.draw_rect().start();
        let walkable = grid.count(Tile::Room) + grid.count(Tile::Hall);
        assert_eq!(grid.flood_count(start), walkable);
    }

    #[test]
    fn test_prefer_hall_becomes_hall_node() {
        let mut g = GridPlan::new(2, 1, Loc::new(3, 3), 1);
        let t = NodeTags::empty();
        g.add_room(Rect::new(0, 0, 1, 1), RoomGen::square(RandRange::fixed(3), RandRange::fixed(3)), t, false)
            .unwrap();
        g.add_room(Rect::new(1, 0, 1, 1), RoomGen::single(), t, true).unwrap();
        g.set_hall(Loc::new(0, 0), Dir4::Right, Some(HallGen::single())).unwrap();
        let mut rng = GameRng::new(3);
        let floor = g.place_rooms_on_floor(&mut rng).unwrap();
        assert_eq!(floor.room_count(), 1);
        // the converted room plus the connecting segment
        assert_eq!(floor.hall_count(), 2);
        assert_eq!(floor.distance(NodeRef::room(0), NodeRef::hall(0)), Some(2));
    }

    #[test]
    fn test_zero_wall_links_rooms_directly() {
        let mut g = GridPlan::new(2, 1, Loc::new(3, 3), 0);
        let t = NodeTags::empty();
        let full = RoomGen::square(RandRange::fixed(3), RandRange::fixed(3));
        g.add_room(Rect::new(0, 0, 1, 1), full.clone(), t, false).unwrap();
        g.add_room(Rect::new(1, 0, 1, 1), full, t, false).unwrap();
        g.set_hall(Loc::new(0, 0), Dir4::Right, Some(HallGen::single())).unwrap();
        let mut rng = GameRng::new(3);
        let floor = g.place_rooms_on_floor(&mut rng).unwrap();
        assert_eq!(floor.hall_count(), 0);
        assert!(floor.is_linked(NodeRef::room(0), NodeRef::room(1)));
    }

    #[test]
    fn test_hall_reaches_room_outside_tier() {
        // tall room over column 1 whose left edge sits just past the wall gap
        let mut g = GridPlan::new(2, 2, Loc::new(8, 8), 1);
        let t = NodeTags::empty();
        let square = |w, h| RoomGen::square(RandRange::fixed(w), RandRange::fixed(h));
        g.add_room(Rect::new(1, 0, 1, 2), square(6, 5), t, false).unwrap();
        g.add_room(Rect::new(0, 1, 1, 1), square(2, 2), t, false).unwrap();
        g.set_hall(Loc::new(0, 1), Dir4::Right, Some(HallGen::angled(RandRange::fixed(1), RandRange::fixed(1))))
            .unwrap();

        let mut rng = ScriptedRng::new([0; 16]);
        let mut floor = g.place_rooms_on_floor(&mut rng).unwrap();
        assert_eq!(floor.hall_count(), 2);
        assert_eq!(floor.rect(NodeRef::hall(1)), Some(Rect::new(8, 4, 1, 13)));
        assert!(floor.is_linked(NodeRef::hall(1), NodeRef::room(0)));
        assert_flush_and_connected(&mut floor);
    }

    #[test]
    fn test_multi_cell_room_placement_stays_connected() {
        use crate::path::GridPathBranch;
        use crate::step::GridStep;

        for seed in 0..40 {
            let mut g = GridPlan::new(4, 4, Loc::new(8, 8), 1);
            g.add_room(
                Rect::new(1, 1, 2, 2),
                RoomGen::square(RandRange::new(3, 16), RandRange::new(3, 16)),
                NodeTags::empty(),
                false,
            )
            .unwrap();
            let step = GridPathBranch {
                rooms: [(RoomGen::square(RandRange::new(2, 7), RandRange::new(2, 7)), 1)].into_iter().collect(),
                halls: [(HallGen::angled(RandRange::fixed(1), RandRange::fixed(1)), 1)].into_iter().collect(),
                ..Default::default()
            };
            let mut rng = GameRng::new(seed);
            step.apply(&mut g, &mut rng).unwrap();
            let mut floor = g.place_rooms_on_floor(&mut rng).unwrap();
            assert!(floor.is_connected(), "seed {seed}");
            assert_flush_and_connected(&mut floor);
        }
    }
}
