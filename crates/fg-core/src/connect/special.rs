//! Special room replacement

use fg_rng::LayoutRng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::floor::{FloorPlan, NodeId, NodeRef};
use crate::geom::{Dir4, IntRange, Loc, Rect};
use crate::room_gen::RoomGen;
use crate::spawn::SpawnList;
use crate::step::FloorStep;
use crate::tags::{NodeFilter, NodeTags, TagFilter};

/// A neighbour of the room being replaced, captured before the erase
#[derive(Debug, Clone)]
struct Neighbour {
    id: NodeId,
    rect: Rect,
    shape: RoomGen,
    /// Side of the old room this neighbour sits flush against
    side: Option<Dir4>,
}

impl Neighbour {
    /// Open cells shared with a room of `size` at `loc`, `None` when the two
    /// do not touch
    fn match_at(&self, room: &RoomGen, loc: Loc) -> Option<usize> {
        let rect = Rect::from_loc_size(loc, room.draw_rect().size());
        let dir = rect.touching_dir(&self.rect)?;
        Some(FloorPlan::border_match(&self.shape, room, loc, dir.reverse()))
    }
}

/// Replace room `anchor` with `shape`, keeping every old neighbour connected.
///
/// The new room is sized no larger than the old one and placed inside its
/// footprint, flush against a side with a neighbour. Spots matching the most
/// neighbours win, ties broken by the weakest match, then at random.
/// Neighbours left without a shared opening get a support hall through the
/// vacated floor, or a direct link when no hall fits.
pub fn place_special_room(
    plan: &mut FloorPlan,
    rng: &mut dyn LayoutRng,
    anchor: usize,
    shape: &RoomGen,
    tags: NodeTags,
) -> Result<NodeRef> {
    let anchor_ref = NodeRef::room(anchor);
    let old = plan.get(anchor_ref)?.shape.draw_rect();

    let mut room = shape.clone();
    let proposed = room.propose_size(rng);
    room.prepare_size(rng, Loc::new(proposed.x.min(old.w), proposed.y.min(old.h)));
    let size = room.draw_rect().size();

    let neighbours: Vec<Neighbour> = plan
        .adjacents(anchor_ref)
        .into_iter()
        .filter_map(|r| plan.node(r))
        .map(|n| {
            let rect = n.shape.draw_rect();
            Neighbour {
                id: n.id(),
                rect,
                shape: n.shape.clone(),
                side: old.touching_dir(&rect),
            }
        })
        .collect();

    let spots = candidate_spots(old, size, &neighbours);
    let loc = if spots.is_empty() {
        Loc::new(old.x + (old.w - size.x) / 2, old.y + (old.h - size.y) / 2)
    } else {
        let scored: Vec<(Loc, (usize, usize))> = spots
            .iter()
            .map(|&loc| (loc, score(&room, loc, &neighbours)))
            .collect();
        let best = scored.iter().map(|(_, s)| *s).max();
        let top: Vec<Loc> = scored
            .iter()
            .filter(|(_, s)| Some(*s) == best)
            .map(|(loc, _)| *loc)
            .collect();
        top[rng.next_max(top.len() as i32) as usize]
    };
    room.set_loc(loc);
    let placed = room.draw_rect();
    log::debug!("special room replaces room#{anchor} {old} at {placed}");

    plan.erase(anchor_ref)?;

    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for n in &neighbours {
        let Some(r) = plan.resolve(n.id) else {
            continue;
        };
        match n.match_at(&room, loc) {
            Some(m) if m > 0 => matched.push(r),
            _ => unmatched.push((r, n)),
        }
    }
    let new_ref = plan.add_room(&room, tags | NodeTags::SPECIAL, &matched)?;

    for (r, n) in unmatched {
        match support_rect(old, placed, n) {
            Some(rect) => {
                log::trace!("support hall {rect} for {r}");
                let hall = RoomGen::placed_hall(rect);
                plan.add_hall(&hall, NodeTags::SUPPORT, &[new_ref, r])?;
            }
            None => plan.link(new_ref, r)?,
        }
    }
    Ok(new_ref)
}

/// Spots inside `old` flush against a side shared with some neighbour, the
/// new room's span overlapping that neighbour's. Neighbour order, then
/// position along the side.
fn candidate_spots(old: Rect, size: Loc, neighbours: &[Neighbour]) -> Vec<Loc> {
    let mut spots: Vec<Loc> = Vec::new();
    for n in neighbours {
        let Some(dir) = n.side else {
            continue;
        };
        let axis = dir.axis();
        let cross = axis.orth();
        let main = if dir.is_positive() {
            old.side(dir) - size.scalar(axis)
        } else {
            old.side(dir)
        };
        let span = n.rect.side_range(dir.reverse());
        let outer = old.range(cross);
        let lo = outer.min.max(span.min - size.scalar(cross) + 1);
        let hi = (outer.max - size.scalar(cross)).min(span.max - 1);
        for c in lo..=hi {
            let loc = Loc::new(0, 0).with_scalar(axis, main).with_scalar(cross, c);
            if !spots.contains(&loc) {
                spots.push(loc);
            }
        }
    }
    spots
}

/// Neighbours matched, then the weakest match among touched neighbours
fn score(room: &RoomGen, loc: Loc, neighbours: &[Neighbour]) -> (usize, usize) {
    let matches: Vec<usize> = neighbours.iter().filter_map(|n| n.match_at(room, loc)).collect();
    let hits = matches.iter().filter(|m| **m > 0).count();
    (hits, matches.iter().copied().min().unwrap_or(0))
}

/// Smallest hall through the vacated floor joining `placed` to `n`
fn support_rect(old: Rect, placed: Rect, n: &Neighbour) -> Option<Rect> {
    if placed.touching_dir(&n.rect).is_some() {
        return None;
    }
    let dir = n.side?;
    let n_span = n.rect.side_range(dir.reverse()).intersect(&old.side_range(dir))?;
    let axis = dir.axis();
    let old_side = old.side(dir);
    let new_side = placed.side(dir);
    let new_span = placed.side_range(dir);

    let rect = if old_side != new_side {
        let main = if dir.is_positive() {
            IntRange::new(new_side, old_side)
        } else {
            IntRange::new(old_side, new_side)
        };
        Rect::from_axis_ranges(axis, main, n_span.hull(&new_span))
    } else {
        let main = if dir.is_positive() {
            IntRange::new(old_side - 1, old_side)
        } else {
            IntRange::new(old_side, old_side + 1)
        };
        let cross = if n_span.max <= new_span.min {
            IntRange::new(n_span.max - 1, new_span.min)
        } else {
            IntRange::new(new_span.max, n_span.min + 1)
        };
        Rect::from_axis_ranges(axis, main, cross)
    };
    Some(rect)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialRoomStep {
    pub rooms: SpawnList<RoomGen>,
    /// Rooms that may be replaced
    pub filter: TagFilter,
    /// Tags given to the new room, on top of `SPECIAL`
    pub tags: NodeTags,
}

impl Default for SpecialRoomStep {
    fn default() -> Self {
        Self {
            rooms: SpawnList::new(),
            filter: TagFilter::refuse(NodeTags::IMMUTABLE | NodeTags::SPECIAL),
            tags: NodeTags::SPECIAL | NodeTags::IMMUTABLE,
        }
    }
}

impl FloorStep for SpecialRoomStep {
    fn apply(&self, plan: &mut FloorPlan, rng: &mut dyn LayoutRng) -> Result<()> {
        if self.rooms.is_empty() {
            log::warn!("special room step has no rooms to place");
            return Ok(());
        }
        let anchors: Vec<usize> = plan
            .rooms()
            .iter()
            .enumerate()
            .filter(|(_, n)| self.filter.passes(n))
            .map(|(i, _)| i)
            .collect();
        if anchors.is_empty() {
            log::debug!("no room can host a special room");
            return Ok(());
        }
        let anchor = anchors[rng.next_max(anchors.len() as i32) as usize];
        let Some(shape) = self.rooms.pick(rng) else {
            return Ok(());
        };
        place_special_room(plan, rng, anchor, shape, self.tags)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::RandRange;
    use crate::tile::{Tile, TileGrid};
    use fg_rng::{GameRng, ScriptedRng};

    fn room(x: i32, y: i32, w: i32, h: i32) -> RoomGen {
        RoomGen::placed_square(Rect::new(x, y, w, h))
    }

    fn square(w: i32, h: i32) -> RoomGen {
        RoomGen::square(RandRange::fixed(w), RandRange::fixed(h))
    }

    #[test]
    fn test_replaces_big_room_next_to_small() {
        let mut plan = FloorPlan::new(Loc::new(12, 12));
        let t = NodeTags::empty();
        let big = plan.add_room(&room(3, 3, 6, 6), t, &[]).unwrap();
        plan.add_room(&room(5, 1, 2, 2), t, &[big]).unwrap();

        let mut rng = GameRng::new(5);
        let placed = place_special_room(&mut plan, &mut rng, 0, &square(2, 2), NodeTags::empty()).unwrap();

        assert_eq!(plan.room_count(), 2);
        assert_eq!(plan.hall_count(), 0);
        assert_eq!(placed, NodeRef::room(1));
        assert_eq!(plan.rect(placed), Some(Rect::new(5, 3, 2, 2)));
        assert_eq!(plan.rect(NodeRef::room(0)), Some(Rect::new(5, 1, 2, 2)));
        assert!(plan.is_linked(placed, NodeRef::room(0)));
        assert!(plan.node(placed).unwrap().tags.contains(NodeTags::SPECIAL));
    }

    #[test]
    fn test_gap_gets_support_hall() {
        let mut plan = FloorPlan::new(Loc::new(20, 20));
        let t = NodeTags::empty();
        let big = plan.add_room(&room(4, 4, 8, 8), t, &[]).unwrap();
        plan.add_room(&room(4, 0, 3, 4), t, &[big]).unwrap();
        plan.add_room(&room(12, 8, 3, 3), t, &[big]).unwrap();

        // size roll, then the first of the best spots
        let mut rng = ScriptedRng::new([0, 0, 0]);
        let placed = place_special_room(&mut plan, &mut rng, 0, &square(2, 2), NodeTags::empty()).unwrap();
        assert_eq!(plan.rect(placed), Some(Rect::new(4, 4, 2, 2)));

        let (top, right) = (NodeRef::room(0), NodeRef::room(1));
        assert!(plan.is_linked(placed, top));
        assert_eq!(plan.hall_count(), 1);
        let hall = NodeRef::hall(0);
        assert_eq!(plan.rect(hall), Some(Rect::new(6, 4, 6, 7)));
        assert_eq!(plan.node(hall).unwrap().tags, NodeTags::SUPPORT);
        let mut ends = plan.adjacents(hall);
        ends.sort();
        assert_eq!(ends, vec![right, placed]);

        let mut map = TileGrid::new(20, 20);
        plan.draw_on_map(&mut map).unwrap();
        let walkable = map.count(Tile::Room) + map.count(Tile::Hall);
        assert_eq!(map.flood_count(Loc::new(5, 0)), walkable);
    }

    #[test]
    fn test_flush_miss_gets_strip() {
        let mut plan = FloorPlan::new(Loc::new(16, 16));
        let t = NodeTags::empty();
        let big = plan.add_room(&room(4, 4, 8, 8), t, &[]).unwrap();
        plan.add_room(&room(0, 4, 4, 3), t, &[big]).unwrap();
        plan.add_room(&room(9, 0, 3, 4), t, &[big]).unwrap();

        let mut rng = ScriptedRng::new([0, 0, 0]);
        let placed = place_special_room(&mut plan, &mut rng, 0, &square(2, 2), NodeTags::empty()).unwrap();
        assert_eq!(plan.rect(placed), Some(Rect::new(4, 4, 2, 2)));
        assert!(plan.is_linked(placed, NodeRef::room(0)));
        assert_eq!(plan.rect(NodeRef::hall(0)), Some(Rect::new(6, 4, 4, 1)));
        assert!(plan.is_linked(NodeRef::hall(0), NodeRef::room(1)));
    }

    #[test]
    fn test_lonely_room_is_centred() {
        let mut plan = FloorPlan::new(Loc::new(10, 10));
        plan.add_room(&room(2, 2, 6, 6), NodeTags::empty(), &[]).unwrap();
        let mut rng = GameRng::new(0);
        let placed = place_special_room(&mut plan, &mut rng, 0, &square(2, 2), NodeTags::empty()).unwrap();
        assert_eq!(plan.rect(placed), Some(Rect::new(4, 4, 2, 2)));
        assert_eq!(plan.room_count(), 1);
    }

    #[test]
    fn test_oversized_special_is_capped() {
        let mut plan = FloorPlan::new(Loc::new(10, 10));
        plan.add_room(&room(2, 2, 4, 3), NodeTags::empty(), &[]).unwrap();
        let mut rng = GameRng::new(0);
        let placed = place_special_room(&mut plan, &mut rng, 0, &square(9, 9), NodeTags::empty()).unwrap();
        assert_eq!(plan.rect(placed), Some(Rect::new(2, 2, 4, 3)));
    }

    #[test]
    fn test_step_skips_refused_rooms() {
        let mut plan = FloorPlan::new(Loc::new(12, 6));
        let a = plan.add_room(&room(0, 0, 6, 6), NodeTags::IMMUTABLE, &[]).unwrap();
        plan.add_room(&room(6, 0, 6, 6), NodeTags::empty(), &[a]).unwrap();
        let step = SpecialRoomStep {
            rooms: [(square(3, 3), 1)].into_iter().collect(),
            ..Default::default()
        };
        let mut rng = GameRng::new(9);
        step.apply(&mut plan, &mut rng).unwrap();

        assert_eq!(plan.room_count(), 2);
        assert_eq!(plan.rect(NodeRef::room(0)), Some(Rect::new(0, 0, 6, 6)));
        let special = NodeRef::room(1);
        assert_eq!(plan.rect(special).map(|r| r.x), Some(6));
        assert_eq!(
            plan.node(special).unwrap().tags,
            NodeTags::SPECIAL | NodeTags::IMMUTABLE
        );
        assert!(plan.is_connected());
    }
}
