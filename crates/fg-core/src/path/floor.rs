//! Branch growth on the fine-grained plan

use fg_rng::LayoutRng;
use serde::{Deserialize, Serialize};

use super::{BRANCH_UNIT, MAX_EXPANSION_ATTEMPTS};
use crate::error::Result;
use crate::floor::{FloorPlan, NodeRef};
use crate::geom::{Dir4, Loc, RandRange, Rect};
use crate::room_gen::{HallGen, RoomGen};
use crate::spawn::SpawnList;
use crate::step::FloorStep;
use crate::tags::NodeTags;

/// A room (and optional hall in front of it) ready to attach to `from`
#[derive(Debug, Clone, PartialEq)]
pub struct FloorExpansion {
    pub from: NodeRef,
    pub hall: Option<RoomGen>,
    pub room: RoomGen,
}

impl FloorExpansion {
    pub fn area(&self) -> i32 {
        let hall = self.hall.as_ref().map_or(0, |h| h.draw_rect().area());
        hall + self.room.draw_rect().area()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorPathBranch {
    /// Percent of the floor area to cover
    pub fill_percent: RandRange,
    /// Percent of a branch earned per placed room
    pub branch_ratio: RandRange,
    /// Chance in percent that a hall is put between two rooms
    pub hall_percent: i32,
    /// Stop instead of forking when dead ends cannot grow
    pub no_forced_branches: bool,
    pub rooms: SpawnList<RoomGen>,
    pub halls: SpawnList<HallGen>,
    /// Tags given to every node this step creates
    pub tags: NodeTags,
}

impl Default for FloorPathBranch {
    fn default() -> Self {
        Self {
            fill_percent: RandRange::fixed(50),
            branch_ratio: RandRange::fixed(0),
            hall_percent: 50,
            no_forced_branches: false,
            rooms: SpawnList::new(),
            halls: SpawnList::new(),
            tags: NodeTags::PATH,
        }
    }
}

impl FloorPathBranch {
    /// Nodes growth may start from.
    ///
    /// Terminal mode takes nodes with at most one neighbour, branch mode
    /// nodes with two or more. Immutable nodes and nodes boxed in on all four
    /// sides never qualify.
    pub fn possible_expansions(plan: &FloorPlan, branch: bool) -> Vec<NodeRef> {
        plan.node_refs()
            .filter(|r| {
                let Some(node) = plan.node(*r) else {
                    return false;
                };
                let degree_ok = if branch {
                    node.degree() >= 2
                } else {
                    node.degree() <= 1
                };
                degree_ok && !node.is_immutable() && has_open_side(plan, node.shape.draw_rect())
            })
            .collect()
    }

    /// Clone a room from the pool and size it to fit the floor
    fn prepare_room(&self, rng: &mut dyn LayoutRng, max: Loc) -> Option<RoomGen> {
        let mut room = self.rooms.pick(rng)?.clone();
        let size = room.propose_size(rng);
        room.prepare_size(rng, Loc::new(size.x.min(max.x), size.y.min(max.y)));
        Some(room)
    }

    fn prepare_hall(&self, rng: &mut dyn LayoutRng, max: Loc) -> Option<RoomGen> {
        let mut hall = self.halls.pick(rng)?.room_gen().clone();
        let size = hall.propose_size(rng);
        hall.prepare_size(rng, Loc::new(size.x.min(max.x), size.y.min(max.y)));
        Some(hall)
    }

    /// Try up to [`MAX_EXPANSION_ATTEMPTS`] times to fit a new room off one
    /// of the `frontier` nodes.
    ///
    /// Each attempt draws: the frontier pick, the room's pool pick and size,
    /// the hall roll, the hall's pick, size and placement if it rolled, then
    /// the room placement.
    pub fn choose_room_expansion(
        &self,
        plan: &FloorPlan,
        rng: &mut dyn LayoutRng,
        frontier: &[NodeRef],
    ) -> Option<FloorExpansion> {
        if frontier.is_empty() {
            return None;
        }
        for attempt in 0..MAX_EXPANSION_ATTEMPTS {
            let from = frontier[rng.next_max(frontier.len() as i32) as usize];
            let from_shape = &plan.node(from)?.shape;
            let mut room = self.prepare_room(rng, plan.size())?;

            let wants_hall = rng.percent(self.hall_percent);
            let hall = if wants_hall {
                self.prepare_hall(rng, plan.size())
            } else {
                None
            };

            let placed = match hall {
                Some(mut hall) => {
                    if !pick_placement(plan, rng, from_shape, &mut hall, &[from]) {
                        log::trace!("attempt {attempt}: no room for a hall off {from}");
                        continue;
                    }
                    if !pick_placement(plan, rng, &hall, &mut room, &[]) {
                        log::trace!("attempt {attempt}: no room past the hall off {from}");
                        continue;
                    }
                    Some(hall)
                }
                None => {
                    if !pick_placement(plan, rng, from_shape, &mut room, &[from]) {
                        log::trace!("attempt {attempt}: no room off {from}");
                        continue;
                    }
                    None
                }
            };
            return Some(FloorExpansion {
                from,
                hall: placed,
                room,
            });
        }
        None
    }

    /// Commit an expansion, returning the tiles it covers
    pub fn add_expansion(&self, plan: &mut FloorPlan, expansion: &FloorExpansion) -> Result<i32> {
        let parent = match &expansion.hall {
            Some(hall) => plan.add_hall(hall, self.tags, &[expansion.from])?,
            None => expansion.from,
        };
        plan.add_room(&expansion.room, self.tags, &[parent])?;
        Ok(expansion.area())
    }

    fn expand(&self, plan: &mut FloorPlan, rng: &mut dyn LayoutRng, branch: bool) -> Result<Option<i32>> {
        let frontier = Self::possible_expansions(plan, branch);
        match self.choose_room_expansion(plan, rng, &frontier) {
            Some(expansion) => Ok(Some(self.add_expansion(plan, &expansion)?)),
            None => Ok(None),
        }
    }

    /// Put the first room somewhere on an empty floor
    fn place_seed(&self, plan: &mut FloorPlan, rng: &mut dyn LayoutRng) -> Result<Option<i32>> {
        let Some(mut room) = self.prepare_room(rng, plan.size()) else {
            return Ok(None);
        };
        let bounds = plan.draw_rect();
        let size = room.draw_rect().size();
        let x = rng.next_range(bounds.left(), bounds.right() - size.x + 1);
        let y = rng.next_range(bounds.top(), bounds.bottom() - size.y + 1);
        room.set_loc(Loc::new(x, y));
        plan.add_room(&room, self.tags, &[])?;
        Ok(Some(room.draw_rect().area()))
    }
}

impl FloorStep for FloorPathBranch {
    fn apply(&self, plan: &mut FloorPlan, rng: &mut dyn LayoutRng) -> Result<()> {
        if self.rooms.is_empty() {
            log::warn!("path branch has no rooms to place");
            return Ok(());
        }
        let tiles_to_open = (plan.draw_rect().area() * self.fill_percent.pick(rng) / 100).max(1);
        let add_branch = self.branch_ratio.pick(rng);
        let mut tiles_left = tiles_to_open;

        if plan.node_count() == 0 {
            match self.place_seed(plan, rng)? {
                Some(area) => tiles_left -= area,
                None => return Ok(()),
            }
        }

        let mut pending_branch = 0;
        while tiles_left > 0 {
            let terminal = self.expand(plan, rng, false)?;
            match terminal {
                Some(area) => {
                    tiles_left -= area;
                    pending_branch += add_branch;
                }
                None if self.no_forced_branches => break,
                None => pending_branch = BRANCH_UNIT,
            }

            let mut branch_failed = false;
            while pending_branch >= BRANCH_UNIT && tiles_left > 0 {
                match self.expand(plan, rng, true)? {
                    Some(area) => {
                        tiles_left -= area;
                        pending_branch -= BRANCH_UNIT;
                    }
                    None => {
                        branch_failed = true;
                        break;
                    }
                }
            }
            if terminal.is_none() && branch_failed {
                break;
            }
        }

        log::debug!(
            "path branch opened {} of {} tiles: {} rooms, {} halls",
            tiles_to_open - tiles_left.max(0),
            tiles_to_open,
            plan.room_count(),
            plan.hall_count()
        );
        Ok(())
    }
}

/// A side of `rect` whose one-tile strip is on the floor and unoccupied
fn has_open_side(plan: &FloorPlan, rect: Rect) -> bool {
    let bounds = plan.draw_rect();
    Dir4::ALL.into_iter().any(|dir| {
        let strip = rect.outer_strip(dir, 1);
        bounds.contains_rect(&strip) && plan.check_collision(strip).is_empty()
    })
}

/// Place `to` flush against `from` at a weighted random legal spot.
///
/// Returns false, with no draw, when there is no legal spot.
fn pick_placement(
    plan: &FloorPlan,
    rng: &mut dyn LayoutRng,
    from: &RoomGen,
    to: &mut RoomGen,
    exclude: &[NodeRef],
) -> bool {
    let mut spots = SpawnList::new();
    for dir in Dir4::ALL {
        add_legal_placements(plan, &mut spots, from, to, dir, exclude);
    }
    match spots.pick(rng) {
        Some(loc) => {
            to.set_loc(*loc);
            true
        }
        None => false,
    }
}

/// Collect every spot for `to` along `from`'s side `dir`, weighted by how
/// many border cells the two could open between them.
///
/// A spot is legal when it lies on the floor and its one-tile margin touches
/// no node other than those in `exclude`.
fn add_legal_placements(
    plan: &FloorPlan,
    spots: &mut SpawnList<Loc>,
    from: &RoomGen,
    to: &RoomGen,
    dir: Dir4,
    exclude: &[NodeRef],
) {
    let fr = from.draw_rect();
    let size = to.draw_rect().size();
    let cross = dir.axis().orth();
    let side = fr.side_range(dir);
    let bounds = plan.draw_rect();

    let mut s = side.min - (size.scalar(cross) - 1);
    while s < side.max {
        let loc = match dir {
            Dir4::Down => Loc::new(s, fr.bottom()),
            Dir4::Up => Loc::new(s, fr.top() - size.y),
            Dir4::Left => Loc::new(fr.left() - size.x, s),
            Dir4::Right => Loc::new(fr.right(), s),
        };
        let rect = Rect::from_loc_size(loc, size);
        if !bounds.contains_rect(&rect) {
            s += 1;
            continue;
        }

        let blocked_until = plan
            .check_collision(rect.inflate(1, 1))
            .into_iter()
            .filter(|hit| !exclude.contains(hit))
            .filter_map(|hit| plan.rect(hit))
            .map(|hit| hit.range(cross).max + 1)
            .max();
        if let Some(next) = blocked_until {
            s = next.max(s + 1);
            continue;
        }

        let score = FloorPlan::border_match(from, to, loc, dir);
        if score > 0 {
            spots.add(loc, score as i32);
        }
        s += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::NodeFilter;
    use fg_rng::{GameRng, ScriptedRng, TracingRng};

    fn square_pool(min: i32, max: i32) -> SpawnList<RoomGen> {
        [(RoomGen::square(RandRange::new(min, max), RandRange::new(min, max)), 1)]
            .into_iter()
            .collect()
    }

    fn seeded(size: Loc, rect: Rect) -> FloorPlan {
        let mut plan = FloorPlan::new(size);
        plan.add_room(&RoomGen::placed_square(rect), NodeTags::empty(), &[])
            .unwrap();
        plan
    }

    #[test]
    fn test_expansion_draw_order() {
        let plan = seeded(Loc::new(10, 3), Rect::new(0, 0, 3, 3));
        let step = FloorPathBranch {
            hall_percent: 0,
            rooms: square_pool(3, 4),
            ..Default::default()
        };
        // frontier, pool, width, height, hall roll, placement
        let mut rng = ScriptedRng::new([0; 6]);
        let frontier = FloorPathBranch::possible_expansions(&plan, false);
        let exp = step.choose_room_expansion(&plan, &mut rng, &frontier).unwrap();
        assert_eq!(rng.remaining(), 0);
        assert_eq!(exp.from, NodeRef::room(0));
        assert_eq!(exp.hall, None);
        assert_eq!(exp.room.draw_rect(), Rect::new(3, 0, 3, 3));
    }

    #[test]
    fn test_placement_avoids_third_node() {
        let mut plan = seeded(Loc::new(9, 3), Rect::new(0, 0, 3, 3));
        plan.add_room(&RoomGen::placed_square(Rect::new(6, 0, 3, 3)), NodeTags::empty(), &[])
            .unwrap();
        let step = FloorPathBranch {
            hall_percent: 0,
            rooms: square_pool(3, 4),
            ..Default::default()
        };
        let mut rng = TracingRng::new(GameRng::new(9));
        let exp = step.choose_room_expansion(&plan, &mut rng, &[NodeRef::room(0)]);
        assert_eq!(exp, None);
        // frontier, pool, two sizes and the hall roll, on every attempt
        assert_eq!(rng.call_count(), (5 * MAX_EXPANSION_ATTEMPTS) as u64);
    }

    #[test]
    fn test_expansion_through_hall() {
        let plan = seeded(Loc::new(12, 3), Rect::new(0, 0, 3, 3));
        let step = FloorPathBranch {
            hall_percent: 100,
            rooms: square_pool(3, 4),
            halls: [(HallGen::angled(RandRange::new(2, 3), RandRange::new(1, 2)), 1)]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let mut rng = GameRng::new(4);
        let exp = step
            .choose_room_expansion(&plan, &mut rng, &[NodeRef::room(0)])
            .unwrap();
        let hall = exp.hall.as_ref().unwrap();
        assert_eq!(hall.draw_rect().size(), Loc::new(2, 1));
        assert_eq!(hall.draw_rect().left(), 3);
        assert_eq!(exp.room.draw_rect(), Rect::new(5, 0, 3, 3));

        let mut plan = plan;
        assert_eq!(step.add_expansion(&mut plan, &exp).unwrap(), 11);
        assert_eq!(plan.distance(NodeRef::room(0), NodeRef::room(1)), Some(2));
    }

    #[test]
    fn test_possible_expansions_modes() {
        let mut plan = seeded(Loc::new(20, 5), Rect::new(0, 0, 3, 3));
        let t = NodeTags::empty();
        let b = plan
            .add_room(&RoomGen::placed_square(Rect::new(3, 0, 3, 3)), t, &[NodeRef::room(0)])
            .unwrap();
        plan.add_room(&RoomGen::placed_square(Rect::new(6, 0, 3, 3)), NodeTags::IMMUTABLE, &[b])
            .unwrap();
        assert_eq!(
            FloorPathBranch::possible_expansions(&plan, false),
            vec![NodeRef::room(0)]
        );
        assert_eq!(FloorPathBranch::possible_expansions(&plan, true), vec![b]);
    }

    #[test]
    fn test_grows_a_single_path_without_branches() {
        let step = FloorPathBranch {
            fill_percent: RandRange::fixed(40),
            hall_percent: 50,
            no_forced_branches: true,
            rooms: square_pool(3, 6),
            halls: [(HallGen::angled(RandRange::new(1, 4), RandRange::new(1, 4)), 1)]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        for seed in 0..20 {
            let mut plan = FloorPlan::new(Loc::new(48, 32));
            let mut rng = GameRng::new(seed);
            step.apply(&mut plan, &mut rng).unwrap();
            assert!(plan.room_count() >= 1);
            assert!(plan.is_connected());
            for r in plan.node_refs() {
                assert!(plan.degree(r) <= 2, "seed {seed}: {r} forks");
                assert!(step.tags == plan.node(r).unwrap().tags);
            }
        }
    }

    #[test]
    fn test_branches_fork_the_path() {
        let step = FloorPathBranch {
            fill_percent: RandRange::fixed(60),
            branch_ratio: RandRange::fixed(100),
            hall_percent: 0,
            rooms: square_pool(3, 5),
            ..Default::default()
        };
        let mut forked = 0;
        for seed in 0..10 {
            let mut plan = FloorPlan::new(Loc::new(40, 40));
            let mut rng = GameRng::new(seed);
            step.apply(&mut plan, &mut rng).unwrap();
            assert!(plan.is_connected());
            if plan.node_refs().any(|r| plan.degree(r) >= 3) {
                forked += 1;
            }
            let filter = crate::tags::TagFilter::require(NodeTags::PATH);
            assert!(plan.rooms().iter().all(|n| filter.passes(n)));
        }
        assert!(forked > 0);
    }

    #[test]
    fn test_empty_pool_is_a_no_op() {
        let mut plan = FloorPlan::new(Loc::new(10, 10));
        let mut rng = TracingRng::new(GameRng::new(1));
        FloorPathBranch::default().apply(&mut plan, &mut rng).unwrap();
        assert_eq!(plan.node_count(), 0);
        assert_eq!(rng.call_count(), 0);
    }
}
