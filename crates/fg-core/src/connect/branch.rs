//! Shortcuts between dead ends

use fg_rng::LayoutRng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::floor::{FloorPlan, NodeRef};
use crate::geom::{Dir4, IntRange, RandRange, Rect};
use crate::room_gen::{HallGen, RoomGen};
use crate::spawn::SpawnList;
use crate::step::FloorStep;
use crate::tags::{NodeFilter, NodeTags, TagFilter};

/// A possible shortcut from a dead end to the first node it faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutCandidate {
    pub from: NodeRef,
    pub to: NodeRef,
    pub dir: Dir4,
    /// Open tiles between the two, `None` when they already touch
    pub hall: Option<Rect>,
}

/// Every unbranched corridor hanging off a dead end.
///
/// Each arm starts at a node of degree 1 and follows degree-2 nodes; the
/// node where the walk stops (degree 0, 1 or 3+) is not part of the arm.
pub fn branch_arms(plan: &FloorPlan) -> Vec<Vec<NodeRef>> {
    let mut arms = Vec::new();
    for start in plan.node_refs() {
        if plan.degree(start) != 1 {
            continue;
        }
        let mut arm = vec![start];
        let mut prev = start;
        let Some(mut cur) = plan.adjacents(start).first().copied() else {
            continue;
        };
        while plan.degree(cur) == 2 && !arm.contains(&cur) {
            arm.push(cur);
            let Some(next) = plan.adjacents(cur).into_iter().find(|n| *n != prev) else {
                break;
            };
            prev = cur;
            cur = next;
        }
        arms.push(arm);
    }
    arms
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectBranchStep {
    /// Chance in percent that each arm gets a shortcut
    pub connect_percent: i32,
    pub halls: SpawnList<HallGen>,
    /// Nodes allowed at either end of a shortcut
    pub filter: TagFilter,
    /// Tags given to shortcut halls
    pub tags: NodeTags,
}

impl Default for ConnectBranchStep {
    fn default() -> Self {
        Self {
            connect_percent: 50,
            halls: [(HallGen::angled(RandRange::fixed(1), RandRange::fixed(1)), 1)]
                .into_iter()
                .collect(),
            filter: TagFilter::refuse(NodeTags::IMMUTABLE),
            tags: NodeTags::SHORTCUT,
        }
    }
}

impl ConnectBranchStep {
    /// Probe outward from the arm's dead end on all four sides.
    ///
    /// Each probe grows a strip until it first hits a node. The hit is
    /// dropped when it belongs to the arm, is already linked to the dead end,
    /// fails the filter, or either side cannot open on the shared span.
    pub fn candidates(&self, plan: &FloorPlan, arm: &[NodeRef]) -> Vec<ShortcutCandidate> {
        let Some(&from) = arm.first() else {
            return Vec::new();
        };
        let Some(node) = plan.node(from) else {
            return Vec::new();
        };
        let rect = node.shape.draw_rect();
        let bounds = plan.draw_rect();
        let mut found = Vec::new();

        for dir in Dir4::ALL {
            let mut thickness = 1;
            let hit = loop {
                let strip = rect.outer_strip(dir, thickness);
                if !bounds.contains_rect(&strip) {
                    break None;
                }
                if let Some(first) = plan.check_collision(strip).first() {
                    break Some(*first);
                }
                thickness += 1;
            };
            let Some(to) = hit else {
                continue;
            };
            if arm.contains(&to) || plan.is_linked(from, to) {
                log::trace!("{from} already reaches {to}");
                continue;
            }
            let Some(target) = plan.node(to) else {
                continue;
            };
            if !self.filter.passes(target) {
                continue;
            }
            let target_rect = target.shape.draw_rect();
            let Some(span) = rect
                .side_range(dir)
                .intersect(&target_rect.side_range(dir.reverse()))
            else {
                continue;
            };

            let gap = thickness - 1;
            let hall = if gap == 0 {
                if FloorPlan::border_match(&node.shape, &target.shape, target_rect.start(), dir) == 0 {
                    continue;
                }
                None
            } else {
                if !side_can_open(&node.shape, dir, span)
                    || !side_can_open(&target.shape, dir.reverse(), span)
                {
                    continue;
                }
                let main = rect.outer_strip(dir, gap).range(dir.axis());
                Some(Rect::from_axis_ranges(dir.axis(), main, span))
            };
            found.push(ShortcutCandidate { from, to, dir, hall });
        }
        found
    }

    fn connect(
        &self,
        plan: &mut FloorPlan,
        rng: &mut dyn LayoutRng,
        candidate: &ShortcutCandidate,
    ) -> Result<()> {
        match candidate.hall {
            Some(rect) => {
                let Some(proto) = self.halls.pick(rng) else {
                    return Ok(());
                };
                let mut hall: RoomGen = proto.room_gen().clone();
                hall.prepare_size(rng, rect.size());
                hall.set_loc(rect.start());
                plan.add_hall(&hall, self.tags, &[candidate.from, candidate.to])?;
            }
            None => plan.link(candidate.from, candidate.to)?,
        }
        Ok(())
    }
}

impl FloorStep for ConnectBranchStep {
    fn apply(&self, plan: &mut FloorPlan, rng: &mut dyn LayoutRng) -> Result<()> {
        let direct_only = self.halls.is_empty();
        if direct_only {
            log::debug!("connect step has no halls, linking touching nodes only");
        }
        let mut arms: Vec<Vec<NodeRef>> = branch_arms(plan)
            .into_iter()
            .filter(|arm| plan.node(arm[0]).is_some_and(|n| self.filter.passes(n)))
            .collect();

        let mut quota = 0;
        for _ in &arms {
            if rng.percent(self.connect_percent) {
                quota += 1;
            }
        }

        let mut made = 0;
        while !arms.is_empty() && quota > 0 {
            let chosen = arms.remove(rng.next_max(arms.len() as i32) as usize);
            let mut candidates = self.candidates(plan, &chosen);
            if direct_only {
                candidates.retain(|c| c.hall.is_none());
            }
            if candidates.is_empty() {
                continue;
            }
            let pick = candidates[rng.next_max(candidates.len() as i32) as usize];
            self.connect(plan, rng, &pick)?;
            made += 1;
            quota -= 1;

            // the destination is no longer a dead end
            arms.retain(|arm| {
                if arm[0] == pick.to {
                    quota -= 1;
                    false
                } else {
                    true
                }
            });
        }

        log::debug!("connect step made {made} shortcuts");
        Ok(())
    }
}

/// Whether any cell of `shape`'s side `dir` inside `span` may open
fn side_can_open(shape: &RoomGen, dir: Dir4, span: IntRange) -> bool {
    let side = shape.draw_rect().side_range(dir);
    (span.min..span.max).any(|c| shape.is_fulfillable(dir, (c - side.min) as usize))
}
