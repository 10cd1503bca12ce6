//! Branch growth on the coarse grid

use fg_rng::LayoutRng;
use serde::{Deserialize, Serialize};

use super::BRANCH_UNIT;
use crate::error::Result;
use crate::geom::{Dir4, Loc, RandRange, Rect};
use crate::grid::GridPlan;
use crate::room_gen::{HallGen, RoomGen};
use crate::spawn::SpawnList;
use crate::step::GridStep;
use crate::tags::NodeTags;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPathBranch {
    /// Percent of the cells to fill with rooms
    pub room_ratio: RandRange,
    /// Percent of a branch earned per placed room
    pub branch_ratio: RandRange,
    /// Stop instead of forking when dead ends cannot grow
    pub no_forced_branches: bool,
    pub rooms: SpawnList<RoomGen>,
    pub halls: SpawnList<HallGen>,
    /// Tags given to every room this step creates
    pub tags: NodeTags,
}

impl Default for GridPathBranch {
    fn default() -> Self {
        Self {
            room_ratio: RandRange::fixed(50),
            branch_ratio: RandRange::fixed(0),
            no_forced_branches: false,
            rooms: SpawnList::new(),
            halls: SpawnList::new(),
            tags: NodeTags::PATH,
        }
    }
}

impl GridPathBranch {
    /// Every `(cell, dir)` leading from a room onto an empty cell.
    ///
    /// Terminal mode takes rooms joined to at most one other room, branch mode
    /// rooms joined to two or more. Rooms are visited in index order, their
    /// cells column by column, directions in `Dir4` order.
    pub fn possible_expansions(grid: &GridPlan, branch: bool) -> Vec<(Loc, Dir4)> {
        let mut rays = Vec::new();
        for (index, room) in grid.rooms().iter().enumerate() {
            if room.is_immutable() {
                continue;
            }
            let links = grid.adjacent_rooms(index).len();
            if (branch && links < 2) || (!branch && links > 1) {
                continue;
            }
            let b = room.bounds;
            for x in b.left()..b.right() {
                for y in b.top()..b.bottom() {
                    let cell = Loc::new(x, y);
                    for dir in Dir4::ALL {
                        let dest = cell + dir.to_loc();
                        if grid.in_bounds(dest) && grid.room_at(dest).is_none() {
                            rays.push((cell, dir));
                        }
                    }
                }
            }
        }
        rays
    }

    /// Grow one room along a random ray. Draws the ray, the hall, then the room.
    fn expand(&self, grid: &mut GridPlan, rng: &mut dyn LayoutRng, branch: bool) -> Result<bool> {
        let rays = Self::possible_expansions(grid, branch);
        if rays.is_empty() {
            return Ok(false);
        }
        let (cell, dir) = rays[rng.next_max(rays.len() as i32) as usize];
        let (Some(hall), Some(room)) = (self.halls.pick(rng), self.rooms.pick(rng)) else {
            return Ok(false);
        };
        let dest = cell + dir.to_loc();
        grid.set_hall(cell, dir, Some(hall.clone()))?;
        grid.add_room(Rect::from_loc_size(dest, Loc::splat(1)), room.clone(), self.tags, false)?;
        Ok(true)
    }
}

impl GridStep for GridPathBranch {
    fn apply(&self, grid: &mut GridPlan, rng: &mut dyn LayoutRng) -> Result<()> {
        if self.rooms.is_empty() || self.halls.is_empty() {
            log::warn!("grid path branch needs both rooms and halls");
            return Ok(());
        }
        let cells = grid.cols() * grid.rows();
        let rooms_to_open = (cells * self.room_ratio.pick(rng) / 100).max(1);
        let add_branch = self.branch_ratio.pick(rng);
        let mut rooms_left = rooms_to_open;

        if grid.room_count() == 0 {
            let seed = Loc::new(rng.next_max(grid.cols()), rng.next_max(grid.rows()));
            let Some(room) = self.rooms.pick(rng) else {
                return Ok(());
            };
            grid.add_room(Rect::from_loc_size(seed, Loc::splat(1)), room.clone(), self.tags, false)?;
            rooms_left -= 1;
        }

        let mut pending_branch = 0;
        while rooms_left > 0 {
            let terminal = self.expand(grid, rng, false)?;
            if terminal {
                rooms_left -= 1;
                pending_branch += add_branch;
            } else if self.no_forced_branches {
                break;
            } else {
                pending_branch = BRANCH_UNIT;
            }

            let mut branch_failed = false;
            while pending_branch >= BRANCH_UNIT && rooms_left > 0 {
                if self.expand(grid, rng, true)? {
                    rooms_left -= 1;
                    pending_branch -= BRANCH_UNIT;
                } else {
                    branch_failed = true;
                    break;
                }
            }
            if !terminal && branch_failed {
                break;
            }
        }

        log::debug!(
            "grid path branch placed {} of {} rooms",
            rooms_to_open - rooms_left,
            rooms_to_open
        );
        Ok(())
    }
}
