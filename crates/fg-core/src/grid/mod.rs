//! Coarse grid plan
//!
//! The floor is cut into `cols x rows` cells of a fixed size, separated by a
//! wall gap. Each cell holds at most one room (rooms may span several cells)
//! and each edge between two neighbouring cells may hold a hall. Vertical
//! edges are stored under the cell above them, horizontal edges under the
//! cell to their left; both tables are indexed `[x][y]`.
//!
//! Room and hall shapes only get pixel geometry when the plan is placed on a
//! floor; see [`GridPlan::place_rooms_on_floor`].

mod bounds;
mod place;

use crate::error::{LayoutError, Result};
use crate::geom::{Dir4, Loc, Rect};
use crate::room_gen::{HallGen, RoomGen};
use crate::tags::NodeTags;

/// A room occupying one or more grid cells
#[derive(Debug, Clone, PartialEq)]
pub struct GridRoomPlan {
    /// Cells covered, in cell units
    pub bounds: Rect,
    pub shape: RoomGen,
    pub tags: NodeTags,
    /// Materialize as a hall node when the shape is permissive
    pub prefer_hall: bool,
}

impl GridRoomPlan {
    pub fn is_immutable(&self) -> bool {
        self.tags.contains(NodeTags::IMMUTABLE)
    }
}

/// The hall on one grid edge and the segments chosen for it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridHallGroup {
    hall: Option<HallGen>,
    /// Placed segments, chained from the start room to the end room
    segments: Vec<RoomGen>,
}

impl GridHallGroup {
    pub fn hall(&self) -> Option<&HallGen> {
        self.hall.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.hall.is_some()
    }

    pub fn segments(&self) -> &[RoomGen] {
        &self.segments
    }
}

#[derive(Debug, Clone)]
pub struct GridPlan {
    cols: i32,
    rows: i32,
    cell_size: Loc,
    wall: i32,
    rooms: Vec<GridRoomPlan>,
    cells: Vec<Vec<Option<usize>>>,
    vhalls: Vec<Vec<GridHallGroup>>,
    hhalls: Vec<Vec<GridHallGroup>>,
}

impl GridPlan {
    /// An empty grid of `cols x rows` cells of `cell_size` tiles
    pub fn new(cols: i32, rows: i32, cell_size: Loc, wall: i32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let (c, r) = (cols as usize, rows as usize);
        Self {
            cols,
            rows,
            cell_size,
            wall: wall.max(0),
            rooms: Vec::new(),
            cells: vec![vec![None; r]; c],
            vhalls: vec![vec![GridHallGroup::default(); r.saturating_sub(1)]; c],
            hhalls: vec![vec![GridHallGroup::default(); r]; c.saturating_sub(1)],
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> Loc {
        self.cell_size
    }

    pub fn wall(&self) -> i32 {
        self.wall
    }

    /// Size in tiles of the floor the grid lays out
    pub fn floor_size(&self) -> Loc {
        Loc::new(
            self.cols * (self.cell_size.x + self.wall) - self.wall,
            self.rows * (self.cell_size.y + self.wall) - self.wall,
        )
    }

    pub fn grid_rect(&self) -> Rect {
        Rect::new(0, 0, self.cols, self.rows)
    }

    pub fn in_bounds(&self, cell: Loc) -> bool {
        self.grid_rect().contains_loc(cell)
    }

    /// Tile rect covered by a rect of cells, wall gaps inside it included
    pub fn cell_rect(&self, cells: Rect) -> Rect {
        let stride = self.cell_size + Loc::splat(self.wall);
        Rect::new(
            cells.x * stride.x,
            cells.y * stride.y,
            cells.w * stride.x - self.wall,
            cells.h * stride.y - self.wall,
        )
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn rooms(&self) -> &[GridRoomPlan] {
        &self.rooms
    }

    pub fn room(&self, index: usize) -> Option<&GridRoomPlan> {
        self.rooms.get(index)
    }

    pub fn room_at(&self, cell: Loc) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        self.cells[cell.x as usize][cell.y as usize]
    }

    /// Checks a room could cover `bounds`
    pub fn can_add_room(&self, bounds: Rect) -> Result<()> {
        if !bounds.is_valid() || !self.grid_rect().contains_rect(&bounds) {
            return Err(LayoutError::OutOfBounds {
                rect: bounds,
                size: Loc::new(self.cols, self.rows),
            });
        }
        for x in bounds.left()..bounds.right() {
            for y in bounds.top()..bounds.bottom() {
                if let Some(index) = self.cells[x as usize][y as usize] {
                    return Err(LayoutError::RoomCollision {
                        rect: bounds,
                        index,
                    });
                }
            }
        }
        // edges strictly inside the room
        for x in bounds.left()..bounds.right() {
            for y in bounds.top()..bounds.bottom() {
                let cell = Loc::new(x, y);
                let inner_down = y + 1 < bounds.bottom() && self.has_hall(cell, Dir4::Down);
                let inner_right = x + 1 < bounds.right() && self.has_hall(cell, Dir4::Right);
                if inner_down || inner_right {
                    return Err(LayoutError::HallInsideRoom {
                        loc: cell,
                        index: self.rooms.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Place a room over `bounds` (in cells)
    pub fn add_room(
        &mut self,
        bounds: Rect,
        shape: RoomGen,
        tags: NodeTags,
        prefer_hall: bool,
    ) -> Result<usize> {
        self.can_add_room(bounds)?;
        let index = self.rooms.len();
        for x in bounds.left()..bounds.right() {
            for y in bounds.top()..bounds.bottom() {
                self.cells[x as usize][y as usize] = Some(index);
            }
        }
        self.rooms.push(GridRoomPlan {
            bounds,
            shape,
            tags,
            prefer_hall,
        });
        Ok(index)
    }

    /// Table slot of the edge leaving `cell` toward `dir`
    fn edge_slot(&self, cell: Loc, dir: Dir4) -> Option<(bool, usize, usize)> {
        let dest = cell + dir.to_loc();
        if !self.in_bounds(cell) || !self.in_bounds(dest) {
            return None;
        }
        let vertical = matches!(dir, Dir4::Up | Dir4::Down);
        let owner = if dir.is_positive() { cell } else { dest };
        Some((vertical, owner.x as usize, owner.y as usize))
    }

    /// The hall group on the edge leaving `cell` toward `dir`
    pub fn edge(&self, cell: Loc, dir: Dir4) -> Option<&GridHallGroup> {
        let (vertical, x, y) = self.edge_slot(cell, dir)?;
        if vertical {
            Some(&self.vhalls[x][y])
        } else {
            Some(&self.hhalls[x][y])
        }
    }

    pub(crate) fn edge_mut(&mut self, cell: Loc, dir: Dir4) -> Option<&mut GridHallGroup> {
        let (vertical, x, y) = self.edge_slot(cell, dir)?;
        if vertical {
            Some(&mut self.vhalls[x][y])
        } else {
            Some(&mut self.hhalls[x][y])
        }
    }

    pub fn has_hall(&self, cell: Loc, dir: Dir4) -> bool {
        self.edge(cell, dir).is_some_and(GridHallGroup::is_set)
    }

    /// Set or clear (`None`) the hall on the edge leaving `cell` toward `dir`
    pub fn set_hall(&mut self, cell: Loc, dir: Dir4, hall: Option<HallGen>) -> Result<()> {
        let dest = cell + dir.to_loc();
        if self.edge_slot(cell, dir).is_none() {
            return Err(LayoutError::InvalidDirection { loc: cell });
        }
        if hall.is_some()
            && let Some(index) = self.room_at(cell)
            && self.room_at(dest) == Some(index)
        {
            return Err(LayoutError::HallInsideRoom { loc: cell, index });
        }
        if let Some(group) = self.edge_mut(cell, dir) {
            group.hall = hall;
            group.segments.clear();
        }
        Ok(())
    }

    /// Set or clear the hall between two neighbouring cells
    pub fn set_connecting_hall(&mut self, from: Loc, to: Loc, hall: Option<HallGen>) -> Result<()> {
        let dir = Dir4::ALL
            .into_iter()
            .find(|d| from + d.to_loc() == to)
            .ok_or(LayoutError::InvalidDirection { loc: from })?;
        self.set_hall(from, dir, hall)
    }

    /// Rooms joined to room `index` by a hall.
    ///
    /// Walks the top and bottom rows of the room left to right (probing up,
    /// then down), then its left and right columns top to bottom (probing
    /// left, then right). Callers rely on this order.
    pub fn adjacent_rooms(&self, index: usize) -> Vec<usize> {
        let Some(room) = self.rooms.get(index) else {
            return Vec::new();
        };
        let b = room.bounds;
        let mut probes = Vec::new();
        for x in b.left()..b.right() {
            probes.push((Loc::new(x, b.top()), Dir4::Up));
            probes.push((Loc::new(x, b.bottom() - 1), Dir4::Down));
        }
        for y in b.top()..b.bottom() {
            probes.push((Loc::new(b.left(), y), Dir4::Left));
            probes.push((Loc::new(b.right() - 1, y), Dir4::Right));
        }

        let mut adjacent = Vec::new();
        for (cell, dir) in probes {
            if !self.has_hall(cell, dir) {
                continue;
            }
            if let Some(other) = self.room_at(cell + dir.to_loc())
                && other != index
                && !adjacent.contains(&other)
            {
                adjacent.push(other);
            }
        }
        adjacent
    }
}
