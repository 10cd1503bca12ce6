//! Tile drawing target
//!
//! Shapes draw themselves into anything implementing [`TileTarget`]. The
//! bundled [`TileGrid`] stores cells column-major (`cells[x][y]`).

use core::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geom::{Loc, Rect};

/// Terrain written by shape drawing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Tile {
    #[default]
    Stone = 0,
    Room = 1,
    Hall = 2,
}

impl Tile {
    pub const fn is_passable(&self) -> bool {
        matches!(self, Tile::Room | Tile::Hall)
    }

    pub const fn symbol(&self) -> char {
        match self {
            Tile::Stone => ' ',
            Tile::Room => '.',
            Tile::Hall => '#',
        }
    }
}

/// A settable 2D tile grid
pub trait TileTarget {
    fn size(&self) -> Loc;

    /// Tile at `loc`, `Stone` when out of bounds
    fn tile(&self, loc: Loc) -> Tile;

    /// Write a tile; out-of-bounds writes are ignored
    fn set_tile(&mut self, loc: Loc, tile: Tile);

    fn in_bounds(&self, loc: Loc) -> bool {
        let size = self.size();
        loc.x >= 0 && loc.y >= 0 && loc.x < size.x && loc.y < size.y
    }

    /// True if something walkable was already drawn at `loc`
    fn is_occupied(&self, loc: Loc) -> bool {
        self.tile(loc).is_passable()
    }

    fn fill_rect(&mut self, rect: Rect, tile: Tile) {
        for x in rect.left()..rect.right() {
            for y in rect.top()..rect.bottom() {
                self.set_tile(Loc::new(x, y), tile);
            }
        }
    }
}

/// Plain in-memory tile grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    cells: Vec<Vec<Tile>>,
}

impl TileGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        Self {
            width: w,
            height: h,
            cells: vec![vec![Tile::Stone; h as usize]; w as usize],
        }
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells
            .iter()
            .flat_map(|col| col.iter())
            .filter(|t| **t == tile)
            .count()
    }

    /// Number of passable tiles reachable from `start` by 4-way steps
    pub fn flood_count(&self, start: Loc) -> usize {
        if !self.is_occupied(start) {
            return 0;
        }
        let mut seen = vec![vec![false; self.height as usize]; self.width as usize];
        let mut stack = vec![start];
        seen[start.x as usize][start.y as usize] = true;
        let mut count = 0;
        while let Some(loc) = stack.pop() {
            count += 1;
            for dir in crate::geom::Dir4::ALL {
                let next = loc + dir.to_loc();
                if self.is_occupied(next) && !seen[next.x as usize][next.y as usize] {
                    seen[next.x as usize][next.y as usize] = true;
                    stack.push(next);
                }
            }
        }
        count
    }
}

impl TileTarget for TileGrid {
    fn size(&self) -> Loc {
        Loc::new(self.width, self.height)
    }

    fn tile(&self, loc: Loc) -> Tile {
        if !self.in_bounds(loc) {
            return Tile::Stone;
        }
        self.cells[loc.x as usize][loc.y as usize]
    }

    fn set_tile(&mut self, loc: Loc, tile: Tile) {
        if self.in_bounds(loc) {
            self.cells[loc.x as usize][loc.y as usize] = tile;
        }
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                write!(f, "{}", self.tile(Loc::new(x, y)).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
