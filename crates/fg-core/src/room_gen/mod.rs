//! Room generators
//!
//! A [`RoomGen`] is one placeable shape. Its lifecycle is:
//!
//! 1. `propose_size` - ask the template for a size (prototype untouched)
//! 2. `prepare_size` - commit a final size, build the border tables
//! 3. `set_loc` - move into position
//! 4. `draw` - write tiles, opening doorways where neighbours asked
//!
//! Each side keeps three tables indexed by unit cell along that side:
//! `fulfillable` (may become an opening), `opened` (is an opening), and a
//! list of requests from neighbours (masks of which cells would satisfy
//! them). Pools hold prototypes; callers clone before steps 2-4.

mod hall;
mod shape;

pub use hall::HallGen;
pub use shape::ShapeKind;

use fg_rng::LayoutRng;
use serde::{Deserialize, Serialize};

use crate::geom::{Dir4, IntRange, Loc, RandRange, Rect};
use crate::tile::{Tile, TileTarget};
use shape::CrossBars;

/// Serialized as its [`ShapeKind`]; placement state is not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ShapeKind", into = "ShapeKind")]
pub struct RoomGen {
    kind: ShapeKind,
    draw: Rect,
    bars: Option<CrossBars>,
    fulfillable: [Vec<bool>; 4],
    opened: [Vec<bool>; 4],
    requests: [Vec<Vec<bool>>; 4],
}

impl From<ShapeKind> for RoomGen {
    fn from(kind: ShapeKind) -> Self {
        RoomGen::new(kind)
    }
}

impl From<RoomGen> for ShapeKind {
    fn from(shape: RoomGen) -> Self {
        shape.kind
    }
}

impl RoomGen {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            draw: Rect::default(),
            bars: None,
            fulfillable: Default::default(),
            opened: Default::default(),
            requests: Default::default(),
        }
    }

    pub fn square(width: RandRange, height: RandRange) -> Self {
        Self::new(ShapeKind::Square { width, height })
    }

    pub fn round(width: RandRange, height: RandRange) -> Self {
        Self::new(ShapeKind::Round { width, height })
    }

    pub fn cross(
        width: RandRange,
        height: RandRange,
        vert_thickness: RandRange,
        horiz_thickness: RandRange,
    ) -> Self {
        Self::new(ShapeKind::Cross {
            width,
            height,
            vert_thickness,
            horiz_thickness,
        })
    }

    pub fn angled_hall(width: RandRange, height: RandRange) -> Self {
        Self::new(ShapeKind::AngledHall { width, height })
    }

    pub fn single() -> Self {
        Self::new(ShapeKind::Single)
    }

    /// Fixed-size square already prepared and placed at `rect`
    pub fn placed_square(rect: Rect) -> Self {
        let mut shape = Self::square(RandRange::fixed(rect.w), RandRange::fixed(rect.h));
        shape.prepare_fixed(rect.size());
        shape.set_loc(rect.start());
        shape
    }

    /// Fixed-size hall already prepared and placed at `rect`
    pub fn placed_hall(rect: Rect) -> Self {
        let mut shape = Self::angled_hall(RandRange::fixed(rect.w), RandRange::fixed(rect.h));
        shape.prepare_fixed(rect.size());
        shape.set_loc(rect.start());
        shape
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn is_permissive(&self) -> bool {
        self.kind.is_permissive()
    }

    /// Current placement
    pub fn draw_rect(&self) -> Rect {
        self.draw
    }

    /// Propose a size from the template's ranges
    pub fn propose_size(&self, rng: &mut dyn LayoutRng) -> Loc {
        self.kind.propose_size(rng)
    }

    /// Commit the final size and rebuild every border table
    pub fn prepare_size(&mut self, rng: &mut dyn LayoutRng, size: Loc) {
        let size = Loc::new(size.x.max(1), size.y.max(1));
        self.bars = self.kind.prepare_bars(rng, size);
        self.reset_borders(size);
    }

    /// `prepare_size` for shapes that never draw while preparing
    fn prepare_fixed(&mut self, size: Loc) {
        self.bars = None;
        self.reset_borders(size);
    }

    fn reset_borders(&mut self, size: Loc) {
        self.draw = Rect::from_loc_size(self.draw.start(), size);
        for dir in Dir4::ALL {
            let side = self.kind.fulfillable_side(size, dir, self.bars);
            self.opened[dir.index()] = vec![false; side.len()];
            self.requests[dir.index()].clear();
            self.fulfillable[dir.index()] = side;
        }
    }

    pub fn set_loc(&mut self, loc: Loc) {
        self.draw = self.draw.with_start(loc);
    }

    pub fn border_len(&self, dir: Dir4) -> usize {
        self.fulfillable[dir.index()].len()
    }

    pub fn is_fulfillable(&self, dir: Dir4, index: usize) -> bool {
        self.fulfillable[dir.index()].get(index).copied().unwrap_or(false)
    }

    pub fn is_opened(&self, dir: Dir4, index: usize) -> bool {
        self.opened[dir.index()].get(index).copied().unwrap_or(false)
    }

    pub fn opened_count(&self, dir: Dir4) -> usize {
        self.opened[dir.index()].iter().filter(|o| **o).count()
    }

    /// Cells of the side facing `dir` shared with `other`'s opposite side,
    /// as an absolute span along that side
    fn shared_span(&self, other: &RoomGen, dir: Dir4) -> Option<IntRange> {
        self.draw
            .side_range(dir)
            .intersect(&other.draw.side_range(dir.reverse()))
    }

    /// Record that an undrawn neighbour on side `dir` needs an opening.
    ///
    /// The request prefers cells both shapes can open; failing that, any of
    /// this shape's fulfillable cells on the shared span; failing that, the
    /// whole shared span.
    pub fn receive_fulfillable_border(&mut self, source: &RoomGen, dir: Dir4) {
        let Some(span) = self.shared_span(source, dir) else {
            return;
        };
        let mine = self.draw.side_range(dir).min;
        let theirs = source.draw.side_range(dir.reverse()).min;
        let len = self.border_len(dir);

        let mut mask = vec![false; len];
        for c in span.min..span.max {
            let i = (c - mine) as usize;
            mask[i] = self.is_fulfillable(dir, i)
                && source.is_fulfillable(dir.reverse(), (c - theirs) as usize);
        }
        if !mask.contains(&true) {
            for c in span.min..span.max {
                let i = (c - mine) as usize;
                mask[i] = self.is_fulfillable(dir, i);
            }
        }
        if !mask.contains(&true) {
            for c in span.min..span.max {
                mask[(c - mine) as usize] = true;
            }
        }
        self.requests[dir.index()].push(mask);
    }

    /// Copy a drawn neighbour's openings onto side `dir` so both sides of the
    /// doorway line up.
    pub fn receive_opened_border(&mut self, source: &RoomGen, dir: Dir4) {
        let Some(span) = self.shared_span(source, dir) else {
            return;
        };
        let mine = self.draw.side_range(dir).min;
        let theirs = source.draw.side_range(dir.reverse()).min;
        for c in span.min..span.max {
            if source.is_opened(dir.reverse(), (c - theirs) as usize) {
                self.opened[dir.index()][(c - mine) as usize] = true;
            }
        }
    }

    /// Open one cell for every unsatisfied request
    fn resolve_openings(&mut self) {
        for dir in Dir4::ALL {
            let d = dir.index();
            for mask in &self.requests[d] {
                let satisfied = mask
                    .iter()
                    .zip(self.opened[d].iter())
                    .any(|(want, open)| *want && *open);
                if satisfied {
                    continue;
                }
                let candidates: Vec<usize> = mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, want)| want.then_some(i))
                    .collect();
                if let Some(&i) = candidates.get(candidates.len() / 2) {
                    self.opened[d][i] = true;
                }
            }
            self.requests[d].clear();
        }
    }

    /// Absolute tile of cell `index` on the side facing `dir`
    fn border_tile(&self, dir: Dir4, index: usize) -> Loc {
        let i = index as i32;
        let r = self.draw;
        match dir {
            Dir4::Up => Loc::new(r.left() + i, r.top()),
            Dir4::Down => Loc::new(r.left() + i, r.bottom() - 1),
            Dir4::Left => Loc::new(r.left(), r.top() + i),
            Dir4::Right => Loc::new(r.right() - 1, r.top() + i),
        }
    }

    fn opened_tiles(&self) -> Vec<(Dir4, Loc)> {
        let mut tiles = Vec::new();
        for dir in Dir4::ALL {
            for (i, open) in self.opened[dir.index()].iter().enumerate() {
                if *open {
                    tiles.push((dir, self.border_tile(dir, i)));
                }
            }
        }
        tiles
    }

    /// Write this shape onto `target`
    pub fn draw(&mut self, target: &mut dyn TileTarget) {
        self.resolve_openings();
        let tile = if self.is_permissive() { Tile::Hall } else { Tile::Room };
        let r = self.draw;

        if let ShapeKind::AngledHall { .. } = self.kind {
            self.draw_angled(target, tile);
            return;
        }

        for x in r.left()..r.right() {
            for y in r.top()..r.bottom() {
                let rel = Loc::new(x - r.left(), y - r.top());
                if self.kind.covers(r.size(), rel, self.bars) {
                    target.set_tile(Loc::new(x, y), tile);
                }
            }
        }

        // carve from each doorway inward until the body is reached
        for (dir, start) in self.opened_tiles() {
            let step = dir.reverse().to_loc();
            let mut loc = start;
            while r.contains_loc(loc) {
                let rel = loc - r.start();
                let reached = self.kind.covers(r.size(), rel, self.bars);
                target.set_tile(loc, tile);
                if reached {
                    break;
                }
                loc += step;
            }
        }
    }

    /// Join every opening through the middle with L-shaped paths
    fn draw_angled(&self, target: &mut dyn TileTarget, tile: Tile) {
        let r = self.draw;
        let center = r.center();
        let openings = self.opened_tiles();
        if openings.is_empty() {
            target.set_tile(center, tile);
            return;
        }
        for (dir, start) in openings {
            // leave the wall straight first, then turn toward the middle
            let axis = dir.axis();
            let mut loc = start;
            let main_target = center.scalar(axis);
            while loc.scalar(axis) != main_target {
                target.set_tile(loc, tile);
                let delta = (main_target - loc.scalar(axis)).signum();
                loc = loc.with_scalar(axis, loc.scalar(axis) + delta);
            }
            let cross = axis.orth();
            let cross_target = center.scalar(cross);
            while loc.scalar(cross) != cross_target {
                target.set_tile(loc, tile);
                let delta = (cross_target - loc.scalar(cross)).signum();
                loc = loc.with_scalar(cross, loc.scalar(cross) + delta);
            }
            target.set_tile(loc, tile);
        }
    }
}
