//! Axis-aligned integer rectangles
//!
//! Rectangles are half-open: a rect at `(x, y)` of size `(w, h)` covers the
//! cells `x..x+w` by `y..y+h`. Two rects whose edges meet touch but do not
//! intersect.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Axis4, Dir4, IntRange, Loc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn from_loc_size(start: Loc, size: Loc) -> Self {
        Self::new(start.x, start.y, size.x, size.y)
    }

    /// Rect covering the given horizontal and vertical spans
    pub const fn from_ranges(horiz: IntRange, vert: IntRange) -> Self {
        Self::new(horiz.min, vert.min, horiz.max - horiz.min, vert.max - vert.min)
    }

    /// Rect spanning `cross` on the axis orthogonal to `main_axis` and `main` along it
    pub const fn from_axis_ranges(main_axis: Axis4, main: IntRange, cross: IntRange) -> Self {
        match main_axis {
            Axis4::Vert => Self::from_ranges(cross, main),
            Axis4::Horiz => Self::from_ranges(main, cross),
        }
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    /// One past the last column
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// One past the last row
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn start(&self) -> Loc {
        Loc::new(self.x, self.y)
    }

    pub const fn end(&self) -> Loc {
        Loc::new(self.right(), self.bottom())
    }

    pub const fn size(&self) -> Loc {
        Loc::new(self.w, self.h)
    }

    pub const fn area(&self) -> i32 {
        self.w * self.h
    }

    pub const fn is_valid(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    pub const fn with_start(self, start: Loc) -> Self {
        Self::new(start.x, start.y, self.w, self.h)
    }

    pub fn center(&self) -> Loc {
        Loc::new(self.x + (self.w - 1) / 2, self.y + (self.h - 1) / 2)
    }

    /// Span along one axis
    pub const fn range(&self, axis: Axis4) -> IntRange {
        match axis {
            Axis4::Horiz => IntRange::new(self.x, self.right()),
            Axis4::Vert => IntRange::new(self.y, self.bottom()),
        }
    }

    /// Scalar position of one side.
    ///
    /// `Up`/`Left` give the first row/column, `Down`/`Right` one past the last.
    pub const fn side(&self, dir: Dir4) -> i32 {
        match dir {
            Dir4::Up => self.top(),
            Dir4::Down => self.bottom(),
            Dir4::Left => self.left(),
            Dir4::Right => self.right(),
        }
    }

    /// Cells spanned by the side facing `dir` (the cross-axis span)
    pub const fn side_range(&self, dir: Dir4) -> IntRange {
        self.range(dir.axis().orth())
    }

    /// Length of the side facing `dir`
    pub const fn side_len(&self, dir: Dir4) -> i32 {
        self.side_range(dir).len()
    }

    pub const fn contains_loc(&self, loc: Loc) -> bool {
        loc.x >= self.x && loc.x < self.right() && loc.y >= self.y && loc.y < self.bottom()
    }

    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// True if the rects share at least one cell
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(Rect::new(
            x,
            y,
            self.right().min(other.right()) - x,
            self.bottom().min(other.bottom()) - y,
        ))
    }

    /// Grow to cover `loc`
    pub fn include_loc(self, loc: Loc) -> Rect {
        let x = self.x.min(loc.x);
        let y = self.y.min(loc.y);
        let r = self.right().max(loc.x + 1);
        let b = self.bottom().max(loc.y + 1);
        Rect::new(x, y, r - x, b - y)
    }

    /// Grow to cover `other`
    pub fn include_rect(self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Rect::new(x, y, r - x, b - y)
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom
    pub const fn inflate(self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x - dx, self.y - dy, self.w + dx * 2, self.h + dy * 2)
    }

    /// The strip of `thickness` cells just outside the side facing `dir`
    pub const fn outer_strip(&self, dir: Dir4, thickness: i32) -> Rect {
        match dir {
            Dir4::Down => Rect::new(self.x, self.bottom(), self.w, thickness),
            Dir4::Up => Rect::new(self.x, self.y - thickness, self.w, thickness),
            Dir4::Right => Rect::new(self.right(), self.y, thickness, self.h),
            Dir4::Left => Rect::new(self.x - thickness, self.y, thickness, self.h),
        }
    }

    /// Direction from `self` to `other` when their edges meet with
    /// overlapping spans, `None` otherwise
    pub fn touching_dir(&self, other: &Rect) -> Option<Dir4> {
        Dir4::ALL.into_iter().find(|&dir| {
            self.side(dir) == other.side(dir.reverse())
                && self.side_range(dir).overlaps(&other.side_range(dir))
        })
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{} {}x{}]", self.x, self.y, self.w, self.h)
    }
}
