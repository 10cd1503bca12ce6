//! Shape templates
//!
//! A `ShapeKind` is the serializable description of a shape: its size
//! ranges and proportions. Everything that depends on the final size lives in
//! the owning [`RoomGen`](super::RoomGen).

use fg_rng::LayoutRng;
use serde::{Deserialize, Serialize};

use crate::geom::{Dir4, IntRange, Loc, RandRange};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Filled rectangle
    Square { width: RandRange, height: RandRange },
    /// Rectangle with its corners cut diagonally
    Round { width: RandRange, height: RandRange },
    /// A vertical bar crossed by a horizontal bar
    Cross {
        width: RandRange,
        height: RandRange,
        vert_thickness: RandRange,
        horiz_thickness: RandRange,
    },
    /// Hall that bends to join its openings through the middle
    AngledHall { width: RandRange, height: RandRange },
    /// Plain filled hall, proposed as a single tile
    Single,
}

/// Bars of a cross chosen at prepare time, relative to the draw origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct CrossBars {
    /// Columns of the vertical bar
    pub vert: IntRange,
    /// Rows of the horizontal bar
    pub horiz: IntRange,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Square { .. } => "square",
            ShapeKind::Round { .. } => "round",
            ShapeKind::Cross { .. } => "cross",
            ShapeKind::AngledHall { .. } => "angled_hall",
            ShapeKind::Single => "single",
        }
    }

    /// Hall-like shapes may chain and overlap with other halls
    pub fn is_permissive(&self) -> bool {
        matches!(self, ShapeKind::AngledHall { .. } | ShapeKind::Single)
    }

    /// Draws width then height, except `Single` which never draws
    pub(crate) fn propose_size(&self, rng: &mut dyn LayoutRng) -> Loc {
        match self {
            ShapeKind::Square { width, height }
            | ShapeKind::Round { width, height }
            | ShapeKind::Cross { width, height, .. }
            | ShapeKind::AngledHall { width, height } => {
                let w = width.pick(rng);
                let h = height.pick(rng);
                Loc::new(w.max(1), h.max(1))
            }
            ShapeKind::Single => Loc::splat(1),
        }
    }

    /// Only `Cross` consumes draws here: thicknesses, then bar offsets
    pub(crate) fn prepare_bars(&self, rng: &mut dyn LayoutRng, size: Loc) -> Option<CrossBars> {
        let ShapeKind::Cross {
            vert_thickness,
            horiz_thickness,
            ..
        } = self
        else {
            return None;
        };
        let vw = vert_thickness.pick(rng).clamp(1, size.x);
        let hh = horiz_thickness.pick(rng).clamp(1, size.y);
        let vx = rng.next_max(size.x - vw + 1);
        let hy = rng.next_max(size.y - hh + 1);
        Some(CrossBars {
            vert: IntRange::new(vx, vx + vw),
            horiz: IntRange::new(hy, hy + hh),
        })
    }

    /// Corner cut of a round shape of `size`
    pub(crate) fn round_cut(size: Loc) -> i32 {
        (size.x.min(size.y) - 1) / 2
    }

    /// Which cells of the side facing `dir` may open, for a shape of `size`
    pub(crate) fn fulfillable_side(&self, size: Loc, dir: Dir4, bars: Option<CrossBars>) -> Vec<bool> {
        let len = match dir.axis() {
            crate::geom::Axis4::Vert => size.x,
            crate::geom::Axis4::Horiz => size.y,
        }
        .max(0) as usize;
        match self {
            ShapeKind::Round { .. } => {
                let cut = Self::round_cut(size) as usize;
                (0..len).map(|i| i >= cut && i + cut < len).collect()
            }
            ShapeKind::Cross { .. } => {
                let bars = bars.unwrap_or_default();
                let open = match dir.axis() {
                    crate::geom::Axis4::Vert => bars.vert,
                    crate::geom::Axis4::Horiz => bars.horiz,
                };
                (0..len).map(|i| open.contains(i as i32)).collect()
            }
            _ => vec![true; len],
        }
    }

    /// Whether the body covers the cell at `rel` (relative to the draw origin)
    pub(crate) fn covers(&self, size: Loc, rel: Loc, bars: Option<CrossBars>) -> bool {
        match self {
            ShapeKind::Square { .. } | ShapeKind::Single => true,
            ShapeKind::Round { .. } => {
                let cut = Self::round_cut(size);
                let dx = edge_overshoot(rel.x, size.x, cut);
                let dy = edge_overshoot(rel.y, size.y, cut);
                dx + dy <= cut
            }
            ShapeKind::Cross { .. } => {
                let bars = bars.unwrap_or_default();
                bars.vert.contains(rel.x) || bars.horiz.contains(rel.y)
            }
            // halls only cover the paths between their openings
            ShapeKind::AngledHall { .. } => false,
        }
    }
}

/// How far into the cut band `v` lies, measured from the inner edge
fn edge_overshoot(v: i32, len: i32, cut: i32) -> i32 {
    if v < cut {
        cut - v
    } else if v >= len - cut {
        v - (len - cut - 1)
    } else {
        0
    }
}
