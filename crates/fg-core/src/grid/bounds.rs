//! Turning cell-space rooms and halls into tile geometry

use fg_rng::LayoutRng;

use super::GridPlan;
use crate::error::{LayoutError, Result};
use crate::floor::NodeRef;
use crate::geom::{Dir4, IntRange, Loc, Rect};
use crate::room_gen::RoomGen;

impl GridPlan {
    /// Size and place room `index` somewhere inside its cells.
    ///
    /// Draws the shape's size proposal, any prepare draws, then the x and y
    /// offsets within the leftover slack.
    pub fn choose_room_bounds(&mut self, rng: &mut dyn LayoutRng, index: usize) -> Result<()> {
        let bounds = self
            .rooms
            .get(index)
            .map(|r| r.bounds)
            .ok_or(LayoutError::MissingNode(NodeRef::room(index)))?;
        let area = self.cell_rect(bounds);
        let room = &mut self.rooms[index];

        let proposed = room.shape.propose_size(rng);
        let size = Loc::new(proposed.x.min(area.w), proposed.y.min(area.h));
        room.shape.prepare_size(rng, size);
        let size = room.shape.draw_rect().size();

        let ox = rng.next_max(area.w - size.x + 1);
        let oy = rng.next_max(area.h - size.y + 1);
        room.shape.set_loc(area.start() + Loc::new(ox, oy));
        Ok(())
    }

    /// Lay out the hall below (`vertical`) or right of `cell`.
    ///
    /// Both rooms must already have bounds. The hall runs from the start
    /// room's edge to the end room's edge inside the cell tier. When either
    /// room can only be reached from outside the tier the hall is split at
    /// the wall gap into two segments, each widened to reach its own room.
    /// The split moves to the near or far side of the gap so that a room
    /// outside the tier always keeps a segment of its own.
    pub fn choose_hall_bounds(
        &mut self,
        rng: &mut dyn LayoutRng,
        cell: Loc,
        vertical: bool,
    ) -> Result<()> {
        let dir = if vertical { Dir4::Down } else { Dir4::Right };
        let hall = self
            .edge(cell, dir)
            .ok_or(LayoutError::InvalidDirection { loc: cell })?
            .hall
            .clone();
        let Some(hall) = hall else {
            return Ok(());
        };
        let end_cell = cell + dir.to_loc();
        let start = self.room_at(cell).ok_or(LayoutError::NoRoomAtCell(cell))?;
        let end = self
            .room_at(end_cell)
            .ok_or(LayoutError::NoRoomAtCell(end_cell))?;

        let axis = dir.axis();
        let cell_px = self.cell_rect(Rect::from_loc_size(cell, Loc::splat(1)));
        let tier = cell_px.range(axis.orth());
        let start_shape = &self.rooms[start].shape;
        let end_shape = &self.rooms[end].shape;
        let start_range = touch_range(start_shape, dir, tier);
        let end_range = touch_range(end_shape, dir.reverse(), tier);
        let start_edge = start_shape.draw_rect().side(dir);
        let end_edge = end_shape.draw_rect().side(dir.reverse());

        let start_inside = tier.contains_range(&start_range);
        let end_inside = tier.contains_range(&end_range);
        let mut rects = Vec::with_capacity(2);
        if start_inside && end_inside {
            rects.push(Rect::from_axis_ranges(
                axis,
                IntRange::new(start_edge, end_edge),
                start_range.hull(&end_range),
            ));
        } else {
            let gap_min = cell_px.side(dir);
            let gap_max = gap_min + self.wall;
            let split = if start_inside || !end_inside { gap_max } else { gap_min };
            // an outside room needs a non-empty segment of its own to reach it
            let split = if !end_inside && split >= end_edge {
                gap_min
            } else if !start_inside && split <= start_edge {
                gap_max
            } else {
                split
            };
            let start_seg = IntRange::new(start_edge, split);
            let end_seg = IntRange::new(split, end_edge);
            if (!start_inside && start_seg.is_empty()) || (!end_inside && end_seg.is_empty()) {
                rects.push(Rect::from_axis_ranges(
                    axis,
                    IntRange::new(start_edge, end_edge),
                    start_range.hull(&end_range).hull(&tier),
                ));
            } else {
                rects.push(Rect::from_axis_ranges(axis, start_seg, start_range.hull(&tier)));
                rects.push(Rect::from_axis_ranges(axis, end_seg, end_range.hull(&tier)));
            }
        }
        rects.retain(Rect::is_valid);

        let mut segments = Vec::with_capacity(rects.len());
        for rect in rects {
            let mut segment = hall.room_gen().clone();
            segment.prepare_size(rng, rect.size());
            segment.set_loc(rect.start());
            segments.push(segment);
        }
        if segments.len() > 1 {
            log::trace!("split hall at {cell} ({dir}) into {} segments", segments.len());
        }
        if let Some(group) = self.edge_mut(cell, dir) {
            group.segments = segments;
        }
        Ok(())
    }
}

/// Span of `shape`'s side `dir` a hall inside `tier` can connect to.
///
/// Fulfillable cells inside the tier if there are any; otherwise the one
/// cell nearest the tier, fulfillable cells first.
fn touch_range(shape: &RoomGen, dir: Dir4, tier: IntRange) -> IntRange {
    let side = shape.draw_rect().side_range(dir);
    let open: Vec<i32> = (0..shape.border_len(dir))
        .filter(|i| shape.is_fulfillable(dir, *i))
        .map(|i| side.min + i as i32)
        .collect();

    let mut inside = open.iter().filter(|c| tier.contains(**c));
    if let Some(&first) = inside.next() {
        let last = inside.last().copied().unwrap_or(first);
        return IntRange::new(first, last + 1);
    }

    let pool: Vec<i32> = if open.is_empty() {
        (side.min..side.max).collect()
    } else {
        open
    };
    let nearest = pool
        .into_iter()
        .min_by_key(|c| tier.distance_to(*c))
        .unwrap_or(side.min);
    IntRange::single(nearest)
}
