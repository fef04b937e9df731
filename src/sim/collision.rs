//! Collision detection and response for tile geometry
//!
//! Motion is resolved one axis at a time (horizontal, then vertical). Each
//! pass moves the body along the axis, refreshes its grid cells, gathers the
//! static entities sharing those cells and pushes the body back out of the
//! first one it overlaps. Only that first contact is corrected; simultaneous
//! contact with several platforms on one axis is not fully resolved.

use std::collections::BTreeMap;

use glam::Vec2;

use super::entity::{Body, EntityId, Motion, StaticEntity};
use super::grid::{CellCoord, SpatialGrid};
use super::rect::{Axis, Rect};
use crate::sign;

/// A resolved contact on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisContact {
    /// Static entity that was hit
    pub other: EntityId,
    pub axis: Axis,
    /// Travel direction along the axis (-1, 0 or 1)
    pub direction: f32,
    /// Amount subtracted from the position on `axis`
    pub correction: f32,
}

/// Translation that makes `moving` edge-adjacent to `fixed` along `axis`,
/// given the direction of travel. Subtract it from the moving position.
#[inline]
pub fn separation(moving: &Rect, fixed: &Rect, axis: Axis, direction: f32) -> f32 {
    0.5 * direction * (axis.of(moving.size) + axis.of(fixed.size))
        - (axis.of(fixed.center()) - axis.of(moving.center()))
}

/// First static candidate (in grid order) whose rectangle overlaps `rect`
pub fn first_overlapping<'a>(
    rect: &Rect,
    candidates: &[EntityId],
    solids: &'a BTreeMap<EntityId, StaticEntity>,
) -> Option<&'a StaticEntity> {
    candidates
        .iter()
        .filter_map(|id| solids.get(id))
        .find(|solid| solid.body.rect().overlaps(rect))
}

/// Apply one axis of `motion.vel` to `body` and resolve against static geometry.
///
/// A body that overlaps something without moving on this axis was already
/// penetrating; it is left where it is.
pub fn move_and_collide(
    id: EntityId,
    body: &mut Body,
    motion: &mut Motion,
    axis: Axis,
    grid: &mut SpatialGrid,
    solids: &BTreeMap<EntityId, StaticEntity>,
) -> Option<AxisContact> {
    let step = axis.of(motion.vel);
    *axis.of_mut(&mut body.pos) += step;

    // Membership must reflect the tentative position before gathering candidates
    motion.refresh_cells(id, &body.rect(), grid);
    let rect = body.rect();
    let candidates = grid.candidates(&motion.cells);
    let hit = first_overlapping(&rect, &candidates, solids)?;

    let direction = sign(step);
    let correction = if direction == 0.0 {
        0.0
    } else {
        separation(&rect, &hit.body.rect(), axis, direction)
    };

    if correction != 0.0 {
        *axis.of_mut(&mut body.pos) -= correction;
        motion.refresh_cells(id, &body.rect(), grid);
    }

    log::debug!(
        "{:?} hit {:?} on {:?} in [{}] (dir {}, corrected {})",
        id,
        hit.id,
        axis,
        cell_labels(&motion.cells),
        direction,
        correction
    );

    Some(AxisContact {
        other: hit.id,
        axis,
        direction,
        correction,
    })
}

/// Comma-separated `A1` labels for a list of cells
pub fn cell_labels(cells: &[CellCoord]) -> String {
    cells
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Which axes were pushed back at the map edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryReflection {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Keep a body inside the one-tile border without putting border tiles in the grid.
///
/// A body touching or crossing the border on an axis has that axis' velocity
/// taken back out of its position. Call once per frame, after resolution.
pub fn reflect_at_boundary(body: &mut Body, vel: Vec2, map_size: Vec2, tile_size: f32) -> BoundaryReflection {
    let rect = body.rect();
    let mut reflection = BoundaryReflection::default();

    if rect.left() <= tile_size || rect.right() >= map_size.x - tile_size {
        body.pos.x -= vel.x;
        reflection.horizontal = true;
    }
    if rect.top() <= tile_size || rect.bottom() >= map_size.y - tile_size {
        body.pos.y -= vel.y;
        reflection.vertical = true;
    }

    reflection
}

/// Index of the first rectangle overlapping `rect` once both are shrunk by `ratio`
pub fn first_contact<I>(rect: &Rect, ratio: f32, others: I) -> Option<usize>
where
    I: IntoIterator<Item = Rect>,
{
    others
        .into_iter()
        .position(|other| rect.overlaps_scaled(&other, ratio))
}
