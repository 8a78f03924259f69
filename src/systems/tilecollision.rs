//! Tile-grid collision adapter.
//!
//! [`trace`] computes how far a box can travel through a
//! [`TileRegion`](crate::resources::tileregion::TileRegion) before a blocking
//! tile face stops it, axis-separated with X resolved before Y. Clamping X
//! first and re-deriving the column span from the clamped position is what
//! keeps a body moving diagonally into a concave corner from clipping
//! through either face.
//!
//! [`resolve_tile_collisions`] re-derives each body's motion from
//! `previous_position`, applies the traced result and the bounce rule, and
//! emits [`TileCollision`] messages.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::body::Body;
use crate::events::contact::{Axis, TileCollision};
use crate::resources::config::PhysicsConfig;
use crate::resources::tileregion::TileRegion;

/// Outcome of a trace: the motion actually allowed plus contact flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceResult {
    pub dx: f32,
    pub dy: f32,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub blocked_up: bool,
    pub blocked_down: bool,
    /// Grid cell that stopped X motion.
    pub hit_x: Option<(i32, i32)>,
    /// Grid cell that stopped Y motion.
    pub hit_y: Option<(i32, i32)>,
}

impl TraceResult {
    pub fn blocked_x(&self) -> bool {
        self.blocked_left || self.blocked_right
    }

    pub fn blocked_y(&self) -> bool {
        self.blocked_up || self.blocked_down
    }
}

/// Trace a `width x height` box from `(x, y)` through the region by
/// `(dx, dy)`.
///
/// The sweep visits every tile column (then row) the leading edge would pass
/// through and clamps the motion so the edge lands exactly on the first
/// blocking face. Pre-existing penetration of a blocking face up to `bias`
/// is corrected by snapping back onto it; anything deeper is treated as
/// intentional placement and traced as free motion on that axis.
pub fn trace(
    region: &TileRegion,
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    width: f32,
    height: f32,
    bias: f32,
) -> TraceResult {
    let mut result = TraceResult {
        dx,
        dy,
        ..TraceResult::default()
    };

    sweep_x(region, x, y, width, height, bias, &mut result);
    let new_x = x + result.dx;
    sweep_y(region, new_x, y, width, height, bias, &mut result);

    result
}

/// Rows the box occupies at vertical position `y`. A bottom edge flush on a
/// cell boundary does not occupy the next row.
fn row_span(region: &TileRegion, y: f32, height: f32) -> (i32, i32) {
    let ts = region.tile_size;
    let min = (y / ts).floor() as i32;
    let max = ((y + height) / ts).ceil() as i32 - 1;
    (min.max(0), max.min(region.height as i32 - 1))
}

fn col_span(region: &TileRegion, x: f32, width: f32) -> (i32, i32) {
    let ts = region.tile_size;
    let min = (x / ts).floor() as i32;
    let max = ((x + width) / ts).ceil() as i32 - 1;
    (min.max(0), max.min(region.width as i32 - 1))
}

fn sweep_x(
    region: &TileRegion,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    bias: f32,
    result: &mut TraceResult,
) {
    let ts = region.tile_size;
    let dx = result.dx;
    if dx == 0.0 {
        return;
    }
    let (row_min, row_max) = row_span(region, y, height);
    if row_min > row_max {
        return;
    }

    let blocks = |col: i32, moving_right: bool| -> Option<i32> {
        for row in row_min..=row_max {
            let cell = region.cell(col, row);
            let hit = if moving_right {
                cell.collide_left
            } else {
                cell.collide_right
            };
            if hit {
                return Some(row);
            }
        }
        None
    };

    if dx > 0.0 {
        let lead = x + width;
        // Already past a left face? Snap back when shallow, ignore when deep.
        let inside = (lead / ts).floor() as i32;
        let penetration = lead - inside as f32 * ts;
        if penetration > 0.0 && penetration <= bias {
            if let Some(row) = blocks(inside, true) {
                result.dx = -penetration;
                result.blocked_right = true;
                result.hit_x = Some((inside, row));
                return;
            }
        } else if penetration > bias && blocks(inside, true).is_some() {
            log::debug!("body embedded {penetration}px past tile face, not corrected");
            return;
        }

        let first = (lead / ts).ceil() as i32;
        let last = ((lead + dx) / ts).floor() as i32;
        let first = first.max(0);
        let last = last.min(region.width as i32 - 1);
        for col in first..=last {
            if let Some(row) = blocks(col, true) {
                result.dx = col as f32 * ts - lead;
                result.blocked_right = true;
                result.hit_x = Some((col, row));
                return;
            }
        }
    } else {
        let lead = x;
        let inside = (lead / ts).ceil() as i32 - 1;
        let face = (inside + 1) as f32 * ts;
        let penetration = face - lead;
        if penetration > 0.0 && penetration <= bias {
            if let Some(row) = blocks(inside, false) {
                result.dx = penetration;
                result.blocked_left = true;
                result.hit_x = Some((inside, row));
                return;
            }
        } else if penetration > bias && blocks(inside, false).is_some() {
            log::debug!("body embedded {penetration}px past tile face, not corrected");
            return;
        }

        let first = (lead / ts).ceil() as i32 - 1;
        let last = ((lead + dx) / ts).floor() as i32;
        let first = first.min(region.width as i32 - 1);
        let last = last.max(0);
        for col in (last..=first).rev() {
            if let Some(row) = blocks(col, false) {
                result.dx = (col + 1) as f32 * ts - lead;
                result.blocked_left = true;
                result.hit_x = Some((col, row));
                return;
            }
        }
    }
}

fn sweep_y(
    region: &TileRegion,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    bias: f32,
    result: &mut TraceResult,
) {
    let ts = region.tile_size;
    let dy = result.dy;
    if dy == 0.0 {
        return;
    }
    let (col_min, col_max) = col_span(region, x, width);
    if col_min > col_max {
        return;
    }

    let blocks = |row: i32, moving_down: bool| -> Option<i32> {
        for col in col_min..=col_max {
            let cell = region.cell(col, row);
            let hit = if moving_down {
                cell.collide_up
            } else {
                cell.collide_down
            };
            if hit {
                return Some(col);
            }
        }
        None
    };

    if dy > 0.0 {
        let lead = y + height;
        let inside = (lead / ts).floor() as i32;
        let penetration = lead - inside as f32 * ts;
        if penetration > 0.0 && penetration <= bias {
            if let Some(col) = blocks(inside, true) {
                result.dy = -penetration;
                result.blocked_down = true;
                result.hit_y = Some((col, inside));
                return;
            }
        } else if penetration > bias && blocks(inside, true).is_some() {
            log::debug!("body embedded {penetration}px past tile face, not corrected");
            return;
        }

        let first = ((lead / ts).ceil() as i32).max(0);
        let last = (((lead + dy) / ts).floor() as i32).min(region.height as i32 - 1);
        for row in first..=last {
            if let Some(col) = blocks(row, true) {
                result.dy = row as f32 * ts - lead;
                result.blocked_down = true;
                result.hit_y = Some((col, row));
                return;
            }
        }
    } else {
        let lead = y;
        let inside = (lead / ts).ceil() as i32 - 1;
        let face = (inside + 1) as f32 * ts;
        let penetration = face - lead;
        if penetration > 0.0 && penetration <= bias {
            if let Some(col) = blocks(inside, false) {
                result.dy = penetration;
                result.blocked_up = true;
                result.hit_y = Some((col, inside));
                return;
            }
        } else if penetration > bias && blocks(inside, false).is_some() {
            log::debug!("body embedded {penetration}px past tile face, not corrected");
            return;
        }

        let first = ((lead / ts).ceil() as i32 - 1).min(region.height as i32 - 1);
        let last = (((lead + dy) / ts).floor() as i32).max(0);
        for row in (last..=first).rev() {
            if let Some(col) = blocks(row, false) {
                result.dy = (row + 1) as f32 * ts - lead;
                result.blocked_up = true;
                result.hit_y = Some((col, row));
                return;
            }
        }
    }
}

/// Apply the tile region to every enabled movable body.
///
/// Bodies with an empty `collides` mask pass through tiles. The motion
/// vector is re-derived from `previous_position`, so this runs after
/// integration and before pair resolution.
pub fn resolve_tile_collisions(
    region: Option<Res<TileRegion>>,
    config: Res<PhysicsConfig>,
    mut query: Query<&mut Body>,
    mut writer: MessageWriter<TileCollision>,
) {
    let Some(region) = region else {
        return;
    };
    for mut body in query.iter_mut() {
        if !body.enabled || body.immovable || body.collides == 0 {
            continue;
        }
        let start = body.previous_position;
        let motion = body.delta_position();
        if motion == Vec2::ZERO {
            continue;
        }
        let result = trace(
            &region,
            start.x,
            start.y,
            motion.x,
            motion.y,
            body.size.x,
            body.size.y,
            config.tile_bias,
        );

        body.position = start + Vec2::new(result.dx, result.dy);

        if result.blocked_x() {
            if result.blocked_left {
                body.blocked.set_left();
            } else {
                body.blocked.set_right();
            }
            body.velocity.x = if body.bounce.x == 0.0 {
                0.0
            } else {
                -body.velocity.x * body.bounce.x
            };
            if let Some((tile_x, tile_y)) = result.hit_x {
                writer.write(TileCollision {
                    body: body.id,
                    tile_x: tile_x.max(0) as u32,
                    tile_y: tile_y.max(0) as u32,
                    axis: Axis::X,
                });
            }
        }
        if result.blocked_y() {
            if result.blocked_up {
                body.blocked.set_up();
            } else {
                body.blocked.set_down();
            }
            body.velocity.y = if body.bounce.y == 0.0 {
                0.0
            } else {
                -body.velocity.y * body.bounce.y
            };
            if let Some((tile_x, tile_y)) = result.hit_y {
                writer.write(TileCollision {
                    body: body.id,
                    tile_x: tile_x.max(0) as u32,
                    tile_y: tile_y.max(0) as u32,
                    axis: Axis::Y,
                });
            }
        }
    }
}
