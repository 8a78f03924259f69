//! World-bounds clamping system.
//!
//! Keeps opted-in bodies inside the configured bounds rectangle. Each edge
//! can be disabled independently via `check_collision`, and contacts reflect
//! velocity by the body's bounce exactly like a tile face.

use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::events::contact::{Edge, WorldEdgeContact};
use crate::resources::config::PhysicsConfig;

/// Clamp bodies with `collide_world_bounds` to the world rectangle.
pub fn clamp_world_bounds(
    config: Res<PhysicsConfig>,
    mut query: Query<&mut Body>,
    mut writer: MessageWriter<WorldEdgeContact>,
) {
    let Some(bounds) = config.bounds else {
        return;
    };
    let check = config.check_collision;

    for mut body in query.iter_mut() {
        if !body.enabled || !body.collide_world_bounds || body.immovable {
            continue;
        }

        if check.left && body.position.x < bounds.x {
            body.position.x = bounds.x;
            body.velocity.x = if body.bounce.x == 0.0 {
                0.0
            } else {
                -body.velocity.x * body.bounce.x
            };
            body.blocked.set_left();
            writer.write(WorldEdgeContact {
                body: body.id,
                edge: Edge::Left,
            });
        } else if check.right && body.position.x + body.size.x > bounds.right() {
            body.position.x = bounds.right() - body.size.x;
            body.velocity.x = if body.bounce.x == 0.0 {
                0.0
            } else {
                -body.velocity.x * body.bounce.x
            };
            body.blocked.set_right();
            writer.write(WorldEdgeContact {
                body: body.id,
                edge: Edge::Right,
            });
        }

        if check.up && body.position.y < bounds.y {
            body.position.y = bounds.y;
            body.velocity.y = if body.bounce.y == 0.0 {
                0.0
            } else {
                -body.velocity.y * body.bounce.y
            };
            body.blocked.set_up();
            writer.write(WorldEdgeContact {
                body: body.id,
                edge: Edge::Up,
            });
        } else if check.down && body.position.y + body.size.y > bounds.bottom() {
            body.position.y = bounds.bottom() - body.size.y;
            body.velocity.y = if body.bounce.y == 0.0 {
                0.0
            } else {
                -body.velocity.y * body.bounce.y
            };
            body.blocked.set_down();
            writer.write(WorldEdgeContact {
                body: body.id,
                edge: Edge::Down,
            });
        }
    }
}
