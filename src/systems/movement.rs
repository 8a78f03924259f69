//! Integration system.
//!
//! Advances every enabled body by the current substep delta under the world
//! gravity from [`PhysicsConfig`](crate::resources::config::PhysicsConfig).
//! The per-body rules (gravity scaling, acceleration vs drag, velocity
//! clamp) live on [`Body::integrate`](crate::components::body::Body::integrate).

use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::resources::config::PhysicsConfig;
use crate::resources::worldtime::WorldTime;

/// Integrate all enabled bodies for the current substep.
///
/// Runs first in the step schedule; disabled bodies are skipped entirely and
/// keep their previous state, including stale `previous_position`.
pub fn integrate_bodies(
    mut query: Query<&mut Body>,
    config: Res<PhysicsConfig>,
    time: Res<WorldTime>,
) {
    let delta = time.delta;
    if delta <= 0.0 {
        return;
    }
    let gravity = config.gravity;
    for mut body in query.iter_mut() {
        if !body.enabled {
            continue;
        }
        body.integrate(gravity, delta);
    }
}
