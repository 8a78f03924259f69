//! Narrow-phase collision resolution between body pairs.
//!
//! [`separate`] is the physical path: it computes the per-axis overlap,
//! applies the tunneling guard, displaces the bodies on the axis of least
//! overlap and updates their velocities. [`overlap_only`] is the
//! trigger-style path: a pure intersection test with no displacement.
//!
//! The [`resolve_body_collisions`] system drives both over the broad-phase
//! candidates, walking bodies in ascending id order so simultaneous contacts
//! resolve in a deterministic order, and emits the contact messages drained
//! by the world facade.

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;
use glam::Vec2;

use crate::components::body::{Body, BodyId, Shape};
use crate::events::contact::{Axis, BodyCollision, BodyOverlap};
use crate::resources::config::PhysicsConfig;
use crate::resources::spatialtree::{AabbTree, TreeEntry};

/// Mask test for physical collision: both bodies must list the other's
/// category.
pub fn can_collide(a: &Body, b: &Body) -> bool {
    (a.collides & b.category) != 0 && (b.collides & a.category) != 0
}

/// Mask test for trigger-style overlap checks, either direction.
pub fn wants_check(a: &Body, b: &Body) -> bool {
    (a.check_against & b.category) != 0 || (b.check_against & a.category) != 0
}

/// Exact intersection test honoring both bodies' shapes. Never mutates.
pub fn overlap_only(a: &Body, b: &Body) -> bool {
    match (a.shape, b.shape) {
        (Shape::Box, Shape::Box) => a.overlaps(b),
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            let r = ra + rb;
            a.center().distance_squared(b.center()) < r * r
        }
        (Shape::Circle { radius }, Shape::Box) => circle_box_overlaps(a.center(), radius, b),
        (Shape::Box, Shape::Circle { radius }) => circle_box_overlaps(b.center(), radius, a),
    }
}

fn circle_box_overlaps(center: Vec2, radius: f32, boxy: &Body) -> bool {
    let (min, max) = boxy.bounds();
    let closest = center.clamp(min, max);
    center.distance_squared(closest) < radius * radius
}

/// Separate two intersecting bodies.
///
/// Returns the resolution axis when the bodies intersected (immovable pairs
/// included: they are detected but never displaced), or `None` when they do
/// not intersect or the overlap exceeded the credible maximum for this step
/// (`bias` plus both bodies' motion) and was left for the next step.
pub fn separate(a: &mut Body, b: &mut Body, bias: f32) -> Option<Axis> {
    match (a.shape, b.shape) {
        (Shape::Box, Shape::Box) => separate_box(a, b, bias),
        _ => separate_circle(a, b, bias),
    }
}

fn separate_box(a: &mut Body, b: &mut Body, bias: f32) -> Option<Axis> {
    let (min_a, max_a) = a.bounds();
    let (min_b, max_b) = b.bounds();

    let mut overlap_x = (max_a.x.min(max_b.x)) - (min_a.x.max(min_b.x));
    let mut overlap_y = (max_a.y.min(max_b.y)) - (min_a.y.max(min_b.y));
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }

    // An overlap deeper than both bodies could have produced this step is a
    // tunneling artifact; zero it so the other axis (or a later step) wins.
    let max_x = a.delta_position().x.abs() + b.delta_position().x.abs() + bias;
    let max_y = a.delta_position().y.abs() + b.delta_position().y.abs() + bias;
    if overlap_x > max_x {
        overlap_x = 0.0;
    }
    if overlap_y > max_y {
        overlap_y = 0.0;
    }
    if overlap_x == 0.0 && overlap_y == 0.0 {
        return None;
    }

    // Least overlap wins; ties and guarded axes fall back to X.
    let axis = if overlap_y == 0.0 {
        Axis::X
    } else if overlap_x == 0.0 {
        Axis::Y
    } else if overlap_x <= overlap_y {
        Axis::X
    } else {
        Axis::Y
    };

    match axis {
        Axis::X => {
            let a_on_left = a.center().x < b.center().x;
            apply_axis_separation(a, b, Axis::X, overlap_x, a_on_left);
        }
        Axis::Y => {
            let a_on_top = a.center().y < b.center().y;
            apply_axis_separation(a, b, Axis::Y, overlap_y, a_on_top);
        }
    }
    Some(axis)
}

/// Displace and update velocities on one axis. `a_first` is true when `a` is
/// on the negative side (left of / above `b`).
fn apply_axis_separation(a: &mut Body, b: &mut Body, axis: Axis, overlap: f32, a_first: bool) {
    let sign = if a_first { 1.0 } else { -1.0 };

    match (a.immovable, b.immovable) {
        (true, true) => {}
        (true, false) => {
            shift(b, axis, sign * overlap);
            bounce_off_wall(b, axis);
        }
        (false, true) => {
            shift(a, axis, -sign * overlap);
            bounce_off_wall(a, axis);
        }
        (false, false) => {
            shift(a, axis, -sign * overlap * 0.5);
            shift(b, axis, sign * overlap * 0.5);
            exchange_velocity(a, b, axis);
        }
    }

    // Contact flags face the other body.
    match axis {
        Axis::X => {
            if a_first {
                a.blocked.set_right();
                b.blocked.set_left();
            } else {
                a.blocked.set_left();
                b.blocked.set_right();
            }
        }
        Axis::Y => {
            if a_first {
                a.blocked.set_down();
                b.blocked.set_up();
            } else {
                a.blocked.set_up();
                b.blocked.set_down();
            }
        }
    }
}

fn shift(body: &mut Body, axis: Axis, amount: f32) {
    match axis {
        Axis::X => body.position.x += amount,
        Axis::Y => body.position.y += amount,
    }
}

/// Velocity rule against an immovable body: dead stop, or reflect scaled by
/// the body's own bounce.
fn bounce_off_wall(body: &mut Body, axis: Axis) {
    match axis {
        Axis::X => {
            body.velocity.x = if body.bounce.x == 0.0 {
                0.0
            } else {
                -body.velocity.x * body.bounce.x
            };
        }
        Axis::Y => {
            body.velocity.y = if body.bounce.y == 0.0 {
                0.0
            } else {
                -body.velocity.y * body.bounce.y
            };
        }
    }
}

/// Mass-weighted velocity exchange between two movable bodies on one axis.
fn exchange_velocity(a: &mut Body, b: &mut Body, axis: Axis) {
    let (va, vb, ea, eb) = match axis {
        Axis::X => (a.velocity.x, b.velocity.x, a.bounce.x, b.bounce.x),
        Axis::Y => (a.velocity.y, b.velocity.y, a.bounce.y, b.bounce.y),
    };
    let (na, nb) = exchanged_components(va, a.mass, ea, vb, b.mass, eb);
    match axis {
        Axis::X => {
            a.velocity.x = na;
            b.velocity.x = nb;
        }
        Axis::Y => {
            a.velocity.y = na;
            b.velocity.y = nb;
        }
    }
}

/// The 1D exchange: each body takes the mass-scaled speed of the other,
/// recentered on the pair average, then applies its own restitution.
fn exchanged_components(v1: f32, m1: f32, e1: f32, v2: f32, m2: f32, e2: f32) -> (f32, f32) {
    let sign2 = if v2 < 0.0 { -1.0 } else { 1.0 };
    let sign1 = if v1 < 0.0 { -1.0 } else { 1.0 };
    let nv1 = ((v2 * v2 * m2) / m1).sqrt() * sign2;
    let nv2 = ((v1 * v1 * m1) / m2).sqrt() * sign1;
    let avg = (nv1 + nv2) * 0.5;
    (avg + (nv1 - avg) * e1, avg + (nv2 - avg) * e2)
}

fn separate_circle(a: &mut Body, b: &mut Body, bias: f32) -> Option<Axis> {
    let (normal, overlap) = match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            let diff = b.center() - a.center();
            let dist = diff.length();
            let r = ra + rb;
            if dist >= r {
                return None;
            }
            if dist == 0.0 {
                // Coincident centers: push apart on X, deterministically.
                (Vec2::X, r)
            } else {
                (diff / dist, r - dist)
            }
        }
        (Shape::Circle { radius }, Shape::Box) => {
            let (min, max) = b.bounds();
            let closest = a.center().clamp(min, max);
            let diff = closest - a.center();
            let dist = diff.length();
            if dist >= radius {
                return None;
            }
            if dist == 0.0 {
                // Center inside the box; the axis-aligned path is stable here.
                return separate_box(a, b, bias);
            }
            (diff / dist, radius - dist)
        }
        (Shape::Box, Shape::Circle { radius }) => {
            let (min, max) = a.bounds();
            let closest = b.center().clamp(min, max);
            let diff = b.center() - closest;
            let dist = diff.length();
            if dist >= radius {
                return None;
            }
            if dist == 0.0 {
                return separate_box(a, b, bias);
            }
            (diff / dist, radius - dist)
        }
        // Box pairs are routed to separate_box by the caller.
        (Shape::Box, Shape::Box) => return separate_box(a, b, bias),
    };

    // Displacement along the center normal, same immovable split as boxes.
    match (a.immovable, b.immovable) {
        (true, true) => {}
        (true, false) => {
            b.position += normal * overlap;
            reflect_about_normal(b, normal);
        }
        (false, true) => {
            a.position -= normal * overlap;
            reflect_about_normal(a, normal);
        }
        (false, false) => {
            a.position -= normal * overlap * 0.5;
            b.position += normal * overlap * 0.5;
            let un_a = a.velocity.dot(normal);
            let un_b = b.velocity.dot(normal);
            let ea = dominant_bounce(a, normal);
            let eb = dominant_bounce(b, normal);
            let (na, nb) = exchanged_components(un_a, a.mass, ea, un_b, b.mass, eb);
            a.velocity += normal * (na - un_a);
            b.velocity += normal * (nb - un_b);
        }
    }

    let axis = if normal.x.abs() >= normal.y.abs() {
        Axis::X
    } else {
        Axis::Y
    };
    match axis {
        Axis::X => {
            if normal.x > 0.0 {
                a.blocked.set_right();
                b.blocked.set_left();
            } else {
                a.blocked.set_left();
                b.blocked.set_right();
            }
        }
        Axis::Y => {
            if normal.y > 0.0 {
                a.blocked.set_down();
                b.blocked.set_up();
            } else {
                a.blocked.set_up();
                b.blocked.set_down();
            }
        }
    }
    Some(axis)
}

/// Remove (or reflect, when bouncy) the velocity component along the contact
/// normal. The restitution comes from the bounce axis the normal leans on.
fn reflect_about_normal(body: &mut Body, normal: Vec2) {
    let e = dominant_bounce(body, normal);
    let vn = body.velocity.dot(normal);
    if e == 0.0 {
        body.velocity -= normal * vn;
    } else {
        body.velocity -= normal * (vn * (1.0 + e));
    }
}

fn dominant_bounce(body: &Body, normal: Vec2) -> f32 {
    if normal.x.abs() >= normal.y.abs() {
        body.bounce.x
    } else {
        body.bounce.y
    }
}

/// Resolve all candidate pairs for this substep.
///
/// Bodies are visited in ascending id order and each unordered pair is
/// processed once. Candidates come from the spatial tree, or from a
/// brute-force scan when `use_tree` is off; a candidate whose body was
/// removed mid-step by an observer callback is skipped silently.
pub fn resolve_body_collisions(world: &mut World) {
    let (overlap_bias, use_tree) = {
        let config = world.resource::<PhysicsConfig>();
        (config.overlap_bias, config.use_tree)
    };

    let mut bodies: Vec<(BodyId, Entity, u32, u32)> = {
        let mut query = world.query::<(Entity, &Body)>();
        query
            .iter(world)
            .filter(|(_, body)| body.enabled)
            .map(|(entity, body)| (body.id, entity, body.collides, body.check_against))
            .collect()
    };
    bodies.sort_unstable_by_key(|(id, ..)| *id);

    let mut collisions: Vec<BodyCollision> = Vec::new();
    let mut overlaps: Vec<BodyOverlap> = Vec::new();
    let mut scratch: Vec<TreeEntry> = Vec::new();

    for index in 0..bodies.len() {
        let (id_a, entity_a, collides_a, check_a) = bodies[index];
        if collides_a == 0 && check_a == 0 {
            continue;
        }

        // Candidate ids above ours; lower ids already considered this pair.
        let candidates: Vec<(BodyId, Entity)> = if use_tree {
            let Some(body_a) = world.get::<Body>(entity_a) else {
                continue;
            };
            let (min, max) = body_a.bounds();
            scratch.clear();
            world.resource::<AabbTree>().query(min, max, &mut scratch);
            scratch.sort_unstable_by_key(|entry| entry.id);
            scratch
                .iter()
                .filter(|entry| entry.id > id_a)
                .map(|entry| (entry.id, entry.entity))
                .collect()
        } else {
            bodies[index + 1..]
                .iter()
                .map(|(id, entity, ..)| (*id, *entity))
                .collect()
        };

        for (id_b, entity_b) in candidates {
            let Some(body_a) = world.get::<Body>(entity_a) else {
                break;
            };
            let Some(body_b) = world.get::<Body>(entity_b) else {
                continue;
            };
            if !body_b.enabled {
                continue;
            }

            let solid = can_collide(body_a, body_b);
            let check = wants_check(body_a, body_b);
            if !solid && !check {
                continue;
            }

            let mut a = body_a.clone();
            let mut b = body_b.clone();

            if solid {
                if let Some(axis) = separate(&mut a, &mut b, overlap_bias) {
                    collisions.push(BodyCollision {
                        a: id_a,
                        b: id_b,
                        axis,
                    });
                    if let Some(mut slot) = world.get_mut::<Body>(entity_a) {
                        *slot = a;
                    }
                    if let Some(mut slot) = world.get_mut::<Body>(entity_b) {
                        *slot = b;
                    }
                }
            } else if overlap_only(&a, &b) {
                overlaps.push(BodyOverlap { a: id_a, b: id_b });
            }
        }
    }

    let mut state: SystemState<(MessageWriter<BodyCollision>, MessageWriter<BodyOverlap>)> =
        SystemState::new(world);
    let (mut collision_writer, mut overlap_writer) = state.get_mut(world);
    collision_writer.write_batch(collisions);
    overlap_writer.write_batch(overlaps);
}
