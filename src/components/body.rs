//! Rigid body component for the arcade physics simulation.
//!
//! A [`Body`] owns the full kinematic state of one simulated entity:
//! position, velocity, acceleration, drag, bounce, gravity scaling, mass and
//! collision masks. The integration step advances this state; the collision
//! systems mutate it when contacts are resolved.
//!
//! Coordinate convention: `position` is the **top-left corner** of the body's
//! bounds, not its center. All bounds math in the engine relies on this.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique identifier of a body, assigned by the world on creation.
///
/// Ids increase monotonically and are never reused, so a stale id held by a
/// caller after `remove_body` can never alias a newer body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u64);

/// Collision shape of a body.
///
/// A circle's bounds are the enclosing square (`size = 2r x 2r`); the tile
/// adapter collides circles as that box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box,
    Circle { radius: f32 },
}

/// Contact flags from the last step.
///
/// Recomputed at the start of every integration, so they never carry stale
/// contact state across steps. `none` is true while no edge is touching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blocked {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub none: bool,
}

impl Default for Blocked {
    fn default() -> Self {
        Self {
            up: false,
            down: false,
            left: false,
            right: false,
            none: true,
        }
    }
}

impl Blocked {
    /// Reset all contact flags.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set_up(&mut self) {
        self.up = true;
        self.none = false;
    }

    pub fn set_down(&mut self) {
        self.down = true;
        self.none = false;
    }

    pub fn set_left(&mut self) {
        self.left = true;
        self.none = false;
    }

    pub fn set_right(&mut self) {
        self.right = true;
        self.none = false;
    }
}

/// Default velocity clamp, effectively "no limit" for arcade-scale speeds.
const DEFAULT_MAX_VELOCITY: f32 = 10_000.0;

/// Simulated rigid body.
///
/// # Fields
/// - `position` - top-left corner of the bounds, world units
/// - `previous_position` - position at the start of the current step
/// - `velocity` / `acceleration` / `drag` - world units per second (squared)
/// - `gravity_factor` - per-body multiplier on the world gravity
/// - `bounce` - restitution per axis, 0.0 (dead stop) to 1.0 (full reflect)
/// - `max_velocity` - per-axis velocity clamp applied after integration
/// - `mass` - relative weight used when two movable bodies exchange velocity
/// - `immovable` - never displaced and never slowed by collisions
/// - `category` / `collides` / `check_against` - collision mask bitfields
/// - `blocked` - contact flags from the last step
/// - `enabled` - disabled bodies are skipped by every system
///
/// # Example
/// ```ignore
/// let mut body = Body::new(BodyId(1), 0.0, 0.0, 32.0, 32.0);
/// body.velocity = Vec2::new(100.0, 0.0);
/// body.integrate(Vec2::ZERO, 1.0 / 60.0);
/// ```
#[derive(Component, Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub position: Vec2,
    pub previous_position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub drag: Vec2,
    pub gravity_factor: f32,
    pub bounce: Vec2,
    pub size: Vec2,
    /// Visual-to-physics alignment offset, owned by the caller. The engine
    /// stores it for snapshots but never applies it to bounds.
    pub offset: Vec2,
    pub max_velocity: Vec2,
    pub mass: f32,
    pub immovable: bool,
    pub category: u32,
    pub collides: u32,
    pub check_against: u32,
    pub blocked: Blocked,
    pub enabled: bool,
    pub shape: Shape,
    /// When true, the world clamps this body inside the configured bounds.
    pub collide_world_bounds: bool,
}

impl Body {
    /// Create a box body at `(x, y)` with the given size.
    ///
    /// Size validation happens in `PhysicsWorld::create_body`; this
    /// constructor trusts its inputs.
    pub fn new(id: BodyId, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
            previous_position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            drag: Vec2::ZERO,
            gravity_factor: 1.0,
            bounce: Vec2::ZERO,
            size: Vec2::new(width, height),
            offset: Vec2::ZERO,
            max_velocity: Vec2::splat(DEFAULT_MAX_VELOCITY),
            mass: 1.0,
            immovable: false,
            category: 1,
            collides: u32::MAX,
            check_against: 0,
            blocked: Blocked::default(),
            enabled: true,
            shape: Shape::Box,
            collide_world_bounds: false,
        }
    }

    /// Turn this body into a circle. Bounds become the enclosing square.
    pub fn set_circle(&mut self, radius: f32) {
        self.shape = Shape::Circle { radius };
        self.size = Vec2::splat(radius * 2.0);
    }

    pub fn is_circle(&self) -> bool {
        matches!(self.shape, Shape::Circle { .. })
    }

    /// Radius for circles, half the larger extent for boxes.
    pub fn radius(&self) -> f32 {
        match self.shape {
            Shape::Circle { radius } => radius,
            Shape::Box => self.size.x.max(self.size.y) * 0.5,
        }
    }

    /// (min, max) corners of the bounds at the current position.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.position, self.position + self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Motion applied during the current step so far.
    pub fn delta_position(&self) -> Vec2 {
        self.position - self.previous_position
    }

    /// AABB overlap test against another body's bounds.
    pub fn overlaps(&self, other: &Self) -> bool {
        let (min_a, max_a) = self.bounds();
        let (min_b, max_b) = other.bounds();
        min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
    }

    /// Advance the body by `delta` seconds under the given world gravity.
    ///
    /// Order: clear contact flags, remember the previous position, apply
    /// gravity, then per axis either acceleration or drag (never both),
    /// clamp to `max_velocity`, and finally move. `delta <= 0.0` leaves the
    /// body untouched.
    pub fn integrate(&mut self, gravity: Vec2, delta: f32) {
        if delta <= 0.0 {
            return;
        }
        self.blocked.clear();
        self.previous_position = self.position;

        self.velocity += gravity * self.gravity_factor * delta;

        self.velocity.x =
            integrate_axis(self.velocity.x, self.acceleration.x, self.drag.x, delta);
        self.velocity.y =
            integrate_axis(self.velocity.y, self.acceleration.y, self.drag.y, delta);

        self.velocity.x = self.velocity.x.clamp(-self.max_velocity.x, self.max_velocity.x);
        self.velocity.y = self.velocity.y.clamp(-self.max_velocity.y, self.max_velocity.y);

        self.position += self.velocity * delta;
    }

    /// Capture the persisted-relevant state of this body.
    ///
    /// Transient state (`blocked`, `previous_position`) is deliberately not
    /// part of the snapshot; a restored body behaves identically from its
    /// next step onward.
    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.position,
            velocity: self.velocity,
            acceleration: self.acceleration,
            drag: self.drag,
            bounce: self.bounce,
            max_velocity: self.max_velocity,
            gravity_factor: self.gravity_factor,
            mass: self.mass,
            immovable: self.immovable,
            size: self.size,
            offset: self.offset,
            shape: self.shape,
            category: self.category,
            collides: self.collides,
            check_against: self.check_against,
            collide_world_bounds: self.collide_world_bounds,
        }
    }

    /// Rebuild a body from a snapshot under a freshly assigned id.
    pub fn restore(id: BodyId, snap: &BodySnapshot) -> Self {
        Self {
            id,
            position: snap.position,
            previous_position: snap.position,
            velocity: snap.velocity,
            acceleration: snap.acceleration,
            drag: snap.drag,
            gravity_factor: snap.gravity_factor,
            bounce: snap.bounce,
            size: snap.size,
            offset: snap.offset,
            max_velocity: snap.max_velocity,
            mass: snap.mass,
            immovable: snap.immovable,
            category: snap.category,
            collides: snap.collides,
            check_against: snap.check_against,
            blocked: Blocked::default(),
            enabled: true,
            shape: snap.shape,
            collide_world_bounds: snap.collide_world_bounds,
        }
    }
}

/// One axis of the velocity rule: acceleration wins over drag; drag reduces
/// the magnitude toward zero and never reverses the sign.
fn integrate_axis(velocity: f32, acceleration: f32, drag: f32, delta: f32) -> f32 {
    if acceleration != 0.0 {
        velocity + acceleration * delta
    } else if drag != 0.0 {
        let decay = drag * delta;
        if velocity - decay > 0.0 {
            velocity - decay
        } else if velocity + decay < 0.0 {
            velocity + decay
        } else {
            0.0
        }
    } else {
        velocity
    }
}

/// JSON-serializable snapshot of a body for save/restore tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub drag: Vec2,
    pub bounce: Vec2,
    pub max_velocity: Vec2,
    pub gravity_factor: f32,
    pub mass: f32,
    pub immovable: bool,
    pub size: Vec2,
    pub offset: Vec2,
    pub shape: Shape,
    pub category: u32,
    pub collides: u32,
    pub check_against: u32,
    pub collide_world_bounds: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    fn make_body() -> Body {
        Body::new(BodyId(1), 0.0, 0.0, 32.0, 32.0)
    }

    // ==================== INTEGRATION TESTS ====================

    #[test]
    fn test_velocity_moves_position() {
        let mut body = make_body();
        body.velocity = Vec2::new(100.0, 0.0);
        body.integrate(Vec2::ZERO, 0.016);
        assert!(approx_eq(body.position.x, 1.6));
        assert!(approx_eq(body.position.y, 0.0));
    }

    #[test]
    fn test_gravity_adds_before_move() {
        let mut body = make_body();
        body.integrate(Vec2::new(0.0, 500.0), 0.016);
        assert!(approx_eq(body.velocity.y, 8.0));
        // Position uses the post-gravity velocity.
        assert!(approx_eq(body.position.y, 8.0 * 0.016));
    }

    #[test]
    fn test_gravity_factor_scales() {
        let mut body = make_body();
        body.gravity_factor = 0.5;
        body.integrate(Vec2::new(0.0, 500.0), 0.016);
        assert!(approx_eq(body.velocity.y, 4.0));
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut body = make_body();
        body.velocity = Vec2::new(100.0, 50.0);
        body.blocked.set_left();
        body.integrate(Vec2::new(0.0, 500.0), 0.0);
        assert!(vec_approx_eq(body.position, Vec2::ZERO));
        assert!(vec_approx_eq(body.velocity, Vec2::new(100.0, 50.0)));
        assert!(body.blocked.left); // not even the flags are touched
    }

    #[test]
    fn test_negative_delta_is_noop() {
        let mut body = make_body();
        body.velocity = Vec2::new(100.0, 0.0);
        body.integrate(Vec2::ZERO, -0.016);
        assert!(vec_approx_eq(body.position, Vec2::ZERO));
    }

    #[test]
    fn test_integration_is_deterministic() {
        let mut a = make_body();
        let mut b = make_body();
        a.velocity = Vec2::new(33.3, -7.25);
        b.velocity = Vec2::new(33.3, -7.25);
        for _ in 0..100 {
            a.integrate(Vec2::new(0.0, 981.0), 1.0 / 60.0);
            b.integrate(Vec2::new(0.0, 981.0), 1.0 / 60.0);
        }
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }

    #[test]
    fn test_blocked_flags_reset_each_step() {
        let mut body = make_body();
        body.blocked.set_down();
        body.integrate(Vec2::ZERO, 0.016);
        assert!(!body.blocked.down);
        assert!(body.blocked.none);
    }

    // ==================== ACCELERATION / DRAG TESTS ====================

    #[test]
    fn test_acceleration_applied() {
        let mut body = make_body();
        body.acceleration = Vec2::new(10.0, 0.0);
        body.integrate(Vec2::ZERO, 1.0);
        assert!(approx_eq(body.velocity.x, 10.0));
    }

    #[test]
    fn test_drag_reduces_magnitude() {
        let mut body = make_body();
        body.velocity = Vec2::new(10.0, -10.0);
        body.drag = Vec2::new(4.0, 4.0);
        body.integrate(Vec2::ZERO, 1.0);
        assert!(approx_eq(body.velocity.x, 6.0));
        assert!(approx_eq(body.velocity.y, -6.0));
    }

    #[test]
    fn test_drag_never_reverses_sign() {
        let mut body = make_body();
        body.velocity = Vec2::new(2.0, -2.0);
        body.drag = Vec2::new(100.0, 100.0);
        body.integrate(Vec2::ZERO, 1.0);
        assert!(approx_eq(body.velocity.x, 0.0));
        assert!(approx_eq(body.velocity.y, 0.0));
    }

    #[test]
    fn test_acceleration_suppresses_drag() {
        let mut body = make_body();
        body.velocity = Vec2::new(10.0, 0.0);
        body.acceleration = Vec2::new(1.0, 0.0);
        body.drag = Vec2::new(100.0, 0.0);
        body.integrate(Vec2::ZERO, 1.0);
        assert!(approx_eq(body.velocity.x, 11.0));
    }

    #[test]
    fn test_velocity_clamped_to_max() {
        let mut body = make_body();
        body.max_velocity = Vec2::new(50.0, 50.0);
        body.velocity = Vec2::new(40.0, -40.0);
        body.acceleration = Vec2::new(1000.0, -1000.0);
        body.integrate(Vec2::ZERO, 1.0);
        assert!(approx_eq(body.velocity.x, 50.0));
        assert!(approx_eq(body.velocity.y, -50.0));
    }

    // ==================== SHAPE / BOUNDS TESTS ====================

    #[test]
    fn test_bounds_are_top_left_anchored() {
        let body = Body::new(BodyId(2), 10.0, 20.0, 30.0, 40.0);
        let (min, max) = body.bounds();
        assert!(vec_approx_eq(min, Vec2::new(10.0, 20.0)));
        assert!(vec_approx_eq(max, Vec2::new(40.0, 60.0)));
        assert!(vec_approx_eq(body.center(), Vec2::new(25.0, 40.0)));
    }

    #[test]
    fn test_set_circle_updates_size() {
        let mut body = make_body();
        body.set_circle(8.0);
        assert!(body.is_circle());
        assert!(approx_eq(body.radius(), 8.0));
        assert!(vec_approx_eq(body.size, Vec2::new(16.0, 16.0)));
    }

    #[test]
    fn test_overlaps() {
        let a = Body::new(BodyId(1), 0.0, 0.0, 32.0, 32.0);
        let b = Body::new(BodyId(2), 16.0, 0.0, 32.0, 32.0);
        let c = Body::new(BodyId(3), 100.0, 100.0, 32.0, 32.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Body::new(BodyId(1), 0.0, 0.0, 32.0, 32.0);
        let b = Body::new(BodyId(2), 32.0, 0.0, 32.0, 32.0);
        assert!(!a.overlaps(&b));
    }

    // ==================== SNAPSHOT TESTS ====================

    #[test]
    fn test_snapshot_roundtrip_preserves_behavior() {
        let mut original = make_body();
        original.velocity = Vec2::new(12.0, -3.0);
        original.acceleration = Vec2::new(0.0, 5.0);
        original.bounce = Vec2::new(0.5, 0.5);
        original.mass = 2.5;
        original.set_circle(16.0);

        let snap = original.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let parsed: BodySnapshot = serde_json::from_str(&json).unwrap();
        let mut restored = Body::restore(BodyId(99), &parsed);

        for _ in 0..10 {
            original.integrate(Vec2::new(0.0, 100.0), 1.0 / 60.0);
            restored.integrate(Vec2::new(0.0, 100.0), 1.0 / 60.0);
        }
        assert_eq!(original.position, restored.position);
        assert_eq!(original.velocity, restored.velocity);
    }

    #[test]
    fn test_snapshot_excludes_transient_state() {
        let mut body = make_body();
        body.blocked.set_down();
        let snap = body.snapshot();
        let restored = Body::restore(BodyId(2), &snap);
        assert!(restored.blocked.none);
    }
}
