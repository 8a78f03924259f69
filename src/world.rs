//! The simulation controller.
//!
//! [`PhysicsWorld`] owns the ECS world, the chained step schedule, the pause
//! state and the fixed-step accumulator. It is the single entry point for
//! the game-object layer: create and remove bodies, drive `step()`, and
//! receive contacts through a registered
//! [`ContactObserver`](crate::events::contact::ContactObserver).
//!
//! A step runs to completion before returning, so callers always observe a
//! fully resolved world. Nothing else may mutate body state while `step()`
//! runs (single-writer discipline).

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::debug;

use crate::components::body::{Body, BodyId, BodySnapshot};
use crate::events::contact::{
    BodyCollision, BodyOverlap, ContactObserver, NullObserver, TileCollision, WorldEdgeContact,
};
use crate::resources::config::PhysicsConfig;
use crate::resources::registry::BodyRegistry;
use crate::resources::spatialtree::AabbTree;
use crate::resources::tileregion::TileRegion;
use crate::resources::worldtime::WorldTime;
use crate::systems::broadphase::rebuild_spatial_tree;
use crate::systems::collision::{overlap_only, resolve_body_collisions};
use crate::systems::movement::integrate_bodies;
use crate::systems::tilecollision::resolve_tile_collisions;
use crate::systems::worldbounds::clamp_world_bounds;

/// Upper bound on catch-up substeps per `step()` call. Excess accumulated
/// time is discarded rather than simulated, trading accuracy for a bounded
/// step cost when the host stalls (e.g. a backgrounded tab).
const MAX_SUBSTEPS: u32 = 10;

/// Arcade physics world facade.
///
/// # Example
/// ```ignore
/// let mut world = PhysicsWorld::new(PhysicsConfig::default());
/// let id = world.create_body(0.0, 0.0, 32.0, 32.0)?;
/// world.body_mut(id).unwrap().velocity.x = 100.0;
/// world.step(1.0 / 60.0);
/// ```
pub struct PhysicsWorld {
    world: World,
    schedule: Schedule,
    observer: Box<dyn ContactObserver>,
    paused: bool,
    accumulator: f32,
}

impl PhysicsWorld {
    /// Build a world from the given configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        let paused = config.is_paused;

        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(BodyRegistry::new());
        world.insert_resource(AabbTree::new());
        world.insert_resource(config);
        world.init_resource::<Messages<BodyCollision>>();
        world.init_resource::<Messages<BodyOverlap>>();
        world.init_resource::<Messages<TileCollision>>();
        world.init_resource::<Messages<WorldEdgeContact>>();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                integrate_bodies,
                rebuild_spatial_tree,
                resolve_tile_collisions,
                resolve_body_collisions,
                clamp_world_bounds,
            )
                .chain(),
        );
        schedule
            .initialize(&mut world)
            .expect("Failed to initialize physics schedule");

        Self {
            world,
            schedule,
            observer: Box::new(NullObserver),
            paused,
            accumulator: 0.0,
        }
    }

    // --------------- body lifecycle ---------------

    /// Create a box body. Fails on non-positive size; the world is not
    /// mutated on error.
    pub fn create_body(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<BodyId, String> {
        if !(width > 0.0 && height > 0.0) {
            return Err(format!(
                "Body size must be positive, got {}x{}",
                width, height
            ));
        }
        let id = self.world.resource_mut::<BodyRegistry>().allocate();
        let entity = self.world.spawn(Body::new(id, x, y, width, height)).id();
        self.world.resource_mut::<BodyRegistry>().insert(id, entity);
        Ok(id)
    }

    /// Create a circle body whose bounds are the enclosing square.
    pub fn create_circle_body(&mut self, x: f32, y: f32, radius: f32) -> Result<BodyId, String> {
        if !(radius > 0.0) {
            return Err(format!("Circle radius must be positive, got {}", radius));
        }
        let id = self.create_body(x, y, radius * 2.0, radius * 2.0)?;
        if let Some(mut body) = self.body_mut(id) {
            body.set_circle(radius);
        }
        Ok(id)
    }

    /// Recreate a body from a snapshot under a fresh id.
    pub fn create_body_from_snapshot(&mut self, snap: &BodySnapshot) -> Result<BodyId, String> {
        if !(snap.size.x > 0.0 && snap.size.y > 0.0) {
            return Err(format!(
                "Snapshot size must be positive, got {}x{}",
                snap.size.x, snap.size.y
            ));
        }
        if snap.category == 0 {
            return Err("Snapshot category mask must be non-zero".to_string());
        }
        let id = self.world.resource_mut::<BodyRegistry>().allocate();
        let entity = self.world.spawn(Body::restore(id, snap)).id();
        self.world.resource_mut::<BodyRegistry>().insert(id, entity);
        Ok(id)
    }

    /// Detach and despawn a body. Returns false for unknown (or already
    /// removed) ids. The id is never reused.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(entity) = self.world.resource_mut::<BodyRegistry>().remove(id) else {
            return false;
        };
        self.world.despawn(entity);
        true
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        let entity = self.world.resource::<BodyRegistry>().entity(id)?;
        self.world.get::<Body>(entity)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<Mut<'_, Body>> {
        let entity = self.world.resource::<BodyRegistry>().entity(id)?;
        self.world.get_mut::<Body>(entity)
    }

    pub fn body_count(&self) -> usize {
        self.world.resource::<BodyRegistry>().len()
    }

    /// Persisted-relevant state of a body, or None for unknown ids.
    pub fn snapshot(&self, id: BodyId) -> Option<BodySnapshot> {
        self.body(id).map(Body::snapshot)
    }

    /// Trigger-style intersection test between two bodies; nothing is
    /// displaced and no events fire.
    pub fn overlap(&self, a: BodyId, b: BodyId) -> bool {
        match (self.body(a), self.body(b)) {
            (Some(body_a), Some(body_b)) => overlap_only(body_a, body_b),
            _ => false,
        }
    }

    // --------------- configuration ---------------

    pub fn config(&self) -> &PhysicsConfig {
        self.world.resource::<PhysicsConfig>()
    }

    pub fn config_mut(&mut self) -> &mut PhysicsConfig {
        self.world.resource_mut::<PhysicsConfig>().into_inner()
    }

    /// Convenience for the most common tunable.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config_mut().gravity = gravity;
    }

    pub fn set_tile_region(&mut self, region: TileRegion) {
        self.world.insert_resource(region);
    }

    pub fn clear_tile_region(&mut self) {
        self.world.remove_resource::<TileRegion>();
    }

    pub fn set_observer(&mut self, observer: Box<dyn ContactObserver>) {
        self.observer = observer;
    }

    // --------------- stepping ---------------

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze the simulation. While paused `step()` returns immediately,
    /// body state does not change and no events fire.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.observer.paused();
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.observer.resumed();
        }
    }

    /// Advance the simulation by `delta` seconds of wall time.
    ///
    /// The delta is scaled by `time_scale`, then either accumulated into
    /// fixed `1/fps` substeps (default) or run as a single variable substep.
    /// All contacts produced by the call are forwarded to the observer
    /// before it returns.
    pub fn step(&mut self, delta: f32) {
        if self.paused || delta <= 0.0 {
            return;
        }
        let (scaled, fixed_step, step_delta) = {
            let config = self.world.resource::<PhysicsConfig>();
            (
                delta * config.time_scale,
                config.fixed_step,
                config.step_delta(),
            )
        };
        if scaled <= 0.0 {
            return;
        }

        if fixed_step {
            self.accumulator += scaled;
            let mut substeps = 0;
            while self.accumulator >= step_delta && substeps < MAX_SUBSTEPS {
                self.run_substep(step_delta);
                self.accumulator -= step_delta;
                substeps += 1;
            }
            if self.accumulator >= step_delta {
                debug!(
                    "physics falling behind: discarding {:.4}s of accumulated time",
                    self.accumulator
                );
                self.accumulator %= step_delta;
            }
        } else {
            self.run_substep(scaled);
        }

        self.forward_contacts();
        let elapsed = self.elapsed();
        self.observer.step_complete(elapsed);
    }

    fn run_substep(&mut self, delta: f32) {
        self.world.resource_mut::<WorldTime>().advance(delta);
        self.schedule.run(&mut self.world);
    }

    /// Drain the step's buffered messages into the observer, in pipeline
    /// order: tile contacts, pair collisions, overlaps, world edges.
    fn forward_contacts(&mut self) {
        let tiles: Vec<TileCollision> = self
            .world
            .resource_mut::<Messages<TileCollision>>()
            .drain()
            .collect();
        let collisions: Vec<BodyCollision> = self
            .world
            .resource_mut::<Messages<BodyCollision>>()
            .drain()
            .collect();
        let overlaps: Vec<BodyOverlap> = self
            .world
            .resource_mut::<Messages<BodyOverlap>>()
            .drain()
            .collect();
        let edges: Vec<WorldEdgeContact> = self
            .world
            .resource_mut::<Messages<WorldEdgeContact>>()
            .drain()
            .collect();

        for contact in tiles {
            self.observer
                .tile_collide(contact.body, contact.tile_x, contact.tile_y, contact.axis);
        }
        for contact in collisions {
            self.observer.collide(contact.a, contact.b, contact.axis);
        }
        for contact in overlaps {
            self.observer.overlap(contact.a, contact.b);
        }
        for contact in edges {
            self.observer.world_bounds(contact.body, contact.edge);
        }
    }

    /// Elapsed simulated seconds.
    pub fn elapsed(&self) -> f32 {
        self.world.resource::<WorldTime>().elapsed
    }

    /// Substeps executed since creation.
    pub fn frame_count(&self) -> u64 {
        self.world.resource::<WorldTime>().frame_count
    }
}
