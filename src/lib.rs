//! Rebound arcade physics library.
//!
//! A headless 2D rigid-body simulation in the arcade style: axis-aligned
//! boxes and circles, per-step integration with gravity/acceleration/drag,
//! an AABB-tree broad phase, bias-corrected narrow-phase separation and a
//! tile-grid collision adapter. Built on bevy_ecs; the
//! [`world::PhysicsWorld`] facade is the public entry point.
//!
//! - [`components`] – the [`Body`](components::body::Body) component
//! - [`events`] – contact messages and the observer interface
//! - [`resources`] – configuration, clock, registry, spatial tree, tile grid
//! - [`systems`] – the per-substep simulation systems
//! - [`world`] – the simulation controller

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;
pub mod world;
