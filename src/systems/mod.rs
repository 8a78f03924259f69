//! Simulation systems.
//!
//! This module groups the ECS systems that advance one physics substep. The
//! world facade chains them in a fixed order so every substep is fully
//! deterministic.
//!
//! Submodules overview
//! - [`movement`] – integrate velocities, gravity, acceleration and drag
//! - [`broadphase`] – rebuild the AABB tree from current body bounds
//! - [`tilecollision`] – trace bodies against the static tile grid
//! - [`collision`] – narrow-phase separation of body pairs and overlap checks
//! - [`worldbounds`] – clamp opted-in bodies to the world rectangle

pub mod broadphase;
pub mod collision;
pub mod movement;
pub mod tilecollision;
pub mod worldbounds;
