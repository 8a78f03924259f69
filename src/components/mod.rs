//! ECS components.
//!
//! Submodules overview:
//! - [`body`] – the simulated rigid body: kinematic state, collision masks,
//!   contact flags and the per-step integration rules

pub mod body;
