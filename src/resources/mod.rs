//! ECS resources made available to systems.
//!
//! Overview
//! - `config` – all simulation tunables, injected as `Res<PhysicsConfig>`
//! - `registry` – body id allocation and id-to-entity lookup
//! - `spatialtree` – the broad-phase AABB tree, rebuilt every substep
//! - `tileregion` – static tile collision grid, read-only for the engine
//! - `worldtime` – simulation clock written by the world facade

pub mod config;
pub mod registry;
pub mod spatialtree;
pub mod tileregion;
pub mod worldtime;
