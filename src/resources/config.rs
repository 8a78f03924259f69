//! Physics world configuration resource.
//!
//! All tunables of the simulation live here and are injected into systems as
//! `Res<PhysicsConfig>`; nothing in the engine reads global state. Defaults
//! are safe for a 60 fps arcade game and can be overridden from an INI file.
//!
//! # Configuration File Format
//!
//! ```ini
//! [world]
//! gravity_x = 0.0
//! gravity_y = 600.0
//! fps = 60
//! fixed_step = true
//! time_scale = 1.0
//! paused = false
//!
//! [bounds]
//! x = 0.0
//! y = 0.0
//! width = 800.0
//! height = 600.0
//!
//! [collision]
//! overlap_bias = 4.0
//! tile_bias = 16.0
//! check_up = true
//! check_down = true
//! check_left = true
//! check_right = true
//!
//! [broadphase]
//! use_tree = true
//! max_entries = 16
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec2;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_GRAVITY_X: f32 = 0.0;
const DEFAULT_GRAVITY_Y: f32 = 0.0;
const DEFAULT_FPS: u32 = 60;
const DEFAULT_FIXED_STEP: bool = true;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_OVERLAP_BIAS: f32 = 4.0;
const DEFAULT_TILE_BIAS: f32 = 16.0;
const DEFAULT_MAX_ENTRIES: usize = 16;
const DEFAULT_USE_TREE: bool = true;
const DEFAULT_CONFIG_PATH: &str = "./physics.ini";

/// Axis-aligned rectangle, used for the world bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Which world-bounds edges are solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Default for EdgeFlags {
    fn default() -> Self {
        Self {
            up: true,
            down: true,
            left: true,
            right: true,
        }
    }
}

/// Physics configuration resource.
///
/// Constructed by the caller (or loaded from file) and handed to
/// [`PhysicsWorld::new`](crate::world::PhysicsWorld::new). Mutating it after
/// construction is allowed between steps; the systems read it fresh every
/// substep.
#[derive(Resource, Debug, Clone)]
pub struct PhysicsConfig {
    /// World gravity in units per second squared, scaled per body.
    pub gravity: Vec2,
    /// Fixed-step rate. A substep simulates `1.0 / fps` seconds.
    pub fps: u32,
    /// When true, `step()` accumulates delta and runs fixed-size substeps.
    pub fixed_step: bool,
    /// Multiplier applied to the incoming delta before accumulation.
    pub time_scale: f32,
    /// Optional world bounds. Bodies opt in via `collide_world_bounds`.
    pub bounds: Option<Rect>,
    /// Which bounds edges push back.
    pub check_collision: EdgeFlags,
    /// Maximum credible overlap beyond combined per-step motion for
    /// body-vs-body separation. Larger overlaps are ignored for the step.
    pub overlap_bias: f32,
    /// Maximum pre-existing tile penetration the trace will correct.
    pub tile_bias: f32,
    /// Leaf size of the broad-phase tree.
    pub max_entries: usize,
    /// Disable to fall back to brute-force pairwise candidate checks.
    pub use_tree: bool,
    /// Initial pause state of the world.
    pub is_paused: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsConfig {
    /// Create a configuration with safe default values.
    pub fn new() -> Self {
        Self {
            gravity: Vec2::new(DEFAULT_GRAVITY_X, DEFAULT_GRAVITY_Y),
            fps: DEFAULT_FPS,
            fixed_step: DEFAULT_FIXED_STEP,
            time_scale: DEFAULT_TIME_SCALE,
            bounds: None,
            check_collision: EdgeFlags::default(),
            overlap_bias: DEFAULT_OVERLAP_BIAS,
            tile_bias: DEFAULT_TILE_BIAS,
            max_entries: DEFAULT_MAX_ENTRIES,
            use_tree: DEFAULT_USE_TREE,
            is_paused: false,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a configuration with a custom config file path.
    #[allow(dead_code)]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Duration of one fixed substep in seconds.
    pub fn step_delta(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. The bounds
    /// rectangle is only set when all four of its keys are present.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [world] section
        if let Some(gx) = config.getfloat("world", "gravity_x").ok().flatten() {
            self.gravity.x = gx as f32;
        }
        if let Some(gy) = config.getfloat("world", "gravity_y").ok().flatten() {
            self.gravity.y = gy as f32;
        }
        if let Some(fps) = config.getuint("world", "fps").ok().flatten() {
            self.fps = fps as u32;
        }
        if let Some(fixed) = config.getbool("world", "fixed_step").ok().flatten() {
            self.fixed_step = fixed;
        }
        if let Some(scale) = config.getfloat("world", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }
        if let Some(paused) = config.getbool("world", "paused").ok().flatten() {
            self.is_paused = paused;
        }

        // [bounds] section
        let bx = config.getfloat("bounds", "x").ok().flatten();
        let by = config.getfloat("bounds", "y").ok().flatten();
        let bw = config.getfloat("bounds", "width").ok().flatten();
        let bh = config.getfloat("bounds", "height").ok().flatten();
        if let (Some(x), Some(y), Some(w), Some(h)) = (bx, by, bw, bh) {
            self.bounds = Some(Rect::new(x as f32, y as f32, w as f32, h as f32));
        }

        // [collision] section
        if let Some(bias) = config.getfloat("collision", "overlap_bias").ok().flatten() {
            self.overlap_bias = bias as f32;
        }
        if let Some(bias) = config.getfloat("collision", "tile_bias").ok().flatten() {
            self.tile_bias = bias as f32;
        }
        if let Some(up) = config.getbool("collision", "check_up").ok().flatten() {
            self.check_collision.up = up;
        }
        if let Some(down) = config.getbool("collision", "check_down").ok().flatten() {
            self.check_collision.down = down;
        }
        if let Some(left) = config.getbool("collision", "check_left").ok().flatten() {
            self.check_collision.left = left;
        }
        if let Some(right) = config.getbool("collision", "check_right").ok().flatten() {
            self.check_collision.right = right;
        }

        // [broadphase] section
        if let Some(entries) = config.getuint("broadphase", "max_entries").ok().flatten() {
            self.max_entries = (entries as usize).max(1);
        }
        if let Some(tree) = config.getbool("broadphase", "use_tree").ok().flatten() {
            self.use_tree = tree;
        }

        info!(
            "Loaded physics config: gravity=({}, {}), fps={}, fixed_step={}, use_tree={}, max_entries={}",
            self.gravity.x, self.gravity.y, self.fps, self.fixed_step, self.use_tree, self.max_entries
        );

        Ok(())
    }
}
