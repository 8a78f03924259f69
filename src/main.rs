//! Rebound headless runner.
//!
//! A small CLI that exercises the physics core without any rendering: it
//! builds a [`PhysicsWorld`] from an INI config, scatters a seeded set of
//! boxes and circles above a tile floor, steps the simulation at 60 fps and
//! logs contact statistics at the end.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --bodies 100 --steps 600
//! RUST_LOG=debug cargo run -- --seed 42
//! ```

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use glam::Vec2;

use rebound::components::body::BodyId;
use rebound::events::contact::{Axis, ContactObserver, Edge};
use rebound::resources::config::{PhysicsConfig, Rect};
use rebound::resources::tileregion::{TileFlags, TileRegion};
use rebound::world::PhysicsWorld;

/// Rebound arcade physics, headless demo
#[derive(Parser)]
#[command(version, about = "Headless arcade-physics simulation runner")]
struct Cli {
    /// Path to the physics INI config (missing file falls back to defaults).
    #[arg(long, value_name = "PATH", default_value = "./physics.ini")]
    config: PathBuf,

    /// Number of bodies to scatter.
    #[arg(long, default_value_t = 50)]
    bodies: u32,

    /// Number of 60 fps steps to simulate.
    #[arg(long, default_value_t = 600)]
    steps: u32,

    /// Seed for the body scatter.
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

#[derive(Default)]
struct ContactStats {
    collisions: u64,
    tile_hits: u64,
    overlaps: u64,
    edge_hits: u64,
}

/// Counts every contact the world forwards.
struct StatsObserver(Rc<RefCell<ContactStats>>);

impl ContactObserver for StatsObserver {
    fn collide(&mut self, _a: BodyId, _b: BodyId, _axis: Axis) {
        self.0.borrow_mut().collisions += 1;
    }
    fn tile_collide(&mut self, _body: BodyId, _tile_x: u32, _tile_y: u32, _axis: Axis) {
        self.0.borrow_mut().tile_hits += 1;
    }
    fn overlap(&mut self, _a: BodyId, _b: BodyId) {
        self.0.borrow_mut().overlaps += 1;
    }
    fn world_bounds(&mut self, _body: BodyId, _edge: Edge) {
        self.0.borrow_mut().edge_hits += 1;
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = PhysicsConfig::with_path(&cli.config);
    config.load_from_file().ok(); // ignore errors, use defaults
    if config.gravity == Vec2::ZERO {
        config.gravity = Vec2::new(0.0, 600.0);
    }
    if config.bounds.is_none() {
        config.bounds = Some(Rect::new(0.0, 0.0, 800.0, 600.0));
    }
    let bounds = config.bounds.expect("bounds were just set");

    log::info!(
        "Simulating {} bodies for {} steps (seed {})",
        cli.bodies,
        cli.steps,
        cli.seed
    );

    let mut world = PhysicsWorld::new(config);

    // Tile floor two cells above the lower bounds edge, so bodies hit tiles
    // before the world edge does anything.
    let tile_size = 32.0;
    let cols = (bounds.width / tile_size).ceil() as u32;
    let rows = (bounds.height / tile_size).ceil() as u32;
    let mut region = TileRegion::new(cols, rows, tile_size);
    region.fill_row(rows.saturating_sub(2), TileFlags::solid());
    world.set_tile_region(region);

    let stats = Rc::new(RefCell::new(ContactStats::default()));
    world.set_observer(Box::new(StatsObserver(stats.clone())));

    let mut rng = fastrand::Rng::with_seed(cli.seed);
    let mut ids = Vec::new();
    for index in 0..cli.bodies {
        let x = bounds.x + rng.f32() * (bounds.width - 64.0);
        let y = bounds.y + rng.f32() * (bounds.height * 0.5);
        let id = if index % 4 == 0 {
            world
                .create_circle_body(x, y, 8.0 + rng.f32() * 8.0)
                .expect("circle creation")
        } else {
            world
                .create_body(x, y, 16.0 + rng.f32() * 24.0, 16.0 + rng.f32() * 24.0)
                .expect("body creation")
        };
        {
            let mut body = world.body_mut(id).expect("body just created");
            body.velocity = Vec2::new(rng.f32() * 400.0 - 200.0, rng.f32() * 100.0 - 50.0);
            body.bounce = Vec2::new(0.6, 0.6);
            body.collide_world_bounds = true;
        }
        ids.push(id);
    }

    for _ in 0..cli.steps {
        world.step(1.0 / 60.0);
    }

    let stats = stats.borrow();
    log::info!(
        "Done after {:.1}s simulated: {} pair collisions, {} tile hits, {} overlaps, {} edge hits",
        world.elapsed(),
        stats.collisions,
        stats.tile_hits,
        stats.overlaps,
        stats.edge_hits
    );

    // A quick sanity readout of where the first few bodies settled.
    for id in ids.iter().take(5) {
        if let Some(body) = world.body(*id) {
            log::info!(
                "body {:?}: pos=({:.1}, {:.1}) vel=({:.1}, {:.1}) blocked_down={}",
                body.id,
                body.position.x,
                body.position.y,
                body.velocity.x,
                body.velocity.y,
                body.blocked.down
            );
        }
    }
}
