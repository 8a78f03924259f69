//! Simulation clock resource.
//!
//! Written by the world facade before each substep; systems read `delta`
//! (already time-scaled) and never touch wall-clock time themselves.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Total simulated seconds.
    pub elapsed: f32,
    /// Duration of the current substep in seconds.
    pub delta: f32,
    /// Substeps executed since world creation.
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    /// Advance the clock by one substep of `delta` seconds.
    pub fn advance(&mut self, delta: f32) {
        self.elapsed += delta;
        self.delta = delta;
        self.frame_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut time = WorldTime::default();
        time.advance(0.016);
        time.advance(0.016);
        assert_eq!(time.frame_count, 2);
        assert!((time.elapsed - 0.032).abs() < 1e-6);
        assert!((time.delta - 0.016).abs() < 1e-6);
    }
}
