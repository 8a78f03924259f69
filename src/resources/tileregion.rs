//! Static tile collision grid resource.
//!
//! A uniform grid of per-cell edge flags owned by the tilemap side of the
//! game; the physics engine only ever reads it. Each flag names the face of
//! the *tile* that blocks: `collide_left` stops bodies moving right into the
//! tile, `collide_up` stops bodies falling onto it, and so on.
//!
//! Regions deserialize from JSON so level tooling can export them next to
//! the tilemap itself.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Blocking faces of a single tile cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TileFlags {
    pub collide_up: bool,
    pub collide_down: bool,
    pub collide_left: bool,
    pub collide_right: bool,
}

impl TileFlags {
    /// A tile blocking from every side.
    pub fn solid() -> Self {
        Self {
            collide_up: true,
            collide_down: true,
            collide_left: true,
            collide_right: true,
        }
    }

    /// A tile that never blocks.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.collide_up || self.collide_down || self.collide_left || self.collide_right
    }
}

/// Read-only tile collision grid.
///
/// Cells are stored row-major. Coordinates outside the grid behave as empty
/// cells, so a region never blocks motion beyond its own extent.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct TileRegion {
    pub tile_size: f32,
    pub width: u32,
    pub height: u32,
    cells: Vec<TileFlags>,
}

impl TileRegion {
    /// Create an all-empty region.
    pub fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self {
            tile_size,
            width,
            height,
            cells: vec![TileFlags::empty(); (width * height) as usize],
        }
    }

    /// Parse a region from its JSON form.
    ///
    /// Returns an error when the document does not parse or the cell count
    /// does not match `width * height`.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let region: TileRegion =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse tile region: {}", e))?;
        let expected = (region.width * region.height) as usize;
        if region.cells.len() != expected {
            return Err(format!(
                "Tile region cell count {} does not match {}x{}",
                region.cells.len(),
                region.width,
                region.height
            ));
        }
        Ok(region)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Flags of the cell at grid coordinates; empty outside the region.
    pub fn cell(&self, x: i32, y: i32) -> TileFlags {
        if self.in_bounds(x, y) {
            self.cells[(y as u32 * self.width + x as u32) as usize]
        } else {
            TileFlags::empty()
        }
    }

    pub fn set_cell(&mut self, x: u32, y: u32, flags: TileFlags) {
        if x < self.width && y < self.height {
            self.cells[(y * self.width + x) as usize] = flags;
        }
    }

    /// Convenience: mark a full row of solid tiles, e.g. a floor.
    pub fn fill_row(&mut self, y: u32, flags: TileFlags) {
        for x in 0..self.width {
            self.set_cell(x, y, flags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_empty() {
        let region = TileRegion::new(4, 4, 32.0);
        assert!(!region.cell(-1, 0).any());
        assert!(!region.cell(0, -1).any());
        assert!(!region.cell(4, 0).any());
        assert!(!region.cell(0, 4).any());
    }

    #[test]
    fn test_set_and_get() {
        let mut region = TileRegion::new(4, 4, 32.0);
        region.set_cell(2, 1, TileFlags::solid());
        assert!(region.cell(2, 1).collide_left);
        assert!(!region.cell(1, 1).any());
    }

    #[test]
    fn test_fill_row() {
        let mut region = TileRegion::new(3, 3, 16.0);
        region.fill_row(2, TileFlags::solid());
        assert!(region.cell(0, 2).any());
        assert!(region.cell(2, 2).any());
        assert!(!region.cell(0, 1).any());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut region = TileRegion::new(2, 2, 32.0);
        region.set_cell(0, 1, TileFlags::solid());
        let json = serde_json::to_string(&region).unwrap();
        let parsed = TileRegion::from_json(&json).unwrap();
        assert_eq!(parsed.width, 2);
        assert!(parsed.cell(0, 1).collide_up);
        assert!(!parsed.cell(1, 1).any());
    }

    #[test]
    fn test_mismatched_cell_count_is_an_error() {
        let json = r#"{"tile_size":32.0,"width":2,"height":2,"cells":[]}"#;
        assert!(TileRegion::from_json(json).is_err());
    }
}
