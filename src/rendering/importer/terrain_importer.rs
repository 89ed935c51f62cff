use glam::Vec2;
use holocron_files::terrain::types::TerrainAsset;
use log::{trace, warn};

use crate::rendering::common::types::HeightfieldDescription;

/// Samples per grid side. Finer grids are coarsened until they fit.
pub const MAX_GRID_SIDE: usize = 4096;

pub struct TerrainImporter {}

impl TerrainImporter {
    /// Samples the procedural terrain on a square grid centred on the map origin. Samples start at
    /// the water table and every layer is applied on top.
    pub fn create_heightfield(terrain: &TerrainAsset, spacing: f32) -> HeightfieldDescription {
        profiling::scope!("TerrainImporter::create_heightfield");
        let map_size = terrain.map_size();
        let water_height = terrain.water_height();
        if !map_size.is_finite() || map_size <= 0.0 {
            warn!("Map size {} can't be sampled, emitting an empty heightfield", map_size);
            return HeightfieldDescription {
                origin: Vec2::ZERO,
                spacing,
                rows: 0,
                cols: 0,
                heights: Vec::new(),
                water_height,
            };
        }

        let mut spacing = spacing;
        // Saturating cast, NaN and negative spacings end up with an empty grid
        let mut samples = (map_size / spacing).floor() as usize;
        if samples > MAX_GRID_SIDE {
            samples = MAX_GRID_SIDE;
            spacing = map_size / MAX_GRID_SIDE as f32;
            warn!("Grid for a map of size {} is too fine, sampling every {} units", map_size, spacing);
        }

        let origin = Vec2::splat(-map_size / 2.0);
        trace!("Sampling a {}x{} grid for a map of size {}", samples, samples, map_size);
        let heights = match terrain.sample_grid(origin.x, origin.y, spacing, samples, samples) {
            Ok(heights) => heights,
            Err(err) => {
                warn!("Failed to sample the terrain: {}", err);
                samples = 0;
                Vec::new()
            }
        };

        HeightfieldDescription {
            origin,
            spacing,
            rows: samples,
            cols: samples,
            heights,
            water_height,
        }
    }
}
