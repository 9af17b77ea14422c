use glam::{IVec2, Vec2};
use serde::Deserialize;

use crate::color::ColorBands;
use crate::scatter::ScatterConfig;

// --- Config ---

/// How raw per-sample noise is produced for a chunk.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum HeightStyle {
    /// Multi-octave gradient noise sampled in world space; seamless.
    #[default]
    Fractal,
    /// Per-chunk value lattice seeded from `(seed, cx, cz)`; chunk edges do not match.
    Value,
    /// Uncorrelated per-sample values seeded like `Value`.
    White,
    Flat,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: i32,
    /// Samples per chunk along x and z.
    pub nx: usize,
    pub nz: usize,
    /// World units spanned by one chunk edge.
    pub chunk_size: f32,
    pub view_distance_chunks: i32,
    /// Chunks applied per frame; 0 means no limit.
    pub chunk_build_budget_per_frame: usize,
    /// Background generation threads; 0 builds chunks inline on the caller.
    pub worker_threads: usize,
    pub noise_base_frequency: f32,
    pub noise_amplitude: f32,
    pub noise_octaves: u32,
    pub noise_persistence: f32,
    pub height_scale: f32,
    pub style: HeightStyle,
    /// Quantize heights to this step; 0 disables terracing.
    pub terrace_step: f32,
    pub scatter: ScatterConfig,
    pub color_bands: Option<ColorBands>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            nx: 100,
            nz: 100,
            chunk_size: 100.0,
            view_distance_chunks: 2,
            chunk_build_budget_per_frame: 0,
            worker_threads: 0,
            noise_base_frequency: 0.05,
            noise_amplitude: 2.0,
            noise_octaves: 4,
            noise_persistence: 0.3,
            height_scale: 2.0,
            style: HeightStyle::Fractal,
            terrace_step: 0.0,
            scatter: ScatterConfig::default(),
            color_bands: None,
        }
    }
}

impl TerrainConfig {
    /// Floor division of a world position by the chunk size.
    pub fn chunk_of_world(&self, world_xz: Vec2) -> IVec2 {
        IVec2::new(
            (world_xz.x / self.chunk_size).floor() as i32,
            (world_xz.y / self.chunk_size).floor() as i32,
        )
    }

    pub fn chunk_origin_world(&self, coord: IVec2) -> Vec2 {
        Vec2::new(
            coord.x as f32 * self.chunk_size,
            coord.y as f32 * self.chunk_size,
        )
    }
}

// --- Frame ---

/// Per-frame input to the chunk trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameContext {
    pub viewer_world_xz: Vec2,
    pub delta_seconds: f32,
}

impl FrameContext {
    pub fn at(viewer_world_xz: Vec2) -> Self {
        Self {
            viewer_world_xz,
            delta_seconds: 0.0,
        }
    }
}
