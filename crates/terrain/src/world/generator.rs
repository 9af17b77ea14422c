use std::sync::atomic::{AtomicBool, Ordering};

use glam::{IVec2, Vec2, Vec3};
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::grid::{Grid, make_grid};
use crate::heightfield::{HeightField, make_heightfield, terrace};
use crate::mesh::{Mesh, build_surface_mesh};
use crate::noise::{FractalNoise, flat_noise, value_noise, white_noise};
use crate::scatter::scatter;
use crate::types::{HeightStyle, TerrainConfig};

/// A finished, immutable terrain patch. Positions are in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkData {
    pub coord: IVec2,
    pub origin: Vec2,
    pub heightfield: HeightField,
    pub mesh: Mesh,
    /// Scattered prototype instances; empty when scattering is off.
    pub decorations: Mesh,
}

impl ChunkData {
    /// Translation-only model transform for chunk-local meshes.
    pub fn model_translation(&self) -> Vec3 {
        Vec3::new(self.origin.x, 0.0, self.origin.y)
    }

    pub fn local_mesh(&self) -> Mesh {
        self.mesh.translated(-self.model_translation())
    }

    pub fn local_decorations(&self) -> Mesh {
        self.decorations.translated(-self.model_translation())
    }
}

/// Mixes the world seed with a chunk coordinate (splitmix64 finalizer).
pub fn chunk_seed(seed: i32, coord: IVec2) -> u64 {
    let packed = ((coord.x as u32 as u64) << 32) | coord.y as u32 as u64;
    let mut z = (seed as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ packed;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Everything a chunk job needs, shared read-only between workers.
///
/// Permutation tables are built once here; every chunk derives any other
/// randomness from [`chunk_seed`], so output does not depend on which
/// thread builds it or in what order.
pub struct ChunkGenerator {
    config: TerrainConfig,
    noise: FractalNoise,
    prototype: Mesh,
}

impl ChunkGenerator {
    pub fn new(config: TerrainConfig) -> Self {
        let noise = FractalNoise::new(
            config.noise_base_frequency,
            config.noise_amplitude,
            config.noise_octaves,
            config.noise_persistence,
            config.seed,
        );
        let prototype = config.scatter.prototype.build();
        Self {
            config,
            noise,
            prototype,
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn build(&self, coord: IVec2) -> ChunkData {
        let grid = self.grid(coord);
        let heightfield = self.heightfield(&grid, coord);
        let mesh = self.surface(&grid, &heightfield);
        self.finish(coord, heightfield, mesh)
    }

    /// Same as [`build`](Self::build), but gives up with `None` as soon as
    /// `cancel` is raised between pipeline stages.
    pub fn build_cancellable(&self, coord: IVec2, cancel: &AtomicBool) -> Option<ChunkData> {
        let cancelled = || cancel.load(Ordering::Relaxed);
        if cancelled() {
            return None;
        }

        let grid = self.grid(coord);
        let heightfield = self.heightfield(&grid, coord);
        if cancelled() {
            return None;
        }

        let mesh = self.surface(&grid, &heightfield);
        if cancelled() {
            return None;
        }

        Some(self.finish(coord, heightfield, mesh))
    }

    fn grid(&self, coord: IVec2) -> Grid {
        let c = &self.config;
        make_grid(coord.x, coord.y, c.nx, c.nz, c.chunk_size)
    }

    fn heightfield(&self, grid: &Grid, coord: IVec2) -> HeightField {
        let raw = self.sample_noise(grid, coord);
        let mut heightfield = make_heightfield(grid.nx, grid.nz, &raw, self.config.height_scale);
        terrace(&mut heightfield, self.config.terrace_step);
        heightfield
    }

    fn surface(&self, grid: &Grid, heightfield: &HeightField) -> Mesh {
        let mut mesh = build_surface_mesh(grid, heightfield);
        if let Some(bands) = &self.config.color_bands {
            bands.apply(&mut mesh);
        }
        mesh
    }

    fn finish(&self, coord: IVec2, heightfield: HeightField, mesh: Mesh) -> ChunkData {
        let c = &self.config;
        let decorations = if c.scatter.density > 0.0 {
            let mut rng = StdRng::seed_from_u64(chunk_seed(c.seed, coord));
            scatter(
                &self.prototype,
                &mesh,
                c.scatter.density,
                c.scatter.scale_variance,
                c.scatter.rotation_variance,
                &mut rng,
            )
        } else {
            Mesh::default()
        };

        let (low, high) = heightfield.min_max().unwrap_or_default();
        debug!(
            "built chunk {coord}: {} vertices, {} triangles, {} decoration vertices, heights {low:.2}..{high:.2}",
            mesh.vertices.len(),
            mesh.triangle_count(),
            decorations.vertices.len()
        );

        ChunkData {
            coord,
            origin: c.chunk_origin_world(coord),
            heightfield,
            mesh,
            decorations,
        }
    }

    fn sample_noise(&self, grid: &Grid, coord: IVec2) -> Vec<f32> {
        match self.config.style {
            HeightStyle::Fractal => self.noise.sample_grid(grid),
            HeightStyle::Value => {
                let seed = (chunk_seed(self.config.seed, coord) >> 32) as i32;
                // Lattice rows run along z so the output lines up with the grid.
                value_noise(grid.nz, grid.nx, seed)
                    .into_iter()
                    .map(|v| v * 2.0 - 1.0)
                    .collect()
            }
            HeightStyle::White => {
                let seed = (chunk_seed(self.config.seed, coord) >> 32) as i32;
                white_noise(grid.nz, grid.nx, seed)
                    .into_iter()
                    .map(|v| v * 2.0 - 1.0)
                    .collect()
            }
            HeightStyle::Flat => flat_noise(grid, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Primitive;
    use crate::scatter::ScatterConfig;

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            nx: 9,
            nz: 7,
            chunk_size: 16.0,
            ..Default::default()
        }
    }

    #[test]
    fn chunk_matches_manual_pipeline() {
        let config = small_config();
        let chunk = ChunkGenerator::new(config.clone()).build(IVec2::new(2, -3));

        let grid = make_grid(2, -3, 9, 7, 16.0);
        let raw = crate::noise::fractal_noise(
            &grid,
            config.noise_base_frequency,
            config.noise_amplitude,
            config.noise_octaves,
            config.noise_persistence,
            config.seed,
        );
        let hf = make_heightfield(9, 7, &raw, config.height_scale);

        assert_eq!(chunk.heightfield, hf);
        assert_eq!(chunk.mesh, build_surface_mesh(&grid, &hf));
        assert_eq!(chunk.origin, Vec2::new(32.0, -48.0));
        assert!(chunk.decorations.is_empty());
    }

    #[test]
    fn default_config_feeds_one_amplitude_through_both_stages() {
        let config = TerrainConfig::default();
        let chunk = ChunkGenerator::new(config.clone()).build(IVec2::new(1, -1));

        let grid = make_grid(1, -1, 100, 100, 100.0);
        let raw = crate::noise::fractal_noise(&grid, 0.05, 2.0, 4, 0.3, 1);
        let expected = make_heightfield(100, 100, &raw, 2.0);

        assert_eq!(config.noise_amplitude, config.height_scale);
        assert_eq!(chunk.heightfield, expected);
    }

    #[test]
    fn white_style_is_seeded_per_chunk() {
        let config = TerrainConfig {
            style: HeightStyle::White,
            ..small_config()
        };
        let generator = ChunkGenerator::new(config);
        let a = generator.build(IVec2::new(3, 3));
        assert_eq!(a, generator.build(IVec2::new(3, 3)));
        assert_ne!(a.heightfield, generator.build(IVec2::new(3, 4)).heightfield);
        let (low, high) = a.heightfield.min_max().unwrap();
        assert!(low >= 0.0 && high <= 2.0, "{low}..{high}");
    }

    #[test]
    fn local_mesh_starts_at_origin() {
        let chunk = ChunkGenerator::new(small_config()).build(IVec2::new(-1, 4));
        let local = chunk.local_mesh();
        let first = local.vertices[0].position;
        assert!(first.x.abs() < 1e-4 && first.z.abs() < 1e-4);
        assert_eq!(chunk.model_translation(), Vec3::new(-16.0, 0.0, 64.0));
    }

    #[test]
    fn cancelled_build_returns_none() {
        let generator = ChunkGenerator::new(small_config());
        let cancel = AtomicBool::new(true);
        assert!(generator.build_cancellable(IVec2::ZERO, &cancel).is_none());
    }

    #[test]
    fn decorations_are_reproducible_per_chunk() {
        let config = TerrainConfig {
            scatter: ScatterConfig {
                density: 0.3,
                prototype: Primitive::Plane,
                ..Default::default()
            },
            ..small_config()
        };
        let a = ChunkGenerator::new(config.clone()).build(IVec2::new(5, 5));
        let b = ChunkGenerator::new(config).build(IVec2::new(5, 5));
        assert!(!a.decorations.is_empty());
        assert_eq!(a.decorations, b.decorations);
    }

    #[test]
    fn styles_produce_grid_sized_fields() {
        for style in [
            HeightStyle::Fractal,
            HeightStyle::Value,
            HeightStyle::White,
            HeightStyle::Flat,
        ] {
            let config = TerrainConfig {
                style,
                ..small_config()
            };
            let chunk = ChunkGenerator::new(config).build(IVec2::new(1, 1));
            assert_eq!(chunk.heightfield.heights.len(), 63);
            assert!(chunk.mesh.is_well_formed());
        }
    }

    #[test]
    fn flat_style_sits_at_half_height() {
        let config = TerrainConfig {
            style: HeightStyle::Flat,
            height_scale: 6.0,
            ..small_config()
        };
        let chunk = ChunkGenerator::new(config).build(IVec2::ZERO);
        assert!(chunk.heightfield.heights.iter().all(|&h| h == 3.0));
    }

    #[test]
    fn chunk_seed_separates_neighbours() {
        let a = chunk_seed(1, IVec2::new(0, 0));
        assert_ne!(a, chunk_seed(1, IVec2::new(1, 0)));
        assert_ne!(a, chunk_seed(1, IVec2::new(0, 1)));
        assert_ne!(a, chunk_seed(2, IVec2::new(0, 0)));
        assert_eq!(a, chunk_seed(1, IVec2::new(0, 0)));
    }
}
