use super::permutation::{PermutationTable, build_permutation};
use super::perlin::perlin_sample;
use crate::grid::Grid;

/// Octave stack with one permutation table per octave, seeded `seed + i`.
///
/// Built once per configuration and shared read-only between chunk jobs.
#[derive(Clone, Debug)]
pub struct FractalNoise {
    pub base_frequency: f32,
    pub base_amplitude: f32,
    pub persistence: f32,
    tables: Vec<PermutationTable>,
}

impl FractalNoise {
    pub fn new(
        base_frequency: f32,
        base_amplitude: f32,
        octaves: u32,
        persistence: f32,
        seed: i32,
    ) -> Self {
        let tables = (0..octaves)
            .map(|i| build_permutation(seed.wrapping_add(i as i32)))
            .collect();
        Self {
            base_frequency,
            base_amplitude,
            persistence,
            tables,
        }
    }

    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let mut sum = 0.0;
        for (i, perm) in self.tables.iter().enumerate() {
            let freq = self.base_frequency * 2f32.powi(i as i32);
            let amp = self.base_amplitude * self.persistence.powi(i as i32);
            sum += perlin_sample(x * freq, z * freq, perm) * amp;
        }
        sum
    }

    pub fn sample_grid(&self, grid: &Grid) -> Vec<f32> {
        grid.points.iter().map(|p| self.sample(p.x, p.y)).collect()
    }
}

/// Single gradient-noise layer over every grid point.
pub fn noise2d(grid: &Grid, frequency: f32, seed: i32) -> Vec<f32> {
    let perm = build_permutation(seed);
    grid.points
        .iter()
        .map(|p| perlin_sample(p.x * frequency, p.y * frequency, &perm))
        .collect()
}

pub fn fractal_noise(
    grid: &Grid,
    base_frequency: f32,
    base_amplitude: f32,
    octaves: u32,
    persistence: f32,
    seed: i32,
) -> Vec<f32> {
    FractalNoise::new(base_frequency, base_amplitude, octaves, persistence, seed).sample_grid(grid)
}
