use super::perlin::lerp;
use super::permutation::LegacyRand;
use crate::grid::Grid;

/// Smoothstep `3t^2 - 2t^3`; value noise uses this instead of the quintic fade.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// One random scalar per lattice point of a `(rows + 1) x (cols + 1)` lattice.
#[derive(Clone, Debug)]
pub struct ValueLattice {
    width: usize,
    depth: usize,
    values: Vec<f32>,
}

impl ValueLattice {
    pub fn new(rows: usize, cols: usize, seed: i32) -> Self {
        let width = rows + 1;
        let depth = cols + 1;
        let mut rng = LegacyRand::from_terrain_seed(seed);
        let values = (0..width * depth).map(|_| rng.next_unit()).collect();
        Self {
            width,
            depth,
            values,
        }
    }

    fn at(&self, x: i64, z: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let z = z.clamp(0, self.depth as i64 - 1) as usize;
        self.values[x * self.depth + z]
    }

    /// Bilinear sample at a continuous lattice position; indices clamp to the lattice.
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let x0 = x.floor();
        let z0 = z.floor();
        let u = smoothstep(x - x0);
        let v = smoothstep(z - z0);
        let (x0, z0) = (x0 as i64, z0 as i64);

        let v00 = self.at(x0, z0);
        let v10 = self.at(x0 + 1, z0);
        let v01 = self.at(x0, z0 + 1);
        let v11 = self.at(x0 + 1, z0 + 1);

        lerp(lerp(v00, v10, u), lerp(v01, v11, u), v)
    }
}

/// Value noise in `[0, 1]` queried at `(i, j)` for `i < rows, j < cols`,
/// laid out as `i * cols + j`.
pub fn value_noise(rows: usize, cols: usize, seed: i32) -> Vec<f32> {
    let lattice = ValueLattice::new(rows, cols, seed);
    let mut out = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            out.push(lattice.sample(i as f32, j as f32));
        }
    }
    out
}

/// Independent uniform `[0, 1]` values, laid out as `i * cols + j`.
pub fn white_noise(rows: usize, cols: usize, seed: i32) -> Vec<f32> {
    let mut rng = LegacyRand::from_terrain_seed(seed);
    (0..rows * cols).map(|_| rng.next_unit()).collect()
}

pub fn flat_noise(grid: &Grid, value: f32) -> Vec<f32> {
    vec![value; grid.len()]
}
