//! Seeded noise sources for heightfield synthesis.

mod fractal;
mod perlin;
mod permutation;
mod value;

pub use fractal::{FractalNoise, fractal_noise, noise2d};
pub use perlin::{fade, perlin_sample};
pub use permutation::{LegacyRand, PermutationTable, build_permutation};
pub use value::{ValueLattice, flat_noise, smoothstep, value_noise, white_noise};
