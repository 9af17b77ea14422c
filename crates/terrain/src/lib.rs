//! Procedural heightfield terrain: chunk grids, noise, meshing, scattering
//! and viewer-driven chunk streaming. Rendering lives in `terrain-viewer`.

pub mod color;
pub mod error;
pub mod grid;
pub mod heightfield;
pub mod mesh;
pub mod noise;
pub mod primitives;
pub mod scatter;
pub mod types;
pub mod world;

pub use error::TerrainError;
pub use types::*;
pub use world::*;
